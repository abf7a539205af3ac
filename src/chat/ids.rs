// File: src/chat/ids.rs

//! Identifier types for the chat session.
//!
//! Every [`Message`](super::message::Message) carries a [`MessageId`] so a view can key
//! its rows, and every submit/settle cycle carries a [`TurnId`] so a late reply can be
//! matched against the turn that is actually in flight.
//!
//! ## Cargo features used by this module
//! - `uuid_v7`: enables `UUIDv7` generation via `uuid/v7`.

use core::fmt;

use uuid::Uuid;

/// Generate an ID that sorts roughly by creation time when `uuid_v7` is enabled.
///
/// Without the feature this falls back to `Uuid::new_v4()`.
#[inline]
#[must_use]
fn uuid_time_ordered() -> Uuid {
    #[cfg(feature = "uuid_v7")]
    {
        Uuid::now_v7()
    }
    #[cfg(not(feature = "uuid_v7"))]
    {
        Uuid::new_v4()
    }
}

/// Declare a UUID newtype with a consistent API.
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(Uuid);

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Create a new identifier.
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(uuid_time_ordered())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_uuid_id!(
    /// Identifier of a single chat message, unique within the page lifetime.
    MessageId
);

define_uuid_id!(
    /// Identifier of one submit/settle cycle against the relay.
    TurnId
);
