//! Client-side chat session: conversation state, quick prompts and the relay transport.
//!
//! [`ChatSession`] is the synchronous state machine; [`ChatController`] drives it
//! through a [`RelayClient`] and notifies a [`SessionView`].

pub mod client;
pub mod controller;
pub mod error;
pub mod ids;
pub mod message;
pub mod session;
pub mod templates;

pub use client::{CHAT_ROUTE, HttpRelayClient, RelayClient};
pub use controller::{ChatController, NullView, SessionView};
pub use error::{RelayFailure, SubmitRejection};
pub use ids::{MessageId, TurnId};
pub use message::{ChatReply, ChatRequest, Message, Role, WireMessage};
pub use session::{ChatSession, PendingTurn, SessionSnapshot, TurnStatus};
pub use templates::{FLOW_DEMO_PROMPT, INITIAL_DRAFT, QUICK_PROMPTS, QuickPromptTemplate};
