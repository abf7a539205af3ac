//! Async driver that turns user intent into relay round trips.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::client::RelayClient;
use super::error::{RelayFailure, SubmitRejection};
use super::ids::TurnId;
use super::message::ChatReply;
use super::session::{ChatSession, SessionSnapshot, TurnStatus};
use super::templates::QuickPromptTemplate;

/// Receives state changes from a [`ChatController`].
pub trait SessionView: Send + Sync {
    /// Called after every state change with the new state.
    fn render(&self, snapshot: &SessionSnapshot);

    /// Called after the conversation grew; views scroll smoothly to the newest message.
    fn scroll_to_bottom(&self) {}
}

/// View that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullView;

impl SessionView for NullView {
    fn render(&self, _snapshot: &SessionSnapshot) {}
}

/// Owns a [`ChatSession`] and a relay transport.
///
/// The session lock is only held for synchronous transitions, never across the
/// relay call, so a second `submit` observes the in-flight turn and is rejected.
pub struct ChatController<C, V = NullView> {
    session: Mutex<ChatSession>,
    client: C,
    view: V,
}

impl<C: RelayClient> ChatController<C, NullView> {
    /// Controller without a view.
    #[must_use]
    pub fn new(session: ChatSession, client: C) -> Self {
        Self::with_view(session, client, NullView)
    }
}

impl<C: RelayClient, V: SessionView> ChatController<C, V> {
    /// Controller that notifies `view` on every change.
    #[must_use]
    pub const fn with_view(session: ChatSession, client: C, view: V) -> Self {
        Self {
            session: Mutex::new(session),
            client,
            view,
        }
    }

    /// Copy the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Whether a send would be accepted right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.lock().can_submit()
    }

    /// Replace the draft input; ignored while a turn is in flight.
    pub fn set_draft(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(|session| session.set_draft(text))
    }

    /// Seed the draft from a template.
    pub fn select_template(&self, template: &'static QuickPromptTemplate) -> bool {
        self.update(|session| session.select_template(template))
    }

    /// Submit the current draft.
    ///
    /// # Errors
    /// See [`ChatController::submit`].
    pub async fn submit_draft(&self) -> Result<TurnStatus, SubmitRejection> {
        let draft = self.lock().draft().to_string();
        self.submit(&draft).await
    }

    /// Clear the template highlight and send `prompt` directly.
    ///
    /// # Errors
    /// See [`ChatController::submit`].
    pub async fn run_demo(&self, prompt: &str) -> Result<TurnStatus, SubmitRejection> {
        self.update(ChatSession::clear_template_selection);
        self.submit(prompt).await
    }

    /// Run one full turn: optimistic append, relay call, reconcile.
    ///
    /// # Errors
    /// Returns [`SubmitRejection`] without touching the conversation or the network when
    /// `text` is blank or another turn is in flight.
    pub async fn submit(&self, text: &str) -> Result<TurnStatus, SubmitRejection> {
        let pending = self.update(|session| session.begin_submit(text))?;
        debug!(
            turn = %pending.id(),
            messages = pending.request().messages.len(),
            "chat turn started"
        );

        let guard = SettleGuard {
            controller: self,
            turn: pending.id(),
            armed: true,
        };
        let outcome = self.client.send(pending.request()).await;
        Ok(guard.settle(outcome))
    }

    fn settle(&self, turn: TurnId, outcome: Result<ChatReply, RelayFailure>) -> TurnStatus {
        if let Err(failure) = &outcome {
            warn!(turn = %turn, error = %failure, "chat turn failed");
        }
        // A turn only settles once; a missing status means it was already reconciled.
        self.update(|session| session.settle(turn, outcome))
            .unwrap_or(TurnStatus::Failed)
    }

    fn update<R>(&self, apply: impl FnOnce(&mut ChatSession) -> R) -> R {
        let (result, before, after) = {
            let mut session = self.lock();
            let before = session.snapshot();
            let result = apply(&mut session);
            (result, before, session.snapshot())
        };

        if after != before {
            self.view.render(&after);
        }
        if after.messages.len() != before.messages.len() {
            self.view.scroll_to_bottom();
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, ChatSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settles the in-flight turn even when the submitting future is dropped.
struct SettleGuard<'a, C: RelayClient, V: SessionView> {
    controller: &'a ChatController<C, V>,
    turn: TurnId,
    armed: bool,
}

impl<C: RelayClient, V: SessionView> SettleGuard<'_, C, V> {
    fn settle(mut self, outcome: Result<ChatReply, RelayFailure>) -> TurnStatus {
        self.armed = false;
        self.controller.settle(self.turn, outcome)
    }
}

impl<C: RelayClient, V: SessionView> Drop for SettleGuard<'_, C, V> {
    fn drop(&mut self) {
        if self.armed {
            self.controller.settle(self.turn, Err(RelayFailure::Abandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::error::{FALLBACK_NOTICE, GENERIC_ERROR_BANNER};
    use crate::chat::message::{ChatRequest, Role, WireMessage};
    use crate::chat::templates::QUICK_PROMPTS;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Echoes the last message, records every request.
    #[derive(Default)]
    struct EchoClient {
        requests: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl RelayClient for EchoClient {
        async fn send(&self, request: &ChatRequest) -> Result<ChatReply, RelayFailure> {
            self.requests
                .lock()
                .expect("lock")
                .push(request.clone());
            let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(ChatReply {
                content: format!("echo: {last}"),
            })
        }
    }

    impl EchoClient {
        fn calls(&self) -> usize {
            self.requests.lock().expect("lock").len()
        }
    }

    struct FailingClient(RelayFailure);

    #[async_trait]
    impl RelayClient for FailingClient {
        async fn send(&self, _request: &ChatRequest) -> Result<ChatReply, RelayFailure> {
            Err(self.0.clone())
        }
    }

    /// Holds every request until released, to keep a turn in flight.
    struct GatedClient {
        release: Arc<Notify>,
        entered: Arc<Notify>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RelayClient for GatedClient {
        async fn send(&self, _request: &ChatRequest) -> Result<ChatReply, RelayFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(ChatReply {
                content: "late".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingView {
        renders: AtomicUsize,
        scrolls: AtomicUsize,
        seen_loading: AtomicUsize,
    }

    impl SessionView for Arc<RecordingView> {
        fn render(&self, snapshot: &SessionSnapshot) {
            self.renders.fetch_add(1, Ordering::SeqCst);
            if snapshot.loading {
                self.seen_loading.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn scroll_to_bottom(&self) {
            self.scrolls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let controller = ChatController::new(ChatSession::with_draft(""), EchoClient::default());

        let status = controller.submit("A").await.expect("accepted");
        assert_eq!(status, TurnStatus::Fulfilled);

        let snapshot = controller.snapshot();
        let wire: Vec<WireMessage> = snapshot.messages.iter().map(|m| m.to_wire()).collect();
        assert_eq!(wire, vec![WireMessage::user("A"), WireMessage::assistant("echo: A")]);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_blank_submit_issues_no_call() {
        let controller = ChatController::new(ChatSession::with_draft(""), EchoClient::default());

        let rejected = controller.submit("  \n").await;
        assert_eq!(rejected, Err(SubmitRejection::EmptyDraft));
        assert_eq!(controller.client.calls(), 0);
        assert!(controller.snapshot().messages.is_empty());
    }

    #[tokio::test]
    async fn test_failure_appends_fallback_and_banner() {
        let failure = RelayFailure::Rejected {
            status: 500,
            message: Some("حدث خطأ".to_string()),
        };
        let controller = ChatController::new(ChatSession::with_draft(""), FailingClient(failure));

        let status = controller.submit("A").await.expect("accepted");
        assert_eq!(status, TurnStatus::Failed);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].role(), Role::Assistant);
        assert_eq!(snapshot.messages[1].content(), FALLBACK_NOTICE);
        assert_eq!(snapshot.error.as_deref(), Some("حدث خطأ"));
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_in_flight() {
        let release = Arc::new(Notify::new());
        let entered = Arc::new(Notify::new());
        let client = GatedClient {
            release: Arc::clone(&release),
            entered: Arc::clone(&entered),
            calls: AtomicUsize::new(0),
        };
        let controller = Arc::new(ChatController::new(ChatSession::with_draft(""), client));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.submit("first").await })
        };
        entered.notified().await;

        // Optimistic append is visible before the relay answers.
        let during = controller.snapshot();
        assert_eq!(during.messages.len(), 1);
        assert!(during.loading);

        let second = controller.submit("second").await;
        assert_eq!(second, Err(SubmitRejection::InFlight));
        assert_eq!(controller.snapshot().messages.len(), 1);

        release.notify_one();
        let status = first.await.expect("join").expect("accepted");
        assert_eq!(status, TurnStatus::Fulfilled);
        assert_eq!(controller.client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.snapshot().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_turn_clears_loading() {
        let client = GatedClient {
            release: Arc::new(Notify::new()),
            entered: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
        };
        let controller = ChatController::new(ChatSession::with_draft(""), client);

        {
            let turn = controller.submit("A");
            tokio::pin!(turn);
            // Poll once so the turn starts, then drop it.
            let polled = tokio::time::timeout(std::time::Duration::from_millis(10), &mut turn).await;
            assert!(polled.is_err());
        }

        let snapshot = controller.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.error.as_deref(), Some(GENERIC_ERROR_BANNER));
    }

    #[tokio::test]
    async fn test_template_then_submit_draft() {
        let controller = ChatController::new(ChatSession::new(), EchoClient::default());
        let template = &QUICK_PROMPTS[0];

        assert!(controller.select_template(template));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.draft, template.prompt);
        assert!(snapshot.messages.is_empty());

        controller.submit_draft().await.expect("accepted");
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages[0].content(), template.prompt);
        assert_eq!(snapshot.draft, "");
    }

    #[tokio::test]
    async fn test_run_demo_matches_typed_submit() {
        let demo = ChatController::new(ChatSession::new(), EchoClient::default());
        demo.select_template(&QUICK_PROMPTS[2]);
        demo.run_demo("اعرض سير العمل").await.expect("accepted");

        let typed = ChatController::new(ChatSession::new(), EchoClient::default());
        typed.set_draft("اعرض سير العمل");
        typed.submit_draft().await.expect("accepted");

        let project = |s: SessionSnapshot| -> Vec<WireMessage> {
            s.messages.iter().map(|m| m.to_wire()).collect()
        };
        let demo_state = demo.snapshot();
        assert!(demo_state.selected_template.is_none());
        assert_eq!(project(demo_state), project(typed.snapshot()));
        assert_eq!(
            demo.client.requests.lock().expect("lock").clone(),
            typed.client.requests.lock().expect("lock").clone()
        );
    }

    #[tokio::test]
    async fn test_view_scrolls_on_each_append() {
        let view = Arc::new(RecordingView::default());
        let controller = ChatController::with_view(
            ChatSession::with_draft(""),
            EchoClient::default(),
            Arc::clone(&view),
        );

        controller.submit("A").await.expect("accepted");
        assert_eq!(view.scrolls.load(Ordering::SeqCst), 2);
        assert!(view.seen_loading.load(Ordering::SeqCst) >= 1);

        controller.set_draft("typing");
        assert_eq!(view.scrolls.load(Ordering::SeqCst), 2);
        assert_eq!(view.renders.load(Ordering::SeqCst), 3);

        // Rejections change nothing and render nothing.
        let _ = controller.submit(" ").await;
        assert_eq!(view.renders.load(Ordering::SeqCst), 3);
    }
}
