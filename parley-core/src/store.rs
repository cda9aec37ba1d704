use std::sync::Arc;

use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::assistant::Assistant;
use crate::error::AssistantError;
use crate::input::InputBuffer;
use crate::message::Message;
use crate::session::{LoadingState, SessionState};

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The user message was appended and a query was issued.
    Sent,
    /// The text was empty or whitespace only.
    IgnoredEmpty,
    /// A query is already outstanding.
    IgnoredBusy,
}

type OpeningResult = Result<Message, AssistantError>;

/// Owns the session state and drives the assistant calls.
///
/// Calls run as spawned tokio tasks and report back over oneshot channels.
/// Nothing changes until [`poll`](Self::poll) or [`settle`](Self::settle)
/// applies the results, so all mutation happens on the owner's thread.
/// Every transcript append and loading transition publishes a snapshot to
/// the receivers handed out by [`subscribe`](Self::subscribe).
pub struct ConversationStore {
    assistant: Arc<dyn Assistant>,
    state: SessionState,
    notifier: watch::Sender<SessionState>,
    opening_rx: Option<oneshot::Receiver<OpeningResult>>,
    reply_rx: Option<oneshot::Receiver<Message>>,
}

impl ConversationStore {
    pub fn new(assistant: Arc<dyn Assistant>) -> Self {
        let state = SessionState::default();
        let (notifier, _) = watch::channel(state.clone());
        Self {
            assistant,
            state,
            notifier,
            opening_rx: None,
            reply_rx: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.notifier.subscribe()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transcript(&self) -> &[Message] {
        &self.state.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn loading_state(&self) -> LoadingState {
        self.state.loading_state()
    }

    pub fn pending_input(&self) -> &InputBuffer {
        &self.state.pending_input
    }

    /// Editing the pending input does not notify subscribers.
    pub fn pending_input_mut(&mut self) -> &mut InputBuffer {
        &mut self.state.pending_input
    }

    /// Requests the opening message. Must be called within a tokio runtime.
    pub fn initialize(&mut self) {
        if self.opening_rx.is_some() {
            debug!("Opening message already requested");
            return;
        }

        let (tx, rx) = oneshot::channel();
        let assistant = Arc::clone(&self.assistant);

        tokio::spawn(async move {
            let result = assistant.fetch_opening_message().await;
            // The store may be gone by now; nothing to deliver to then.
            let _ = tx.send(result);
        });

        self.opening_rx = Some(rx);
    }

    /// Appends `text` as a user message and asks the assistant for a reply.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit_user_message(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::IgnoredEmpty;
        }
        if self.state.is_loading {
            debug!("Reply still outstanding, ignoring submission");
            return SubmitOutcome::IgnoredBusy;
        }

        self.state.transcript.push(Message::user(text));
        self.state.pending_input.clear();
        self.state.is_loading = true;

        let (tx, rx) = oneshot::channel();
        let assistant = Arc::clone(&self.assistant);
        let query = text.to_string();

        tokio::spawn(async move {
            let reply = assistant.query(&query).await;
            let _ = tx.send(reply);
        });

        self.reply_rx = Some(rx);
        self.publish();
        SubmitOutcome::Sent
    }

    /// Submits whatever is in the pending input.
    ///
    /// Ignored submissions leave the input untouched.
    pub fn submit_pending_input(&mut self) -> SubmitOutcome {
        let text = self.state.pending_input.text().to_string();
        self.submit_user_message(&text)
    }

    /// Applies any results that have arrived. Returns whether state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        let opening = self.opening_rx.as_mut().map(|rx| rx.try_recv());
        match opening {
            Some(Ok(result)) => {
                self.opening_rx = None;
                changed |= self.apply_opening(result);
            }
            Some(Err(TryRecvError::Closed)) => {
                self.opening_rx = None;
                warn!("Opening message task ended without a result");
            }
            Some(Err(TryRecvError::Empty)) | None => {}
        }

        let reply = self.reply_rx.as_mut().map(|rx| rx.try_recv());
        match reply {
            Some(Ok(message)) => {
                self.reply_rx = None;
                self.apply_reply(message);
                changed = true;
            }
            Some(Err(TryRecvError::Closed)) => {
                self.reply_rx = None;
                warn!("Query task ended without a reply");
                self.apply_reply(Message::sentinel_error());
                changed = true;
            }
            Some(Err(TryRecvError::Empty)) | None => {}
        }

        changed
    }

    /// Waits for every outstanding call and applies its result.
    pub async fn settle(&mut self) {
        if let Some(rx) = self.opening_rx.take() {
            match rx.await {
                Ok(result) => {
                    self.apply_opening(result);
                }
                Err(_) => warn!("Opening message task ended without a result"),
            }
        }

        if let Some(rx) = self.reply_rx.take() {
            let reply = rx.await.unwrap_or_else(|_| {
                warn!("Query task ended without a reply");
                Message::sentinel_error()
            });
            self.apply_reply(reply);
        }
    }

    fn apply_opening(&mut self, result: OpeningResult) -> bool {
        match result {
            Ok(message) => {
                if !self.state.transcript.is_empty() {
                    // Putting it first now would reorder what the user already saw.
                    warn!("Opening message arrived after the conversation started, dropping it");
                    return false;
                }
                info!("Opening message received");
                self.state.transcript = vec![Message::assistant(message.content)];
                self.publish();
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch opening message");
                false
            }
        }
    }

    fn apply_reply(&mut self, reply: Message) {
        self.state.transcript.push(Message::assistant(reply.content));
        self.state.is_loading = false;
        self.publish();
    }

    fn publish(&mut self) {
        self.state.revision += 1;
        self.notifier.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    struct ScriptedAssistant {
        opening: OpeningResult,
        replies: Mutex<VecDeque<Message>>,
        queries: Mutex<Vec<String>>,
        calls: AtomicUsize,
        gate: Option<Arc<Semaphore>>,
    }

    impl ScriptedAssistant {
        fn new(opening: OpeningResult) -> Self {
            Self {
                opening,
                replies: Mutex::new(VecDeque::new()),
                queries: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn with_replies(mut self, replies: &[Message]) -> Self {
            self.replies = Mutex::new(replies.iter().cloned().collect());
            self
        }

        fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Assistant for ScriptedAssistant {
        async fn fetch_opening_message(&self) -> Result<Message, AssistantError> {
            self.opening.clone()
        }

        async fn query(&self, text: &str) -> Message {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(text.to_string());
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(Message::sentinel_error)
        }
    }

    fn greeting() -> OpeningResult {
        Ok(Message::assistant("Hi, how can I help?"))
    }

    fn roles(store: &ConversationStore) -> Vec<Role> {
        store.transcript().iter().map(|m| m.role).collect()
    }

    #[tokio::test]
    async fn starts_idle_and_empty() {
        let store = ConversationStore::new(Arc::new(ScriptedAssistant::new(greeting())));
        assert!(store.transcript().is_empty());
        assert!(!store.is_loading());
        assert_eq!(store.loading_state(), LoadingState::Idle);
    }

    #[tokio::test]
    async fn initialize_loads_opening_message() {
        let mut store = ConversationStore::new(Arc::new(ScriptedAssistant::new(greeting())));
        store.initialize();
        store.settle().await;

        assert_eq!(store.transcript(), &[Message::assistant("Hi, how can I help?")]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn failed_opening_leaves_transcript_empty() {
        let assistant = ScriptedAssistant::new(Err(AssistantError::Protocol { status: 500 }));
        let mut store = ConversationStore::new(Arc::new(assistant));
        store.initialize();
        store.settle().await;

        assert!(store.transcript().is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn send_appends_user_then_assistant() {
        let assistant =
            ScriptedAssistant::new(greeting()).with_replies(&[Message::assistant("World")]);
        let mut store = ConversationStore::new(Arc::new(assistant));

        assert_eq!(store.submit_user_message("Hello"), SubmitOutcome::Sent);
        assert!(store.is_loading());
        assert_eq!(store.transcript(), &[Message::user("Hello")]);

        store.settle().await;
        assert!(!store.is_loading());
        assert_eq!(
            store.transcript(),
            &[Message::user("Hello"), Message::assistant("World")]
        );
    }

    #[tokio::test]
    async fn sentinel_reply_clears_loading() {
        let assistant =
            ScriptedAssistant::new(greeting()).with_replies(&[Message::sentinel_error()]);
        let mut store = ConversationStore::new(Arc::new(assistant));

        store.submit_user_message("Hello");
        store.settle().await;

        assert!(!store.is_loading());
        assert_eq!(
            store.transcript(),
            &[Message::user("Hello"), Message::assistant("error")]
        );
    }

    #[tokio::test]
    async fn reply_is_always_recorded_as_assistant() {
        let assistant = ScriptedAssistant::new(greeting()).with_replies(&[Message::user("odd")]);
        let mut store = ConversationStore::new(Arc::new(assistant));

        store.submit_user_message("Hello");
        store.settle().await;

        assert_eq!(store.transcript()[1], Message::assistant("odd"));
    }

    #[tokio::test]
    async fn blank_input_is_a_noop() {
        let assistant = Arc::new(ScriptedAssistant::new(greeting()));
        let mut store = ConversationStore::new(assistant.clone());
        let mut updates = store.subscribe();

        assert_eq!(store.submit_user_message(""), SubmitOutcome::IgnoredEmpty);
        assert_eq!(store.submit_user_message("   "), SubmitOutcome::IgnoredEmpty);
        assert_eq!(store.submit_user_message("\n\t"), SubmitOutcome::IgnoredEmpty);
        store.settle().await;

        assert!(store.transcript().is_empty());
        assert!(!store.is_loading());
        assert_eq!(assistant.calls(), 0);
        assert!(!updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().revision, 0);
    }

    #[tokio::test]
    async fn transcript_alternates_after_opening() {
        let replies: Vec<Message> = (0..4).map(|i| Message::assistant(format!("r{i}"))).collect();
        let assistant = ScriptedAssistant::new(greeting()).with_replies(&replies);
        let mut store = ConversationStore::new(Arc::new(assistant));

        store.initialize();
        store.settle().await;
        for i in 0..4 {
            assert_eq!(store.submit_user_message(&format!("q{i}")), SubmitOutcome::Sent);
            store.settle().await;
        }

        assert_eq!(store.transcript().len(), 1 + 2 * 4);
        let roles = roles(&store);
        assert_eq!(roles[0], Role::Assistant);
        for (i, pair) in roles[1..].chunks(2).enumerate() {
            assert_eq!(pair, &[Role::User, Role::Assistant], "round trip {i}");
        }
    }

    #[tokio::test]
    async fn loading_tracks_outstanding_query() {
        let gate = Arc::new(Semaphore::new(0));
        let assistant = ScriptedAssistant::new(greeting())
            .with_replies(&[Message::assistant("late")])
            .gated(gate.clone());
        let mut store = ConversationStore::new(Arc::new(assistant));

        store.submit_user_message("Hello");
        tokio::task::yield_now().await;
        assert!(!store.poll());
        assert_eq!(store.loading_state(), LoadingState::AwaitingReply);

        gate.add_permits(1);
        store.settle().await;
        assert_eq!(store.loading_state(), LoadingState::Idle);
        assert_eq!(store.transcript().last(), Some(&Message::assistant("late")));
    }

    #[tokio::test]
    async fn second_send_while_waiting_is_ignored() {
        let gate = Arc::new(Semaphore::new(0));
        let assistant = Arc::new(
            ScriptedAssistant::new(greeting())
                .with_replies(&[Message::assistant("first")])
                .gated(gate.clone()),
        );
        let mut store = ConversationStore::new(assistant.clone());

        assert_eq!(store.submit_user_message("one"), SubmitOutcome::Sent);
        store.pending_input_mut().set("two");
        assert_eq!(store.submit_pending_input(), SubmitOutcome::IgnoredBusy);
        assert_eq!(store.pending_input().text(), "two");
        assert_eq!(store.transcript().len(), 1);

        gate.add_permits(1);
        store.settle().await;
        assert_eq!(assistant.queries.lock().unwrap().as_slice(), ["one"]);
        assert_eq!(
            store.transcript(),
            &[Message::user("one"), Message::assistant("first")]
        );
    }

    #[tokio::test]
    async fn send_clears_pending_input_immediately() {
        let gate = Arc::new(Semaphore::new(0));
        let assistant = ScriptedAssistant::new(greeting()).gated(gate.clone());
        let mut store = ConversationStore::new(Arc::new(assistant));

        store.pending_input_mut().set("Hello");
        assert_eq!(store.submit_pending_input(), SubmitOutcome::Sent);
        assert!(store.pending_input().is_empty());

        // Typing continues while the reply is outstanding.
        store.pending_input_mut().insert_char('n');
        assert_eq!(store.pending_input().text(), "n");

        gate.add_permits(1);
        store.settle().await;
        assert_eq!(store.pending_input().text(), "n");
    }

    #[tokio::test]
    async fn user_text_is_kept_verbatim() {
        let assistant = Arc::new(ScriptedAssistant::new(greeting()));
        let mut store = ConversationStore::new(assistant.clone());

        store.submit_user_message("  **bold** question ");
        store.settle().await;

        assert_eq!(store.transcript()[0].content, "  **bold** question ");
        assert_eq!(
            assistant.queries.lock().unwrap().as_slice(),
            ["  **bold** question "]
        );
    }

    #[tokio::test]
    async fn subscribers_see_every_transition() {
        let assistant = ScriptedAssistant::new(greeting()).with_replies(&[Message::assistant("World")]);
        let mut store = ConversationStore::new(Arc::new(assistant));
        let mut updates = store.subscribe();

        store.submit_user_message("Hello");
        assert!(updates.has_changed().unwrap());
        {
            let snapshot = updates.borrow_and_update();
            assert!(snapshot.is_loading);
            assert_eq!(snapshot.transcript.len(), 1);
            assert_eq!(snapshot.revision, 1);
        }

        store.settle().await;
        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.transcript.len(), 2);
        assert_eq!(snapshot.revision, 2);
    }

    #[tokio::test]
    async fn late_opening_message_is_dropped() {
        let gate = Arc::new(Semaphore::new(0));
        let assistant = ScriptedAssistant::new(greeting())
            .with_replies(&[Message::assistant("World")])
            .gated(gate.clone());
        let mut store = ConversationStore::new(Arc::new(assistant));

        store.submit_user_message("Hello");
        store.initialize();
        gate.add_permits(1);
        store.settle().await;

        assert_eq!(
            store.transcript(),
            &[Message::user("Hello"), Message::assistant("World")]
        );
    }

    #[tokio::test]
    async fn poll_applies_settled_results() {
        let assistant =
            ScriptedAssistant::new(greeting()).with_replies(&[Message::assistant("World")]);
        let mut store = ConversationStore::new(Arc::new(assistant));

        store.initialize();
        let mut waited = 0;
        while store.transcript().is_empty() && waited < 1000 {
            store.poll();
            tokio::task::yield_now().await;
            waited += 1;
        }
        assert_eq!(store.transcript().len(), 1);

        store.submit_user_message("Hello");
        while store.is_loading() && waited < 2000 {
            store.poll();
            tokio::task::yield_now().await;
            waited += 1;
        }
        assert!(!store.is_loading());
        assert_eq!(store.transcript().len(), 3);
    }

    #[tokio::test]
    async fn dropping_store_mid_call_is_harmless() {
        let gate = Arc::new(Semaphore::new(0));
        let assistant = Arc::new(ScriptedAssistant::new(greeting()).gated(gate.clone()));
        let mut store = ConversationStore::new(assistant.clone());

        store.submit_user_message("Hello");
        drop(store);

        gate.add_permits(1);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(assistant.calls(), 1);
    }
}
