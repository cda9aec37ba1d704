use crate::input::InputBuffer;
use crate::message::Message;

/// Whether the typing indicator is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    AwaitingReply,
}

/// Everything the chat surface shows.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Append-only, oldest first.
    pub transcript: Vec<Message>,
    pub pending_input: InputBuffer,
    pub is_loading: bool,
    /// Bumped on every transcript append and loading transition.
    pub revision: u64,
}

impl SessionState {
    pub fn loading_state(&self) -> LoadingState {
        if self.is_loading {
            LoadingState::AwaitingReply
        } else {
            LoadingState::Idle
        }
    }

    /// Messages that produce a visible bubble.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.transcript.iter().filter(|m| m.is_visible())
    }
}
