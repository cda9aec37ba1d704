use async_trait::async_trait;

use crate::error::AssistantError;
use crate::message::Message;

/// The remote assistant service, as seen by the conversation store.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Fetches the greeting that opens a conversation.
    async fn fetch_opening_message(&self) -> Result<Message, AssistantError>;

    /// Asks for a reply to `text`.
    ///
    /// Implementations must not fail: any error is reported as
    /// [`Message::sentinel_error`]. The returned role is ignored by the store,
    /// which always records the reply as an assistant message.
    async fn query(&self, text: &str) -> Message;
}
