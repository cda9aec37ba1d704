use parley_core::{AssistantError, Message};
use tracing::debug;

use crate::types::{OpeningResponse, QueryResponse};

/// Parses the opening message body.
///
/// The greeting is always recorded as an assistant message, whatever role the
/// service labels it with.
pub fn parse_opening_message(body: &[u8]) -> Result<Message, AssistantError> {
    let parsed: OpeningResponse = serde_json::from_slice(body)
        .map_err(|e| AssistantError::MalformedResponse(e.to_string()))?;

    if let Some(role) = parsed.role.as_deref().filter(|r| *r != "assistant") {
        debug!(role, "Opening message has a non-assistant role");
    }

    Ok(Message::assistant(parsed.content))
}

/// Extracts the reply text from a chat query body.
pub fn parse_query_response(body: &[u8]) -> Result<String, AssistantError> {
    let parsed: QueryResponse = serde_json::from_slice(body)
        .map_err(|e| AssistantError::MalformedResponse(e.to_string()))?;
    Ok(parsed.content)
}
