use thiserror::Error;

/// Failure of a call to the assistant service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// The request never produced a response (unreachable host, reset, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status code.
    #[error("Protocol error: status {status}")]
    Protocol { status: u16 },

    /// Success status, but the body did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
