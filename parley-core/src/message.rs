use serde::{Deserialize, Serialize};

/// Content of the assistant message substituted for a failed query.
pub const SENTINEL_ERROR_CONTENT: &str = "error";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single entry in the transcript.
///
/// Content is kept exactly as authored, markdown included. Rendering happens
/// at the view layer and never writes back into the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// The assistant message shown in place of a reply that could not be obtained.
    pub fn sentinel_error() -> Self {
        Self::assistant(SENTINEL_ERROR_CONTENT)
    }

    /// Messages with empty content stay in the transcript but produce no bubble.
    pub fn is_visible(&self) -> bool {
        !self.content.is_empty()
    }
}
