//! Conversation state for a single-session assistant chat.
//!
//! [`ConversationStore`] owns the transcript, the text being typed and the
//! loading flag. It talks to the remote service through the [`Assistant`]
//! trait and publishes a [`SessionState`] snapshot on every visible change.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use parley_core::{ConversationStore, SubmitOutcome};
//!
//! let mut store = ConversationStore::new(Arc::new(client));
//! store.initialize();
//! assert_eq!(store.submit_user_message("Hello"), SubmitOutcome::Sent);
//! store.settle().await;
//! ```

mod assistant;
mod error;
mod input;
mod message;
mod session;
mod store;

pub use assistant::Assistant;
pub use error::AssistantError;
pub use input::InputBuffer;
pub use message::{Message, Role, SENTINEL_ERROR_CONTENT};
pub use session::{LoadingState, SessionState};
pub use store::{ConversationStore, SubmitOutcome};
