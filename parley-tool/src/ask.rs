use std::io::{self, Write};
use std::sync::Arc;

use parley_client::AssistantClient;
use parley_core::{ConversationStore, Message, SubmitOutcome};
use tracing::info;

use crate::error::ParleyError;

/// Runs a single round trip and prints the transcript.
pub async fn run(client: AssistantClient, query: &str) -> Result<(), ParleyError> {
    let mut store = ConversationStore::new(Arc::new(client));

    store.initialize();
    store.settle().await;

    if store.submit_user_message(query) == SubmitOutcome::IgnoredEmpty {
        return Err(ParleyError::EmptyQuery);
    }
    store.settle().await;
    info!(messages = store.transcript().len(), "Round trip complete");

    let mut stdout = io::stdout().lock();
    write_transcript(&mut stdout, store.transcript())?;
    Ok(())
}

fn write_transcript(out: &mut impl Write, transcript: &[Message]) -> io::Result<()> {
    for message in transcript.iter().filter(|m| m.is_visible()) {
        writeln!(out, "{}: {}", message.role, message.content)?;
    }
    Ok(())
}
