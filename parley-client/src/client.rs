use async_trait::async_trait;
use parley_core::{Assistant, AssistantError, Message};
use tracing::{debug, instrument, warn};

use crate::convert::{parse_opening_message, parse_query_response};
use crate::types::QueryRequest;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const OPENING_PATH: &str = "/api/initial";
const QUERY_PATH: &str = "/api";

/// HTTP client for the assistant service.
///
/// Every call is a single attempt. There are no retries and no client-side
/// timeout beyond what the transport imposes.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    base_url: String,
}

impl AssistantClient {
    /// Creates a client for the service on its default local address.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client for the service at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the greeting that opens a conversation.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_opening_message(&self) -> Result<Message, AssistantError> {
        debug!("Requesting opening message");

        let response = self
            .http
            .get(format!("{}{}", self.base_url, OPENING_PATH))
            .send()
            .await
            .map_err(transport)?;

        let body = success_body(response).await?;
        debug!(body = %String::from_utf8_lossy(&body), "Received opening message");

        parse_opening_message(&body)
    }

    /// Sends `text` and returns the assistant's reply, or the reason there is none.
    #[instrument(skip(self, text), fields(base_url = %self.base_url, len = text.len()))]
    pub async fn try_query(&self, text: &str) -> Result<Message, AssistantError> {
        debug!("Sending query");

        let response = self
            .http
            .post(format!("{}{}", self.base_url, QUERY_PATH))
            .json(&QueryRequest { query: text })
            .send()
            .await
            .map_err(transport)?;

        let body = success_body(response).await?;
        debug!(body = %String::from_utf8_lossy(&body), "Received reply");

        let content = parse_query_response(&body)?;
        Ok(Message::assistant(content))
    }

    /// Sends `text` and returns the assistant's reply.
    ///
    /// Never fails: any error is logged and replaced by
    /// [`Message::sentinel_error`].
    pub async fn query(&self, text: &str) -> Message {
        match self.try_query(text).await {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Query failed, substituting error reply");
                Message::sentinel_error()
            }
        }
    }
}

impl Default for AssistantClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Assistant for AssistantClient {
    async fn fetch_opening_message(&self) -> Result<Message, AssistantError> {
        AssistantClient::fetch_opening_message(self).await
    }

    async fn query(&self, text: &str) -> Message {
        AssistantClient::query(self, text).await
    }
}

fn transport(e: reqwest::Error) -> AssistantError {
    AssistantError::Transport(e.to_string())
}

/// Reads the body of a success response; anything else is a protocol error.
async fn success_body(response: reqwest::Response) -> Result<Vec<u8>, AssistantError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AssistantError::Protocol {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    Ok(body.to_vec())
}
