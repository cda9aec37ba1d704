use serde::{Deserialize, Serialize};

/// Body of a chat query.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

/// Successful chat query response. Any role the service sends is ignored.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub content: String,
}

/// Successful opening message response.
#[derive(Debug, Deserialize)]
pub struct OpeningResponse {
    #[serde(default)]
    pub role: Option<String>,
    pub content: String,
}
