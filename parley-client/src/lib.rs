//! HTTP client for the parley assistant service.
//!
//! The service exposes two endpoints: `GET /api/initial` returns the opening
//! message and `POST /api` answers a `{"query": ...}` body with
//! `{"content": ...}`. [`AssistantClient`] implements
//! [`parley_core::Assistant`] on top of them.
//!
//! # Example
//!
//! ```ignore
//! use parley_client::AssistantClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AssistantClient::with_base_url("http://localhost:5000");
//!     let greeting = client.fetch_opening_message().await.unwrap();
//!     let reply = client.query("Which part fits my dishwasher?").await;
//!     println!("{}\n{}", greeting.content, reply.content);
//! }
//! ```

mod client;
mod convert;
mod types;

pub use client::AssistantClient;
pub use convert::{parse_opening_message, parse_query_response};
pub use types::{OpeningResponse, QueryRequest, QueryResponse};
