//! Boundary to the remote suggestion service.
//!
//! The engine never talks to a transport directly. It is handed an explicitly
//! constructed [`SuggestionService`] so that tests and `--offline` runs can
//! substitute an in-process implementation:
//!
//! - **[`http`]**: reqwest client for the REST service.
//! - **[`memory`]**: in-process ranked term store with the same contract.

pub mod http;
pub mod memory;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::model::types::{SuggestResponse, Suggestion, TermRecord};

pub use http::HttpSuggestionService;
pub use memory::InMemoryService;

/// Every way a service call can fail.
///
/// The search engine collapses all of these into a single "fetch failed"
/// outcome; the variants exist for logs and for the one-shot CLI.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Request/response contract of the ranking service.
///
/// Implementations must be cheap to share (`Arc<S>`) and safe to call from
/// many concurrently spawned tasks.
pub trait SuggestionService: Send + Sync + 'static {
    /// Ranked terms starting with `prefix`, at most `limit` of them.
    fn suggest(
        &self,
        prefix: &str,
        limit: usize,
    ) -> impl Future<Output = Result<SuggestResponse, ServiceError>> + Send;

    /// Record one use of `term`, returning the updated record.
    fn submit(&self, term: &str) -> impl Future<Output = Result<TermRecord, ServiceError>> + Send;

    /// The `limit` most used terms, most frequent first.
    fn top(&self, limit: usize)
    -> impl Future<Output = Result<Vec<Suggestion>, ServiceError>> + Send;

    /// Seed sample data. Returns the service's confirmation text.
    fn init(&self) -> impl Future<Output = Result<String, ServiceError>> + Send;
}
