//! Data model shared by the engine, the leaderboard, and the service clients.

pub mod types;

pub use types::{SubmitRequest, SuggestResponse, Suggestion, TermRecord};
