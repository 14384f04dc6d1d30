//! Incremental search interaction layer.
//!
//! - **[`engine`]**: clock-free state machine: query, epoch guard, suggestion
//!   list, visibility, and the effects each input produces.
//! - **[`cursor`]**: the one selection cursor shared by keyboard and pointer.
//! - **[`debounce`]**: owned, cancel-and-replace tokio timer.
//! - **[`widget`]**: executes engine effects against a [`SuggestionService`]
//!   and routes completions back into the engine.
//!
//! [`SuggestionService`]: crate::service::SuggestionService

pub mod cursor;
pub mod debounce;
pub mod engine;
pub mod widget;

pub use cursor::SelectionCursor;
pub use engine::{Effect, FetchOutcome, FetchTicket, NavKey, PanelView, SearchEngine};
pub use widget::{Completion, Processed, SearchWidget};
