//! Most-used terms panel.
//!
//! Fetches the top-N list once on mount and again on every manual retry.
//! Retries may overlap; only the newest attempt is ever applied.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::model::types::Suggestion;
use crate::service::{ServiceError, SuggestionService};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load popular terms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardView<'a> {
    Loading,
    Failed { message: &'a str },
    /// Loaded successfully but the service knows no terms yet.
    Empty,
    Ranked { entries: &'a [Suggestion] },
}

#[derive(Debug, Default)]
pub struct Leaderboard {
    entries: Vec<Suggestion>,
    loading: bool,
    error: Option<String>,
    attempt: u64,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a new attempt, superseding any still running.
    pub fn begin_load(&mut self) -> u64 {
        self.attempt += 1;
        self.loading = true;
        self.error = None;
        self.attempt
    }

    /// Apply an attempt's outcome. Returns `false` when a newer attempt has
    /// started since, in which case nothing changes.
    pub fn finish_load(
        &mut self,
        attempt: u64,
        result: Result<Vec<Suggestion>, ServiceError>,
    ) -> bool {
        if attempt != self.attempt {
            debug!(attempt, current = self.attempt, "discarding superseded leaderboard load");
            return false;
        }
        self.loading = false;
        match result {
            Ok(entries) => {
                debug!(count = entries.len(), "leaderboard loaded");
                self.entries = entries;
                self.error = None;
            }
            Err(err) => {
                warn!("leaderboard load failed: {err}");
                self.error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    pub fn view(&self) -> LeaderboardView<'_> {
        if self.loading {
            LeaderboardView::Loading
        } else if let Some(message) = self.error.as_deref() {
            LeaderboardView::Failed { message }
        } else if self.entries.is_empty() {
            LeaderboardView::Empty
        } else {
            LeaderboardView::Ranked {
                entries: &self.entries,
            }
        }
    }

    /// Bar length for entry `index` relative to the leader, in `[0, 100]`.
    ///
    /// `None` for an out-of-range index or a zero baseline frequency.
    pub fn bar_percent(&self, index: usize) -> Option<f64> {
        bar_percent(&self.entries, index)
    }
}

/// Relative bar width of `entries[index]` against `entries[0]`.
pub fn bar_percent(entries: &[Suggestion], index: usize) -> Option<f64> {
    let baseline = entries.first()?.frequency;
    let entry = entries.get(index)?;
    if baseline == 0 {
        return None;
    }
    let pct = entry.frequency as f64 / baseline as f64 * 100.0;
    Some(pct.clamp(0.0, 100.0))
}

#[derive(Debug)]
struct LoadResult {
    attempt: u64,
    result: Result<Vec<Suggestion>, ServiceError>,
}

/// Drives [`Leaderboard`] loads against a service.
pub struct LeaderboardViewer<S: SuggestionService> {
    state: Leaderboard,
    service: Arc<S>,
    limit: usize,
    tx: UnboundedSender<LoadResult>,
    rx: UnboundedReceiver<LoadResult>,
}

impl<S: SuggestionService> LeaderboardViewer<S> {
    pub fn new(service: Arc<S>, limit: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Leaderboard::new(),
            service,
            limit,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &Leaderboard {
        &self.state
    }

    pub fn view(&self) -> LeaderboardView<'_> {
        self.state.view()
    }

    /// Kick off a fetch. Safe to call repeatedly; doubles as retry.
    pub fn load(&mut self) {
        let attempt = self.state.begin_load();
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let limit = self.limit;
        tokio::spawn(async move {
            let result = service.top(limit).await;
            let _ = tx.send(LoadResult { attempt, result });
        });
    }

    /// Apply finished loads without waiting. Returns `true` if the visible
    /// state changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            changed |= self.state.finish_load(done.attempt, done.result);
        }
        changed
    }

    /// Wait for the next finished load and apply it. Returns whether it was
    /// the current attempt.
    pub async fn process_next(&mut self) -> Option<bool> {
        let done = self.rx.recv().await?;
        Some(self.state.finish_load(done.attempt, done.result))
    }
}
