//! Interaction state machine behind the search box.
//!
//! [`SearchEngine`] is deliberately clock-free and transport-free: every
//! input (keystroke, timer, response, key, pointer) is a method call that
//! mutates state synchronously and returns the [`Effect`]s the host runtime
//! must carry out. Because nothing here awaits, no two inputs can interleave,
//! and out-of-order responses are reconciled purely by the epoch guard:
//!
//! ```text
//! keystroke ─► epoch += 1 ─► ArmDebounce(gen)
//! timer(gen) ─► gen still live? ─► Fetch{seq, epoch, prefix}
//! response{seq, epoch} ─► epoch == current && seq in flight? ─► apply : discard
//! ```

use std::time::Duration;

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::cursor::SelectionCursor;
use crate::model::types::{SuggestResponse, Suggestion};
use crate::service::ServiceError;

/// Effects produced by one input. Three is the most any input emits.
pub type Effects = SmallVec<[Effect; 3]>;

/// Work the runtime must perform on the engine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace any live debounce timer with a new one.
    ArmDebounce { generation: u64, delay: Duration },
    /// Cancel the live debounce timer, if any.
    CancelDebounce,
    /// Issue one suggestion request and report back with the same ticket.
    Fetch(FetchTicket),
    /// Fire-and-forget usage report for a chosen term.
    ReportUsage { term: String },
    /// Tell the host application which term was chosen.
    TermChosen { term: String },
}

/// Identity of one issued suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub epoch: u64,
    pub prefix: String,
}

/// Keys the engine reacts to. Printable input goes through
/// [`SearchEngine::on_query_change`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Down,
    Up,
    Enter,
    Escape,
    Other,
}

/// What happened to a completed suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the list.
    Applied,
    /// The request failed; the list was cleared.
    Failed,
    /// The query moved on since the request was issued; nothing changed.
    Stale,
}

/// Render-ready view of the suggestion panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelView<'a> {
    Hidden,
    Suggestions {
        items: &'a [Suggestion],
        selected: Option<usize>,
        execution_time_ms: Option<u64>,
    },
    NoResults {
        query: &'a str,
    },
}

#[derive(Debug)]
pub struct SearchEngine {
    debounce: Duration,
    query: String,
    /// Bumped whenever the query changes; responses carry the epoch they were
    /// issued under.
    epoch: u64,
    next_generation: u64,
    live_timer: Option<u64>,
    next_seq: u64,
    in_flight: Option<u64>,
    suggestions: Vec<Suggestion>,
    /// Epoch whose request last landed (response or failure). The cached list
    /// belongs to the current query only while this equals `epoch`.
    resolved_epoch: Option<u64>,
    cursor: SelectionCursor,
    visible: bool,
    execution_time_ms: Option<u64>,
    closed: bool,
}

impl SearchEngine {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            query: String::new(),
            epoch: 0,
            next_generation: 0,
            live_timer: None,
            next_seq: 0,
            in_flight: None,
            suggestions: Vec::new(),
            resolved_epoch: None,
            cursor: SelectionCursor::NONE,
            visible: false,
            execution_time_ms: None,
            closed: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn cursor(&self) -> SelectionCursor {
        self.cursor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// A request for the current query is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn execution_time_ms(&self) -> Option<u64> {
        self.execution_time_ms
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn has_live_timer(&self) -> bool {
        self.live_timer.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn view(&self) -> PanelView<'_> {
        if !self.visible || self.query.is_empty() {
            return PanelView::Hidden;
        }
        if !self.suggestions.is_empty() {
            return PanelView::Suggestions {
                items: &self.suggestions,
                selected: self.cursor.get(),
                execution_time_ms: self.execution_time_ms,
            };
        }
        if self.is_loading() {
            PanelView::Hidden
        } else {
            PanelView::NoResults { query: &self.query }
        }
    }

    /// The text in the input changed.
    pub fn on_query_change(&mut self, text: impl Into<String>) -> Effects {
        let mut effects = Effects::new();
        let text = text.into();
        if self.closed || text == self.query {
            return effects;
        }
        self.query = text;
        self.advance_epoch();

        if self.query.is_empty() {
            if self.live_timer.take().is_some() {
                effects.push(Effect::CancelDebounce);
            }
            self.suggestions.clear();
            self.cursor.reset();
            self.visible = false;
            self.resolved_epoch = None;
            debug!(epoch = self.epoch, "query cleared");
            return effects;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.live_timer = Some(generation);
        debug!(epoch = self.epoch, generation, "debounce armed");
        effects.push(Effect::ArmDebounce {
            generation,
            delay: self.debounce,
        });
        effects
    }

    /// A debounce timer elapsed. Only the live generation may issue a request.
    pub fn on_timer_fired(&mut self, generation: u64) -> Effects {
        let mut effects = Effects::new();
        if self.closed || self.live_timer != Some(generation) {
            debug!(generation, "ignoring superseded debounce timer");
            return effects;
        }
        self.live_timer = None;
        self.next_seq += 1;
        let ticket = FetchTicket {
            seq: self.next_seq,
            epoch: self.epoch,
            prefix: self.query.clone(),
        };
        self.in_flight = Some(ticket.seq);
        info!(prefix = %ticket.prefix, seq = ticket.seq, "requesting suggestions");
        effects.push(Effect::Fetch(ticket));
        effects
    }

    /// Reconcile a completed request against the current query.
    pub fn on_fetch_complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<SuggestResponse, ServiceError>,
    ) -> FetchOutcome {
        if self.closed || ticket.epoch != self.epoch || self.in_flight != Some(ticket.seq) {
            match &result {
                Ok(resp) => debug!(
                    prefix = %ticket.prefix,
                    seq = ticket.seq,
                    execution_time_ms = resp.execution_time_ms,
                    "discarding stale suggestions"
                ),
                Err(err) => debug!(prefix = %ticket.prefix, seq = ticket.seq, "discarding stale failure: {err}"),
            }
            return FetchOutcome::Stale;
        }

        self.in_flight = None;
        self.resolved_epoch = Some(self.epoch);
        self.cursor.reset();
        match result {
            Ok(resp) => {
                debug!(
                    prefix = %ticket.prefix,
                    count = resp.suggestions.len(),
                    execution_time_ms = resp.execution_time_ms,
                    "suggestions applied"
                );
                self.suggestions = resp.suggestions;
                self.execution_time_ms = Some(resp.execution_time_ms);
                self.visible = true;
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(prefix = %ticket.prefix, "suggestion fetch failed: {err}");
                self.suggestions.clear();
                FetchOutcome::Failed
            }
        }
    }

    pub fn on_key(&mut self, key: NavKey) -> Effects {
        if self.closed || !self.visible || self.suggestions.is_empty() {
            return Effects::new();
        }
        let len = self.suggestions.len();
        match key {
            NavKey::Down => self.cursor.move_down(len),
            NavKey::Up => self.cursor.move_up(len),
            NavKey::Enter => {
                if let Some(index) = self.cursor.get() {
                    return self.select_index(index);
                }
            }
            NavKey::Escape => {
                self.visible = false;
                self.cursor.reset();
            }
            NavKey::Other => {}
        }
        Effects::new()
    }

    /// Pointer moved over item `index`.
    pub fn on_hover(&mut self, index: usize) {
        if !self.closed && self.visible {
            self.cursor.hover(index, self.suggestions.len());
        }
    }

    /// Item `index` was clicked.
    pub fn on_click(&mut self, index: usize) -> Effects {
        if self.closed || !self.visible || index >= self.suggestions.len() {
            return Effects::new();
        }
        self.select_index(index)
    }

    /// Pointer interaction outside the widget. Query and list survive.
    pub fn on_outside_pointer(&mut self) {
        self.visible = false;
    }

    /// Input regained focus: re-show what is already cached, never refetch.
    pub fn on_focus(&mut self) {
        if !self.closed && !self.query.is_empty() && self.resolved_epoch == Some(self.epoch) {
            self.visible = true;
        }
    }

    /// Teardown. Any timer is cancelled and every later input is ignored.
    pub fn shutdown(&mut self) -> Effects {
        let mut effects = Effects::new();
        if self.closed {
            return effects;
        }
        self.closed = true;
        self.in_flight = None;
        if self.live_timer.take().is_some() {
            effects.push(Effect::CancelDebounce);
        }
        effects
    }

    fn select_index(&mut self, index: usize) -> Effects {
        match self.suggestions.get(index) {
            Some(item) => {
                let term = item.term.clone();
                self.choose(term)
            }
            None => Effects::new(),
        }
    }

    /// Selection: the visible state changes first, then the usage report and
    /// the host notification are requested.
    fn choose(&mut self, term: String) -> Effects {
        let mut effects = Effects::new();
        info!(term = %term, "term selected");
        self.query.clone_from(&term);
        self.advance_epoch();
        if self.live_timer.take().is_some() {
            effects.push(Effect::CancelDebounce);
        }
        self.visible = false;
        self.cursor.reset();
        effects.push(Effect::ReportUsage { term: term.clone() });
        effects.push(Effect::TermChosen { term });
        effects
    }

    fn advance_epoch(&mut self) {
        self.epoch += 1;
        // Whatever is in transit now belongs to an older query.
        self.in_flight = None;
    }
}
