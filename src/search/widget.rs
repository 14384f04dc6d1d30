//! Runtime host for [`SearchEngine`].
//!
//! `SearchWidget` turns the engine's effects into tokio work: debounce timers,
//! spawned suggestion fetches, and fire-and-forget usage reports. Every
//! completion comes back through one unbounded channel and is applied from the
//! owner's event loop via [`SearchWidget::pump`] (non-blocking) or
//! [`SearchWidget::process_next`] (async), so engine state is only ever
//! touched from one place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::engine::{Effect, Effects, FetchOutcome, FetchTicket, NavKey, PanelView, SearchEngine};
use crate::config::AppConfig;
use crate::model::types::{SuggestResponse, TermRecord};
use crate::service::{ServiceError, SuggestionService};

/// Host callback receiving each chosen term.
pub type OnChosen = Box<dyn FnMut(&str) + Send>;

/// Asynchronous results delivered back to the widget.
#[derive(Debug)]
pub enum Completion {
    TimerFired {
        generation: u64,
    },
    Suggestions {
        ticket: FetchTicket,
        result: Result<SuggestResponse, ServiceError>,
    },
    UsageReported {
        term: String,
        result: Result<TermRecord, ServiceError>,
    },
}

/// What applying one completion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed {
    /// A debounce timer fired; `issued` is false when it had been superseded.
    TimerFired { issued: bool },
    Suggestions(FetchOutcome),
    UsageReported { term: String, accepted: bool },
}

pub struct SearchWidget<S: SuggestionService> {
    engine: SearchEngine,
    service: Arc<S>,
    suggest_limit: usize,
    debouncer: Debouncer,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    on_chosen: Option<OnChosen>,
}

impl<S: SuggestionService> SearchWidget<S> {
    pub fn new(service: Arc<S>, debounce: Duration, suggest_limit: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine: SearchEngine::new(debounce),
            service,
            suggest_limit,
            debouncer: Debouncer::new(),
            tx,
            rx,
            on_chosen: None,
        }
    }

    pub fn from_config(service: Arc<S>, config: &AppConfig) -> Self {
        Self::new(service, config.debounce(), config.suggest_limit)
    }

    /// Register the host's "term chosen" callback.
    pub fn on_chosen(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_chosen = Some(Box::new(callback));
        self
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn view(&self) -> PanelView<'_> {
        self.engine.view()
    }

    pub fn query(&self) -> &str {
        self.engine.query()
    }

    pub fn is_loading(&self) -> bool {
        self.engine.is_loading()
    }

    pub fn query_changed(&mut self, text: impl Into<String>) {
        let effects = self.engine.on_query_change(text);
        self.run(effects);
    }

    pub fn key(&mut self, key: NavKey) {
        let effects = self.engine.on_key(key);
        self.run(effects);
    }

    pub fn hover(&mut self, index: usize) {
        self.engine.on_hover(index);
    }

    pub fn click(&mut self, index: usize) {
        let effects = self.engine.on_click(index);
        self.run(effects);
    }

    pub fn outside_pointer(&mut self) {
        self.engine.on_outside_pointer();
    }

    pub fn focus(&mut self) {
        self.engine.on_focus();
    }

    /// Apply every completion that is already available, in arrival order.
    pub fn pump(&mut self) -> Vec<Processed> {
        let mut processed = Vec::new();
        if self.engine.is_closed() {
            return processed;
        }
        loop {
            match self.rx.try_recv() {
                Ok(completion) => processed.push(self.apply(completion)),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        processed
    }

    /// Wait for the next completion and apply it. `None` after shutdown.
    pub async fn process_next(&mut self) -> Option<Processed> {
        if self.engine.is_closed() {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Teardown: the timer is aborted and late completions are dropped unread.
    pub fn shutdown(&mut self) {
        let effects = self.engine.shutdown();
        self.run(effects);
        self.debouncer.cancel();
        self.rx.close();
        debug!("search widget shut down");
    }

    fn apply(&mut self, completion: Completion) -> Processed {
        match completion {
            Completion::TimerFired { generation } => {
                let effects = self.engine.on_timer_fired(generation);
                let issued = !effects.is_empty();
                self.run(effects);
                Processed::TimerFired { issued }
            }
            Completion::Suggestions { ticket, result } => {
                Processed::Suggestions(self.engine.on_fetch_complete(&ticket, result))
            }
            Completion::UsageReported { term, result } => {
                let accepted = match result {
                    Ok(record) => {
                        debug!(term = %record.term, frequency = record.frequency, "usage recorded");
                        true
                    }
                    Err(err) => {
                        warn!(term = %term, "usage report failed: {err}");
                        false
                    }
                };
                Processed::UsageReported { term, accepted }
            }
        }
    }

    fn run(&mut self, effects: Effects) {
        for effect in effects {
            match effect {
                Effect::ArmDebounce { generation, delay } => {
                    self.debouncer
                        .arm(delay, self.tx.clone(), Completion::TimerFired { generation });
                }
                Effect::CancelDebounce => self.debouncer.cancel(),
                Effect::Fetch(ticket) => self.spawn_fetch(ticket),
                Effect::ReportUsage { term } => self.spawn_usage_report(term),
                Effect::TermChosen { term } => {
                    info!(term = %term, "notifying host of chosen term");
                    if let Some(callback) = self.on_chosen.as_mut() {
                        callback(&term);
                    }
                }
            }
        }
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let limit = self.suggest_limit;
        tokio::spawn(async move {
            let result = service.suggest(&ticket.prefix, limit).await;
            let _ = tx.send(Completion::Suggestions { ticket, result });
        });
    }

    fn spawn_usage_report(&self, term: String) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.submit(&term).await;
            if tx.is_closed()
                && let Err(err) = &result
            {
                // Nobody will read the completion; log here instead.
                warn!(term = %term, "usage report failed after shutdown: {err}");
            }
            let _ = tx.send(Completion::UsageReported { term, result });
        });
    }
}

impl<S: SuggestionService> Drop for SearchWidget<S> {
    fn drop(&mut self) {
        if !self.engine.is_closed() {
            self.shutdown();
        }
    }
}
