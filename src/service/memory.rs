//! In-process suggestion service.
//!
//! Mirrors the REST service's contract closely enough to stand in for it in
//! `--offline` sessions and in tests: terms are normalised to trimmed lower
//! case, suggestions are ranked by frequency (ties broken alphabetically),
//! `submit` increments or inserts, and `init` seeds sample data only once.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{ServiceError, SuggestionService};
use crate::model::types::{SuggestResponse, Suggestion, TermRecord};

/// Upper bound applied to every `suggest` limit.
pub const MAX_SUGGESTIONS: usize = 10;

/// Longest term accepted by `submit`.
pub const MAX_TERM_LEN: usize = 255;

/// Sample vocabulary, most popular first.
pub const SAMPLE_TERMS: &[&str] = &[
    "javascript",
    "java",
    "python",
    "react",
    "angular",
    "vue",
    "typescript",
    "spring",
    "django",
    "flask",
    "nodejs",
    "express",
    "mongodb",
    "postgresql",
    "mysql",
    "redis",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "google cloud",
    "spring boot",
    "react native",
];

#[derive(Debug, Clone)]
struct StoredTerm {
    id: i64,
    frequency: u64,
    last_used: NaiveDateTime,
    created_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct Store {
    terms: BTreeMap<String, StoredTerm>,
    next_id: i64,
}

impl Store {
    fn insert(&mut self, term: String, frequency: u64) -> TermRecord {
        let now = Local::now().naive_local();
        self.next_id += 1;
        let stored = StoredTerm {
            id: self.next_id,
            frequency,
            last_used: now,
            created_at: now,
        };
        let record = to_record(&term, &stored);
        self.terms.insert(term, stored);
        record
    }
}

fn rank_entries<'a>(entries: impl Iterator<Item = (&'a String, &'a StoredTerm)>) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = entries
        .map(|(term, stored)| Suggestion::new(term.clone(), stored.frequency))
        .collect();
    out.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.term.cmp(&b.term)));
    out
}

fn to_record(term: &str, stored: &StoredTerm) -> TermRecord {
    TermRecord {
        id: stored.id,
        term: term.to_string(),
        frequency: stored.frequency,
        last_used: Some(stored.last_used),
        created_at: Some(stored.created_at),
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Shared-state term store. Wrap in `Arc` to hand to several widgets.
#[derive(Debug, Default)]
pub struct InMemoryService {
    store: Mutex<Store>,
    latency: Duration,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with [`SAMPLE_TERMS`].
    pub fn seeded() -> Self {
        let svc = Self::new();
        svc.seed();
        svc
    }

    /// Delay every call by `latency` to make debounce and loading states
    /// observable.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Insert or overwrite a term with an explicit frequency.
    pub fn insert(&self, term: &str, frequency: u64) {
        let term = normalize(term);
        if term.is_empty() {
            return;
        }
        let mut store = self.store.lock();
        if let Some(existing) = store.terms.get_mut(&term) {
            existing.frequency = frequency;
        } else {
            store.insert(term, frequency);
        }
    }

    pub fn len(&self) -> usize {
        self.store.lock().terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frequency_of(&self, term: &str) -> Option<u64> {
        self.store
            .lock()
            .terms
            .get(&normalize(term))
            .map(|t| t.frequency)
    }

    /// Returns `true` when sample data was written.
    fn seed(&self) -> bool {
        let mut store = self.store.lock();
        if !store.terms.is_empty() {
            return false;
        }
        let total = SAMPLE_TERMS.len() as u64;
        for (i, term) in SAMPLE_TERMS.iter().enumerate() {
            store.insert((*term).to_string(), (total - i as u64) * 100);
        }
        info!(terms = SAMPLE_TERMS.len(), "seeded sample terms");
        true
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn lookup(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        let prefix = normalize(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }
        let store = self.store.lock();
        let matches = store
            .terms
            .range(prefix.clone()..)
            .take_while(|(term, _)| term.starts_with(&prefix));
        let mut ranked = rank_entries(matches);
        ranked.truncate(limit.min(MAX_SUGGESTIONS));
        ranked
    }
}

impl SuggestionService for InMemoryService {
    async fn suggest(&self, prefix: &str, limit: usize) -> Result<SuggestResponse, ServiceError> {
        self.simulate_latency().await;
        let started = Instant::now();
        let suggestions = self.lookup(prefix, limit);
        let execution_time_ms = started.elapsed().as_millis() as u64;
        debug!(prefix, found = suggestions.len(), "in-memory suggest");
        Ok(SuggestResponse {
            prefix: prefix.to_string(),
            suggestions,
            execution_time_ms,
        })
    }

    async fn submit(&self, term: &str) -> Result<TermRecord, ServiceError> {
        self.simulate_latency().await;
        let term = normalize(term);
        if term.is_empty() {
            return Err(ServiceError::InvalidRequest("term must not be blank".into()));
        }
        if term.chars().count() > MAX_TERM_LEN {
            return Err(ServiceError::InvalidRequest(format!(
                "term must be at most {MAX_TERM_LEN} characters"
            )));
        }
        let mut store = self.store.lock();
        let record = match store.terms.get_mut(&term) {
            Some(existing) => {
                existing.frequency += 1;
                existing.last_used = Local::now().naive_local();
                to_record(&term, existing)
            }
            None => store.insert(term, 1),
        };
        debug!(term = %record.term, frequency = record.frequency, "in-memory submit");
        Ok(record)
    }

    async fn top(&self, limit: usize) -> Result<Vec<Suggestion>, ServiceError> {
        self.simulate_latency().await;
        let store = self.store.lock();
        let mut ranked = rank_entries(store.terms.iter());
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn init(&self) -> Result<String, ServiceError> {
        self.simulate_latency().await;
        if self.seed() {
            Ok("Sample data initialized".to_string())
        } else {
            Ok("Sample data already present".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn suggest_ranks_by_frequency_within_prefix() {
        let svc = InMemoryService::new();
        svc.insert("java", 1500);
        svc.insert("jakarta", 200);
        svc.insert("javascript", 2300);
        svc.insert("python", 900);

        let resp = svc.suggest("ja", 10).await.unwrap();
        let terms: Vec<&str> = resp.suggestions.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, ["javascript", "java", "jakarta"]);
        assert_eq!(resp.prefix, "ja");
    }

    #[tokio::test]
    async fn suggest_normalises_and_caps_limit() {
        let svc = InMemoryService::seeded();
        let resp = svc.suggest("  SPR ", 50).await.unwrap();
        let terms: Vec<&str> = resp.suggestions.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, ["spring", "spring boot"]);

        let wide = svc.suggest("a", 50).await.unwrap();
        assert!(wide.suggestions.len() <= MAX_SUGGESTIONS);
    }

    #[tokio::test]
    async fn blank_prefix_returns_nothing() {
        let svc = InMemoryService::seeded();
        assert!(svc.suggest("   ", 10).await.unwrap().suggestions.is_empty());
        assert!(svc.suggest("xyz", 10).await.unwrap().suggestions.is_empty());
    }

    #[tokio::test]
    async fn submit_increments_or_inserts() {
        let svc = InMemoryService::new();
        svc.insert("rust", 4);

        let bumped = svc.submit("Rust ").await.unwrap();
        assert_eq!(bumped.term, "rust");
        assert_eq!(bumped.frequency, 5);

        let fresh = svc.submit("zig").await.unwrap();
        assert_eq!(fresh.frequency, 1);
        assert_ne!(fresh.id, bumped.id);
        assert_eq!(svc.len(), 2);
    }

    #[tokio::test]
    async fn submit_rejects_blank_and_oversized_terms() {
        let svc = InMemoryService::new();
        assert!(matches!(
            svc.submit("  ").await,
            Err(ServiceError::InvalidRequest(_))
        ));
        let long = "x".repeat(MAX_TERM_LEN + 1);
        assert!(matches!(
            svc.submit(&long).await,
            Err(ServiceError::InvalidRequest(_))
        ));
        assert!(svc.is_empty());
    }

    #[tokio::test]
    async fn top_is_frequency_descending() {
        let svc = InMemoryService::seeded();
        let top = svc.top(3).await.unwrap();
        let terms: Vec<&str> = top.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, ["javascript", "java", "python"]);
        assert!(top.windows(2).all(|w| w[0].frequency >= w[1].frequency));
    }

    #[tokio::test]
    async fn init_seeds_only_once() {
        let svc = InMemoryService::new();
        assert_eq!(svc.init().await.unwrap(), "Sample data initialized");
        assert_eq!(svc.len(), SAMPLE_TERMS.len());
        svc.submit("java").await.unwrap();
        assert_eq!(svc.init().await.unwrap(), "Sample data already present");
        assert_eq!(svc.frequency_of("java"), Some(2201));
    }
}
