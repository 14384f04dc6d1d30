use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use typeahead::model::types::{SuggestResponse, Suggestion, TermRecord};
use typeahead::service::{ServiceError, SuggestionService};

type SuggestReply = Result<Vec<Suggestion>, ServiceError>;

struct PendingSuggest {
    prefix: String,
    reply: oneshot::Sender<SuggestReply>,
}

/// Scripted service: every `suggest` call parks until the test answers it,
/// so responses can be delivered in any order.
#[allow(dead_code)]
#[derive(Default)]
pub struct GatedService {
    suggest_calls: Mutex<Vec<String>>,
    pending: Mutex<Vec<PendingSuggest>>,
    submitted: Mutex<Vec<String>>,
    fail_submit: Mutex<bool>,
    top_replies: Mutex<VecDeque<Result<Vec<Suggestion>, ServiceError>>>,
    top_calls: Mutex<usize>,
}

#[allow(dead_code)]
impl GatedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every prefix `suggest` was called with, in call order.
    pub fn suggest_calls(&self) -> Vec<String> {
        self.suggest_calls.lock().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }

    pub fn top_calls(&self) -> usize {
        *self.top_calls.lock()
    }

    pub fn fail_submits(&self) {
        *self.fail_submit.lock() = true;
    }

    /// Queue the reply for the next `top` call. Unscripted calls get `[]`.
    pub fn script_top(&self, reply: Result<Vec<Suggestion>, ServiceError>) {
        self.top_replies.lock().push_back(reply);
    }

    /// Release the oldest parked call for `prefix`.
    pub fn respond(&self, prefix: &str, reply: SuggestReply) {
        let mut pending = self.pending.lock();
        let idx = pending
            .iter()
            .position(|p| p.prefix == prefix)
            .unwrap_or_else(|| panic!("no parked suggest call for {prefix:?}"));
        let call = pending.remove(idx);
        let _ = call.reply.send(reply);
    }

    /// Yield to spawned tasks until `n` calls are parked.
    pub async fn wait_for_pending(&self, n: usize) {
        for _ in 0..10_000 {
            if self.pending_count() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {n} parked suggest calls, have {}", self.pending_count());
    }
}

impl SuggestionService for GatedService {
    async fn suggest(&self, prefix: &str, _limit: usize) -> Result<SuggestResponse, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.suggest_calls.lock().push(prefix.to_string());
        self.pending.lock().push(PendingSuggest {
            prefix: prefix.to_string(),
            reply: tx,
        });
        let suggestions = rx
            .await
            .map_err(|_| ServiceError::Transport("gate dropped".into()))??;
        Ok(SuggestResponse {
            prefix: prefix.to_string(),
            suggestions,
            execution_time_ms: 4,
        })
    }

    async fn submit(&self, term: &str) -> Result<TermRecord, ServiceError> {
        self.submitted.lock().push(term.to_string());
        if *self.fail_submit.lock() {
            return Err(ServiceError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(TermRecord {
            id: 1,
            term: term.to_string(),
            frequency: 1,
            last_used: None,
            created_at: None,
        })
    }

    async fn top(&self, _limit: usize) -> Result<Vec<Suggestion>, ServiceError> {
        *self.top_calls.lock() += 1;
        let reply = self.top_replies.lock().pop_front();
        reply.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn init(&self) -> Result<String, ServiceError> {
        Ok("ok".into())
    }
}

#[allow(dead_code)]
pub fn items(pairs: &[(&str, u64)]) -> Vec<Suggestion> {
    pairs.iter().map(|(t, f)| Suggestion::new(*t, *f)).collect()
}

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).to_string()
    }

    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn set(key: &str, val: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::set_var(key, val.as_ref()) };
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(&self.key, v) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}
