//! Owned debounce timer.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

/// Holds at most one live timer task. Arming replaces (aborts) the previous
/// timer; dropping the debouncer aborts whatever is still pending, so a timer
/// can never outlive the widget that armed it.
#[derive(Debug, Default)]
pub struct Debouncer {
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer that sends `message` on `tx` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<M: Send + 'static>(&mut self, delay: Duration, tx: UnboundedSender<M>, message: M) {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone after teardown; nothing to notify.
            let _ = tx.send(message);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!("cancelling debounce timer");
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
