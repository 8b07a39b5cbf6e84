use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use super::types::{SummaryBackend, SummaryRequest};
use super::BackendError;

#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Fail,
    Never,
}

/// Scriptable backend for tests and offline demos.
pub struct MockBackend {
    name: String,
    behavior: Behavior,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Answers immediately with `response`.
    pub fn new(name: &str, response: &str) -> Self {
        Self {
            name: name.to_string(),
            behavior: Behavior::Reply(response.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every call with a connection error.
    pub fn failing(name: &str) -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::new(name, "")
        }
    }

    /// Never completes.
    pub fn unresponsive(name: &str) -> Self {
        Self {
            behavior: Behavior::Never,
            ..Self::new(name, "")
        }
    }

    /// Wait `delay` before answering or failing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `complete` calls started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SummaryBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete<'a>(
        &'a self,
        _request: &'a SummaryRequest,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.behavior {
                Behavior::Reply(text) => Ok(text.clone()),
                Behavior::Fail => Err(BackendError::Connection(format!("mock://{}", self.name))),
                Behavior::Never => std::future::pending().await,
            }
        }
        .boxed()
    }
}
