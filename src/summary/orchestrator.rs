use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::task::JoinSet;
use tokio::time::Instant;

use super::fallback::local_fallback_summary;
use super::ollama::OllamaBackend;
use super::openai::OpenAiBackend;
use super::prompt::build_request;
use super::types::{SummaryBackend, SummaryOutcome, SummaryRequest};
use super::{BackendError, SummaryError};
use crate::config::{BackendKind, SummaryConfig, MAX_TIMEOUT};
use crate::models::{Patient, VitalSignReading};

const PROMPT_PREVIEW_CHARS: usize = 200;
const REPLY_PREVIEW_CHARS: usize = 300;

type AttemptResult = (String, Result<String, BackendError>);

/// Races every configured backend under a hard deadline and falls back to
/// the local summary when none of them answers.
pub struct SummaryOrchestrator {
    config: SummaryConfig,
    backends: Vec<Arc<dyn SummaryBackend>>,
}

impl SummaryOrchestrator {
    pub fn new(config: SummaryConfig, backends: Vec<Arc<dyn SummaryBackend>>) -> Self {
        Self { config, backends }
    }

    /// Build one HTTP backend per configured entry, each with its own client.
    pub fn from_config(config: SummaryConfig) -> Result<Self, BackendError> {
        let timeout = config.per_attempt_timeout;
        let backends = config
            .backends
            .iter()
            .map(|b| {
                tracing::debug!(
                    kind = b.kind.as_str(),
                    backend = %b.name,
                    model = %b.model,
                    "Configuring summary backend"
                );
                let backend: Arc<dyn SummaryBackend> = match b.kind {
                    BackendKind::Ollama => Arc::new(OllamaBackend::from_config(b, timeout)?),
                    BackendKind::OpenAiCompatible => {
                        Arc::new(OpenAiBackend::from_config(b, timeout)?)
                    }
                };
                Ok::<_, BackendError>(backend)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(config, backends))
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Summarize a patient from their history (newest first).
    ///
    /// Never fails: backend errors are absorbed, and a fault in the
    /// orchestration itself is reported in `error` next to fallback text.
    pub async fn summarize(
        &self,
        patient: &Patient,
        readings: &[VitalSignReading],
    ) -> SummaryOutcome {
        let started = Instant::now();
        let name = patient.display_name();

        tracing::info!(
            patient = %name,
            readings = readings.len(),
            backends = self.backends.len(),
            "Summary requested"
        );

        let outcome = match AssertUnwindSafe(self.run(patient, readings, started))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(payload) => {
                let err = SummaryError::Panicked(panic_message(payload.as_ref()));
                tracing::error!(patient = %name, error = %err, "Summary orchestration failed");
                SummaryOutcome {
                    error: Some(err.to_string()),
                    ..SummaryOutcome::fallback(local_fallback_summary(patient, readings))
                }
            }
        };

        tracing::info!(
            patient = %name,
            fallback = outcome.is_fallback(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Summary finished"
        );
        outcome
    }

    async fn run(
        &self,
        patient: &Patient,
        readings: &[VitalSignReading],
        started: Instant,
    ) -> SummaryOutcome {
        let deadline = deadline_after(started, self.config.overall_deadline);
        let request = Arc::new(build_request(&self.config, patient, readings));

        tracing::debug!(
            prompt = %preview(&request.prompt, PROMPT_PREVIEW_CHARS),
            "Summary prompt"
        );

        if !self.backends.is_empty() {
            let race_deadline = deadline_after(started, self.config.race_window());
            if let Some((backend, text)) = self.race(&request, race_deadline).await {
                return SummaryOutcome::remote(&backend, text);
            }
            if let Some((backend, text)) = self.retry(&request, deadline).await {
                return SummaryOutcome::remote(&backend, text);
            }
        }

        tracing::warn!(
            patient = %patient.display_name(),
            "No backend produced a summary, using local fallback"
        );
        SummaryOutcome::fallback(local_fallback_summary(patient, readings))
    }

    /// One concurrent attempt per backend; first usable reply wins.
    async fn race(
        &self,
        request: &Arc<SummaryRequest>,
        race_deadline: Instant,
    ) -> Option<(String, String)> {
        let mut attempts: JoinSet<AttemptResult> = JoinSet::new();
        for backend in &self.backends {
            let name = backend.name().to_string();
            attempts.spawn(attempt(Arc::clone(backend), Arc::clone(request), name));
        }

        let winner = loop {
            match tokio::time::timeout_at(race_deadline, attempts.join_next()).await {
                Ok(Some(Ok((name, result)))) => {
                    if let Some(text) = accept(&name, result) {
                        break Some((name, text));
                    }
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Summary attempt task failed");
                }
                Ok(None) => break None,
                Err(_) => {
                    tracing::warn!(pending = attempts.len(), "Summary race timed out");
                    break None;
                }
            }
        };

        attempts.abort_all();
        winner
    }

    /// One attempt per backend in list order, each capped by what is left
    /// of the overall deadline.
    async fn retry(
        &self,
        request: &Arc<SummaryRequest>,
        deadline: Instant,
    ) -> Option<(String, String)> {
        for backend in &self.backends {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!("Summary deadline exhausted before retry");
                break;
            }
            let bound = self.config.per_attempt_timeout.min(remaining);
            let name = backend.name().to_string();

            tracing::debug!(
                backend = %name,
                bound_ms = bound.as_millis() as u64,
                "Retrying backend"
            );

            let mut handle = tokio::spawn(attempt(
                Arc::clone(backend),
                Arc::clone(request),
                name.clone(),
            ));
            match tokio::time::timeout(bound, &mut handle).await {
                Ok(Ok((name, result))) => {
                    if let Some(text) = accept(&name, result) {
                        return Some((name, text));
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(backend = %name, error = %e, "Summary retry task failed");
                }
                Err(_) => {
                    handle.abort();
                    tracing::warn!(backend = %name, bound = ?bound, "Summary retry timed out");
                }
            }
        }
        None
    }
}

/// `started + budget`, clamped to `MAX_TIMEOUT` when the sum overflows.
fn deadline_after(started: Instant, budget: Duration) -> Instant {
    started
        .checked_add(budget)
        .or_else(|| started.checked_add(MAX_TIMEOUT))
        .unwrap_or(started)
}

async fn attempt(
    backend: Arc<dyn SummaryBackend>,
    request: Arc<SummaryRequest>,
    name: String,
) -> AttemptResult {
    let result = backend.complete(&request).await;
    (name, result)
}

/// Trimmed reply, or `None` when the attempt failed or said nothing.
fn accept(backend: &str, result: Result<String, BackendError>) -> Option<String> {
    match result {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                tracing::warn!(backend, error = %BackendError::EmptyContent, "Summary attempt failed");
                return None;
            }
            tracing::info!(backend, "Summary produced by backend");
            tracing::debug!(backend, reply = %preview(text, REPLY_PREVIEW_CHARS), "Summary reply");
            Some(text.to_string())
        }
        Err(e) => {
            tracing::warn!(backend, error = %e, "Summary attempt failed");
            None
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::models::patient::make_patient;
    use crate::models::vital_sign::make_reading;
    use crate::summary::fallback::FALLBACK_DISCLAIMER;
    use crate::summary::mock::MockBackend;
    use crate::summary::SummarySource;
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scheduling and fallback formatting on top of the overall deadline.
    const DEADLINE_SLACK: Duration = Duration::from_millis(250);

    fn config(per_attempt_ms: u64, overall_ms: u64) -> SummaryConfig {
        SummaryConfig {
            per_attempt_timeout: Duration::from_millis(per_attempt_ms),
            overall_deadline: Duration::from_millis(overall_ms),
            ..SummaryConfig::default()
        }
    }

    fn orchestrator(
        config: SummaryConfig,
        backends: Vec<Arc<dyn SummaryBackend>>,
    ) -> SummaryOrchestrator {
        SummaryOrchestrator::new(config, backends)
    }

    fn history() -> Vec<VitalSignReading> {
        vec![
            make_reading("2024-03-02", 118, 76, 72, 95, 36.8),
            make_reading("2024-03-01", 125, 82, 80, 100, 37.1),
        ]
    }

    /// Fails the first `failures` calls, then replies.
    struct FlakyBackend {
        name: String,
        failures: usize,
        reply: String,
        calls: AtomicUsize,
    }

    impl FlakyBackend {
        fn new(name: &str, failures: usize, reply: &str) -> Self {
            Self {
                name: name.to_string(),
                failures,
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SummaryBackend for FlakyBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn complete<'a>(
            &'a self,
            _request: &'a SummaryRequest,
        ) -> BoxFuture<'a, Result<String, BackendError>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < self.failures {
                    Err(BackendError::Connection(self.name.clone()))
                } else {
                    Ok(self.reply.clone())
                }
            }
            .boxed()
        }
    }

    /// Sets `finished` only if it is allowed to run past its delay.
    struct SlowFlagBackend {
        delay: Duration,
        finished: Arc<AtomicBool>,
    }

    impl SummaryBackend for SlowFlagBackend {
        fn name(&self) -> &str {
            "slow"
        }

        fn complete<'a>(
            &'a self,
            _request: &'a SummaryRequest,
        ) -> BoxFuture<'a, Result<String, BackendError>> {
            async move {
                tokio::time::sleep(self.delay).await;
                self.finished.store(true, Ordering::SeqCst);
                Ok("late reply".to_string())
            }
            .boxed()
        }
    }

    struct PanickingBackend;

    impl SummaryBackend for PanickingBackend {
        fn name(&self) -> &str {
            "panics"
        }

        fn complete<'a>(
            &'a self,
            _request: &'a SummaryRequest,
        ) -> BoxFuture<'a, Result<String, BackendError>> {
            async { panic!("backend exploded") }.boxed()
        }
    }

    struct BrokenNameBackend;

    impl SummaryBackend for BrokenNameBackend {
        fn name(&self) -> &str {
            panic!("name lookup failed")
        }

        fn complete<'a>(
            &'a self,
            _request: &'a SummaryRequest,
        ) -> BoxFuture<'a, Result<String, BackendError>> {
            async { Ok("unused".to_string()) }.boxed()
        }
    }

    #[tokio::test]
    async fn no_backends_gives_fallback_with_name_and_disclaimer() {
        let orch = orchestrator(SummaryConfig::default(), vec![]);
        let patient = make_patient("Sara", "Karimi", 52);

        let outcome = orch.summarize(&patient, &history()).await;

        assert!(outcome.is_fallback());
        assert!(outcome.error.is_none());
        assert!(outcome.text.contains("Sara Karimi"));
        assert!(outcome.text.contains(FALLBACK_DISCLAIMER));
    }

    #[tokio::test]
    async fn empty_history_still_gives_text() {
        let orch = orchestrator(SummaryConfig::default(), vec![]);
        let outcome = orch.summarize(&make_patient("A", "B", 30), &[]).await;
        assert!(!outcome.text.trim().is_empty());
    }

    #[tokio::test]
    async fn fast_backend_reply_is_returned_trimmed() {
        let backend = Arc::new(MockBackend::new("local", "  Stable, afebrile.\n"));
        let orch = orchestrator(config(500, 1000), vec![backend.clone()]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert_eq!(outcome.text, "Stable, afebrile.");
        assert_eq!(
            outcome.source,
            SummarySource::Remote {
                backend: "local".into()
            }
        );
        assert!(!outcome.text.contains(FALLBACK_DISCLAIMER));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn first_success_wins_the_race() {
        let slow =
            Arc::new(MockBackend::new("slow", "slow reply").with_delay(Duration::from_secs(2)));
        let fast =
            Arc::new(MockBackend::new("fast", "fast reply").with_delay(Duration::from_millis(20)));
        let orch = orchestrator(config(3000, 5000), vec![slow, fast]);

        let started = Instant::now();
        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert_eq!(outcome.text, "fast reply");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn losing_attempts_are_aborted_after_a_win() {
        let finished = Arc::new(AtomicBool::new(false));
        let slow = Arc::new(SlowFlagBackend {
            delay: Duration::from_millis(200),
            finished: Arc::clone(&finished),
        });
        let fast = Arc::new(MockBackend::new("fast", "fast reply"));
        let orch = orchestrator(config(1000, 2000), vec![slow, fast]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;
        assert_eq!(outcome.text, "fast reply");

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn oversized_deadline_is_clamped_not_fatal() {
        let hang = Arc::new(MockBackend::unresponsive("hang"));
        let config = SummaryConfig {
            per_attempt_timeout: Duration::from_millis(150),
            overall_deadline: Duration::from_secs(u64::MAX / 2),
            ..SummaryConfig::default()
        };
        let orch = orchestrator(config, vec![hang.clone()]);

        let started = Instant::now();
        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert!(outcome.is_fallback());
        assert!(outcome.error.is_none());
        assert_eq!(hang.calls(), 2);
        assert!(started.elapsed() < Duration::from_millis(300) + DEADLINE_SLACK);
    }

    #[test]
    fn deadline_after_never_overflows() {
        let now = Instant::now();
        assert_eq!(deadline_after(now, Duration::from_secs(5)), now + Duration::from_secs(5));
        assert!(deadline_after(now, Duration::MAX) >= now);
    }

    #[tokio::test]
    async fn failure_does_not_end_the_race() {
        let down = Arc::new(MockBackend::failing("down"));
        let up = Arc::new(MockBackend::new("up", "reply").with_delay(Duration::from_millis(50)));
        let orch = orchestrator(config(500, 1000), vec![down, up]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;
        assert_eq!(outcome.text, "reply");
    }

    #[tokio::test]
    async fn unresponsive_backend_respects_overall_deadline() {
        let hang = Arc::new(MockBackend::unresponsive("hang"));
        let orch = orchestrator(config(200, 500), vec![hang]);

        let started = Instant::now();
        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert!(started.elapsed() < Duration::from_millis(500) + DEADLINE_SLACK);
        assert!(outcome.is_fallback());
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn retry_is_capped_by_remaining_budget() {
        let hang = Arc::new(MockBackend::unresponsive("hang"));
        // Race takes 300ms, leaving 100ms for the retry.
        let orch = orchestrator(config(300, 400), vec![hang.clone()]);

        let started = Instant::now();
        let outcome = orch.summarize(&make_patient("A", "B", 30), &[]).await;

        assert!(started.elapsed() < Duration::from_millis(400) + DEADLINE_SLACK);
        assert!(outcome.is_fallback());
        assert_eq!(hang.calls(), 2);
    }

    #[tokio::test]
    async fn race_window_is_bounded_by_overall_deadline() {
        let hang = Arc::new(MockBackend::unresponsive("hang"));
        let orch = orchestrator(config(5000, 300), vec![hang.clone()]);

        let started = Instant::now();
        let outcome = orch.summarize(&make_patient("A", "B", 30), &[]).await;

        assert!(started.elapsed() < Duration::from_millis(300) + DEADLINE_SLACK);
        assert!(outcome.is_fallback());
        // No budget left for a retry.
        assert_eq!(hang.calls(), 1);
    }

    #[tokio::test]
    async fn sequential_retry_recovers_transient_failure() {
        let flaky = Arc::new(FlakyBackend::new("flaky", 1, "recovered"));
        let orch = orchestrator(config(500, 1000), vec![flaky.clone()]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert_eq!(outcome.text, "recovered");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_runs_in_list_order_and_stops_at_first_success() {
        let first = Arc::new(FlakyBackend::new("first", 1, "from first"));
        let second = Arc::new(FlakyBackend::new("second", 1, "from second"));
        let orch = orchestrator(config(500, 1000), vec![first.clone(), second.clone()]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert_eq!(outcome.text, "from first");
        assert_eq!(first.calls.load(Ordering::SeqCst), 2);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_backend_gets_exactly_one_retry() {
        let a = Arc::new(MockBackend::failing("a"));
        let b = Arc::new(MockBackend::failing("b"));
        let orch = orchestrator(config(500, 1000), vec![a.clone(), b.clone()]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert!(outcome.is_fallback());
        assert_eq!(a.calls(), 2);
        assert_eq!(b.calls(), 2);
    }

    #[tokio::test]
    async fn blank_reply_counts_as_failure() {
        let blank = Arc::new(MockBackend::new("blank", "   \n"));
        let orch = orchestrator(config(500, 1000), vec![blank.clone()]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert!(outcome.is_fallback());
        assert_eq!(blank.calls(), 2);
    }

    #[tokio::test]
    async fn backend_panic_is_absorbed_like_any_failure() {
        let orch = orchestrator(config(500, 1000), vec![Arc::new(PanickingBackend)]);

        let outcome = orch.summarize(&make_patient("A", "B", 30), &history()).await;

        assert!(outcome.is_fallback());
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn orchestration_fault_pairs_error_with_fallback_text() {
        let orch = orchestrator(config(500, 1000), vec![Arc::new(BrokenNameBackend)]);
        let patient = make_patient("Sara", "Karimi", 52);

        let outcome = orch.summarize(&patient, &history()).await;

        assert!(outcome.is_fallback());
        assert!(outcome.text.contains("Sara Karimi"));
        let error = outcome.error.unwrap();
        assert!(error.contains("name lookup failed"));
    }

    #[test]
    fn from_config_builds_one_backend_per_entry() {
        let config = SummaryConfig {
            backends: vec![
                BackendConfig::parse("ollama=local@http://localhost:11434#medgemma").unwrap(),
                BackendConfig::parse("openai=cloud@https://api.example.com#gpt-4o-mini").unwrap(),
            ],
            ..SummaryConfig::default()
        };
        let orch = SummaryOrchestrator::from_config(config).unwrap();
        assert_eq!(orch.backend_count(), 2);
        assert_eq!(orch.backends[0].name(), "local");
        assert_eq!(orch.backends[1].name(), "cloud");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("°°°°", 2), "°°…");
    }
}
