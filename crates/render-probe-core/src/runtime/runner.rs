// crates/render-probe-core/src/runtime/runner.rs
// ============================================================================
// Module: Conformance Runner
// Description: Executes a probe battery against a live endpoint.
// Purpose: Classify every probe as pass, fail, or error in one sweep.
// Dependencies: reqwest, tokio, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runner owns one HTTP client per run, configured to follow no redirects
//! and keep no cookies: redirect responses are assertion subjects, and every
//! probe starts from a fresh cookie-less context. Probes fan out in bounded
//! waves; a per-probe timeout converts stalls into `Error` outcomes without
//! aborting the rest of the run. Results are reassembled in catalog order
//! regardless of completion order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use reqwest::redirect::Policy;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::core::probe::HttpMethod;
use crate::core::probe::Probe;
use crate::core::probe::RequestBody;
use crate::core::report::ConformanceReport;
use crate::core::report::ProbeOutcome;
use crate::core::report::ProbeResult;
use crate::core::report::ResponseSnapshot;
use crate::core::report::RunStatus;
use crate::interfaces::Endpoint;
use crate::interfaces::NoopAuditSink;
use crate::interfaces::ProbeAuditEvent;
use crate::interfaces::RunAuditEvent;
use crate::interfaces::RunAuditEventParams;
use crate::interfaces::RunAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum accepted per-probe timeout.
const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Maximum accepted per-probe timeout.
const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum accepted concurrent probe executions.
const MAX_CONCURRENCY_LIMIT: usize = 64;

/// Maximum accepted response read bound.
const MAX_BODY_BYTES_LIMIT: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Runner tuning knobs.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Whole-probe execution bound; expiry classifies the probe as `Error`.
    pub probe_timeout: Duration,
    /// Maximum probes executing at once.
    pub max_concurrency: usize,
    /// Maximum bytes read from one response body.
    pub max_body_bytes: usize,
    /// Maximum body bytes retained per captured response snapshot.
    pub capture_body_bytes: usize,
    /// User agent sent with every probe request.
    pub user_agent: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
            max_concurrency: 4,
            max_body_bytes: MAX_BODY_BYTES_LIMIT,
            capture_body_bytes: 64 * 1024,
            user_agent: String::from("render-probe/0.1"),
        }
    }
}

impl RunnerConfig {
    /// Validates the configuration bounds.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Config` when any knob is outside its accepted
    /// range.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.probe_timeout < MIN_PROBE_TIMEOUT || self.probe_timeout > MAX_PROBE_TIMEOUT {
            return Err(RunnerError::Config(format!(
                "probe timeout {}ms outside {}..={}ms",
                self.probe_timeout.as_millis(),
                MIN_PROBE_TIMEOUT.as_millis(),
                MAX_PROBE_TIMEOUT.as_millis()
            )));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(RunnerError::Config(format!(
                "max concurrency {} outside 1..={MAX_CONCURRENCY_LIMIT}",
                self.max_concurrency
            )));
        }
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(RunnerError::Config(format!(
                "max body bytes {} outside 1..={MAX_BODY_BYTES_LIMIT}",
                self.max_body_bytes
            )));
        }
        if self.capture_body_bytes == 0 || self.capture_body_bytes > self.max_body_bytes {
            return Err(RunnerError::Config(format!(
                "capture body bytes {} outside 1..={}",
                self.capture_body_bytes, self.max_body_bytes
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while constructing a runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The runner configuration is outside accepted bounds.
    #[error("invalid runner config: {0}")]
    Config(String),
    /// The HTTP client could not be built.
    #[error("http client init failed: {0}")]
    Client(String),
}

/// Infrastructure failures that classify a probe as `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    /// The request could not be sent or the response could not be read.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response body exceeded the configured read bound.
    #[error("response body {actual} bytes exceeds limit {limit}")]
    BodyTooLarge {
        /// Bytes observed before aborting the read.
        actual: usize,
        /// Configured read bound.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes probe batteries against a live endpoint.
///
/// # Invariants
/// - The client follows no redirects and keeps no cookie state.
/// - One probe failure never aborts the run.
/// - The report lists results in catalog order.
pub struct ConformanceRunner {
    /// Runner tuning knobs shared with spawned probe tasks.
    config: Arc<RunnerConfig>,
    /// HTTP client shared across all probe executions of a run.
    client: Client,
    /// Audit sink receiving probe and run lifecycle events.
    audit: Arc<dyn RunAuditSink>,
}

impl ConformanceRunner {
    /// Creates a runner with a no-op audit sink.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError` when the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        Self::with_audit(config, Arc::new(NoopAuditSink))
    }

    /// Creates a runner that reports lifecycle events to the given sink.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError` when the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn with_audit(
        config: RunnerConfig,
        audit: Arc<dyn RunAuditSink>,
    ) -> Result<Self, RunnerError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.probe_timeout)
            .redirect(Policy::none())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| RunnerError::Client(err.to_string()))?;
        Ok(Self {
            config: Arc::new(config),
            client,
            audit,
        })
    }

    /// Runs every probe against the endpoint and assembles the report.
    ///
    /// Probes execute in waves of at most `max_concurrency`; each probe is
    /// bounded by the per-probe timeout and classified independently.
    pub async fn run(&self, endpoint: &Endpoint, probes: &[Probe]) -> ConformanceReport {
        let run_started = Instant::now();
        let mut slots: Vec<Option<ProbeResult>> = Vec::new();
        slots.resize_with(probes.len(), || None);
        for (wave, chunk) in probes.chunks(self.config.max_concurrency).enumerate() {
            let mut joins = JoinSet::new();
            for (offset, probe) in chunk.iter().enumerate() {
                let index = wave * self.config.max_concurrency + offset;
                let task = ProbeTask {
                    client: self.client.clone(),
                    endpoint: endpoint.clone(),
                    probe: probe.clone(),
                    config: Arc::clone(&self.config),
                    audit: Arc::clone(&self.audit),
                };
                joins.spawn(async move { (index, task.execute().await) });
            }
            while let Some(joined) = joins.join_next().await {
                if let Ok((index, result)) = joined
                    && let Some(slot) = slots.get_mut(index)
                {
                    *slot = Some(result);
                }
            }
        }
        let mut results = Vec::with_capacity(probes.len());
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(result) => results.push(result),
                None => {
                    // A task lost to cancellation still yields a result so the
                    // summary invariant holds.
                    if let Some(probe) = probes.get(index) {
                        results.push(ProbeResult {
                            name: probe.name.clone(),
                            outcome: ProbeOutcome::Error {
                                cause: String::from("probe task did not complete"),
                            },
                            elapsed_ms: 0,
                            responses: Vec::new(),
                        });
                    }
                }
            }
        }
        let report = ConformanceReport::from_results(results);
        let summary = report.summary();
        self.audit.record_run(&RunAuditEvent::new(RunAuditEventParams {
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            errored: summary.errored,
            status: match report.status() {
                RunStatus::Pass => "pass",
                RunStatus::Fail => "fail",
            },
            elapsed_ms: elapsed_ms(run_started),
        }));
        report
    }
}

// ============================================================================
// SECTION: Probe Execution
// ============================================================================

/// Owned context for one probe execution task.
struct ProbeTask {
    /// Shared HTTP client.
    client: Client,
    /// Endpoint under test.
    endpoint: Endpoint,
    /// Probe definition being executed.
    probe: Probe,
    /// Runner tuning knobs.
    config: Arc<RunnerConfig>,
    /// Audit sink for the completion event.
    audit: Arc<dyn RunAuditSink>,
}

impl ProbeTask {
    /// Executes the probe and returns its classified result.
    async fn execute(self) -> ProbeResult {
        let started = Instant::now();
        let (outcome, responses) =
            match timeout(self.config.probe_timeout, self.run_steps()).await {
                Ok(Ok(snapshots)) => self.classify(snapshots),
                Ok(Err(failure)) => (
                    ProbeOutcome::Error {
                        cause: failure.to_string(),
                    },
                    Vec::new(),
                ),
                Err(_) => (
                    ProbeOutcome::Error {
                        cause: format!(
                            "probe timed out after {}ms",
                            self.config.probe_timeout.as_millis()
                        ),
                    },
                    Vec::new(),
                ),
            };
        let elapsed = elapsed_ms(started);
        self.audit.record_probe(&ProbeAuditEvent::new(
            self.probe.name.to_string(),
            outcome.label(),
            elapsed,
            outcome.detail().map(str::to_owned),
        ));
        ProbeResult {
            name: self.probe.name.clone(),
            outcome,
            elapsed_ms: elapsed,
            responses,
        }
    }

    /// Issues every step request sequentially and captures responses.
    async fn run_steps(&self) -> Result<Vec<ResponseSnapshot>, ProbeFailure> {
        let mut snapshots = Vec::with_capacity(self.probe.steps.len());
        for (index, step) in self.probe.steps.iter().enumerate() {
            let url = self.endpoint.url_for(&step.request.target);
            let mut request = self.client.request(request_method(step.request.method), &url);
            if let Some(body) = &step.request.body {
                request = match body {
                    RequestBody::Json(value) => request.json(value),
                    RequestBody::Text(text) => request.body(text.clone()),
                };
            }
            // Explicit probe headers are applied last so they win over any
            // body-derived defaults.
            for (name, value) in &step.request.headers {
                request = request.header(name, value);
            }
            let response = request
                .send()
                .await
                .map_err(|err| ProbeFailure::Transport(err.to_string()))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_ascii_lowercase(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body_bytes = read_body_with_limit(response, self.config.max_body_bytes).await?;
            snapshots.push(ResponseSnapshot {
                step: index,
                status,
                headers,
                body: String::from_utf8_lossy(&body_bytes).into_owned(),
                body_truncated: false,
            });
        }
        Ok(snapshots)
    }

    /// Evaluates every check and cross-check over the captured responses.
    fn classify(&self, snapshots: Vec<ResponseSnapshot>) -> (ProbeOutcome, Vec<ResponseSnapshot>) {
        let mut reasons = Vec::new();
        for (step, snapshot) in self.probe.steps.iter().zip(&snapshots) {
            for check in &step.expect {
                for reason in check.evaluate(snapshot) {
                    reasons.push(format!("step {}: {reason}", snapshot.step));
                }
            }
        }
        for cross in &self.probe.cross_checks {
            reasons.extend(cross.evaluate(&snapshots));
        }
        if reasons.is_empty() {
            (ProbeOutcome::Pass, Vec::new())
        } else {
            let captured = snapshots
                .iter()
                .map(|snapshot| snapshot.truncated(self.config.capture_body_bytes))
                .collect();
            (
                ProbeOutcome::Fail {
                    reasons,
                },
                captured,
            )
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a probe method onto the client method type.
fn request_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

/// Reads a response body up to the configured bound.
async fn read_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ProbeFailure> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| ProbeFailure::Transport(err.to_string()))?
    {
        let next_total = total.checked_add(chunk.len()).ok_or(ProbeFailure::BodyTooLarge {
            actual: usize::MAX,
            limit,
        })?;
        if next_total > limit {
            return Err(ProbeFailure::BodyTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}

/// Converts an elapsed instant into saturating milliseconds.
fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
