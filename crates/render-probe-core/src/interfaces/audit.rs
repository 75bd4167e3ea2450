// crates/render-probe-core/src/interfaces/audit.rs
// ============================================================================
// Module: Run Audit Logging
// Description: Structured audit events for fixture and probe lifecycles.
// Purpose: Emit machine-readable run telemetry without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for conformance runs.
//! It is intentionally lightweight so environments can route events to their
//! preferred logging pipeline without redesign. Sinks must never panic and
//! must swallow their own I/O errors; audit output is advisory, the report
//! is authoritative.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Fixture acquisition audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Provisioner kind label.
    pub fixture: &'static str,
    /// Base URL of the acquired endpoint.
    pub base_url: String,
    /// Time spent acquiring, in milliseconds.
    pub elapsed_ms: u64,
}

impl FixtureAuditEvent {
    /// Creates a fixture audit event with a consistent timestamp.
    #[must_use]
    pub fn new(fixture: &'static str, base_url: String, elapsed_ms: u64) -> Self {
        Self {
            event: "fixture_ready",
            timestamp_ms: now_ms(),
            fixture,
            base_url,
            elapsed_ms,
        }
    }
}

/// Probe completion audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Probe name.
    pub probe: String,
    /// Outcome label (`pass`, `fail`, or `error`).
    pub outcome: &'static str,
    /// Probe execution time in milliseconds.
    pub elapsed_ms: u64,
    /// First reason or cause when the outcome is not a pass.
    pub detail: Option<String>,
}

impl ProbeAuditEvent {
    /// Creates a probe audit event with a consistent timestamp.
    #[must_use]
    pub fn new(
        probe: String,
        outcome: &'static str,
        elapsed_ms: u64,
        detail: Option<String>,
    ) -> Self {
        Self {
            event: "probe_completed",
            timestamp_ms: now_ms(),
            probe,
            outcome,
            elapsed_ms,
            detail,
        }
    }
}

/// Run completion audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RunAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Number of probes executed.
    pub total: usize,
    /// Number of passing probes.
    pub passed: usize,
    /// Number of failing probes.
    pub failed: usize,
    /// Number of errored probes.
    pub errored: usize,
    /// Aggregate status label (`pass` or `fail`).
    pub status: &'static str,
    /// Whole-run execution time in milliseconds.
    pub elapsed_ms: u64,
}

/// Inputs required to construct a run audit event.
pub struct RunAuditEventParams {
    /// Number of probes executed.
    pub total: usize,
    /// Number of passing probes.
    pub passed: usize,
    /// Number of failing probes.
    pub failed: usize,
    /// Number of errored probes.
    pub errored: usize,
    /// Aggregate status label (`pass` or `fail`).
    pub status: &'static str,
    /// Whole-run execution time in milliseconds.
    pub elapsed_ms: u64,
}

impl RunAuditEvent {
    /// Creates a run audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RunAuditEventParams) -> Self {
        Self {
            event: "run_completed",
            timestamp_ms: now_ms(),
            total: params.total,
            passed: params.passed,
            failed: params.failed,
            errored: params.errored,
            status: params.status,
            elapsed_ms: params.elapsed_ms,
        }
    }
}

/// Returns the current wall clock in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for conformance run events.
pub trait RunAuditSink: Send + Sync {
    /// Record a probe completion event.
    fn record_probe(&self, event: &ProbeAuditEvent);

    /// Record a fixture acquisition event.
    fn record_fixture(&self, _event: &FixtureAuditEvent) {}

    /// Record a run completion event.
    fn record_run(&self, _event: &RunAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RunAuditSink for StderrAuditSink {
    fn record_probe(&self, event: &ProbeAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_fixture(&self, event: &FixtureAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_run(&self, event: &RunAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunAuditSink for FileAuditSink {
    fn record_probe(&self, event: &ProbeAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }

    fn record_fixture(&self, event: &FixtureAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }

    fn record_run(&self, event: &RunAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that drops all events.
pub struct NoopAuditSink;

impl RunAuditSink for NoopAuditSink {
    fn record_probe(&self, _event: &ProbeAuditEvent) {}
}
