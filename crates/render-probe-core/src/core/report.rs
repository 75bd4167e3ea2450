// crates/render-probe-core/src/core/report.rs
// ============================================================================
// Module: Conformance Reports
// Description: Per-probe results and the aggregate run report.
// Purpose: Provide immutable, serializable run outcomes with summary invariants.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A run produces exactly one report: one result per probe in catalog order
//! plus summary counts. Results distinguish behavioral non-conformance
//! (`Fail`, with the violated reasons and captured responses) from
//! infrastructure problems (`Error`, with a cause). The summary maintains
//! `total == passed + failed + errored` by construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::probe::ProbeName;

// ============================================================================
// SECTION: Response Snapshots
// ============================================================================

/// Captured response retained for diagnostics.
///
/// # Invariants
/// - Header names are lowercased; duplicates (for example `Set-Cookie`) are
///   preserved in arrival order.
/// - `body` may be truncated for reporting; `body_truncated` records that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// Zero-based index of the step that produced this response.
    pub step: usize,
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order with lowercased names.
    pub headers: Vec<(String, String)>,
    /// Response body decoded as lossy UTF-8.
    pub body: String,
    /// Whether the body was truncated for capture.
    #[serde(default)]
    pub body_truncated: bool,
}

impl ResponseSnapshot {
    /// Returns a copy with the body truncated to `limit` bytes for capture.
    ///
    /// Truncation lands on a character boundary at or below the limit.
    #[must_use]
    pub fn truncated(&self, limit: usize) -> Self {
        if self.body.len() <= limit {
            return self.clone();
        }
        let mut cut = limit;
        while cut > 0 && !self.body.is_char_boundary(cut) {
            cut -= 1;
        }
        Self {
            step: self.step,
            status: self.status,
            headers: self.headers.clone(),
            body: self.body[.. cut].to_owned(),
            body_truncated: true,
        }
    }
}

// ============================================================================
// SECTION: Probe Outcomes
// ============================================================================

/// Classification of one probe execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Every check and cross-check held.
    Pass,
    /// At least one check was violated; behavioral non-conformance.
    Fail {
        /// One reason per violated check.
        reasons: Vec<String>,
    },
    /// The probe could not be evaluated; infrastructure problem.
    Error {
        /// Transport, timeout, or capture cause.
        cause: String,
    },
}

impl ProbeOutcome {
    /// Returns whether this outcome is a pass.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns the stable outcome label used in reports and audit events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail {
                ..
            } => "fail",
            Self::Error {
                ..
            } => "error",
        }
    }

    /// Returns the first reason or cause, when one exists.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail {
                reasons,
            } => reasons.first().map(String::as_str),
            Self::Error {
                cause,
            } => Some(cause.as_str()),
        }
    }
}

/// Result of executing one probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probe name.
    pub name: ProbeName,
    /// Outcome classification.
    pub outcome: ProbeOutcome,
    /// Wall-clock execution time in milliseconds.
    pub elapsed_ms: u64,
    /// Captured responses; retained only when the outcome is not `Pass`.
    #[serde(default)]
    pub responses: Vec<ResponseSnapshot>,
}

// ============================================================================
// SECTION: Aggregate Report
// ============================================================================

/// Aggregate run status derived from the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every probe passed.
    Pass,
    /// At least one probe failed or errored.
    Fail,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Summary counts for one run.
///
/// # Invariants
/// - `total == passed + failed + errored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of probes executed.
    pub total: usize,
    /// Number of passing probes.
    pub passed: usize,
    /// Number of failing probes.
    pub failed: usize,
    /// Number of errored probes.
    pub errored: usize,
}

impl ReportSummary {
    /// Computes the summary from a result sequence.
    #[must_use]
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            passed: 0,
            failed: 0,
            errored: 0,
        };
        for result in results {
            match result.outcome {
                ProbeOutcome::Pass => summary.passed += 1,
                ProbeOutcome::Fail {
                    ..
                } => summary.failed += 1,
                ProbeOutcome::Error {
                    ..
                } => summary.errored += 1,
            }
        }
        summary
    }

    /// Returns the aggregate status for these counts.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        if self.failed == 0 && self.errored == 0 {
            RunStatus::Pass
        } else {
            RunStatus::Fail
        }
    }
}

/// Immutable report for one conformance run.
///
/// # Invariants
/// - Results are in catalog order.
/// - The summary is derived from the results at construction and never
///   recomputed afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Per-probe results in catalog order.
    results: Vec<ProbeResult>,
    /// Summary counts.
    summary: ReportSummary,
}

impl ConformanceReport {
    /// Assembles a report from ordered results.
    #[must_use]
    pub fn from_results(results: Vec<ProbeResult>) -> Self {
        let summary = ReportSummary::from_results(&results);
        Self {
            results,
            summary,
        }
    }

    /// Returns the per-probe results in catalog order.
    #[must_use]
    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    /// Returns the summary counts.
    #[must_use]
    pub const fn summary(&self) -> ReportSummary {
        self.summary
    }

    /// Returns the aggregate run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.summary.status()
    }
}
