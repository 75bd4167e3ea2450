// crates/render-probe-core/src/core/probe.rs
// ============================================================================
// Module: Probe Definitions
// Description: Named request/assertion units that encode one required behavior.
// Purpose: Provide immutable, serializable probe definitions for the catalog.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A probe couples one or more HTTP requests with declarative checks over the
//! responses. Probes are defined once at harness-definition time and never
//! mutated afterward; everything the runner needs is captured in the probe
//! itself so executions stay independent and order-insensitive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::check::Check;
use crate::core::check::CrossCheck;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted probe name length in bytes.
const MAX_PROBE_NAME_LEN: usize = 64;

// ============================================================================
// SECTION: Probe Names
// ============================================================================

/// Errors raised when a probe name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeNameError {
    /// The name was empty.
    #[error("probe name is empty")]
    Empty,
    /// The name exceeded the maximum length.
    #[error("probe name exceeds {MAX_PROBE_NAME_LEN} bytes: {len}")]
    TooLong {
        /// Observed length in bytes.
        len: usize,
    },
    /// The name contained a character outside the accepted set.
    #[error("probe name contains invalid character {ch:?}: {name}")]
    InvalidChar {
        /// Offending character.
        ch: char,
        /// Full rejected name.
        name: String,
    },
}

/// Unique probe identifier.
///
/// # Invariants
/// - Non-empty, at most 64 bytes.
/// - ASCII lowercase alphanumerics plus `.`, `_`, and `-` only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeName(String);

impl ProbeName {
    /// Creates a validated probe name.
    ///
    /// # Errors
    ///
    /// Returns `ProbeNameError` when the name is empty, too long, or contains
    /// characters outside the accepted set.
    pub fn new(name: impl Into<String>) -> Result<Self, ProbeNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ProbeNameError::Empty);
        }
        if name.len() > MAX_PROBE_NAME_LEN {
            return Err(ProbeNameError::TooLong {
                len: name.len(),
            });
        }
        for ch in name.chars() {
            let accepted = ch.is_ascii_lowercase()
                || ch.is_ascii_digit()
                || matches!(ch, '.' | '_' | '-');
            if !accepted {
                return Err(ProbeNameError::InvalidChar {
                    ch,
                    name,
                });
            }
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProbeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// HTTP method issued by a probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP HEAD.
    Head,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
    /// HTTP OPTIONS.
    Options,
}

impl HttpMethod {
    /// Returns the canonical method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload carried by a probe request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestBody {
    /// JSON payload; the runner sets `application/json` unless a header
    /// in the request overrides it.
    Json(Value),
    /// Raw text payload; content type comes from the request headers.
    Text(String),
}

/// One HTTP request issued against the endpoint under test.
///
/// # Invariants
/// - `target` is endpoint-relative and starts with `/` (query included).
/// - Header names are matched case-insensitively by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Endpoint-relative path and query, starting with `/`.
    pub target: String,
    /// Extra request headers in insertion order.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Optional request payload.
    #[serde(default)]
    pub body: Option<RequestBody>,
}

impl ProbeRequest {
    /// Creates a GET request for the given target.
    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, target)
    }

    /// Creates a request with the given method and target.
    #[must_use]
    pub fn new(method: HttpMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches a JSON payload.
    #[must_use]
    pub fn with_json(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Attaches a raw text payload.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(text.into()));
        self
    }
}

// ============================================================================
// SECTION: Probes
// ============================================================================

/// One request/check pair within a probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeStep {
    /// Request issued for this step.
    pub request: ProbeRequest,
    /// Checks applied to this step's response; all must hold.
    pub expect: Vec<Check>,
}

impl ProbeStep {
    /// Creates a step from a request and its checks.
    #[must_use]
    pub fn new(request: ProbeRequest, expect: Vec<Check>) -> Self {
        Self {
            request,
            expect,
        }
    }
}

/// A named conformance probe.
///
/// # Invariants
/// - At least one step; enforced at catalog registration.
/// - Cross-check step indices refer to existing steps; enforced at
///   registration.
/// - Immutable once constructed; the runner only borrows probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Probe {
    /// Unique probe name.
    pub name: ProbeName,
    /// Human-readable one-line description of the asserted behavior.
    pub summary: String,
    /// Ordered request/check steps; steps within one probe run sequentially.
    pub steps: Vec<ProbeStep>,
    /// Checks spanning multiple step responses.
    #[serde(default)]
    pub cross_checks: Vec<CrossCheck>,
}

impl Probe {
    /// Creates a single-step probe.
    ///
    /// # Errors
    ///
    /// Returns `ProbeNameError` when the name fails validation.
    pub fn single(
        name: &str,
        summary: &str,
        request: ProbeRequest,
        expect: Vec<Check>,
    ) -> Result<Self, ProbeNameError> {
        Ok(Self {
            name: ProbeName::new(name)?,
            summary: summary.to_owned(),
            steps: vec![ProbeStep::new(request, expect)],
            cross_checks: Vec::new(),
        })
    }

    /// Creates a multi-step probe with optional cross-step checks.
    ///
    /// # Errors
    ///
    /// Returns `ProbeNameError` when the name fails validation.
    pub fn sequence(
        name: &str,
        summary: &str,
        steps: Vec<ProbeStep>,
        cross_checks: Vec<CrossCheck>,
    ) -> Result<Self, ProbeNameError> {
        Ok(Self {
            name: ProbeName::new(name)?,
            summary: summary.to_owned(),
            steps,
            cross_checks,
        })
    }
}
