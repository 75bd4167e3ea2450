// crates/render-probe-core/src/interfaces/mod.rs
// ============================================================================
// Module: Render Probe Interfaces
// Description: Runtime-agnostic interfaces for fixtures and audit logging.
// Purpose: Define the contract surfaces between the runner and its collaborators.
// Dependencies: async-trait, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the harness obtains a live endpoint without knowing
//! which runtime serves it: a spawned worker process, a remote deployment, or
//! an in-process simulator all satisfy the same provisioner contract.
//! Implementations must fail closed: an endpoint that cannot be reached or
//! torn down is a provisioning error, never a silent degradation.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::FixtureAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::ProbeAuditEvent;
pub use audit::RunAuditEvent;
pub use audit::RunAuditEventParams;
pub use audit::RunAuditSink;
pub use audit::StderrAuditSink;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// SECTION: Endpoints
// ============================================================================

/// Opaque handle to a reachable instance of the bundle under test.
///
/// # Invariants
/// - The base URL carries scheme, host, and port with no trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL without a trailing slash.
    base_url: String,
}

impl Endpoint {
    /// Creates an endpoint from a base URL, trimming any trailing slash.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins an endpoint-relative target (starting with `/`) onto the base.
    #[must_use]
    pub fn url_for(&self, target: &str) -> String {
        if target.starts_with('/') {
            format!("{}{target}", self.base_url)
        } else {
            format!("{}/{target}", self.base_url)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

// ============================================================================
// SECTION: Provisioning Errors
// ============================================================================

/// Errors raised while provisioning or tearing down a fixture.
///
/// Provisioning failures are fatal to a run: no probe executes without a
/// reachable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// The fixture configuration is unusable.
    #[error("fixture config invalid: {0}")]
    Config(String),
    /// The runtime process could not be spawned.
    #[error("runtime spawn failed: {0}")]
    Spawn(String),
    /// The endpoint did not become reachable before the startup deadline.
    #[error("endpoint not ready after {elapsed_ms}ms: {detail}")]
    Startup {
        /// Time spent waiting, in milliseconds.
        elapsed_ms: u64,
        /// Last observed failure detail.
        detail: String,
    },
    /// An I/O operation on the fixture failed.
    #[error("fixture io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Provisioner Interface
// ============================================================================

/// A live fixture: a reachable endpoint plus its teardown handle.
#[async_trait]
pub trait ProvisionedFixture: Send {
    /// Returns the endpoint served by this fixture.
    fn endpoint(&self) -> &Endpoint;

    /// Tears the fixture down, releasing any process or listener it holds.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError` when teardown fails; implementations must
    /// still release what they can before reporting the failure.
    async fn shutdown(self: Box<Self>) -> Result<(), ProvisionError>;
}

/// Produces live fixtures from a bundle artifact and its declared config.
#[async_trait]
pub trait FixtureProvisioner: Send + Sync {
    /// Stable label for reports and audit events.
    fn kind(&self) -> &'static str;

    /// Acquires a reachable endpoint for one run.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError` when the bundle cannot be loaded or the
    /// runtime fails to initialize or become reachable.
    async fn acquire(&self) -> Result<Box<dyn ProvisionedFixture>, ProvisionError>;
}
