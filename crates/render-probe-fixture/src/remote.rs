// crates/render-probe-fixture/src/remote.rs
// ============================================================================
// Module: Remote Provisioner
// Description: Attaches to an already-running deployment by base URL.
// Purpose: Exercise bundles the harness does not own the lifecycle of.
// Dependencies: render-probe-core, crate::readiness
// ============================================================================

//! ## Overview
//! Remote attachment provisions nothing: the deployment exists before the run
//! and survives it, so teardown is a no-op. An optional readiness check
//! confirms the base URL answers HTTP before any probe is spent against an
//! unreachable deployment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use render_probe_core::Endpoint;
use render_probe_core::FixtureProvisioner;
use render_probe_core::ProvisionError;
use render_probe_core::ProvisionedFixture;

use crate::readiness::wait_for_http;

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Provisions endpoints by attaching to a configured base URL.
#[derive(Debug, Clone)]
pub struct RemoteProvisioner {
    /// Base URL of the running deployment.
    base_url: String,
    /// Readiness deadline; `None` skips the check entirely.
    readiness_timeout: Option<Duration>,
}

impl RemoteProvisioner {
    /// Attaches without any readiness check.
    #[must_use]
    pub fn attach(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            readiness_timeout: None,
        }
    }

    /// Attaches after confirming the deployment answers HTTP.
    #[must_use]
    pub fn with_readiness(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            readiness_timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl FixtureProvisioner for RemoteProvisioner {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn acquire(&self) -> Result<Box<dyn ProvisionedFixture>, ProvisionError> {
        if self.base_url.trim().is_empty() {
            return Err(ProvisionError::Config("remote base url is empty".to_string()));
        }
        let endpoint = Endpoint::new(self.base_url.clone());
        if let Some(deadline) = self.readiness_timeout {
            wait_for_http(&endpoint, deadline).await?;
        }
        Ok(Box::new(RemoteFixture {
            endpoint,
        }))
    }
}

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Live fixture borrowing an externally managed deployment.
struct RemoteFixture {
    /// Endpoint of the attached deployment.
    endpoint: Endpoint,
}

#[async_trait]
impl ProvisionedFixture for RemoteFixture {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn shutdown(self: Box<Self>) -> Result<(), ProvisionError> {
        // The deployment's lifecycle belongs to its operator.
        Ok(())
    }
}
