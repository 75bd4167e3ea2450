// crates/render-probe-fixture/src/readiness.rs
// ============================================================================
// Module: Endpoint Readiness
// Description: Polling loop shared by the process and remote provisioners.
// Purpose: Wait for an endpoint to answer HTTP without arbitrary sleeps.
// Dependencies: reqwest, tokio, render-probe-core
// ============================================================================

//! ## Overview
//! Readiness means "any HTTP response on the base URL": a worker that answers
//! 500 is reachable, and whether it conforms is the battery's question, not
//! the provisioner's. Polling runs on a short fixed interval until the
//! caller's deadline; the last transport error is surfaced in the failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use render_probe_core::Endpoint;
use render_probe_core::ProvisionError;
use tokio::time::sleep;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Interval between readiness attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Per-attempt request timeout.
const ATTEMPT_TIMEOUT: Duration = Duration::from_millis(500);

// ============================================================================
// SECTION: Polling
// ============================================================================

/// Polls the endpoint until it answers HTTP or the deadline expires.
///
/// # Errors
///
/// Returns `ProvisionError::Startup` with the last observed transport error
/// when the deadline expires, and `ProvisionError::Io` when no HTTP client
/// can be built.
pub async fn wait_for_http(
    endpoint: &Endpoint,
    deadline: Duration,
) -> Result<(), ProvisionError> {
    let client = reqwest::Client::builder()
        .timeout(ATTEMPT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|err| ProvisionError::Io(format!("readiness client init failed: {err}")))?;
    let started = Instant::now();
    let url = endpoint.url_for("/");
    let mut last_error = String::from("no attempt completed");
    loop {
        match client.get(&url).send().await {
            Ok(_) => return Ok(()),
            Err(err) => last_error = err.to_string(),
        }
        if started.elapsed() >= deadline {
            return Err(ProvisionError::Startup {
                elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                detail: last_error,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}
