// system-tests/tests/suites/resilience.rs
// ============================================================================
// Module: Resilience Tests
// Description: Battery behavior against unreachable and stalled endpoints.
// Purpose: Validate error classification and bounded runs under bad transport.
// Dependencies: system-tests helpers, render-probe-core, render-probe-suite
// ============================================================================

//! ## Overview
//! Battery behavior against unreachable and stalled endpoints.
//! Purpose: Validate error classification and bounded runs under bad transport.
//! Invariants:
//! - Infrastructure failures classify probes as `Error`, never `Fail`.
//! - One stalled probe never sinks the rest of the run.

use std::time::Duration;
use std::time::Instant;

use render_probe_core::Endpoint;
use render_probe_core::ProbeOutcome;
use render_probe_core::RunStatus;
use render_probe_suite::builtin_catalog;

use crate::helpers::fixtures::battery_runner;

type TestResult = Result<(), String>;

/// Finds a loopback port with nothing listening on it.
fn unbound_port() -> Result<u16, String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let port = listener.local_addr().map_err(|err| err.to_string())?.port();
    drop(listener);
    Ok(port)
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_endpoint_errors_every_probe() -> TestResult {
    let endpoint = Endpoint::new(format!("http://127.0.0.1:{}", unbound_port()?));
    let runner = battery_runner(Duration::from_secs(2))?;
    let catalog = builtin_catalog().map_err(|err| err.to_string())?;
    let report = runner.run(&endpoint, catalog.all()).await;

    for result in report.results() {
        match &result.outcome {
            ProbeOutcome::Error {
                cause,
            } => {
                if cause.is_empty() {
                    return Err(format!("probe {} errored without a cause", result.name));
                }
            }
            other => {
                return Err(format!(
                    "probe {} classified as {} against a dead endpoint",
                    result.name,
                    other.label()
                ));
            }
        }
    }
    if report.status() != RunStatus::Fail {
        return Err("errored run did not report fail status".to_string());
    }
    if report.summary().errored != report.summary().total {
        return Err(format!(
            "expected every probe errored, got {}/{}",
            report.summary().errored,
            report.summary().total
        ));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stalled_worker_times_out_without_sinking_the_run() -> TestResult {
    // Accept connections but never answer, so every probe hits its timeout.
    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let holder = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let probe_timeout = Duration::from_millis(200);
    let endpoint = Endpoint::new(format!("http://{addr}"));
    let runner = battery_runner(probe_timeout)?;
    let catalog = builtin_catalog().map_err(|err| err.to_string())?;

    let started = Instant::now();
    let report = runner.run(&endpoint, catalog.all()).await;
    let elapsed = started.elapsed();
    holder.abort();

    if report.summary().errored != report.summary().total {
        return Err(format!(
            "expected every probe to time out, got {}/{} errors",
            report.summary().errored,
            report.summary().total
        ));
    }
    // Four-wide waves over the battery must finish within a handful of
    // timeout windows; a hung run would blow far past this bound.
    let bound = probe_timeout * 16 + Duration::from_secs(5);
    if elapsed > bound {
        return Err(format!("stalled run took {elapsed:?}, bound was {bound:?}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stalled_probe_classifies_as_bounded_error() -> TestResult {
    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let holder = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let endpoint = Endpoint::new(format!("http://{addr}"));
    let runner = battery_runner(Duration::from_millis(200))?;
    let catalog = builtin_catalog().map_err(|err| err.to_string())?;
    let probes = &catalog.all()[.. 1];
    let report = runner.run(&endpoint, probes).await;
    holder.abort();

    let result = report.results().first().ok_or("empty report")?;
    match &result.outcome {
        ProbeOutcome::Error {
            cause,
        } => {
            // The whole-probe window and the client's request timeout race;
            // either classification is a correctly bounded error.
            if cause.contains("timed out") || cause.contains("transport failure") {
                Ok(())
            } else {
                Err(format!("unexpected timeout cause: {cause}"))
            }
        }
        other => Err(format!("expected an error outcome, got {}", other.label())),
    }
}
