// system-tests/tests/suites/cli_conformance.rs
// ============================================================================
// Module: CLI Conformance Tests
// Description: End-to-end coverage for the render-probe binary.
// Purpose: Validate listing, attached runs, probe selection, and exit codes.
// Dependencies: system-tests helpers, render-probe-fixture, render-probe-suite
// ============================================================================

//! ## Overview
//! End-to-end coverage for the render-probe binary.
//! Purpose: Validate listing, attached runs, probe selection, and exit codes.
//! Invariants:
//! - Exit codes reflect the aggregate run status.
//! - JSON output parses and carries the summary counts.

use std::io::Write;
use std::path::PathBuf;

use render_probe_fixture::SimFaults;
use render_probe_suite::builtin_catalog;
use tempfile::NamedTempFile;

use crate::helpers::cli::cli_binary;
use crate::helpers::cli::run_cli;
use crate::helpers::fixtures::provision_sim;

type TestResult = Result<(), String>;

fn binary() -> Result<PathBuf, String> {
    cli_binary().ok_or_else(|| "render-probe binary unavailable".to_string())
}

#[tokio::test(flavor = "multi_thread")]
async fn list_prints_the_battery_in_order() -> TestResult {
    let cli = binary()?;
    let output = run_cli(&cli, &["list"])?;
    if !output.status.success() {
        return Err(format!("list failed: {}", String::from_utf8_lossy(&output.stderr)));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let catalog = builtin_catalog().map_err(|err| err.to_string())?;
    let mut cursor = 0;
    for probe in catalog.all() {
        match stdout[cursor ..].find(probe.name.as_str()) {
            Some(offset) => cursor += offset + probe.name.as_str().len(),
            None => {
                return Err(format!("probe {} missing or out of order in listing", probe.name));
            }
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn attached_run_passes_and_exits_zero() -> TestResult {
    let cli = binary()?;
    let fixture = provision_sim(SimFaults::default()).await?;
    let base_url = fixture.endpoint().base_url().to_string();
    let output = run_cli(&cli, &["run", "--attach", &base_url, "--format", "json"])?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    if !output.status.success() {
        return Err(format!("run failed: {}", String::from_utf8_lossy(&output.stderr)));
    }
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|err| format!("invalid json: {err}"))?;
    let summary = report.get("summary").ok_or("report missing summary")?;
    let total = summary.get("total").and_then(serde_json::Value::as_u64).unwrap_or(0);
    let passed = summary.get("passed").and_then(serde_json::Value::as_u64).unwrap_or(0);
    let catalog = builtin_catalog().map_err(|err| err.to_string())?;
    if total != catalog.len() as u64 || passed != total {
        return Err(format!("unexpected summary counts: {summary}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn faulted_run_fails_and_exits_nonzero() -> TestResult {
    let cli = binary()?;
    let faults = SimFaults {
        freeze_render_stamp: true,
        ..SimFaults::default()
    };
    let fixture = provision_sim(faults).await?;
    let base_url = fixture.endpoint().base_url().to_string();
    let output = run_cli(&cli, &["run", "--attach", &base_url, "--format", "json"])?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    if output.status.success() {
        return Err("run against a defective worker exited zero".to_string());
    }
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|err| format!("invalid json: {err}"))?;
    let failed = report.pointer("/summary/failed").and_then(serde_json::Value::as_u64);
    if failed != Some(1) {
        return Err(format!("expected exactly one failure, got {failed:?}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn probe_selection_narrows_the_run() -> TestResult {
    let cli = binary()?;
    let fixture = provision_sim(SimFaults::default()).await?;
    let base_url = fixture.endpoint().base_url().to_string();
    let output = run_cli(&cli, &[
        "run",
        "--attach",
        &base_url,
        "--probe",
        "home.fresh-render",
        "--probe",
        "api-data.get-echo",
        "--format",
        "json",
    ])?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    if !output.status.success() {
        return Err(format!("selected run failed: {}", String::from_utf8_lossy(&output.stderr)));
    }
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|err| format!("invalid json: {err}"))?;
    let total = report.pointer("/summary/total").and_then(serde_json::Value::as_u64);
    if total != Some(2) {
        return Err(format!("expected two probes in the run, got {total:?}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_probe_name_is_rejected() -> TestResult {
    let cli = binary()?;
    let fixture = provision_sim(SimFaults::default()).await?;
    let base_url = fixture.endpoint().base_url().to_string();
    let output = run_cli(&cli, &["run", "--attach", &base_url, "--probe", "no.such-probe"])?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    if output.status.success() {
        return Err("unknown probe name was accepted".to_string());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("unknown probe") {
        return Err(format!("stderr does not name the rejection: {stderr}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn config_validate_accepts_a_sim_document() -> TestResult {
    let cli = binary()?;
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[harness]\nfixture = \"sim\"\nprobe_timeout_ms = 5000\n")
        .map_err(|err| err.to_string())?;
    let path = file.path().to_str().ok_or("non-utf8 temp path")?.to_string();
    let output = run_cli(&cli, &["config", "validate", "--config", &path])?;
    if !output.status.success() {
        return Err(format!(
            "config validate failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("configuration valid") {
        return Err(format!("unexpected validate output: {stdout}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn config_validate_rejects_out_of_range_timeout() -> TestResult {
    let cli = binary()?;
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[harness]\nfixture = \"sim\"\nprobe_timeout_ms = 5\n")
        .map_err(|err| err.to_string())?;
    let path = file.path().to_str().ok_or("non-utf8 temp path")?.to_string();
    let output = run_cli(&cli, &["config", "validate", "--config", &path])?;
    if output.status.success() {
        return Err("out-of-range timeout was accepted".to_string());
    }
    Ok(())
}
