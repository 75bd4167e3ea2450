// system-tests/tests/suites/conformance.rs
// ============================================================================
// Module: Full Battery Conformance Tests
// Description: End-to-end battery runs against a conformant worker.
// Purpose: Validate the clean-path report, ordering, and summary invariants.
// Dependencies: system-tests helpers, render-probe-core, render-probe-suite
// ============================================================================

//! ## Overview
//! End-to-end battery runs against a conformant worker.
//! Purpose: Validate the clean-path report, ordering, and summary invariants.
//! Invariants:
//! - A conformant worker passes every built-in probe.
//! - Report order and counts match the catalog exactly.

use render_probe_core::RunStatus;
use render_probe_suite::builtin_catalog;

use crate::helpers::fixtures::ensure_all_pass;
use crate::helpers::fixtures::provision_target;
use crate::helpers::fixtures::run_full_battery;

type TestResult = Result<(), String>;

#[tokio::test(flavor = "multi_thread")]
async fn full_battery_passes_against_conformant_worker() -> TestResult {
    let fixture = provision_target().await?;
    let report = run_full_battery(fixture.as_ref()).await?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    ensure_all_pass(&report)?;
    if report.status() != RunStatus::Pass {
        return Err(format!("expected pass status, got {}", report.status()));
    }
    let catalog = builtin_catalog().map_err(|err| err.to_string())?;
    if report.summary().total != catalog.len() {
        return Err(format!(
            "expected {} probes in the report, got {}",
            catalog.len(),
            report.summary().total
        ));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn report_preserves_battery_order() -> TestResult {
    let fixture = provision_target().await?;
    let report = run_full_battery(fixture.as_ref()).await?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    let catalog = builtin_catalog().map_err(|err| err.to_string())?;
    let expected: Vec<&str> = catalog.all().iter().map(|probe| probe.name.as_str()).collect();
    let observed: Vec<&str> = report.results().iter().map(|result| result.name.as_str()).collect();
    if observed != expected {
        return Err(format!("report order diverged from the catalog: {observed:?}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_runs_stay_clean_on_one_fixture() -> TestResult {
    let fixture = provision_target().await?;
    let first = run_full_battery(fixture.as_ref()).await?;
    let second = run_full_battery(fixture.as_ref()).await?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    ensure_all_pass(&first)?;
    ensure_all_pass(&second)?;
    if first.summary().total != second.summary().total {
        return Err("repeat run changed the probe count".to_string());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn summary_counts_are_consistent_with_results() -> TestResult {
    let fixture = provision_target().await?;
    let report = run_full_battery(fixture.as_ref()).await?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    let summary = report.summary();
    if summary.total != report.results().len() {
        return Err(format!(
            "summary total {} does not cover {} results",
            summary.total,
            report.results().len()
        ));
    }
    if summary.total != summary.passed + summary.failed + summary.errored {
        return Err(format!(
            "summary counts do not add up: total={} passed={} failed={} errored={}",
            summary.total, summary.passed, summary.failed, summary.errored
        ));
    }
    Ok(())
}
