// system-tests/tests/helpers/fixtures.rs
// ============================================================================
// Module: Fixture Helpers
// Description: Provisioning and battery execution shared across suites.
// Purpose: Provide one-call access to a live endpoint and a full battery run.
// Dependencies: render-probe-core, render-probe-fixture, render-probe-suite
// ============================================================================

//! Helpers for provisioning endpoints and running the probe battery.

use std::sync::Arc;
use std::time::Duration;

use render_probe_core::ConformanceReport;
use render_probe_core::ConformanceRunner;
use render_probe_core::FixtureProvisioner;
use render_probe_core::NoopAuditSink;
use render_probe_core::ProbeOutcome;
use render_probe_core::ProvisionedFixture;
use render_probe_core::RunAuditSink;
use render_probe_core::RunnerConfig;
use render_probe_core::StderrAuditSink;
use render_probe_fixture::RemoteProvisioner;
use render_probe_fixture::SimFaults;
use render_probe_fixture::SimProvisioner;
use render_probe_suite::builtin_catalog;
use system_tests::config::SystemTestConfig;

use super::timeouts::resolve_timeout;

/// Default whole-probe timeout for system-test runs.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default readiness window for attached deployments.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds a battery runner with the given whole-probe timeout.
///
/// Audit output is mirrored to stderr when the
/// `RENDER_PROBE_SYSTEM_TEST_VERBOSE_AUDIT` environment variable is truthy.
pub fn battery_runner(probe_timeout: Duration) -> Result<ConformanceRunner, String> {
    let config = SystemTestConfig::load()?;
    let audit: Arc<dyn RunAuditSink> =
        if config.verbose_audit { Arc::new(StderrAuditSink) } else { Arc::new(NoopAuditSink) };
    let runner_config = RunnerConfig {
        probe_timeout,
        ..RunnerConfig::default()
    };
    ConformanceRunner::with_audit(runner_config, audit)
        .map_err(|err| format!("runner init failed: {err}"))
}

/// Provisions the battery target.
///
/// Attaches to `RENDER_PROBE_SYSTEM_TEST_ATTACH_URL` when set; otherwise
/// spawns a conformant simulator on a loopback port.
pub async fn provision_target() -> Result<Box<dyn ProvisionedFixture>, String> {
    let config = SystemTestConfig::load()?;
    let startup = resolve_timeout(DEFAULT_STARTUP_TIMEOUT);
    match config.attach_url {
        Some(url) => RemoteProvisioner::with_readiness(url, startup)
            .acquire()
            .await
            .map_err(|err| format!("attach failed: {err}")),
        None => provision_sim(SimFaults::default()).await,
    }
}

/// Spawns a simulator with the given fault set.
pub async fn provision_sim(faults: SimFaults) -> Result<Box<dyn ProvisionedFixture>, String> {
    SimProvisioner::with_faults(faults)
        .acquire()
        .await
        .map_err(|err| format!("simulator acquire failed: {err}"))
}

/// Runs the complete built-in battery against the fixture's endpoint.
pub async fn run_full_battery(
    fixture: &dyn ProvisionedFixture,
) -> Result<ConformanceReport, String> {
    let runner = battery_runner(resolve_timeout(DEFAULT_PROBE_TIMEOUT))?;
    let catalog = builtin_catalog().map_err(|err| format!("battery init failed: {err}"))?;
    Ok(runner.run(fixture.endpoint(), catalog.all()).await)
}

/// Returns the outcome recorded for the named probe.
pub fn outcome_for<'report>(
    report: &'report ConformanceReport,
    name: &str,
) -> Result<&'report ProbeOutcome, String> {
    report
        .results()
        .iter()
        .find(|result| result.name.as_str() == name)
        .map(|result| &result.outcome)
        .ok_or_else(|| format!("probe {name} missing from report"))
}

/// Fails with every non-passing probe listed when the report is not clean.
pub fn ensure_all_pass(report: &ConformanceReport) -> Result<(), String> {
    let mut offenders = Vec::new();
    for result in report.results() {
        if !result.outcome.is_pass() {
            let detail = result.outcome.detail().unwrap_or("no detail");
            offenders.push(format!("{} => {}: {detail}", result.name, result.outcome.label()));
        }
    }
    if offenders.is_empty() { Ok(()) } else { Err(offenders.join("; ")) }
}
