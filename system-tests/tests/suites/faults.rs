// system-tests/tests/suites/faults.rs
// ============================================================================
// Module: Fault Injection Tests
// Description: Simulator defects mapped to the probes that must catch them.
// Purpose: Validate precise Fail classification with no collateral outcomes.
// Dependencies: system-tests helpers, render-probe-core, render-probe-fixture
// ============================================================================

//! ## Overview
//! Simulator defects mapped to the probes that must catch them.
//! Purpose: Validate precise Fail classification with no collateral outcomes.
//! Invariants:
//! - An injected contract defect flips only its owning probes to `Fail`.
//! - Contract defects never classify as `Error`.

use render_probe_core::ProbeOutcome;
use render_probe_fixture::SimFaults;

use crate::helpers::fixtures::provision_sim;
use crate::helpers::fixtures::run_full_battery;

type TestResult = Result<(), String>;

/// Runs the battery against a faulted simulator and checks that exactly the
/// expected probes fail while every other probe still passes.
async fn fault_flips_only(faults: SimFaults, expected_failures: &[&str]) -> TestResult {
    let fixture = provision_sim(faults).await?;
    let report = run_full_battery(fixture.as_ref()).await?;
    fixture.shutdown().await.map_err(|err| err.to_string())?;

    for result in report.results() {
        let name = result.name.as_str();
        let should_fail = expected_failures.contains(&name);
        match (&result.outcome, should_fail) {
            (
                ProbeOutcome::Fail {
                    ..
                },
                true,
            )
            | (ProbeOutcome::Pass, false) => {}
            (
                ProbeOutcome::Error {
                    cause,
                },
                _,
            ) => {
                return Err(format!("probe {name} errored instead of classifying: {cause}"));
            }
            (ProbeOutcome::Pass, true) => {
                return Err(format!("probe {name} missed the injected defect"));
            }
            (
                ProbeOutcome::Fail {
                    reasons,
                },
                false,
            ) => {
                return Err(format!("probe {name} failed collaterally: {}", reasons.join("; ")));
            }
        }
    }
    if report.summary().failed != expected_failures.len() {
        return Err(format!(
            "expected {} failures, got {}",
            expected_failures.len(),
            report.summary().failed
        ));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn frozen_render_stamp_fails_fresh_render() -> TestResult {
    let faults = SimFaults {
        freeze_render_stamp: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &["home.fresh-render"]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn dropped_suspense_section_fails_suspense_probe() -> TestResult {
    let faults = SimFaults {
        drop_suspense_section: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &["home.suspense-sections"]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn ignored_cookies_fail_cookie_reflection() -> TestResult {
    let faults = SimFaults {
        ignore_cookies: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &["home.cookie-reflection"]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn ignored_redirect_target_fails_explicit_redirect() -> TestResult {
    let faults = SimFaults {
        ignore_redirect_target: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &["redirect.explicit-target"]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_cors_fails_preflight() -> TestResult {
    let faults = SimFaults {
        disable_cors: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &["api-data.preflight"]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn shuffled_streaming_fails_ordered_fragments() -> TestResult {
    let faults = SimFaults {
        shuffle_streaming_order: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &["streaming.ordered-fragments"]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn swallowed_cookie_directives_fail_cookie_writes() -> TestResult {
    let faults = SimFaults {
        swallow_cookie_directives: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &["api-cookies.set-roundtrip", "api-cookies.clear"]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn combined_faults_fail_each_owning_probe() -> TestResult {
    let faults = SimFaults {
        freeze_render_stamp: true,
        disable_cors: true,
        shuffle_streaming_order: true,
        ..SimFaults::default()
    };
    fault_flips_only(faults, &[
        "home.fresh-render",
        "streaming.ordered-fragments",
        "api-data.preflight",
    ])
    .await
}
