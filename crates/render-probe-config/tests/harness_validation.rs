//! Harness section validation tests for render-probe-config.
// crates/render-probe-config/tests/harness_validation.rs
// =============================================================================
// Module: Harness Validation Tests
// Description: Validate tunable bounds and fixture prerequisite checks.
// Purpose: Ensure misconfigured harness settings fail before provisioning.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::PathBuf;

use render_probe_config::BindingConfig;
use render_probe_config::FixtureKind;
use render_probe_config::HarnessConfig;

type TestResult = Result<(), String>;

fn assert_invalid(config: &HarnessConfig, needle: &str) -> TestResult {
    match config.validate() {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err(format!("expected validation failure containing {needle}")),
    }
}

#[test]
fn validate_rejects_probe_timeout_below_floor() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.probe_timeout_ms = 99;
    assert_invalid(&config, "probe_timeout_ms")
}

#[test]
fn validate_rejects_startup_timeout_above_ceiling() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.startup_timeout_ms = 300_001;
    assert_invalid(&config, "startup_timeout_ms")
}

#[test]
fn validate_rejects_zero_concurrency() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.max_concurrency = 0;
    assert_invalid(&config, "max_concurrency")
}

#[test]
fn validate_rejects_excessive_concurrency() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.max_concurrency = 65;
    assert_invalid(&config, "max_concurrency")
}

#[test]
fn validate_rejects_tiny_capture_bound() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.capture_body_bytes = 512;
    assert_invalid(&config, "capture_body_bytes")
}

#[test]
fn validate_rejects_remote_without_base_url() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.fixture = FixtureKind::Remote;
    assert_invalid(&config, "remote fixture requires harness.base_url")
}

#[test]
fn validate_rejects_non_http_base_url() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.fixture = FixtureKind::Remote;
    config.harness.base_url = Some("ftp://127.0.0.1:8080".to_string());
    assert_invalid(&config, "base_url scheme must be http or https")
}

#[test]
fn validate_rejects_unparsable_base_url() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.fixture = FixtureKind::Remote;
    config.harness.base_url = Some("not a url".to_string());
    assert_invalid(&config, "base_url is not a valid url")
}

#[test]
fn validate_rejects_process_without_script() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.fixture = FixtureKind::Process;
    config.runtime.command = vec!["workerd".to_string()];
    assert_invalid(&config, "process fixture requires bundle.script")
}

#[test]
fn validate_rejects_process_without_command() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.fixture = FixtureKind::Process;
    config.bundle.script = Some(PathBuf::from("dist/worker.js"));
    assert_invalid(&config, "process fixture requires runtime.command")
}

#[test]
fn validate_rejects_duplicate_binding_names() -> TestResult {
    let mut config = HarnessConfig::default();
    config.runtime.bindings = vec![
        BindingConfig {
            name: "ASSETS".to_string(),
            kind: "assets".to_string(),
        },
        BindingConfig {
            name: "ASSETS".to_string(),
            kind: "kv".to_string(),
        },
    ];
    assert_invalid(&config, "duplicate binding name")
}

#[test]
fn validate_rejects_non_identifier_binding_name() -> TestResult {
    let mut config = HarnessConfig::default();
    config.runtime.bindings = vec![BindingConfig {
        name: "9lives".to_string(),
        kind: "kv".to_string(),
    }];
    assert_invalid(&config, "binding name is not an identifier")
}

#[test]
fn validate_rejects_empty_command_argument() -> TestResult {
    let mut config = HarnessConfig::default();
    config.runtime.command = vec!["workerd".to_string(), String::new()];
    assert_invalid(&config, "empty argument")
}

#[test]
fn validate_accepts_remote_with_http_base_url() -> TestResult {
    let mut config = HarnessConfig::default();
    config.harness.fixture = FixtureKind::Remote;
    config.harness.base_url = Some("http://127.0.0.1:8787".to_string());
    config.validate().map_err(|err| err.to_string())
}
