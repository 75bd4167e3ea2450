// crates/render-probe-config/src/lib.rs
// ============================================================================
// Module: Render Probe Config Library
// Description: Harness configuration model, loading, and validation.
// Purpose: Provide one strict, fail-closed configuration surface for the CLI.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Harness configuration is a single TOML document describing the bundle
//! artifact under test, the runtime invocation that serves it, and harness
//! tunables. Loading is strict: oversized files, non-UTF-8 payloads, unknown
//! keys, unknown fixture kinds, and out-of-bound tunables all fail closed
//! before any fixture is provisioned.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::BindingConfig;
pub use config::BundleConfig;
pub use config::CONFIG_PATH_ENV;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_FILE;
pub use config::FixtureKind;
pub use config::HarnessConfig;
pub use config::HarnessSection;
pub use config::RuntimeConfig;
