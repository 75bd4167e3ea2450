// crates/render-probe-core/src/lib.rs
// ============================================================================
// Module: Render Probe Core Library
// Description: Public API surface for the Render Probe conformance harness.
// Purpose: Expose probe definitions, catalog, interfaces, and the runner.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Render Probe core defines the conformance model for server-rendered worker
//! bundles: declarative probes over an HTTP surface, an insertion-ordered
//! catalog, fixture interfaces for obtaining a live endpoint, and a runner
//! that classifies every probe as pass, fail, or error in a single sweep.
//! It is runtime-agnostic and integrates through explicit interfaces rather
//! than embedding a concrete worker runtime.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Endpoint;
pub use interfaces::FileAuditSink;
pub use interfaces::FixtureAuditEvent;
pub use interfaces::FixtureProvisioner;
pub use interfaces::NoopAuditSink;
pub use interfaces::ProbeAuditEvent;
pub use interfaces::ProvisionError;
pub use interfaces::ProvisionedFixture;
pub use interfaces::RunAuditEvent;
pub use interfaces::RunAuditEventParams;
pub use interfaces::RunAuditSink;
pub use interfaces::StderrAuditSink;
pub use runtime::ConformanceRunner;
pub use runtime::ProbeFailure;
pub use runtime::RunnerConfig;
pub use runtime::RunnerError;
