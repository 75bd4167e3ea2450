// crates/render-probe-core/src/runtime/mod.rs
// ============================================================================
// Module: Render Probe Runtime
// Description: Execution engine for conformance runs.
// Purpose: Expose the runner that turns a catalog and an endpoint into a report.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime drives probe execution: one HTTP client per run, bounded
//! concurrency, per-probe timeouts, and strict separation of behavioral
//! failures from infrastructure errors.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use runner::ConformanceRunner;
pub use runner::ProbeFailure;
pub use runner::RunnerConfig;
pub use runner::RunnerError;
