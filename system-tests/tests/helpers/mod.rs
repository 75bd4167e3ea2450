// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Render Probe system-tests.
// Purpose: Provide fixture provisioning, battery execution, and CLI utilities.
// Dependencies: system-tests, render-probe-core, render-probe-fixture
// ============================================================================

//! ## Overview
//! Shared helpers for Render Probe system-tests.
//! Purpose: Provide fixture provisioning, battery execution, and CLI utilities.
//! Invariants:
//! - System-test execution is deterministic and fail-closed.
//! - Every provisioned fixture is shut down before a test returns.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod cli;
pub mod fixtures;
pub mod timeouts;
