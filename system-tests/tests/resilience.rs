// system-tests/tests/resilience.rs
// ============================================================================
// Module: Resilience Suite
// Description: Aggregates transport-failure and timeout system tests.
// Purpose: Ensure infrastructure failures classify as errors, never hangs.
// Dependencies: suites/*
// ============================================================================

//! ## Overview
//! Aggregates transport-failure and timeout system tests.
//! Purpose: Ensure infrastructure failures classify as errors, never hangs.
//! Invariants:
//! - System-test execution is deterministic and fail-closed.
//! - Every provisioned fixture is shut down before a test returns.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod helpers;

#[path = "suites/resilience.rs"]
mod resilience;
