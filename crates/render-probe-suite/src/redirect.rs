// crates/render-probe-suite/src/redirect.rs
// ============================================================================
// Module: Redirect Probes
// Description: Server-side redirect behavior with and without a target.
// Purpose: Assert redirects fire exactly when requested and nowhere else.
// Dependencies: render-probe-core, crate::contract
// ============================================================================

//! ## Overview
//! With a `target` query parameter the page must answer any 3xx status and a
//! `Location` header matching the requested target exactly; frameworks vary
//! between 302 and 307, so the status class is the contract, not one code.
//! Without the parameter the page renders a default body instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use render_probe_core::CatalogError;
use render_probe_core::Check;
use render_probe_core::Probe;
use render_probe_core::ProbeRequest;

use crate::contract::NO_REDIRECT_MARKER;
use crate::contract::REDIRECT_PATH;
use crate::contract::REDIRECT_TARGET_PARAM;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Redirect target the explicit probe requests.
const REDIRECT_TARGET: &str = "/foo";

/// Returns the redirect probes in battery order.
///
/// # Errors
///
/// Returns `CatalogError` when a probe definition is internally inconsistent.
pub fn probes() -> Result<Vec<Probe>, CatalogError> {
    Ok(vec![explicit_target()?, default_render()?])
}

/// A requested target yields a 3xx status and an exact `Location`.
fn explicit_target() -> Result<Probe, CatalogError> {
    let target = format!("{REDIRECT_PATH}?{REDIRECT_TARGET_PARAM}={REDIRECT_TARGET}");
    let probe = Probe::single(
        "redirect.explicit-target",
        "a requested redirect target yields a 3xx status and exact location",
        ProbeRequest::get(target),
        vec![
            Check::StatusInRange {
                lo: 300,
                hi: 399,
            },
            Check::HeaderEquals {
                name: "location".to_string(),
                value: REDIRECT_TARGET.to_string(),
            },
        ],
    )?;
    Ok(probe)
}

/// Without a target the page renders its default body.
fn default_render() -> Result<Probe, CatalogError> {
    let probe = Probe::single(
        "redirect.default-render",
        "without a target parameter the page renders instead of redirecting",
        ProbeRequest::get(REDIRECT_PATH),
        vec![Check::StatusIs(200), Check::BodyContains(NO_REDIRECT_MARKER.to_string())],
    )?;
    Ok(probe)
}
