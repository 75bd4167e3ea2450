// crates/render-probe-suite/src/posts.rs
// ============================================================================
// Module: Dynamic Segment Probes
// Description: Literal path-parameter round-trips through dynamic routes.
// Purpose: Assert the router hands segment values to the render untransformed.
// Dependencies: render-probe-core, crate::contract
// ============================================================================

//! ## Overview
//! A dynamic-segment route must reflect the literal path segment in the
//! rendered body, numeric or not, with no transformation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use render_probe_core::CatalogError;
use render_probe_core::Check;
use render_probe_core::Probe;
use render_probe_core::ProbeRequest;
use render_probe_core::ProbeStep;

use crate::contract::posts_path;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Returns the dynamic-segment probes in battery order.
///
/// # Errors
///
/// Returns `CatalogError` when a probe definition is internally inconsistent.
pub fn probes() -> Result<Vec<Probe>, CatalogError> {
    let probe = Probe::sequence(
        "posts.dynamic-segment",
        "dynamic route segments appear literally in the rendered body",
        vec![segment_step("42"), segment_step("abc")],
        Vec::new(),
    )?;
    Ok(vec![probe])
}

/// Builds one request/check step for a literal segment value.
fn segment_step(segment: &str) -> ProbeStep {
    ProbeStep::new(ProbeRequest::get(posts_path(segment)), vec![
        Check::StatusIs(200),
        Check::BodyContains(segment.to_string()),
    ])
}
