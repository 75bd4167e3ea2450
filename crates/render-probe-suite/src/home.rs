// crates/render-probe-suite/src/home.rs
// ============================================================================
// Module: Root Page Probes
// Description: Render freshness, cookie reflection, and suspense completion.
// Purpose: Assert the per-request behaviors of the server-rendered root page.
// Dependencies: render-probe-core, crate::contract
// ============================================================================

//! ## Overview
//! The root page proves three independent capabilities: every request renders
//! fresh (no unintended response caching), request cookies reach the render
//! (request-scoped state), and all deferred suspense sections land in the
//! completed body regardless of streaming order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use render_probe_core::BodyExtract;
use render_probe_core::CatalogError;
use render_probe_core::Check;
use render_probe_core::CrossCheck;
use render_probe_core::Probe;
use render_probe_core::ProbeRequest;
use render_probe_core::ProbeStep;

use crate::contract::COOKIE_DEFAULT_PLACEHOLDER;
use crate::contract::COOKIE_VALUE_OPEN;
use crate::contract::RENDER_STAMP_OPEN;
use crate::contract::ROOT_PATH;
use crate::contract::SUSPENSE_MARKERS;
use crate::contract::TEST_COOKIE_NAME;
use crate::contract::VALUE_CLOSE;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Cookie value the reflection probe sends.
const REFLECTED_COOKIE_VALUE: &str = "abc";

/// Returns the root page probes in battery order.
///
/// # Errors
///
/// Returns `CatalogError` when a probe definition is internally inconsistent.
pub fn probes() -> Result<Vec<Probe>, CatalogError> {
    Ok(vec![fresh_render()?, cookie_reflection()?, suspense_sections()?])
}

/// Two sequential renders must embed differing per-request stamps.
fn fresh_render() -> Result<Probe, CatalogError> {
    let expect = vec![
        Check::StatusIs(200),
        Check::BodyContains(RENDER_STAMP_OPEN.to_string()),
    ];
    let probe = Probe::sequence(
        "home.fresh-render",
        "two sequential root renders embed differing per-request stamps",
        vec![
            ProbeStep::new(ProbeRequest::get(ROOT_PATH), expect.clone()),
            ProbeStep::new(ProbeRequest::get(ROOT_PATH), expect),
        ],
        vec![CrossCheck::ExtractsDiffer {
            first_step: 0,
            second_step: 1,
            extract: BodyExtract::between(RENDER_STAMP_OPEN, VALUE_CLOSE),
        }],
    )?;
    Ok(probe)
}

/// A known request cookie is reflected; its absence yields the placeholder.
fn cookie_reflection() -> Result<Probe, CatalogError> {
    let with_cookie = ProbeRequest::get(ROOT_PATH)
        .with_header("cookie", format!("{TEST_COOKIE_NAME}={REFLECTED_COOKIE_VALUE}"));
    let probe = Probe::sequence(
        "home.cookie-reflection",
        "the test cookie value is rendered; its absence yields the placeholder",
        vec![
            ProbeStep::new(with_cookie, vec![
                Check::StatusIs(200),
                Check::BodyContains(format!("{COOKIE_VALUE_OPEN}{REFLECTED_COOKIE_VALUE}")),
            ]),
            ProbeStep::new(ProbeRequest::get(ROOT_PATH), vec![
                Check::StatusIs(200),
                Check::BodyContains(format!("{COOKIE_VALUE_OPEN}{COOKIE_DEFAULT_PLACEHOLDER}")),
            ]),
        ],
        Vec::new(),
    )?;
    Ok(probe)
}

/// Every suspense section marker appears in the completed body.
fn suspense_sections() -> Result<Probe, CatalogError> {
    let markers = SUSPENSE_MARKERS.iter().map(|marker| (*marker).to_string()).collect();
    let probe = Probe::single(
        "home.suspense-sections",
        "all deferred suspense sections complete into the rendered body",
        ProbeRequest::get(ROOT_PATH),
        vec![Check::StatusIs(200), Check::BodyContainsAll(markers)],
    )?;
    Ok(probe)
}
