// crates/render-probe-suite/src/streaming.rs
// ============================================================================
// Module: Streaming Page Probes
// Description: Ordered fragment delivery on the large-content page.
// Purpose: Assert streamed content arrives complete, in order, exactly once.
// Dependencies: render-probe-core, crate::contract
// ============================================================================

//! ## Overview
//! The streaming page emits a fixed sequence of content fragments. The
//! completed body must contain every fragment at strictly ascending
//! positions, and the fragment prefix must occur exactly as many times as
//! fragments exist, so duplicated or dropped chunks both fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use render_probe_core::CatalogError;
use render_probe_core::Check;
use render_probe_core::Probe;
use render_probe_core::ProbeRequest;

use crate::contract::STREAMING_FRAGMENT_COUNT;
use crate::contract::STREAMING_FRAGMENT_PREFIX;
use crate::contract::STREAMING_PATH;
use crate::contract::streaming_fragment;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Returns the streaming probes in battery order.
///
/// # Errors
///
/// Returns `CatalogError` when a probe definition is internally inconsistent.
pub fn probes() -> Result<Vec<Probe>, CatalogError> {
    let fragments = (1 ..= STREAMING_FRAGMENT_COUNT).map(streaming_fragment).collect();
    let probe = Probe::single(
        "streaming.ordered-fragments",
        "the streaming page delivers every content fragment in order",
        ProbeRequest::get(STREAMING_PATH),
        vec![
            Check::StatusIs(200),
            Check::BodyContainsInOrder(fragments),
            Check::BodyCountEquals {
                needle: STREAMING_FRAGMENT_PREFIX.to_string(),
                count: STREAMING_FRAGMENT_COUNT,
            },
        ],
    )?;
    Ok(vec![probe])
}
