// crates/render-probe-suite/src/lib.rs
// ============================================================================
// Module: Render Probe Suite Library
// Description: The fixed SSR conformance battery.
// Purpose: Assemble the built-in probe catalog from per-surface modules.
// Dependencies: render-probe-core, serde_json
// ============================================================================

//! ## Overview
//! The suite encodes the observable contract of a compliant server-rendered
//! worker bundle as a fixed, ordered probe battery: render freshness, cookie
//! reflection, suspense completion, dynamic segments, streaming order,
//! redirects, and the JSON data and cookie APIs. Marker strings shared with
//! any conformant worker live in [`contract`]; each HTTP surface contributes
//! its probes from its own module.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api_cookies;
pub mod api_data;
pub mod contract;
pub mod home;
pub mod posts;
pub mod redirect;
pub mod streaming;

// ============================================================================
// SECTION: Imports
// ============================================================================

use render_probe_core::CatalogError;
use render_probe_core::ProbeCatalog;

// ============================================================================
// SECTION: Catalog Assembly
// ============================================================================

/// Builds the fixed conformance battery in its canonical order.
///
/// Probe order affects report readability only; every probe is independent
/// and order-insensitive in effect.
///
/// # Errors
///
/// Returns `CatalogError` when the built-in battery is internally
/// inconsistent; this indicates a defect in the suite itself.
pub fn builtin_catalog() -> Result<ProbeCatalog, CatalogError> {
    let mut catalog = ProbeCatalog::new();
    let groups = [
        home::probes()?,
        posts::probes()?,
        streaming::probes()?,
        redirect::probes()?,
        api_data::probes()?,
        api_cookies::probes()?,
    ];
    for group in groups {
        for probe in group {
            catalog.register(probe)?;
        }
    }
    Ok(catalog)
}
