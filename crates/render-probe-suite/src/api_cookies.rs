// crates/render-probe-suite/src/api_cookies.rs
// ============================================================================
// Module: Cookie API Probes
// Description: Cookie enumeration, setting, and clearing through the API.
// Purpose: Assert request-scoped cookie state flows both directions.
// Dependencies: render-probe-core, serde_json, crate::contract
// ============================================================================

//! ## Overview
//! The cookie API enumerates request cookies as a flat name-to-value object,
//! answers a posted `{name, value, options}` document with a matching
//! `Set-Cookie`, and answers a DELETE with a clearing directive. The
//! round-trip probe carries its cookie explicitly, so no state leaks across
//! probes even against a shared endpoint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use render_probe_core::CatalogError;
use render_probe_core::Check;
use render_probe_core::HttpMethod;
use render_probe_core::Probe;
use render_probe_core::ProbeRequest;
use render_probe_core::ProbeStep;
use serde_json::json;

use crate::contract::API_COOKIES_PATH;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Returns the cookie API probes in battery order.
///
/// # Errors
///
/// Returns `CatalogError` when a probe definition is internally inconsistent.
pub fn probes() -> Result<Vec<Probe>, CatalogError> {
    Ok(vec![enumerate()?, set_roundtrip()?, clear()?])
}

/// GET enumerates every request cookie as a flat mapping.
fn enumerate() -> Result<Probe, CatalogError> {
    let request =
        ProbeRequest::get(API_COOKIES_PATH).with_header("cookie", "alpha=one; beta=two");
    let probe = Probe::single(
        "api-cookies.enumerate",
        "the cookie api maps every request cookie name to its value",
        request,
        vec![
            Check::StatusIs(200),
            Check::JsonFieldEquals {
                pointer: "/alpha".to_string(),
                value: json!("one"),
            },
            Check::JsonFieldEquals {
                pointer: "/beta".to_string(),
                value: json!("two"),
            },
        ],
    )?;
    Ok(probe)
}

/// POST sets a cookie; presenting it back shows up in the enumeration.
fn set_roundtrip() -> Result<Probe, CatalogError> {
    let set_request = ProbeRequest::new(HttpMethod::Post, API_COOKIES_PATH)
        .with_json(json!({ "name": "a", "value": "b", "options": {} }));
    let read_request = ProbeRequest::get(API_COOKIES_PATH).with_header("cookie", "a=b");
    let probe = Probe::sequence(
        "api-cookies.set-roundtrip",
        "a posted cookie directive round-trips through set-cookie and back",
        vec![
            ProbeStep::new(set_request, vec![Check::SetCookiePresent {
                name: "a".to_string(),
                value: "b".to_string(),
            }]),
            ProbeStep::new(read_request, vec![
                Check::StatusIs(200),
                Check::JsonFieldEquals {
                    pointer: "/a".to_string(),
                    value: json!("b"),
                },
            ]),
        ],
        Vec::new(),
    )?;
    Ok(probe)
}

/// DELETE with a name yields a clearing directive for that cookie.
fn clear() -> Result<Probe, CatalogError> {
    let request = ProbeRequest::new(HttpMethod::Delete, format!("{API_COOKIES_PATH}?name=a"));
    let probe = Probe::single(
        "api-cookies.clear",
        "a delete request carries a clearing set-cookie for the named cookie",
        request,
        vec![Check::SetCookieCleared {
            name: "a".to_string(),
        }],
    )?;
    Ok(probe)
}
