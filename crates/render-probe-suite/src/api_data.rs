// crates/render-probe-suite/src/api_data.rs
// ============================================================================
// Module: Data API Probes
// Description: JSON echo handlers for query, headers, body, and preflight.
// Purpose: Assert the JSON API surface round-trips request state verbatim.
// Dependencies: render-probe-core, serde_json, crate::contract
// ============================================================================

//! ## Overview
//! The data API echoes what it receives: query parameters and request
//! headers key-for-key on GET (header names lowercased), the parsed JSON
//! payload on POST, and an empty object when the payload is not valid JSON.
//! OPTIONS preflight answers 204 with an open CORS allow-origin and no body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use render_probe_core::CatalogError;
use render_probe_core::Check;
use render_probe_core::HttpMethod;
use render_probe_core::Probe;
use render_probe_core::ProbeRequest;
use serde_json::json;

use crate::contract::API_DATA_PATH;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Echo header name the GET probe sends.
const ECHO_HEADER_NAME: &str = "x-probe-echo";

/// Echo header value the GET probe sends.
const ECHO_HEADER_VALUE: &str = "echo-123";

/// Returns the data API probes in battery order.
///
/// # Errors
///
/// Returns `CatalogError` when a probe definition is internally inconsistent.
pub fn probes() -> Result<Vec<Probe>, CatalogError> {
    Ok(vec![get_echo()?, post_echo()?, invalid_json()?, preflight()?])
}

/// GET echoes query parameters and request headers key-for-key.
fn get_echo() -> Result<Probe, CatalogError> {
    let request = ProbeRequest::get(format!("{API_DATA_PATH}?alpha=1&beta=two"))
        .with_header(ECHO_HEADER_NAME, ECHO_HEADER_VALUE);
    let probe = Probe::single(
        "api-data.get-echo",
        "the data api echoes query parameters and request headers verbatim",
        request,
        vec![
            Check::StatusIs(200),
            Check::JsonFieldEquals {
                pointer: "/method".to_string(),
                value: json!("GET"),
            },
            Check::JsonFieldEquals {
                pointer: "/query/alpha".to_string(),
                value: json!("1"),
            },
            Check::JsonFieldEquals {
                pointer: "/query/beta".to_string(),
                value: json!("two"),
            },
            Check::JsonFieldEquals {
                pointer: format!("/headers/{ECHO_HEADER_NAME}"),
                value: json!(ECHO_HEADER_VALUE),
            },
        ],
    )?;
    Ok(probe)
}

/// POST echoes the parsed JSON payload exactly.
fn post_echo() -> Result<Probe, CatalogError> {
    let request =
        ProbeRequest::new(HttpMethod::Post, API_DATA_PATH).with_json(json!({ "x": 1 }));
    let probe = Probe::single(
        "api-data.post-echo",
        "the data api echoes a posted json payload under the received field",
        request,
        vec![
            Check::StatusIs(200),
            Check::JsonFieldEquals {
                pointer: "/received".to_string(),
                value: json!({ "x": 1 }),
            },
        ],
    )?;
    Ok(probe)
}

/// Invalid JSON yields an empty received object, not an error.
fn invalid_json() -> Result<Probe, CatalogError> {
    let request = ProbeRequest::new(HttpMethod::Post, API_DATA_PATH)
        .with_text("not json")
        .with_header("content-type", "application/json");
    let probe = Probe::single(
        "api-data.invalid-json",
        "an unparsable post body echoes an empty object instead of erroring",
        request,
        vec![
            Check::StatusIs(200),
            Check::JsonFieldEquals {
                pointer: "/received".to_string(),
                value: json!({}),
            },
        ],
    )?;
    Ok(probe)
}

/// OPTIONS preflight answers 204 with open CORS and no body.
fn preflight() -> Result<Probe, CatalogError> {
    let probe = Probe::single(
        "api-data.preflight",
        "options preflight answers 204 with an open cors allow-origin",
        ProbeRequest::new(HttpMethod::Options, API_DATA_PATH),
        vec![
            Check::StatusIs(204),
            Check::BodyIsEmpty,
            Check::HeaderEquals {
                name: "access-control-allow-origin".to_string(),
                value: "*".to_string(),
            },
        ],
    )?;
    Ok(probe)
}
