// crates/render-probe-suite/src/contract.rs
// ============================================================================
// Module: Rendering Contract
// Description: Marker strings and paths a compliant SSR worker must expose.
// Purpose: Keep contract constants in one place shared by probes and fixtures.
// Dependencies: std
// ============================================================================

//! ## Overview
//! These constants are the shared vocabulary between the probe battery and
//! any worker claiming conformance, including the in-process simulator. A
//! worker that renders different marker attributes is non-conformant by
//! definition, so changes here are contract changes.

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Root page path.
pub const ROOT_PATH: &str = "/";

/// Streaming page path.
pub const STREAMING_PATH: &str = "/streaming";

/// Redirect test page path.
pub const REDIRECT_PATH: &str = "/redirect-test";

/// JSON data API path.
pub const API_DATA_PATH: &str = "/api/data";

/// Cookie management API path.
pub const API_COOKIES_PATH: &str = "/api/cookies";

/// Returns the dynamic-segment post path for one identifier.
#[must_use]
pub fn posts_path(id: &str) -> String {
    format!("/posts/{id}")
}

// ============================================================================
// SECTION: Root Page Markers
// ============================================================================

/// Opening marker preceding the per-request render stamp value.
pub const RENDER_STAMP_OPEN: &str = "data-testid=\"render-stamp\">";

/// Opening marker preceding the reflected cookie value.
pub const COOKIE_VALUE_OPEN: &str = "data-testid=\"cookie-value\">";

/// Marker closing any value window opened above.
pub const VALUE_CLOSE: &str = "<";

/// Cookie name the root page reflects.
pub const TEST_COOKIE_NAME: &str = "test-cookie";

/// Placeholder rendered when the test cookie is absent.
pub const COOKIE_DEFAULT_PLACEHOLDER: &str = "not set";

/// Suspense section markers; all must appear in the completed body.
pub const SUSPENSE_MARKERS: [&str; 3] =
    ["async-section-1", "async-section-2", "async-section-3"];

// ============================================================================
// SECTION: Streaming Markers
// ============================================================================

/// Shared prefix of every streaming content fragment.
pub const STREAMING_FRAGMENT_PREFIX: &str = "streaming-chunk-";

/// Number of streaming fragments a conformant worker emits.
pub const STREAMING_FRAGMENT_COUNT: usize = 10;

/// Returns the streaming fragment marker for a one-based index.
#[must_use]
pub fn streaming_fragment(index: usize) -> String {
    format!("{STREAMING_FRAGMENT_PREFIX}{index}")
}

// ============================================================================
// SECTION: Redirect Markers
// ============================================================================

/// Query parameter naming the redirect target.
pub const REDIRECT_TARGET_PARAM: &str = "target";

/// Marker rendered when no redirect target was requested.
pub const NO_REDIRECT_MARKER: &str = "data-testid=\"no-redirect\"";
