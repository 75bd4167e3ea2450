// crates/render-probe-fixture/src/sim.rs
// ============================================================================
// Module: Simulator Provisioner
// Description: In-process reference worker implementing the rendering contract.
// Purpose: Give the harness a conformant endpoint and precise fault injection.
// Dependencies: render-probe-core, axum, tokio, serde_json
// ============================================================================

//! ## Overview
//! The simulator is a small axum application that renders the same observable
//! surface a compliant SSR worker bundle must expose: a root page with a
//! per-request render stamp, cookie reflection, and suspense markers; a
//! dynamic post route; an ordered streaming page; a redirect page; and the
//! JSON data and cookie APIs. Each [`SimFaults`] toggle breaks exactly one
//! contract clause so self-tests can pin which probes detect which defect.
//! It binds an OS-assigned loopback port on a background thread with its own
//! current-thread runtime and shuts down gracefully through a oneshot signal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Json;
use axum::response::Response;
use axum::routing::get;
use render_probe_core::Endpoint;
use render_probe_core::FixtureProvisioner;
use render_probe_core::ProvisionError;
use render_probe_core::ProvisionedFixture;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Contract Constants
// ============================================================================

/// Cookie name the root page reflects.
const TEST_COOKIE_NAME: &str = "test-cookie";

/// Placeholder rendered when the test cookie is absent.
const COOKIE_DEFAULT: &str = "not set";

/// Suspense section markers rendered on the root page.
const SUSPENSE_MARKERS: [&str; 3] = ["async-section-1", "async-section-2", "async-section-3"];

/// Number of streaming fragments the streaming page emits.
const STREAMING_FRAGMENTS: usize = 10;

// ============================================================================
// SECTION: Fault Toggles
// ============================================================================

/// Contract defects the simulator can exhibit on demand.
///
/// All toggles default to off; each one breaks exactly one contract clause
/// so a self-test can assert precise `Fail` classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimFaults {
    /// Render the same stamp for every request (simulates response caching).
    pub freeze_render_stamp: bool,
    /// Omit the second suspense section from the completed body.
    pub drop_suspense_section: bool,
    /// Render the cookie placeholder even when the test cookie is present.
    pub ignore_cookies: bool,
    /// Render the default body even when a redirect target is requested.
    pub ignore_redirect_target: bool,
    /// Omit the CORS allow-origin header from the preflight answer.
    pub disable_cors: bool,
    /// Emit the streaming fragments in descending order.
    pub shuffle_streaming_order: bool,
    /// Drop `Set-Cookie` directives the cookie API would otherwise emit.
    pub swallow_cookie_directives: bool,
}

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Shared state behind every simulator handler.
#[derive(Clone)]
struct SimState {
    /// Active fault toggles.
    faults: SimFaults,
    /// Monotonic render sequence feeding the stamp.
    render_seq: Arc<AtomicU64>,
}

/// Provisions the in-process simulator worker.
#[derive(Debug, Clone, Default)]
pub struct SimProvisioner {
    /// Fault toggles applied to the served contract.
    faults: SimFaults,
}

impl SimProvisioner {
    /// Creates a fully conformant simulator.
    #[must_use]
    pub fn conformant() -> Self {
        Self::default()
    }

    /// Creates a simulator exhibiting the given faults.
    #[must_use]
    pub const fn with_faults(faults: SimFaults) -> Self {
        Self {
            faults,
        }
    }
}

#[async_trait]
impl FixtureProvisioner for SimProvisioner {
    fn kind(&self) -> &'static str {
        "sim"
    }

    async fn acquire(&self) -> Result<Box<dyn ProvisionedFixture>, ProvisionError> {
        let listener = StdTcpListener::bind("127.0.0.1:0")
            .map_err(|err| ProvisionError::Io(format!("sim bind failed: {err}")))?;
        listener
            .set_nonblocking(true)
            .map_err(|err| ProvisionError::Io(format!("sim listener nonblocking failed: {err}")))?;
        let addr = listener
            .local_addr()
            .map_err(|err| ProvisionError::Io(format!("sim local addr failed: {err}")))?;
        let endpoint = Endpoint::new(format!("http://{addr}"));
        let state = SimState {
            faults: self.faults,
            render_seq: Arc::new(AtomicU64::new(0)),
        };
        let app = router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(_) => return,
            };
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(_) => return,
                };
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });
        Ok(Box::new(SimFixture {
            endpoint,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }))
    }
}

/// Builds the simulator router over all contract surfaces.
fn router(state: SimState) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/posts/{id}", get(post_page))
        .route("/streaming", get(streaming_page))
        .route("/redirect-test", get(redirect_page))
        .route("/api/data", get(data_get).post(data_post).options(data_preflight))
        .route("/api/cookies", get(cookies_get).post(cookies_post).delete(cookies_delete))
        .with_state(state)
}

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Live fixture wrapping the background simulator server.
struct SimFixture {
    /// Endpoint the simulator serves.
    endpoint: Endpoint,
    /// Graceful shutdown signal; consumed on teardown.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread handle; joined on teardown.
    join: Option<thread::JoinHandle<()>>,
}

impl SimFixture {
    /// Signals shutdown and joins the server thread.
    fn teardown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

#[async_trait]
impl ProvisionedFixture for SimFixture {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn shutdown(mut self: Box<Self>) -> Result<(), ProvisionError> {
        self.teardown();
        Ok(())
    }
}

impl Drop for SimFixture {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ============================================================================
// SECTION: Page Handlers
// ============================================================================

/// Renders the root page with stamp, cookie reflection, and suspense markers.
async fn home_page(State(state): State<SimState>, headers: HeaderMap) -> Html<String> {
    let stamp = if state.faults.freeze_render_stamp {
        String::from("frozen-0")
    } else {
        let seq = state.render_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", now_nanos())
    };
    let cookie_value = if state.faults.ignore_cookies {
        String::from(COOKIE_DEFAULT)
    } else {
        request_cookies(&headers)
            .remove(TEST_COOKIE_NAME)
            .unwrap_or_else(|| String::from(COOKIE_DEFAULT))
    };
    let mut sections = String::new();
    for (index, marker) in SUSPENSE_MARKERS.iter().enumerate() {
        if state.faults.drop_suspense_section && index == 1 {
            continue;
        }
        sections.push_str(&format!("<section id=\"{marker}\">{marker}</section>\n"));
    }
    Html(format!(
        "<!doctype html>\n<html>\n<body>\n<h1>SSR Sample</h1>\n<span \
         data-testid=\"render-stamp\">{stamp}</span>\n<span \
         data-testid=\"cookie-value\">{cookie_value}</span>\n{sections}</body>\n</html>\n"
    ))
}

/// Renders the dynamic post page echoing the literal segment.
async fn post_page(Path(id): Path<String>) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<body>\n<article data-testid=\"post-id\">Post \
         {id}</article>\n</body>\n</html>\n"
    ))
}

/// Renders the streaming page with its ordered fragments.
async fn streaming_page(State(state): State<SimState>) -> Html<String> {
    let mut order: Vec<usize> = (1 ..= STREAMING_FRAGMENTS).collect();
    if state.faults.shuffle_streaming_order {
        order.reverse();
    }
    let mut body = String::from("<!doctype html>\n<html>\n<body>\n");
    for index in order {
        body.push_str(&format!("<div class=\"chunk\">streaming-chunk-{index}</div>\n"));
    }
    body.push_str("</body>\n</html>\n");
    Html(body)
}

/// Redirects to the requested target, or renders the default body.
async fn redirect_page(
    State(state): State<SimState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let target = query.get("target").filter(|_| !state.faults.ignore_redirect_target);
    match target.and_then(|value| HeaderValue::from_str(value).ok()) {
        Some(location) => {
            let mut headers = HeaderMap::new();
            headers.insert(header::LOCATION, location);
            (StatusCode::FOUND, headers).into_response()
        }
        None => Html(
            "<!doctype html>\n<html>\n<body>\n<p data-testid=\"no-redirect\">No redirect \
             requested</p>\n</body>\n</html>\n"
                .to_string(),
        )
        .into_response(),
    }
}

// ============================================================================
// SECTION: Data API Handlers
// ============================================================================

/// Echoes query parameters and request headers key-for-key.
async fn data_get(
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let mut header_map = serde_json::Map::new();
    for (name, value) in &headers {
        header_map.insert(
            name.as_str().to_ascii_lowercase(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }
    let query_map: serde_json::Map<String, Value> =
        query.into_iter().map(|(key, value)| (key, Value::String(value))).collect();
    Json(json!({
        "method": "GET",
        "query": Value::Object(query_map),
        "headers": Value::Object(header_map),
    }))
}

/// Echoes the parsed JSON payload; invalid JSON becomes an empty object.
async fn data_post(body: Bytes) -> Json<Value> {
    let received: Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));
    Json(json!({ "received": received }))
}

/// Answers CORS preflight with 204 and an open allow-origin.
async fn data_preflight(State(state): State<SimState>) -> Response {
    let mut headers = HeaderMap::new();
    if !state.faults.disable_cors {
        headers
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
    }
    (StatusCode::NO_CONTENT, headers).into_response()
}

// ============================================================================
// SECTION: Cookie API Handlers
// ============================================================================

/// Enumerates request cookies as a flat name-to-value object.
async fn cookies_get(headers: HeaderMap) -> Json<Value> {
    let cookies: serde_json::Map<String, Value> = request_cookies(&headers)
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();
    Json(Value::Object(cookies))
}

/// Sets a cookie from a posted `{name, value, options}` document.
async fn cookies_post(State(state): State<SimState>, body: Bytes) -> Response {
    let Ok(payload) = serde_json::from_slice::<Value>(&body) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid json" })))
            .into_response();
    };
    let (Some(name), Some(value)) = (
        payload.get("name").and_then(Value::as_str),
        payload.get("value").and_then(Value::as_str),
    ) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "name and value required" })))
            .into_response();
    };
    let mut headers = HeaderMap::new();
    if !state.faults.swallow_cookie_directives
        && let Ok(directive) = HeaderValue::from_str(&format!("{name}={value}; Path=/"))
    {
        headers.insert(header::SET_COOKIE, directive);
    }
    (StatusCode::OK, headers, Json(json!({ "ok": true }))).into_response()
}

/// Clears the named cookie through an expiring directive.
async fn cookies_delete(
    State(state): State<SimState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(name) = query.get("name") else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "name required" })))
            .into_response();
    };
    let mut headers = HeaderMap::new();
    if !state.faults.swallow_cookie_directives
        && let Ok(directive) = HeaderValue::from_str(&format!("{name}=; Max-Age=0; Path=/"))
    {
        headers.insert(header::SET_COOKIE, directive);
    }
    (StatusCode::OK, headers, Json(json!({ "ok": true }))).into_response()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses the request `Cookie` header into a name-to-value map.
fn request_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
    cookies
}

/// Returns the current wall clock in nanoseconds since the epoch.
fn now_nanos() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos()
}
