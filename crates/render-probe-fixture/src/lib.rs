// crates/render-probe-fixture/src/lib.rs
// ============================================================================
// Module: Render Probe Fixture Library
// Description: Concrete fixture provisioners for conformance runs.
// Purpose: Turn bundle/runtime configuration into reachable endpoints.
// Dependencies: render-probe-core, axum, reqwest, tokio
// ============================================================================

//! ## Overview
//! Three provisioning strategies satisfy the same interface: `process` spawns
//! the configured edge runtime around a worker bundle, `remote` attaches to an
//! already-running deployment, and `sim` serves an in-process reference worker
//! implementing the rendering contract. The simulator carries a fault toggle
//! set so harness self-tests can assert that each non-conformance is detected
//! as a precise `Fail`, never as an infrastructure `Error`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod process;
pub mod readiness;
pub mod remote;
pub mod sim;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use process::ProcessProvisioner;
pub use process::ProcessSpec;
pub use remote::RemoteProvisioner;
pub use sim::SimFaults;
pub use sim::SimProvisioner;
