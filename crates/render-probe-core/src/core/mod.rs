// crates/render-probe-core/src/core/mod.rs
// ============================================================================
// Module: Render Probe Core Types
// Description: Canonical probe, check, catalog, and report structures.
// Purpose: Provide stable, serializable types for conformance definitions and results.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types define what a conformance probe is (requests plus declarative
//! response checks), how probes are collected into an ordered catalog, and
//! what a finished run reports. These types are the canonical source of truth
//! for any derived surface (CLI output, audit events, system tests).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod check;
pub mod probe;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CatalogError;
pub use catalog::ProbeCatalog;
pub use check::BodyExtract;
pub use check::Check;
pub use check::CrossCheck;
pub use probe::HttpMethod;
pub use probe::Probe;
pub use probe::ProbeName;
pub use probe::ProbeNameError;
pub use probe::ProbeRequest;
pub use probe::ProbeStep;
pub use probe::RequestBody;
pub use report::ConformanceReport;
pub use report::ProbeOutcome;
pub use report::ProbeResult;
pub use report::ReportSummary;
pub use report::ResponseSnapshot;
pub use report::RunStatus;
