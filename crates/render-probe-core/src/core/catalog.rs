// crates/render-probe-core/src/core/catalog.rs
// ============================================================================
// Module: Probe Catalog
// Description: Insertion-ordered collection of uniquely named probes.
// Purpose: Reject misconfigured batteries before any run starts.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The catalog validates probes at registration time and preserves insertion
//! order for reporting. Duplicate names, empty probes, and cross-checks that
//! reference nonexistent steps are configuration defects and fail closed
//! here, never mid-run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::probe::Probe;
use crate::core::probe::ProbeName;
use crate::core::probe::ProbeNameError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while assembling a probe catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A probe with the same name is already registered.
    #[error("duplicate probe name: {0}")]
    DuplicateName(ProbeName),
    /// The probe name failed validation.
    #[error(transparent)]
    Name(#[from] ProbeNameError),
    /// The probe declares no steps.
    #[error("probe {0} has no steps")]
    EmptyProbe(ProbeName),
    /// A cross-check references a step index outside the probe.
    #[error("probe {name} cross-check references step {index}, but only {steps} steps exist")]
    BadStepIndex {
        /// Probe whose cross-check is invalid.
        name: ProbeName,
        /// Referenced step index.
        index: usize,
        /// Number of steps the probe declares.
        steps: usize,
    },
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Insertion-ordered probe collection with unique names.
///
/// # Invariants
/// - Names are unique across the catalog.
/// - Every registered probe has at least one step and in-range cross-checks.
/// - `all()` yields probes in registration order.
#[derive(Debug, Default)]
pub struct ProbeCatalog {
    /// Probes in registration order.
    probes: Vec<Probe>,
    /// Registered names for duplicate detection.
    names: BTreeSet<ProbeName>,
}

impl ProbeCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a probe, validating structure and name uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateName` when the name is taken,
    /// `CatalogError::EmptyProbe` when the probe has no steps, and
    /// `CatalogError::BadStepIndex` when a cross-check references a step the
    /// probe does not have.
    pub fn register(&mut self, probe: Probe) -> Result<(), CatalogError> {
        if self.names.contains(&probe.name) {
            return Err(CatalogError::DuplicateName(probe.name));
        }
        if probe.steps.is_empty() {
            return Err(CatalogError::EmptyProbe(probe.name));
        }
        let steps = probe.steps.len();
        for cross in &probe.cross_checks {
            let (first, second) = cross.step_refs();
            for index in [first, second] {
                if index >= steps {
                    return Err(CatalogError::BadStepIndex {
                        name: probe.name,
                        index,
                        steps,
                    });
                }
            }
        }
        self.names.insert(probe.name.clone());
        self.probes.push(probe);
        Ok(())
    }

    /// Returns all probes in registration order.
    #[must_use]
    pub fn all(&self) -> &[Probe] {
        &self.probes
    }

    /// Looks up a probe by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Probe> {
        self.probes.iter().find(|probe| probe.name.as_str() == name)
    }

    /// Returns the number of registered probes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}
