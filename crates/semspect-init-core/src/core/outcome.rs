// crates/semspect-init-core/src/core/outcome.rs
// ============================================================================
// Module: Semspect Init Outcomes
// Description: Invocation outcomes and the aggregated batch report.
// Purpose: Represent expected failures as values instead of errors.
// Dependencies: crate::core::target, serde
// ============================================================================

//! ## Overview
//! Every failure mode of a single procedure attempt (privilege denial,
//! wrong status, malformed record) is normalized into one tagged outcome so
//! the fallback logic needs no special-casing per error type. The batch
//! report aggregates the targets that exhausted their fallback; an empty
//! report is full success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::target::InitTarget;

// ============================================================================
// SECTION: Invocation Outcome
// ============================================================================

/// Classified result of one procedure attempt.
///
/// # Invariants
/// - Produced per attempt and consumed immediately; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Procedure completed with the expected status.
    Success {
        /// Status reported by the server.
        status: i64,
    },
    /// Procedure failed, returned the wrong status, or produced no usable
    /// record.
    Failure {
        /// Status reported by the server, when a record carried one.
        status: Option<i64>,
        /// Failure detail from the server or the session layer.
        detail: Option<String>,
    },
}

impl InvocationOutcome {
    /// Returns true when the attempt succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the status observed on the wire, if any.
    #[must_use]
    pub const fn status(&self) -> Option<i64> {
        match self {
            Self::Success {
                status,
            } => Some(*status),
            Self::Failure {
                status, ..
            } => *status,
        }
    }

    /// Returns the failure detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success {
                ..
            } => None,
            Self::Failure {
                detail, ..
            } => detail.as_deref(),
        }
    }
}

// ============================================================================
// SECTION: Batch Report
// ============================================================================

/// Aggregated outcome of one batch run.
///
/// # Invariants
/// - Contains exactly the targets for which neither reload nor init returned
///   the expected status.
/// - Ordered by target value; a duplicated failing target reports once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Targets that did not succeed after exhausting fallback.
    failed: BTreeSet<InitTarget>,
}

impl BatchReport {
    /// Records a target that exhausted its fallback.
    pub(crate) fn record_failure(&mut self, target: InitTarget) {
        self.failed.insert(target);
    }

    /// Returns true when every target succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the failed targets in value order.
    #[must_use]
    pub const fn failed(&self) -> &BTreeSet<InitTarget> {
        &self.failed
    }

    /// Returns the number of failed targets.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

impl FromIterator<InitTarget> for BatchReport {
    fn from_iter<I: IntoIterator<Item = InitTarget>>(iter: I) -> Self {
        Self {
            failed: iter.into_iter().collect(),
        }
    }
}
