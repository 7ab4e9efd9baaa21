// crates/semspect-init-core/src/runtime/batch.rs
// ============================================================================
// Module: Semspect Batch Runtime
// Description: Per-target session handling and batch aggregation.
// Purpose: Run every target over one connection and collect the failures.
// Dependencies: crate::{core, interfaces, runtime::strategy}, thiserror
// ============================================================================

//! ## Overview
//! The batch runner acquires one connection through an injected factory and
//! processes targets strictly in input order. Each target gets its own
//! impersonated session, released immediately after the target finishes.
//! One target's failure never aborts the batch; only connection acquisition
//! is fatal, so a populated failure report and a batch error are
//! distinguishable at the caller boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::outcome::BatchReport;
use crate::core::target::InitTarget;
use crate::interfaces::ConnectError;
use crate::interfaces::Diagnostics;
use crate::interfaces::GraphConnection;
use crate::interfaces::SessionScope;
use crate::runtime::strategy::TierFallback;

// ============================================================================
// SECTION: Batch Errors
// ============================================================================

/// Errors fatal to an entire batch run.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Per-target failures are never represented here; they live in the
///   [`BatchReport`].
#[derive(Debug, Error)]
pub enum BatchError {
    /// Connection acquisition failed before any target ran.
    #[error("batch aborted: {0}")]
    Connect(#[from] ConnectError),
}

// ============================================================================
// SECTION: Target Runner
// ============================================================================

/// Runs one target inside its own impersonated session.
pub struct TargetRunner {
    /// Tier fallback strategy driving the procedure pair.
    fallback: TierFallback,
    /// Injected diagnostics collaborator.
    diagnostics: Arc<dyn Diagnostics>,
}

impl TargetRunner {
    /// Creates a target runner reporting through the given sink.
    #[must_use]
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            fallback: TierFallback::new(Arc::clone(&diagnostics)),
            diagnostics,
        }
    }

    /// Opens a session scoped to the target and drives the tier fallback.
    ///
    /// The session is dropped on every exit path. A session-open failure
    /// fails this target only.
    #[must_use]
    pub fn run(&self, connection: &dyn GraphConnection, target: &InitTarget) -> bool {
        let scope = SessionScope {
            database: target.database.clone(),
            impersonated_user: target.user.clone(),
        };
        let mut session = match connection.open_session(&scope) {
            Ok(session) => session,
            Err(err) => {
                self.diagnostics.error(&format!("session for {target} could not be opened: {err}"));
                return false;
            }
        };
        self.fallback.run_with_fallback(session.as_mut(), target.tier)
    }
}

// ============================================================================
// SECTION: Batch Runner
// ============================================================================

/// Runs an ordered target list over a single connection.
pub struct BatchRunner {
    /// Per-target runner owning the session lifecycle.
    runner: TargetRunner,
    /// Injected diagnostics collaborator.
    diagnostics: Arc<dyn Diagnostics>,
}

impl BatchRunner {
    /// Creates a batch runner reporting through the given sink.
    #[must_use]
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            runner: TargetRunner::new(Arc::clone(&diagnostics)),
            diagnostics,
        }
    }

    /// Acquires a connection and runs every target in input order.
    ///
    /// The connection is released when the batch completes or fails.
    /// Targets that exhaust their fallback accumulate in the returned
    /// report; the batch itself never fails for business-logic reasons.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Connect`] when the factory cannot supply a
    /// connection; no partial report is produced in that case.
    pub fn run_all<C, F>(
        &self,
        connect: F,
        targets: &[InitTarget],
    ) -> Result<BatchReport, BatchError>
    where
        C: GraphConnection,
        F: FnOnce() -> Result<C, ConnectError>,
    {
        let connection = connect()?;
        let mut report = BatchReport::default();
        let total = targets.len();
        for (index, target) in targets.iter().enumerate() {
            self.diagnostics.info(&format!("running target {}/{total}: {target}", index + 1));
            if self.runner.run(&connection, target) {
                self.diagnostics.debug(&format!("target {target} succeeded"));
            } else {
                self.diagnostics.error(&format!("target {target} failed"));
                report.record_failure(target.clone());
            }
        }
        Ok(report)
    }
}
