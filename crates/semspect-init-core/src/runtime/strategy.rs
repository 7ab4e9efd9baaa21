// crates/semspect-init-core/src/runtime/strategy.rs
// ============================================================================
// Module: Semspect Tier Fallback Strategy
// Description: Tier-scoped call sequences and the reload-then-init policy.
// Purpose: Select and drive the procedure pair legal for a privilege tier.
// Dependencies: crate::{core, interfaces, runtime::invoker}
// ============================================================================

//! ## Overview
//! Each privilege tier maps to exactly one reload/init pair; there is no
//! cross-tier escalation. Reload runs first because it is idempotent and
//! cheap when nothing changed; init runs only when reload signals that no
//! index exists yet or reload itself is unsupported for the session.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::catalog::ProcedureCall;
use crate::core::catalog::SEMSPECT_INIT;
use crate::core::catalog::SEMSPECT_INIT_NO_WRITE;
use crate::core::catalog::SEMSPECT_RELOAD;
use crate::core::catalog::SEMSPECT_RELOAD_NO_WRITE;
use crate::core::target::PrivilegeTier;
use crate::interfaces::Diagnostics;
use crate::interfaces::ProcedureSession;
use crate::runtime::invoker::ProcedureInvoker;

// ============================================================================
// SECTION: Call Sequence
// ============================================================================

/// Ordered procedure pair legal for one privilege tier.
///
/// # Invariants
/// - `reload` is always attempted strictly before `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSequence {
    /// Index refresh procedure for the tier.
    pub reload: ProcedureCall,
    /// Index creation procedure for the tier.
    pub init: ProcedureCall,
}

/// Resolves the procedure pair for a privilege tier.
///
/// The match is exhaustive: an unrecognized tier is unrepresentable here and
/// rejected at the configuration boundary instead of silently defaulting.
#[must_use]
pub const fn call_sequence(tier: PrivilegeTier) -> CallSequence {
    match tier {
        PrivilegeTier::ReadWrite => CallSequence {
            reload: SEMSPECT_RELOAD,
            init: SEMSPECT_INIT,
        },
        PrivilegeTier::ReadOnly => CallSequence {
            reload: SEMSPECT_RELOAD_NO_WRITE,
            init: SEMSPECT_INIT_NO_WRITE,
        },
    }
}

// ============================================================================
// SECTION: Tier Fallback
// ============================================================================

/// Drives the reload-then-init policy within one tier.
pub struct TierFallback {
    /// Invoker executing the individual calls.
    invoker: ProcedureInvoker,
    /// Injected diagnostics collaborator.
    diagnostics: Arc<dyn Diagnostics>,
}

impl TierFallback {
    /// Creates a fallback strategy reporting through the given sink.
    #[must_use]
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            invoker: ProcedureInvoker::new(Arc::clone(&diagnostics)),
            diagnostics,
        }
    }

    /// Attempts reload, then init, short-circuiting on the first success.
    ///
    /// A reload success covers both "no reload needed" and "reload
    /// performed"; init is never attempted in that case. Returns false only
    /// when both calls fail.
    #[must_use]
    pub fn run_with_fallback(
        &self,
        session: &mut dyn ProcedureSession,
        tier: PrivilegeTier,
    ) -> bool {
        let sequence = call_sequence(tier);
        if self.invoker.invoke(session, &sequence.reload).succeeded() {
            self.diagnostics.debug(&format!(
                "{} succeeded, {} skipped",
                sequence.reload.name(),
                sequence.init.name()
            ));
            return true;
        }
        self.diagnostics.info(&format!(
            "{} failed, falling back to {}",
            sequence.reload.name(),
            sequence.init.name()
        ));
        self.invoker.invoke(session, &sequence.init).succeeded()
    }
}
