// crates/semspect-init-core/src/runtime/mod.rs
// ============================================================================
// Module: Semspect Init Runtime
// Description: Invocation, tier fallback, and batch orchestration.
// Purpose: Drive the procedure catalog against injected collaborators.
// Dependencies: crate::runtime::{batch, invoker, strategy}
// ============================================================================

//! ## Overview
//! The runtime is strictly sequential: one connection per batch, one session
//! per target, reload strictly before init within a target. Expected remote
//! failures are values; only connection acquisition can fail the batch.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod batch;
pub mod invoker;
pub mod strategy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use batch::BatchError;
pub use batch::BatchRunner;
pub use batch::TargetRunner;
pub use invoker::ProcedureInvoker;
pub use strategy::CallSequence;
pub use strategy::TierFallback;
pub use strategy::call_sequence;
