// crates/semspect-init-core/src/core/catalog.rs
// ============================================================================
// Module: Semspect Procedure Catalog
// Description: Immutable descriptors for the semspect server-side procedures.
// Purpose: Fix the callable procedure set and its success conventions.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The semspect index is managed by four server-side procedures. The catalog
//! is fixed at compile time: procedure names, the expected success status,
//! and the privilege variant split (`NoWrite` procedures for read-only users)
//! are part of the server contract, not runtime configuration.

// ============================================================================
// SECTION: Procedure Call
// ============================================================================

/// Descriptor for one remote procedure invocation.
///
/// # Invariants
/// - `name` is non-empty.
/// - `expected_status` is positive and follows the server's success
///   convention (200 for every cataloged procedure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcedureCall {
    /// Fully qualified procedure name.
    name: &'static str,
    /// Application-level status signaling success.
    expected_status: i64,
}

impl ProcedureCall {
    /// Creates a procedure call descriptor.
    #[must_use]
    pub const fn new(name: &'static str, expected_status: i64) -> Self {
        Self {
            name,
            expected_status,
        }
    }

    /// Returns the fully qualified procedure name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Returns the application-level status signaling success.
    #[must_use]
    pub const fn expected_status(self) -> i64 {
        self.expected_status
    }

    /// Returns the query statement invoking this procedure.
    #[must_use]
    pub fn statement(self) -> String {
        format!("CALL {}()", self.name)
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Creates the semspect index from scratch; requires write access.
pub const SEMSPECT_INIT: ProcedureCall = ProcedureCall::new("semspect.init", 200);

/// Creates the semspect index without writing to the database.
pub const SEMSPECT_INIT_NO_WRITE: ProcedureCall = ProcedureCall::new("semspect.initNoWrite", 200);

/// Refreshes an existing semspect index; requires write access.
pub const SEMSPECT_RELOAD: ProcedureCall = ProcedureCall::new("semspect.reload", 200);

/// Refreshes an existing semspect index without writing to the database.
pub const SEMSPECT_RELOAD_NO_WRITE: ProcedureCall =
    ProcedureCall::new("semspect.reloadNoWrite", 200);
