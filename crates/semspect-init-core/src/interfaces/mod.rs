// crates/semspect-init-core/src/interfaces/mod.rs
// ============================================================================
// Module: Semspect Init Interfaces
// Description: Transport-agnostic interfaces for connections and diagnostics.
// Purpose: Define the contract surfaces used by the Semspect Init runtime.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime reaches the graph database without
//! embedding driver-specific details. Connection pooling, transport,
//! authentication, and session impersonation live behind these traits;
//! implementations surface every remote failure as a [`SessionError`] value
//! so the runtime can treat privilege denials as ordinary outcomes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::catalog::ProcedureCall;

// ============================================================================
// SECTION: Session Scope
// ============================================================================

/// Parameters for opening one impersonated session.
///
/// # Invariants
/// - `database` and `impersonated_user` are non-empty (enforced at the
///   configuration boundary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionScope {
    /// Database the session is scoped to.
    pub database: String,
    /// User the session impersonates, distinct from the connection's own
    /// authenticated identity.
    pub impersonated_user: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Connection factory errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Connection could not be acquired; fatal to the entire batch.
    #[error("connection acquisition failed: {0}")]
    Acquisition(String),
}

/// Session-layer errors for a single procedure call.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant is an expected outcome at the runtime boundary; the
///   invoker converts it into a failure outcome rather than escalating.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Transport-level failure (connectivity, TLS, request encoding).
    #[error("session transport error: {0}")]
    Transport(String),
    /// Server rejected the call (permission denied, unknown procedure).
    #[error("server rejected procedure call ({code}): {message}")]
    Server {
        /// Server-reported error code.
        code: String,
        /// Server-reported error message.
        message: String,
    },
    /// Response violated the wire contract (unparsable body, row overflow).
    #[error("protocol violation: {0}")]
    Protocol(String),
}

// ============================================================================
// SECTION: Session and Connection
// ============================================================================

/// One open, privilege-scoped session against the graph database.
pub trait ProcedureSession {
    /// Runs a named procedure call and returns at most one structured
    /// record. Well-formed records are JSON objects carrying an integer
    /// `status` field and a string `errors` field.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the call fails at the transport,
    /// server, or protocol layer.
    fn run_procedure(&mut self, call: &ProcedureCall) -> Result<Option<Value>, SessionError>;
}

/// Long-lived connection able to open impersonated sessions.
pub trait GraphConnection {
    /// Opens a session scoped to the given database and impersonated user.
    /// The session borrows the connection and is dropped after one target.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session cannot be opened; the
    /// affected target fails without aborting the batch.
    fn open_session(
        &self,
        scope: &SessionScope,
    ) -> Result<Box<dyn ProcedureSession + '_>, SessionError>;
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// Severity of one diagnostic event.
///
/// # Invariants
/// - Ordering follows severity: `Debug < Info < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Verbose progress detail.
    Debug,
    /// Batch progress milestones.
    Info,
    /// Failed attempts and failed targets.
    Error,
}

impl DiagnosticLevel {
    /// Returns a stable label for serialized diagnostic records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// Injected diagnostics collaborator replacing global logger state.
///
/// Recording must never fail the run; implementations drop events they
/// cannot deliver.
pub trait Diagnostics: Send + Sync {
    /// Records one diagnostic event.
    fn record(&self, level: DiagnosticLevel, message: &str);

    /// Records a debug-level event.
    fn debug(&self, message: &str) {
        self.record(DiagnosticLevel::Debug, message);
    }

    /// Records an info-level event.
    fn info(&self, message: &str) {
        self.record(DiagnosticLevel::Info, message);
    }

    /// Records an error-level event.
    fn error(&self, message: &str) {
        self.record(DiagnosticLevel::Error, message);
    }
}
