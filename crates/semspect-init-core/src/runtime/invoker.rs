// crates/semspect-init-core/src/runtime/invoker.rs
// ============================================================================
// Module: Semspect Procedure Invoker
// Description: Executes one procedure call and classifies the response.
// Purpose: Normalize every failure mode into a single outcome value.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! The invoker issues a single remote call, reads at most one structured
//! record, and compares the record's `status` field against the call's
//! expected status. Session errors are not escalated: a privilege denial is
//! a normal outcome when a session lacks write access for that specific
//! procedure, and the fallback strategy treats it like any other failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::core::catalog::ProcedureCall;
use crate::core::outcome::InvocationOutcome;
use crate::interfaces::Diagnostics;
use crate::interfaces::ProcedureSession;

// ============================================================================
// SECTION: Procedure Invoker
// ============================================================================

/// Executes single procedure calls inside an already open session.
pub struct ProcedureInvoker {
    /// Injected diagnostics collaborator.
    diagnostics: Arc<dyn Diagnostics>,
}

impl ProcedureInvoker {
    /// Creates an invoker reporting through the given diagnostics sink.
    #[must_use]
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            diagnostics,
        }
    }

    /// Invokes one procedure call and classifies the response.
    #[must_use]
    pub fn invoke(
        &self,
        session: &mut dyn ProcedureSession,
        call: &ProcedureCall,
    ) -> InvocationOutcome {
        match session.run_procedure(call) {
            Err(err) => {
                self.diagnostics.error(&format!("procedure {} not executed: {err}", call.name()));
                InvocationOutcome::Failure {
                    status: None,
                    detail: Some(err.to_string()),
                }
            }
            Ok(None) => {
                self.diagnostics.error(&format!("procedure {} returned no record", call.name()));
                InvocationOutcome::Failure {
                    status: None,
                    detail: Some("no record returned".to_string()),
                }
            }
            Ok(Some(record)) => self.classify(call, &record),
        }
    }

    /// Classifies a returned record against the expected status.
    fn classify(&self, call: &ProcedureCall, record: &Value) -> InvocationOutcome {
        let Some(status) = record.get("status").and_then(Value::as_i64) else {
            self.diagnostics.error(&format!(
                "procedure {} record is missing an integer status field",
                call.name()
            ));
            return InvocationOutcome::Failure {
                status: None,
                detail: Some("record missing status field".to_string()),
            };
        };
        if status == call.expected_status() {
            self.diagnostics.debug(&format!("procedure {} returned status {status}", call.name()));
            return InvocationOutcome::Success {
                status,
            };
        }
        let detail = record_errors(record);
        self.diagnostics.error(&format!(
            "procedure {} returned status {status}, expected {}: {}",
            call.name(),
            call.expected_status(),
            detail.as_deref().unwrap_or("no error detail")
        ));
        InvocationOutcome::Failure {
            status: Some(status),
            detail,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the `errors` field of a record as failure detail.
fn record_errors(record: &Value) -> Option<String> {
    match record.get("errors") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    }
}
