// crates/semspect-init-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fakes
// Description: Scripted connection and session fakes for runtime tests.
// Purpose: Drive the runtime without a real graph database.
// Dependencies: semspect-init-core, serde_json
// ============================================================================

//! ## Overview
//! `FakeConnection` scripts one reply per procedure name (optionally per
//! user) and logs every call and opened scope, so tests can assert on call
//! ordering, session scoping, and fallback short-circuiting.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only helpers; not every test exercises every fake."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use semspect_init_core::GraphConnection;
use semspect_init_core::InitTarget;
use semspect_init_core::MemoryDiagnostics;
use semspect_init_core::PrivilegeTier;
use semspect_init_core::ProcedureCall;
use semspect_init_core::ProcedureSession;
use semspect_init_core::SessionError;
use semspect_init_core::SessionScope;
use serde_json::Value;
use serde_json::json;

/// Scripted reply for one procedure name.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Record with the given status and empty errors.
    Status(i64),
    /// Record with the given status and errors text.
    StatusWithErrors(i64, String),
    /// Call completes but returns no record.
    Missing,
    /// Record without a status field.
    MalformedRecord,
    /// Session layer reports a transport error.
    TransportError(String),
    /// Session layer reports a server rejection.
    ServerError(String, String),
}

impl Reply {
    /// Renders the scripted reply as a session result.
    fn render(&self) -> Result<Option<Value>, SessionError> {
        match self {
            Self::Status(status) => Ok(Some(json!({"status": status, "errors": ""}))),
            Self::StatusWithErrors(status, errors) => {
                Ok(Some(json!({"status": status, "errors": errors})))
            }
            Self::Missing => Ok(None),
            Self::MalformedRecord => Ok(Some(json!({"errors": "no status here"}))),
            Self::TransportError(detail) => Err(SessionError::Transport(detail.clone())),
            Self::ServerError(code, message) => Err(SessionError::Server {
                code: code.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// Connection fake scripting replies per procedure name.
#[derive(Default)]
pub struct FakeConnection {
    /// Replies keyed by procedure name.
    replies: BTreeMap<String, Reply>,
    /// Replies keyed by `user:procedure`, checked before the name map.
    user_replies: BTreeMap<String, Reply>,
    /// Users for which session opening fails.
    failing_users: Vec<String>,
    /// Procedure names in call order, across all sessions.
    calls: Mutex<Vec<String>>,
    /// Scopes of every opened session, in open order.
    scopes: Mutex<Vec<SessionScope>>,
}

impl FakeConnection {
    /// Creates a connection with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a reply for a procedure name.
    pub fn reply(mut self, procedure: &str, reply: Reply) -> Self {
        self.replies.insert(procedure.to_string(), reply);
        self
    }

    /// Scripts a reply for a procedure name seen by one impersonated user.
    pub fn reply_for(mut self, user: &str, procedure: &str, reply: Reply) -> Self {
        self.user_replies.insert(format!("{user}:{procedure}"), reply);
        self
    }

    /// Makes session opening fail for the given impersonated user.
    pub fn fail_session_open_for(mut self, user: &str) -> Self {
        self.failing_users.push(user.to_string());
        self
    }

    /// Returns the procedure names invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the scopes of every opened session, in order.
    pub fn scopes(&self) -> Vec<SessionScope> {
        self.scopes.lock().unwrap().clone()
    }

    /// Looks up the scripted reply for a call by the given user.
    fn reply_to(&self, user: &str, procedure: &str) -> Reply {
        if let Some(reply) = self.user_replies.get(&format!("{user}:{procedure}")) {
            return reply.clone();
        }
        self.replies
            .get(procedure)
            .cloned()
            .unwrap_or_else(|| panic!("no scripted reply for procedure {procedure}"))
    }
}

impl GraphConnection for FakeConnection {
    fn open_session(
        &self,
        scope: &SessionScope,
    ) -> Result<Box<dyn ProcedureSession + '_>, SessionError> {
        if self.failing_users.contains(&scope.impersonated_user) {
            return Err(SessionError::Server {
                code: "Neo.ClientError.Security.Unauthorized".to_string(),
                message: format!("cannot impersonate {}", scope.impersonated_user),
            });
        }
        self.scopes.lock().unwrap().push(scope.clone());
        Ok(Box::new(FakeSession {
            connection: self,
            user: scope.impersonated_user.clone(),
        }))
    }
}

/// Session fake replaying the connection's scripted replies.
struct FakeSession<'a> {
    /// Owning connection holding scripts and logs.
    connection: &'a FakeConnection,
    /// Impersonated user of this session.
    user: String,
}

impl ProcedureSession for FakeSession<'_> {
    fn run_procedure(&mut self, call: &ProcedureCall) -> Result<Option<Value>, SessionError> {
        self.connection.calls.lock().unwrap().push(call.name().to_string());
        self.connection.reply_to(&self.user, call.name()).render()
    }
}

/// Builds a target for the given user, database, and tier.
pub fn target(user: &str, database: &str, tier: PrivilegeTier) -> InitTarget {
    InitTarget {
        user: user.to_string(),
        database: database.to_string(),
        tier,
    }
}

/// Builds a shared in-memory diagnostics sink.
pub fn diagnostics() -> Arc<MemoryDiagnostics> {
    Arc::new(MemoryDiagnostics::new())
}
