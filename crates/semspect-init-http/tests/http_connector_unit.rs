// crates/semspect-init-http/tests/http_connector_unit.rs
// ============================================================================
// Module: HTTP Connector Unit Tests
// Description: Wire-format and policy tests for the query-endpoint session.
// Purpose: Verify request shape, record mapping, and fail-closed limits.
// Dependencies: semspect-init-http, semspect-init-core, tiny_http
// ============================================================================

//! ## Overview
//! Unit tests against local tiny_http servers: the session must post the
//! statement and impersonated user with basic auth, map rows onto records,
//! convert server errors and non-success statuses into session errors, and
//! enforce the response size limit. Connector construction must fail closed
//! on scheme and credential problems.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use semspect_init_core::BatchRunner;
use semspect_init_core::GraphConnection;
use semspect_init_core::InitTarget;
use semspect_init_core::MemoryDiagnostics;
use semspect_init_core::PrivilegeTier;
use semspect_init_core::SEMSPECT_RELOAD;
use semspect_init_core::SessionError;
use semspect_init_core::SessionScope;
use semspect_init_http::ConnectorError;
use semspect_init_http::HttpConnector;
use semspect_init_http::HttpConnectorConfig;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Request data captured by the scripted server.
struct CapturedRequest {
    /// Request method as text.
    method: String,
    /// Request path including query.
    url: String,
    /// Authorization header value, when present.
    authorization: Option<String>,
    /// Parsed JSON request body.
    body: Value,
}

/// Serves scripted (status, body) responses and captures each request.
fn serve_script(replies: Vec<(u16, String)>) -> (String, JoinHandle<Vec<CapturedRequest>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base = format!("http://{addr}");
    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for (status, body) in replies {
            let mut request = server.recv().unwrap();
            let mut content = String::new();
            request.as_reader().read_to_string(&mut content).unwrap();
            captured.push(CapturedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                authorization: request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Authorization"))
                    .map(|header| header.value.to_string()),
                body: serde_json::from_str(&content).unwrap(),
            });
            let content_type =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response =
                Response::from_string(body).with_status_code(status).with_header(content_type);
            request.respond(response).unwrap();
        }
        captured
    });
    (base, handle)
}

/// Serves one scripted response and captures the request.
fn serve_once(status: u16, body: &str) -> (String, JoinHandle<Vec<CapturedRequest>>) {
    serve_script(vec![(status, body.to_string())])
}

/// Builds a connector for the local server with default limits.
fn connector(base: &str) -> HttpConnector {
    connector_with(base, HttpConnectorConfig::default())
}

/// Builds a connector for the local server with custom limits.
fn connector_with(base: &str, config: HttpConnectorConfig) -> HttpConnector {
    HttpConnector::new(HttpConnectorConfig {
        base_url: base.to_string(),
        username: "initUser".to_string(),
        password: "my_secret".to_string(),
        allow_http: true,
        ..config
    })
    .unwrap()
}

/// Default session scope used by most tests.
fn scope() -> SessionScope {
    SessionScope {
        database: "neo4j".to_string(),
        impersonated_user: "alice".to_string(),
    }
}

/// A well-formed single-record response body.
fn record_body(status: i64, errors: &str) -> String {
    json!({
        "data": {"fields": ["status", "errors"], "values": [[status, errors]]},
        "errors": [],
    })
    .to_string()
}

// ============================================================================
// SECTION: Request Shape
// ============================================================================

/// The session posts the statement and impersonated user with basic auth.
#[test]
fn request_carries_statement_impersonation_and_auth() {
    let (base, handle) = serve_once(200, &record_body(200, ""));
    let connector = connector(&base);

    let mut session = connector.open_session(&scope()).unwrap();
    let record = session.run_procedure(&SEMSPECT_RELOAD).unwrap().unwrap();
    drop(session);

    assert_eq!(record.get("status").and_then(Value::as_i64), Some(200));
    let captured = handle.join().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].method, "POST");
    assert_eq!(captured[0].url, "/db/neo4j/query/v2");
    assert_eq!(
        captured[0].body.get("statement").and_then(Value::as_str),
        Some("CALL semspect.reload()")
    );
    assert_eq!(captured[0].body.get("impersonatedUser").and_then(Value::as_str), Some("alice"));
    let authorization = captured[0].authorization.as_deref().unwrap();
    assert!(authorization.starts_with("Basic "), "unexpected auth header: {authorization}");
}

// ============================================================================
// SECTION: Record Mapping
// ============================================================================

/// Row cells are zipped with field names regardless of field order.
#[test]
fn record_fields_are_zipped_by_name() {
    let body = json!({
        "data": {"fields": ["errors", "status"], "values": [["index is locked", 500]]},
        "errors": [],
    })
    .to_string();
    let (base, handle) = serve_once(200, &body);
    let connector = connector(&base);

    let mut session = connector.open_session(&scope()).unwrap();
    let record = session.run_procedure(&SEMSPECT_RELOAD).unwrap().unwrap();
    drop(session);
    handle.join().unwrap();

    assert_eq!(record.get("status").and_then(Value::as_i64), Some(500));
    assert_eq!(record.get("errors").and_then(Value::as_str), Some("index is locked"));
}

/// Zero rows map onto no record.
#[test]
fn empty_values_map_to_no_record() {
    let body = json!({
        "data": {"fields": ["status", "errors"], "values": []},
        "errors": [],
    })
    .to_string();
    let (base, handle) = serve_once(200, &body);
    let connector = connector(&base);

    let mut session = connector.open_session(&scope()).unwrap();
    let record = session.run_procedure(&SEMSPECT_RELOAD).unwrap();
    drop(session);
    handle.join().unwrap();

    assert!(record.is_none());
}

/// More than one row violates the at-most-one-record contract.
#[test]
fn multiple_rows_are_a_protocol_violation() {
    let body = json!({
        "data": {"fields": ["status", "errors"], "values": [[200, ""], [200, ""]]},
        "errors": [],
    })
    .to_string();
    let (base, handle) = serve_once(200, &body);
    let connector = connector(&base);

    let mut session = connector.open_session(&scope()).unwrap();
    let result = session.run_procedure(&SEMSPECT_RELOAD);
    drop(session);
    handle.join().unwrap();

    assert!(matches!(result, Err(SessionError::Protocol(message)) if message.contains("at most one")));
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// A server-reported error maps onto a session server error.
#[test]
fn server_errors_map_to_session_error() {
    let body = json!({
        "errors": [{
            "code": "Neo.ClientError.Security.Forbidden",
            "message": "write access denied",
        }],
    })
    .to_string();
    let (base, handle) = serve_once(400, &body);
    let connector = connector(&base);

    let mut session = connector.open_session(&scope()).unwrap();
    let result = session.run_procedure(&SEMSPECT_RELOAD);
    drop(session);
    handle.join().unwrap();

    let Err(SessionError::Server {
        code,
        message,
    }) = result
    else {
        panic!("expected server error, got {result:?}");
    };
    assert_eq!(code, "Neo.ClientError.Security.Forbidden");
    assert_eq!(message, "write access denied");
}

/// A non-success status without body errors still fails the call.
#[test]
fn non_success_status_maps_to_session_error() {
    let (base, handle) = serve_once(503, "{}");
    let connector = connector(&base);

    let mut session = connector.open_session(&scope()).unwrap();
    let result = session.run_procedure(&SEMSPECT_RELOAD);
    drop(session);
    handle.join().unwrap();

    assert!(matches!(result, Err(SessionError::Server { code, .. }) if code == "503"));
}

/// An unparsable body is a protocol violation.
#[test]
fn invalid_json_body_is_a_protocol_violation() {
    let (base, handle) = serve_once(200, "not json");
    let connector = connector(&base);

    let mut session = connector.open_session(&scope()).unwrap();
    let result = session.run_procedure(&SEMSPECT_RELOAD);
    drop(session);
    handle.join().unwrap();

    assert!(matches!(result, Err(SessionError::Protocol(_))));
}

/// A response over the configured size limit is rejected.
#[test]
fn oversized_response_is_rejected() {
    let (base, handle) = serve_once(200, &record_body(200, &"x".repeat(4096)));
    let config = HttpConnectorConfig {
        max_response_bytes: 64,
        ..HttpConnectorConfig::default()
    };
    let connector = connector_with(&base, config);

    let mut session = connector.open_session(&scope()).unwrap();
    let result = session.run_procedure(&SEMSPECT_RELOAD);
    drop(session);
    handle.join().unwrap();

    assert!(matches!(result, Err(SessionError::Protocol(message)) if message.contains("size limit")));
}

// ============================================================================
// SECTION: Construction and Scoping Policy
// ============================================================================

/// Cleartext HTTP is rejected unless explicitly allowed.
#[test]
fn cleartext_http_requires_opt_in() {
    let result = HttpConnector::new(HttpConnectorConfig {
        base_url: "http://127.0.0.1:7474".to_string(),
        username: "initUser".to_string(),
        password: "my_secret".to_string(),
        allow_http: false,
        ..HttpConnectorConfig::default()
    });

    assert!(matches!(result, Err(ConnectorError::UnsupportedScheme(_))));
}

/// An empty username fails construction.
#[test]
fn empty_username_fails_construction() {
    let result = HttpConnector::new(HttpConnectorConfig {
        base_url: "https://localhost:7473".to_string(),
        allow_http: false,
        ..HttpConnectorConfig::default()
    });

    assert!(matches!(result, Err(ConnectorError::MissingCredentials(_))));
}

/// A database name with path characters never reaches the endpoint.
#[test]
fn invalid_database_name_is_rejected_at_open() {
    let connector = connector("http://127.0.0.1:1");
    let scope = SessionScope {
        database: "neo4j/../admin".to_string(),
        impersonated_user: "alice".to_string(),
    };

    let result = connector.open_session(&scope);

    assert!(result.is_err());
}

// ============================================================================
// SECTION: Engine Integration
// ============================================================================

/// The batch runner recovers a target through the init path end to end.
#[test]
fn batch_runner_falls_back_over_http() {
    let (base, handle) = serve_script(vec![
        (200, record_body(500, "no index present")),
        (200, record_body(200, "")),
    ]);
    let config = HttpConnectorConfig {
        base_url: base,
        username: "initUser".to_string(),
        password: "my_secret".to_string(),
        allow_http: true,
        ..HttpConnectorConfig::default()
    };
    let runner = BatchRunner::new(Arc::new(MemoryDiagnostics::new()));
    let targets = [InitTarget {
        user: "alice".to_string(),
        database: "neo4j".to_string(),
        tier: PrivilegeTier::ReadWrite,
    }];

    let report = runner
        .run_all(|| HttpConnector::new(config).map_err(Into::into), &targets)
        .unwrap();

    assert!(report.is_success());
    let captured = handle.join().unwrap();
    assert_eq!(captured.len(), 2);
    assert_eq!(
        captured[0].body.get("statement").and_then(Value::as_str),
        Some("CALL semspect.reload()")
    );
    assert_eq!(
        captured[1].body.get("statement").and_then(Value::as_str),
        Some("CALL semspect.init()")
    );
}
