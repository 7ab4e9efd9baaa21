// crates/semspect-init-http/src/connector.rs
// ============================================================================
// Module: Semspect Init HTTP Connector
// Description: Query-endpoint sessions with impersonation and bounded reads.
// Purpose: Map the HTTP query wire format onto the core session contract.
// Dependencies: semspect-init-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The connector posts `CALL <procedure>()` statements to
//! `POST {base}/db/{database}/query/v2` with the connector's own basic-auth
//! credentials and the target user in the `impersonatedUser` body field.
//! Server-reported errors, non-success statuses, unparsable bodies, and
//! oversized responses all surface as [`SessionError`] values, which the
//! core runtime treats as ordinary per-call failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use semspect_init_core::GraphConnection;
use semspect_init_core::ProcedureCall;
use semspect_init_core::ProcedureSession;
use semspect_init_core::SessionError;
use semspect_init_core::SessionScope;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default maximum response size in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Default user agent for outbound requests.
const DEFAULT_USER_AGENT: &str = "semspect-init/0.1";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConnectorConfig {
    /// Base URL of the graph database HTTP endpoint.
    pub base_url: String,
    /// Username the connector authenticates as (not the impersonated user).
    pub username: String,
    /// Password for the connector's own identity.
    pub password: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            allow_http: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Connector Errors
// ============================================================================

/// Connector construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Base URL failed to parse.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    /// Base URL scheme is not allowed by the configuration.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// Connector credentials are incomplete.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
    /// HTTP client could not be created.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

impl From<ConnectorError> for semspect_init_core::ConnectError {
    fn from(err: ConnectorError) -> Self {
        Self::Acquisition(err.to_string())
    }
}

// ============================================================================
// SECTION: Connector
// ============================================================================

/// HTTP connection able to open impersonated query sessions.
pub struct HttpConnector {
    /// Connector configuration, including limits and credentials.
    config: HttpConnectorConfig,
    /// Validated base URL of the query endpoint.
    base: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpConnector {
    /// Creates a connector with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError`] when the base URL or credentials are
    /// invalid or the HTTP client cannot be created.
    pub fn new(config: HttpConnectorConfig) -> Result<Self, ConnectorError> {
        let base = Url::parse(&config.base_url)
            .map_err(|err| ConnectorError::InvalidBaseUrl(err.to_string()))?;
        match base.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            other => return Err(ConnectorError::UnsupportedScheme(other.to_string())),
        }
        if base.host_str().is_none() {
            return Err(ConnectorError::InvalidBaseUrl("base url has no host".to_string()));
        }
        if config.username.is_empty() {
            return Err(ConnectorError::MissingCredentials("username is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ConnectorError::ClientBuild(err.to_string()))?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Builds the query endpoint URL for one database.
    fn query_url(&self, database: &str) -> Result<Url, SessionError> {
        validate_database_name(database)?;
        let base = self.base.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/db/{database}/query/v2"))
            .map_err(|err| SessionError::Protocol(format!("query url construction failed: {err}")))
    }
}

impl GraphConnection for HttpConnector {
    fn open_session(
        &self,
        scope: &SessionScope,
    ) -> Result<Box<dyn ProcedureSession + '_>, SessionError> {
        if scope.impersonated_user.is_empty() {
            return Err(SessionError::Protocol("impersonated user is empty".to_string()));
        }
        let url = self.query_url(&scope.database)?;
        Ok(Box::new(HttpSession {
            connector: self,
            url,
            impersonated_user: scope.impersonated_user.clone(),
        }))
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// One impersonated query session bound to a database endpoint.
struct HttpSession<'a> {
    /// Owning connector holding the client and credentials.
    connector: &'a HttpConnector,
    /// Query endpoint URL for the session's database.
    url: Url,
    /// User every statement in this session impersonates.
    impersonated_user: String,
}

impl ProcedureSession for HttpSession<'_> {
    fn run_procedure(&mut self, call: &ProcedureCall) -> Result<Option<Value>, SessionError> {
        let body = json!({
            "statement": call.statement(),
            "impersonatedUser": self.impersonated_user,
        });
        let payload = serde_json::to_vec(&body)
            .map_err(|err| SessionError::Protocol(format!("request encoding failed: {err}")))?;
        let response = self
            .connector
            .client
            .post(self.url.clone())
            .basic_auth(&self.connector.config.username, Some(&self.connector.config.password))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .map_err(|err| SessionError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = read_response_limited(response, self.connector.config.max_response_bytes)?;
        let reply: Value = serde_json::from_slice(&bytes)
            .map_err(|err| SessionError::Protocol(format!("response is not valid json: {err}")))?;
        if let Some(error) = first_server_error(&reply) {
            return Err(error);
        }
        if !status.is_success() {
            return Err(SessionError::Server {
                code: status.as_u16().to_string(),
                message: "query endpoint returned a non-success status".to_string(),
            });
        }
        extract_record(&reply)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a database name before it is placed into the endpoint path.
fn validate_database_name(database: &str) -> Result<(), SessionError> {
    if database.is_empty() {
        return Err(SessionError::Protocol("database name is empty".to_string()));
    }
    let valid = database
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_');
    if !valid {
        return Err(SessionError::Protocol(format!("invalid database name: {database}")));
    }
    Ok(())
}

/// Maps the first server-reported error onto a session error.
fn first_server_error(reply: &Value) -> Option<SessionError> {
    let first = reply.get("errors")?.as_array()?.first()?;
    Some(SessionError::Server {
        code: first.get("code").and_then(Value::as_str).unwrap_or("unknown").to_string(),
        message: first.get("message").and_then(Value::as_str).unwrap_or("no message").to_string(),
    })
}

/// Extracts at most one record from the query response data section.
fn extract_record(reply: &Value) -> Result<Option<Value>, SessionError> {
    let data = reply
        .get("data")
        .ok_or_else(|| SessionError::Protocol("response is missing the data section".to_string()))?;
    let fields = data
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| SessionError::Protocol("data section is missing fields".to_string()))?;
    let values = data
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| SessionError::Protocol("data section is missing values".to_string()))?;
    let row = match values.as_slice() {
        [] => return Ok(None),
        [row] => row,
        _ => return Err(SessionError::Protocol("expected at most one record".to_string())),
    };
    let cells = row
        .as_array()
        .ok_or_else(|| SessionError::Protocol("record row is not an array".to_string()))?;
    if cells.len() != fields.len() {
        return Err(SessionError::Protocol("record row does not match fields".to_string()));
    }
    let mut record = Map::new();
    for (field, cell) in fields.iter().zip(cells) {
        let name = field
            .as_str()
            .ok_or_else(|| SessionError::Protocol("field name is not a string".to_string()))?;
        record.insert(name.to_string(), cell.clone());
    }
    Ok(Some(Value::Object(record)))
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, SessionError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| SessionError::Protocol("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(SessionError::Protocol("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|err| SessionError::Transport(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(SessionError::Protocol("response exceeds size limit".to_string()));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| SessionError::Protocol("invalid response length".to_string()))?;
        if buf.len() < expected {
            return Err(SessionError::Protocol("response truncated".to_string()));
        }
    }
    Ok(buf)
}
