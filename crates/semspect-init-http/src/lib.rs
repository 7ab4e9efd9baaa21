// crates/semspect-init-http/src/lib.rs
// ============================================================================
// Module: Semspect Init HTTP Library
// Description: HTTP transport for the Semspect Init engine.
// Purpose: Implement the core connection interfaces over the query endpoint.
// Dependencies: semspect-init-core, reqwest, url
// ============================================================================

//! ## Overview
//! [`HttpConnector`] implements [`semspect_init_core::GraphConnection`]
//! against the graph database's HTTP query endpoint. Each session posts
//! procedure call statements under an impersonated user and maps the
//! endpoint's structured response onto the core session contract. Responses
//! are size-capped and redirects are rejected; cleartext HTTP requires an
//! explicit opt-in.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod connector;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use connector::ConnectorError;
pub use connector::HttpConnector;
pub use connector::HttpConnectorConfig;
