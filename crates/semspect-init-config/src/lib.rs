// crates/semspect-init-config/src/lib.rs
// ============================================================================
// Module: Semspect Init Config Library
// Description: Configuration loading and validation for Semspect Init.
// Purpose: Expose the canonical configuration model.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Missing or invalid configuration fails closed: a batch never
//! starts from a target list that did not validate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::ConnectionConfig;
pub use config::InitConfig;
