// crates/semspect-init-core/src/core/target.rs
// ============================================================================
// Module: Semspect Init Targets
// Description: Per-user, per-database initialization descriptors.
// Purpose: Identify one desired initialization unit and its privilege tier.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A target names the user to impersonate, the database holding the index,
//! and the privilege tier the user is declared to hold. The tier selects
//! which procedure variants are legal to call; it is a declared property of
//! the target, never auto-detected by trial and error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Privilege Tier
// ============================================================================

/// Declared access level of a target user on the target database.
///
/// # Invariants
/// - Variants are exhaustive: every target carries exactly one of the two
///   tiers, and unknown tier strings are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrivilegeTier {
    /// User is expected to hold write access.
    ReadWrite,
    /// User is expected to hold read access only.
    ReadOnly,
}

impl PrivilegeTier {
    /// Returns a stable label for diagnostics and reporting.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ReadWrite => "read-write",
            Self::ReadOnly => "read-only",
        }
    }
}

impl fmt::Display for PrivilegeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Init Target
// ============================================================================

/// One desired initialization unit.
///
/// # Invariants
/// - `user` and `database` are non-empty (enforced at the configuration
///   boundary).
/// - Identity for failure reporting is the full value; there is no separate
///   identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitTarget {
    /// User to impersonate when opening the session.
    pub user: String,
    /// Database holding the semspect index.
    pub database: String,
    /// Declared privilege tier of the user on the database.
    pub tier: PrivilegeTier,
}

impl fmt::Display for InitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.user, self.database, self.tier)
    }
}
