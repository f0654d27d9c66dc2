//! Error types returned by the progression engine.
//!
//! Every failure is a value. Commands that return an error leave the engine
//! exactly as it was before the call.

use thiserror::Error;

use crate::time::Millis;

/// Failures of engine commands (purchases, prestige, snapshot restore).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Prestige requested while the lifetime threshold or the cooldown is unmet.
    /// A zero field means that half of the gate is already satisfied.
    #[error(
        "prestige unavailable (missing {missing_resource} energy, {cooldown_remaining_ms}ms of cooldown left)"
    )]
    Ineligible {
        missing_resource: f64,
        cooldown_remaining_ms: Millis,
    },

    #[error("item {id} is still locked (unlocks at {unlock_threshold} lifetime energy)")]
    LockedItem { id: u32, unlock_threshold: f64 },

    #[error("not enough energy for item {id}: costs {cost}, missing {missing}")]
    InsufficientResource { id: u32, cost: f64, missing: f64 },

    #[error("no catalog entry or boost with id {id}")]
    UnknownItem { id: u32 },

    #[error("boost {id} is already active")]
    AlreadyOwned { id: u32 },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Malformed definitions rejected when an [`EngineConfig`](crate::config::EngineConfig)
/// is validated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(String),

    #[error("catalog is empty")]
    EmptyCatalog,

    #[error("duplicate id {0}")]
    DuplicateId(u32),

    #[error("catalog ids must be ascending (found {found} after {previous})")]
    UnorderedCatalog { previous: u32, found: u32 },

    #[error("{field} of entry {id} must be finite and positive, got {value}")]
    NonPositive {
        id: u32,
        field: &'static str,
        value: f64,
    },

    #[error("{field} of entry {id} must be finite and non-negative, got {value}")]
    Negative {
        id: u32,
        field: &'static str,
        value: f64,
    },

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("discount events need a multiplier in (0, 1], got {0}")]
    InvalidDiscount(f64),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
