//! Error types for the skirmish engine

use crate::core::UnitId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkirmishError {
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Unknown keyword: {0}")]
    UnknownKeyword(String),

    #[error("Unknown die color: {0}")]
    UnknownDieColor(String),

    #[error("Unit not found: {0}")]
    UnitNotFound(u32),

    #[error("Invalid battle action: {0}")]
    InvalidAction(String),

    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SkirmishError>;

/// Recoverable rule conditions raised while a turn is being played.
///
/// These never abort a battle. The engine recovers locally (skips the action,
/// clears the link, ends the side's turn) and hands them back in reports so the
/// driver can count or log them.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RuleViolation {
    #[error("unit {unit} nominated invalid target {target}")]
    InvalidTarget { unit: UnitId, target: UnitId },

    #[error("unit {unit} costs {cost} AP but only {available} AP remain")]
    InsufficientAp {
        unit: UnitId,
        cost: u32,
        available: u32,
    },

    #[error("side {side} has no unit able to activate")]
    NoLegalAction { side: crate::core::Side },

    #[error("unit {unit} was linked to unavailable melee target {target}")]
    InconsistentMeleeLink { unit: UnitId, target: UnitId },
}
