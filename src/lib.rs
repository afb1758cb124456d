//! Skirmish battle simulator
//!
//! Dice-based combat resolution and per-unit activation for turn-based
//! skirmish battles between multi-model units, with an AP-driven turn
//! scheduler and batch simulation for balance and AI evaluation.

pub mod battlefield;
pub mod config;
pub mod core;
pub mod duel;
pub mod error;
pub mod game;
pub mod loader;
pub mod tournament;

pub use error::{Result, RuleViolation, SkirmishError};
