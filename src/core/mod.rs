//! Core battle types and entities

pub mod dice;
pub mod entity;
pub mod keyword;
pub mod model;
pub mod player;
pub mod types;
pub mod unit;

pub use dice::{DicePool, DieColor, Face, WoundPool};
pub use entity::{EntityId, EntityStore, UnitId};
pub use keyword::{Capabilities, Keyword};
pub use model::Model;
pub use player::Player;
pub use types::{Phase, PlayerName, Position, Side, UnitName};
pub use unit::{ArmorTier, DefendReport, Unit, UnitTemplate};
