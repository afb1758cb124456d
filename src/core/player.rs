//! Player representation

use crate::core::{PlayerName, Side, UnitId};
use crate::core::types::Phase;
use serde::{Deserialize, Serialize};

/// One side of a battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player name
    pub name: PlayerName,

    /// Which side of the board this player commands
    pub side: Side,

    /// Units this player owns, in deployment order
    pub units: Vec<UnitId>,

    /// Control-point score
    pub score: u32,

    /// AP left unspent at the end of the previous turn
    pub remaining_ap: u32,

    /// Enemy models killed by this player's missile exchanges
    pub missile_kills: u32,

    /// Enemy models killed by this player's melee exchanges
    pub melee_kills: u32,
}

impl Player {
    pub fn new(name: impl Into<PlayerName>, side: Side) -> Self {
        Player {
            name: name.into(),
            side,
            units: Vec::new(),
            score: 0,
            remaining_ap: 0,
            missile_kills: 0,
            melee_kills: 0,
        }
    }

    pub fn owns(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }

    pub fn credit_kills(&mut self, phase: Phase, models: u32) {
        match phase {
            Phase::Missile => self.missile_kills += models,
            Phase::Melee => self.melee_kills += models,
        }
    }
}
