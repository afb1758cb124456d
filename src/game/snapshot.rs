//! Board snapshot for external tooling
//!
//! A flat, serializable summary of the battle from one side's point of view:
//! objectives with who is near them, every unit's position and health, and
//! the scoreboard.

use crate::core::{Position, Side, UnitId};
use crate::game::BattleState;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One control point as seen by the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPointSnapshot {
    pub id: usize,
    pub position: Position,
    /// Both sides have living models within scoring range
    pub contested: bool,
    /// Distance from the nearest living unit of A and B, if any
    pub nearest_unit_distance: [Option<f64>; 2],
}

/// One unit as seen by the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub name: String,
    pub owner: Side,
    pub position: Option<Position>,
    pub models: u32,
    pub wounds_remaining: u32,
    pub has_activated: bool,
    pub engaged_with: Option<UnitId>,
    pub alive: bool,
}

/// Serializable board summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub turn: u32,
    pub active: Side,
    pub scores: [u32; 2],
    pub control_points: Vec<ControlPointSnapshot>,
    pub units: Vec<UnitSnapshot>,
}

impl BoardSnapshot {
    /// Summarize `state` for the `active` side
    pub fn capture(state: &BattleState, active: Side) -> Self {
        let radius = state.rules.scoring_radius;
        let control_points = state
            .battlefield
            .control_points()
            .iter()
            .map(|cp| {
                let nearest = |side: Side| {
                    state
                        .alive_units(side)
                        .filter_map(|u| u.position.map(|p| p.distance_to(&cp.position)))
                        .min_by(|a, b| a.total_cmp(b))
                };
                ControlPointSnapshot {
                    id: cp.id,
                    position: cp.position,
                    contested: state.models_in_range(Side::A, &cp.position, radius) > 0
                        && state.models_in_range(Side::B, &cp.position, radius) > 0,
                    nearest_unit_distance: [nearest(Side::A), nearest(Side::B)],
                }
            })
            .collect();

        let units = state
            .units
            .sorted_ids()
            .into_iter()
            .filter_map(|id| state.unit(id).ok())
            .map(|u| UnitSnapshot {
                id: u.id,
                name: u.name.to_string(),
                owner: u.owner,
                position: u.position,
                models: u.living_models(),
                wounds_remaining: u.total_wounds_remaining(),
                has_activated: u.has_activated,
                engaged_with: u.melee_target,
                alive: u.is_alive(),
            })
            .collect();

        BoardSnapshot {
            turn: state.turn_number,
            active,
            scores: [state.player(Side::A).score, state.player(Side::B).score],
            control_points,
            units,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }
}
