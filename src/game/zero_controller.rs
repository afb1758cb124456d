//! Zero policy for testing and automation
//!
//! Deterministic and simple: always the most expensive affordable unit,
//! always toward the closest objective, always the first target in range.
//! Useful as a baseline opponent and for reproducible engine tests.

use crate::core::{Position, UnitId};
use crate::game::controller::{default_charge_target, nearest_control_point, ActivationPolicy, BattleView};

/// A policy that makes the obvious choice every time
pub struct ZeroPolicy;

impl ZeroPolicy {
    pub fn new() -> Self {
        ZeroPolicy
    }
}

impl Default for ZeroPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationPolicy for ZeroPolicy {
    fn name(&self) -> &str {
        "zero"
    }

    fn choose_unit(&mut self, view: &BattleView, candidates: &[UnitId]) -> Option<UnitId> {
        let budget = view.remaining_ap();
        candidates
            .iter()
            .filter_map(|id| view.unit(*id))
            .filter(|u| u.ap_cost <= budget)
            // Highest cost wins, earlier deployment breaks ties
            .max_by(|a, b| a.ap_cost.cmp(&b.ap_cost).then(b.id.cmp(&a.id)))
            .map(|u| u.id)
    }

    fn choose_move_target(&mut self, view: &BattleView, unit: UnitId) -> Option<Position> {
        let me = view.unit(unit)?;
        let here = me.position?;
        nearest_control_point(view, &here).or_else(|| view.nearest_enemy(me).and_then(|e| e.position))
    }

    fn choose_missile_target(&mut self, view: &BattleView, unit: UnitId) -> Option<UnitId> {
        let me = view.unit(unit)?;
        if !me.has_missile_attack() {
            return None;
        }
        view.enemies_in_range(me).first().map(|e| e.id)
    }

    fn choose_charge_target(
        &mut self,
        view: &BattleView,
        unit: UnitId,
        missile_target: Option<UnitId>,
    ) -> Option<UnitId> {
        default_charge_target(view, unit, missile_target)
    }
}
