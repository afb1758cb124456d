//! Scripted policy for testing
//!
//! Follows a predetermined list of activations, each naming the unit to
//! activate and every decision it will make.

use crate::core::{Position, UnitId};
use crate::game::controller::{ActivationPolicy, BattleView};

/// Decisions for one scripted activation
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedActivation {
    pub unit: UnitId,
    pub move_to: Option<Position>,
    pub shoot: Option<UnitId>,
    pub charge: Option<UnitId>,
    pub disengage: bool,
    pub melee_favorable: bool,
}

impl ScriptedActivation {
    /// Activate `unit` and do nothing else
    pub fn hold(unit: UnitId) -> Self {
        ScriptedActivation {
            unit,
            move_to: None,
            shoot: None,
            charge: None,
            disengage: false,
            melee_favorable: true,
        }
    }

    pub fn moving_to(mut self, position: Position) -> Self {
        self.move_to = Some(position);
        self
    }

    pub fn shooting(mut self, target: UnitId) -> Self {
        self.shoot = Some(target);
        self
    }

    pub fn charging(mut self, target: UnitId) -> Self {
        self.charge = Some(target);
        self
    }

    pub fn disengaging(mut self) -> Self {
        self.disengage = true;
        self
    }

    pub fn unfavorable(mut self) -> Self {
        self.melee_favorable = false;
        self
    }
}

/// A policy that follows a predetermined sequence of activations
pub struct ScriptedPolicy {
    activations: Vec<ScriptedActivation>,
    current_step: usize,
}

impl ScriptedPolicy {
    pub fn new(activations: Vec<ScriptedActivation>) -> Self {
        ScriptedPolicy {
            activations,
            current_step: 0,
        }
    }

    /// Entry in force: the last one handed out by `choose_unit`, or the
    /// first when activations are driven directly
    fn current(&self) -> Option<&ScriptedActivation> {
        self.activations.get(self.current_step.saturating_sub(1))
    }
}

impl ActivationPolicy for ScriptedPolicy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn choose_unit(&mut self, _view: &BattleView, _candidates: &[UnitId]) -> Option<UnitId> {
        let next = self.activations.get(self.current_step)?.unit;
        self.current_step += 1;
        Some(next)
    }

    fn choose_disengage(&mut self, _view: &BattleView, _unit: UnitId) -> bool {
        self.current().is_some_and(|a| a.disengage)
    }

    fn choose_move_target(&mut self, _view: &BattleView, _unit: UnitId) -> Option<Position> {
        self.current()?.move_to
    }

    fn choose_missile_target(&mut self, _view: &BattleView, _unit: UnitId) -> Option<UnitId> {
        self.current()?.shoot
    }

    fn choose_charge_target(
        &mut self,
        _view: &BattleView,
        _unit: UnitId,
        _missile_target: Option<UnitId>,
    ) -> Option<UnitId> {
        self.current()?.charge
    }

    fn melee_favorable(&mut self, _view: &BattleView, _unit: UnitId, _target: UnitId) -> bool {
        self.current().map_or(true, |a| a.melee_favorable)
    }
}
