//! Activation policy trait and battle view
//!
//! The engine asks a policy which unit to activate and, during the
//! activation, where to move, whom to shoot and whom to charge. Policies
//! only see the battle through a read-only [`BattleView`]; the engine
//! validates every nomination before acting on it.

use crate::battlefield::ControlPoint;
use crate::config::RulesConfig;
use crate::core::{Position, Side, Unit, UnitId};
use crate::game::BattleState;

/// Read-only view of a battle from one side's perspective
pub struct BattleView<'a> {
    state: &'a BattleState,
    side: Side,
}

impl<'a> BattleView<'a> {
    pub fn new(state: &'a BattleState, side: Side) -> Self {
        BattleView { state, side }
    }

    /// Side this view belongs to
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn turn(&self) -> u32 {
        self.state.turn_number
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.state.rules
    }

    /// AP this side has left to spend this turn
    pub fn remaining_ap(&self) -> u32 {
        self.state.player(self.side).remaining_ap
    }

    pub fn score(&self, side: Side) -> u32 {
        self.state.player(side).score
    }

    pub fn unit(&self, id: UnitId) -> Option<&'a Unit> {
        self.state.unit(id).ok()
    }

    pub fn control_points(&self) -> &'a [ControlPoint] {
        self.state.battlefield.control_points()
    }

    pub fn own_units(&self) -> impl Iterator<Item = &'a Unit> + 'a {
        self.state.alive_units(self.side)
    }

    pub fn enemy_units(&self) -> impl Iterator<Item = &'a Unit> + 'a {
        self.state.alive_units(self.side.opponent())
    }

    /// Closest living enemy to `unit`
    pub fn nearest_enemy(&self, unit: &Unit) -> Option<&'a Unit> {
        self.nearest(unit, self.enemy_units())
    }

    /// Closest living enemy to `unit` that is not locked in melee
    pub fn nearest_unengaged_enemy(&self, unit: &Unit) -> Option<&'a Unit> {
        self.nearest(unit, self.enemy_units().filter(|e| !e.is_engaged()))
    }

    fn nearest(&self, unit: &Unit, candidates: impl Iterator<Item = &'a Unit>) -> Option<&'a Unit> {
        candidates
            .filter_map(|e| unit.distance_to(e).map(|d| (d, e)))
            .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.id.cmp(&y.1.id)))
            .map(|(_, e)| e)
    }

    /// Living enemies within `unit`'s attack range
    pub fn enemies_in_range(&self, unit: &Unit) -> Vec<&'a Unit> {
        let range = unit.attack_range;
        self.enemy_units()
            .filter(|e| unit.distance_to(e).is_some_and(|d| d <= range))
            .collect()
    }

    /// Enemies in range that are not fighting one of our units up close
    ///
    /// Shooting into a melee involving a friendly unit is avoided.
    pub fn viable_missile_targets(&self, unit: &Unit) -> Vec<&'a Unit> {
        self.enemies_in_range(unit)
            .into_iter()
            .filter(|e| !self.near_friendly_unit(e, unit.id))
            .collect()
    }

    fn near_friendly_unit(&self, enemy: &Unit, except: UnitId) -> bool {
        let radius = self.state.rules.engagement_radius;
        self.own_units()
            .filter(|f| f.id != except)
            .any(|f| f.distance_to(enemy).is_some_and(|d| d <= radius))
    }

    /// Enemies close enough to be charged
    pub fn charge_candidates(&self, unit: &Unit) -> Vec<&'a Unit> {
        let radius = self.state.rules.charge_radius;
        self.enemy_units()
            .filter(|e| unit.distance_to(e).is_some_and(|d| d <= radius))
            .collect()
    }

    /// Number of living units of `side` within `radius` of `point`
    pub fn units_near(&self, side: Side, point: &Position, radius: f64) -> usize {
        self.state
            .alive_units(side)
            .filter(|u| u.position.is_some_and(|p| p.distance_to(point) <= radius))
            .count()
    }
}

/// Decision-making capability injected into the activation engine
///
/// One implementation per play style; all share the same activation shape.
pub trait ActivationPolicy {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Pick the next unit to activate from units that have not yet activated
    ///
    /// Returning `None` ends this side's activations for the turn.
    fn choose_unit(&mut self, view: &BattleView, candidates: &[UnitId]) -> Option<UnitId>;

    /// Whether a unit locked in melee with Disengage should break away
    fn choose_disengage(&mut self, _view: &BattleView, _unit: UnitId) -> bool {
        true
    }

    /// Destination for a free unit's move; `None` stays put
    fn choose_move_target(&mut self, view: &BattleView, unit: UnitId) -> Option<Position>;

    /// Missile target after moving; `None` holds fire
    fn choose_missile_target(&mut self, view: &BattleView, unit: UnitId) -> Option<UnitId>;

    /// Charge target, given whom the unit just shot at
    fn choose_charge_target(
        &mut self,
        view: &BattleView,
        unit: UnitId,
        missile_target: Option<UnitId>,
    ) -> Option<UnitId>;

    /// Tie-break predicate consulted after a successful charge roll
    fn melee_favorable(&mut self, _view: &BattleView, _unit: UnitId, _target: UnitId) -> bool {
        true
    }

    /// Called once the battle ends
    fn on_battle_end(&mut self, _view: &BattleView, _won: bool) {}
}

/// Default charge choice: the missile target if still chargeable, otherwise
/// the nearest enemy in charge range
pub fn default_charge_target(view: &BattleView, unit: UnitId, missile_target: Option<UnitId>) -> Option<UnitId> {
    let me = view.unit(unit)?;
    let candidates = view.charge_candidates(me);
    if let Some(target) = missile_target {
        if candidates.iter().any(|c| c.id == target) {
            return Some(target);
        }
    }
    candidates
        .into_iter()
        .filter_map(|e| me.distance_to(e).map(|d| (d, e.id)))
        .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)))
        .map(|(_, id)| id)
}

/// Nearest control point to `position`
pub fn nearest_control_point(view: &BattleView, position: &Position) -> Option<Position> {
    view.control_points()
        .iter()
        .map(|cp| cp.position)
        .min_by(|a, b| a.distance_to(position).total_cmp(&b.distance_to(position)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::Battlefield;
    use crate::core::{ArmorTier, DieColor, UnitTemplate};

    fn squad(range: f64) -> UnitTemplate {
        UnitTemplate {
            name: "Squad".to_string(),
            num_models: 5,
            wounds_per_model: 1,
            armor: ArmorTier::Medium,
            movement: 6.0,
            ap_cost: 4,
            missile_dice: vec![DieColor::Blue; 5],
            melee_dice: vec![DieColor::Blue; 5],
            attack_range: range,
            keywords: vec![],
        }
    }

    fn battle() -> (BattleState, UnitId, UnitId, UnitId, UnitId) {
        let rules = RulesConfig::default();
        let field = Battlefield::new(&rules).with_control_points(&[Position::new(30.0, 20.0), Position::new(5.0, 20.0)]);
        let mut state = BattleState::new("Frank", "Dee", field, rules);
        let shooter = state.add_unit_at(Side::A, &squad(18.0), Position::new(12.0, 14.0)).unwrap();
        let friend = state.add_unit_at(Side::A, &squad(18.0), Position::new(20.0, 20.5)).unwrap();
        let brawling = state.add_unit_at(Side::B, &squad(18.0), Position::new(20.0, 20.0)).unwrap();
        let far = state.add_unit_at(Side::B, &squad(18.0), Position::new(50.0, 38.0)).unwrap();
        (state, shooter, friend, brawling, far)
    }

    #[test]
    fn test_view_sides() {
        let (state, shooter, _, brawling, _) = battle();
        let view = BattleView::new(&state, Side::A);
        assert_eq!(view.own_units().count(), 2);
        assert_eq!(view.enemy_units().count(), 2);
        assert_eq!(view.nearest_enemy(view.unit(shooter).unwrap()).map(|u| u.id), Some(brawling));
    }

    #[test]
    fn test_viable_targets_skip_enemies_next_to_friends() {
        let (state, shooter, _, brawling, _) = battle();
        let view = BattleView::new(&state, Side::A);
        let me = view.unit(shooter).unwrap();
        let in_range: Vec<UnitId> = view.enemies_in_range(me).iter().map(|u| u.id).collect();
        assert_eq!(in_range, vec![brawling]);
        assert!(view.viable_missile_targets(me).is_empty());
    }

    #[test]
    fn test_default_charge_target() {
        let (state, shooter, _, brawling, far) = battle();
        let view = BattleView::new(&state, Side::A);
        // Far unit is out of charge range, so the nearer one is chosen instead
        assert_eq!(default_charge_target(&view, shooter, Some(far)), Some(brawling));
        assert_eq!(default_charge_target(&view, shooter, None), Some(brawling));
    }

    #[test]
    fn test_nearest_control_point() {
        let (state, _, _, _, _) = battle();
        let view = BattleView::new(&state, Side::A);
        assert_eq!(
            nearest_control_point(&view, &Position::new(0.0, 0.0)),
            Some(Position::new(5.0, 20.0))
        );
    }
}
