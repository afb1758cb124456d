//! Heuristic policy
//!
//! Plays to the unit's strengths: melee-heavy units hunt the nearest free
//! enemy, shooters go for contested control points and focus fire on the
//! weakest target in range. Charges prefer enemies that are pinning one of
//! our units.

use crate::core::{Phase, Position, Unit, UnitId};
use crate::game::controller::{ActivationPolicy, BattleView};

/// Evaluation-driven policy; owns no random source
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    pub fn new() -> Self {
        HeuristicPolicy
    }

    /// Melee dice outnumber missile dice
    fn melee_leaning(unit: &Unit) -> bool {
        unit.attack_dice(Phase::Melee, false).len() > unit.attack_dice(Phase::Missile, false).len()
    }

    /// Control point to head for, scored by (enemy units nearby, distance)
    ///
    /// Points with enemies present come first, fewest enemies winning;
    /// otherwise the least contested point overall.
    fn objective(view: &BattleView, unit: &Unit) -> Option<Position> {
        let here = unit.position?;
        let radius = view.rules().presence_radius;
        let enemy = view.side().opponent();
        let friendly = view.side();

        let scored: Vec<(usize, usize, f64, Position)> = view
            .control_points()
            .iter()
            .map(|cp| {
                let enemies = view.units_near(enemy, &cp.position, radius);
                let friends = view.units_near(friendly, &cp.position, radius);
                (enemies, friends, here.distance_to(&cp.position), cp.position)
            })
            .collect();

        let contested = scored
            .iter()
            .filter(|s| s.0 > 0)
            .min_by(|a, b| a.0.cmp(&b.0).then(a.2.total_cmp(&b.2)));
        if let Some(best) = contested {
            return Some(best.3);
        }
        scored
            .iter()
            .min_by(|a, b| (a.0 + a.1).cmp(&(b.0 + b.1)).then(a.2.total_cmp(&b.2)))
            .map(|s| s.3)
    }

    fn nearest_of(unit: &Unit, pool: &[&Unit]) -> Option<UnitId> {
        pool.iter()
            .filter_map(|e| unit.distance_to(e).map(|d| (d, e.id)))
            .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)))
            .map(|(_, id)| id)
    }

    /// Enemy standing next to a friendly unit that is locked in melee
    fn is_pinning_friend(view: &BattleView, enemy: &Unit) -> bool {
        let radius = view.rules().engagement_radius;
        view.own_units()
            .filter(|f| f.is_engaged())
            .any(|f| f.distance_to(enemy).is_some_and(|d| d <= radius))
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationPolicy for HeuristicPolicy {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn choose_unit(&mut self, view: &BattleView, candidates: &[UnitId]) -> Option<UnitId> {
        let budget = view.remaining_ap();
        let mut ready: Vec<&Unit> = candidates
            .iter()
            .filter_map(|id| view.unit(*id))
            .filter(|u| u.ap_cost <= budget)
            .collect();
        // Biggest units first; among equals, the ones stuck in melee, then commanders
        ready.sort_by(|a, b| {
            (b.ap_cost, b.is_engaged(), b.caps.commander.unwrap_or(0))
                .cmp(&(a.ap_cost, a.is_engaged(), a.caps.commander.unwrap_or(0)))
                .then(a.id.cmp(&b.id))
        });
        ready.first().map(|u| u.id)
    }

    fn choose_disengage(&mut self, view: &BattleView, unit: UnitId) -> bool {
        view.unit(unit).is_some_and(|u| !Self::melee_leaning(u))
    }

    fn choose_move_target(&mut self, view: &BattleView, unit: UnitId) -> Option<Position> {
        let me = view.unit(unit)?;
        if Self::melee_leaning(me) {
            if let Some(prey) = view.nearest_unengaged_enemy(me) {
                return prey.position;
            }
        }
        Self::objective(view, me).or_else(|| view.nearest_enemy(me).and_then(|e| e.position))
    }

    fn choose_missile_target(&mut self, view: &BattleView, unit: UnitId) -> Option<UnitId> {
        let me = view.unit(unit)?;
        if !me.has_missile_attack() {
            return None;
        }
        view.viable_missile_targets(me)
            .into_iter()
            .min_by(|a, b| {
                a.total_wounds_remaining()
                    .cmp(&b.total_wounds_remaining())
                    .then(a.id.cmp(&b.id))
            })
            .map(|e| e.id)
    }

    fn choose_charge_target(
        &mut self,
        view: &BattleView,
        unit: UnitId,
        missile_target: Option<UnitId>,
    ) -> Option<UnitId> {
        let me = view.unit(unit)?;
        let candidates = view.charge_candidates(me);

        let pinning: Vec<&Unit> = candidates
            .iter()
            .copied()
            .filter(|e| Self::is_pinning_friend(view, e))
            .collect();
        if let Some(rescue) = Self::nearest_of(me, &pinning) {
            return Some(rescue);
        }
        if let Some(target) = missile_target {
            if candidates.iter().any(|c| c.id == target) {
                return Some(target);
            }
        }
        Self::nearest_of(me, &candidates)
    }

    fn melee_favorable(&mut self, view: &BattleView, unit: UnitId, target: UnitId) -> bool {
        // Refuse fights against units with more than twice our melee dice
        match (view.unit(unit), view.unit(target)) {
            (Some(me), Some(them)) => {
                them.attack_dice(Phase::Melee, false).len() <= 2 * me.attack_dice(Phase::Melee, true).len()
            }
            _ => false,
        }
    }
}
