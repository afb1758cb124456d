//! Strategy-weighted policy
//!
//! Decisions are coin flips biased by a [`Strategy`] weight vector, so a
//! population of strategies can be scored against each other by running
//! batches of battles. Evolving the weights happens elsewhere.

use crate::core::{Position, UnitId};
use crate::game::controller::{nearest_control_point, ActivationPolicy, BattleView};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Relative weights steering a [`GeneticPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub control_point_capture: f64,
    pub unit_elimination: f64,
    pub missile_preference: f64,
    pub melee_preference: f64,
}

impl Strategy {
    pub fn new(
        control_point_capture: f64,
        unit_elimination: f64,
        missile_preference: f64,
        melee_preference: f64,
    ) -> Self {
        Strategy {
            control_point_capture,
            unit_elimination,
            missile_preference,
            melee_preference,
        }
    }

    /// Random weights, normalized
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Strategy::new(rng.gen(), rng.gen(), rng.gen(), rng.gen()).normalized()
    }

    /// Scale the weights so they sum to 1
    ///
    /// An all-zero vector becomes the uniform strategy.
    pub fn normalized(self) -> Self {
        let weights = self.weights();
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Strategy::default();
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Strategy::default();
        }
        Strategy::new(
            self.control_point_capture / total,
            self.unit_elimination / total,
            self.missile_preference / total,
            self.melee_preference / total,
        )
    }

    pub fn weights(&self) -> [f64; 4] {
        [
            self.control_point_capture,
            self.unit_elimination,
            self.missile_preference,
            self.melee_preference,
        ]
    }

    /// Share of objective play versus hunting enemy units
    fn objective_bias(&self) -> f64 {
        let total = self.control_point_capture + self.unit_elimination;
        if total <= 0.0 {
            0.5
        } else {
            self.control_point_capture / total
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::new(0.25, 0.25, 0.25, 0.25)
    }
}

/// Policy whose choices are biased coin flips drawn from a [`Strategy`]
pub struct GeneticPolicy {
    strategy: Strategy,
    rng: Box<dyn rand::RngCore>,
}

impl GeneticPolicy {
    pub fn new(strategy: Strategy) -> Self {
        GeneticPolicy {
            strategy: strategy.normalized(),
            rng: Box::new(rand::thread_rng()),
        }
    }

    /// Seeded variant for reproducible batches
    pub fn with_seed(strategy: Strategy, seed: u64) -> Self {
        use rand::SeedableRng;
        GeneticPolicy {
            strategy: strategy.normalized(),
            rng: Box::new(rand::rngs::StdRng::seed_from_u64(seed)),
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

impl ActivationPolicy for GeneticPolicy {
    fn name(&self) -> &str {
        "genetic"
    }

    fn choose_unit(&mut self, view: &BattleView, candidates: &[UnitId]) -> Option<UnitId> {
        let budget = view.remaining_ap();
        candidates
            .iter()
            .copied()
            .find(|id| view.unit(*id).is_some_and(|u| u.ap_cost <= budget))
    }

    fn choose_move_target(&mut self, view: &BattleView, unit: UnitId) -> Option<Position> {
        let me = view.unit(unit)?;
        let here = me.position?;
        let enemy = view.nearest_enemy(me).and_then(|e| e.position);
        let objective = nearest_control_point(view, &here);
        if self.chance(self.strategy.objective_bias()) {
            objective.or(enemy)
        } else {
            enemy.or(objective)
        }
    }

    fn choose_missile_target(&mut self, view: &BattleView, unit: UnitId) -> Option<UnitId> {
        let me = view.unit(unit)?;
        if !me.has_missile_attack() || !self.chance(self.strategy.missile_preference) {
            return None;
        }
        view.viable_missile_targets(me).first().map(|e| e.id)
    }

    fn choose_charge_target(
        &mut self,
        view: &BattleView,
        unit: UnitId,
        _missile_target: Option<UnitId>,
    ) -> Option<UnitId> {
        let me = view.unit(unit)?;
        if !self.chance(self.strategy.melee_preference) {
            return None;
        }
        view.charge_candidates(me).first().map(|e| e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::Battlefield;
    use crate::config::RulesConfig;
    use crate::core::{ArmorTier, DieColor, Side, UnitTemplate};
    use crate::game::BattleState;

    fn squad() -> UnitTemplate {
        UnitTemplate {
            name: "Squad".to_string(),
            num_models: 5,
            wounds_per_model: 1,
            armor: ArmorTier::Medium,
            movement: 6.0,
            ap_cost: 4,
            missile_dice: vec![DieColor::Blue; 5],
            melee_dice: vec![DieColor::Blue; 5],
            attack_range: 18.0,
            keywords: vec![],
        }
    }

    #[test]
    fn test_normalize() {
        let s = Strategy::new(2.0, 1.0, 1.0, 0.0).normalized();
        assert!((s.control_point_capture - 0.5).abs() < 1e-12);
        assert!((s.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(Strategy::new(0.0, 0.0, 0.0, 0.0).normalized(), Strategy::default());
    }

    #[test]
    fn test_random_strategy_is_normalized() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let s = Strategy::random(&mut rng);
        assert!((s.weights().iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_strategies_are_deterministic() {
        let rules = RulesConfig::default();
        let field = Battlefield::new(&rules).with_control_points(&[Position::new(30.0, 20.0)]);
        let mut state = BattleState::new("Frank", "Dee", field, rules);
        let me = state.add_unit_at(Side::A, &squad(), Position::new(10.0, 10.0)).unwrap();
        let enemy = state.add_unit_at(Side::B, &squad(), Position::new(14.0, 10.0)).unwrap();
        state.player_mut(Side::A).remaining_ap = 4;
        let view = BattleView::new(&state, Side::A);

        let mut hunter = GeneticPolicy::with_seed(Strategy::new(0.0, 1.0, 0.0, 0.0), 1);
        let mut holder = GeneticPolicy::with_seed(Strategy::new(1.0, 0.0, 0.0, 0.0), 1);
        let mut gunner = GeneticPolicy::with_seed(Strategy::new(0.0, 0.0, 1.0, 0.0), 1);
        let mut brawler = GeneticPolicy::with_seed(Strategy::new(0.0, 0.0, 0.0, 1.0), 1);
        for _ in 0..10 {
            assert_eq!(hunter.choose_move_target(&view, me), Some(Position::new(14.0, 10.0)));
            assert_eq!(hunter.choose_missile_target(&view, me), None);
            assert_eq!(hunter.choose_charge_target(&view, me, None), None);

            assert_eq!(holder.choose_move_target(&view, me), Some(Position::new(30.0, 20.0)));
            assert_eq!(gunner.choose_missile_target(&view, me), Some(enemy));
            assert_eq!(brawler.choose_charge_target(&view, me, None), Some(enemy));
        }
        assert_eq!(hunter.choose_unit(&view, &[me]), Some(me));
    }
}
