//! Random policy for testing and baseline play
//!
//! Picks uniformly among legal-looking options. Serves as a baseline for
//! the smarter policies.

use crate::core::{Position, UnitId};
use crate::game::controller::{default_charge_target, ActivationPolicy, BattleView};
use rand::seq::SliceRandom;
use rand::Rng;

/// A policy that makes random choices
pub struct RandomPolicy {
    rng: Box<dyn rand::RngCore>,
}

impl RandomPolicy {
    /// Create a random policy with the thread RNG
    pub fn new() -> Self {
        RandomPolicy {
            rng: Box::new(rand::thread_rng()),
        }
    }

    /// Create a random policy with a seeded RNG (for deterministic testing)
    pub fn with_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        RandomPolicy {
            rng: Box::new(rand::rngs::StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationPolicy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_unit(&mut self, view: &BattleView, candidates: &[UnitId]) -> Option<UnitId> {
        let budget = view.remaining_ap();
        let affordable: Vec<UnitId> = candidates
            .iter()
            .copied()
            .filter(|id| view.unit(*id).is_some_and(|u| u.ap_cost <= budget))
            .collect();
        affordable.choose(&mut self.rng).copied()
    }

    fn choose_move_target(&mut self, view: &BattleView, unit: UnitId) -> Option<Position> {
        view.unit(unit)?;
        let points: Vec<Position> = view.control_points().iter().map(|cp| cp.position).collect();
        let enemies: Vec<Position> = view.enemy_units().filter_map(|e| e.position).collect();

        let toward_point = self.rng.gen_bool(0.5);
        let (first, second) = if toward_point {
            (&points, &enemies)
        } else {
            (&enemies, &points)
        };
        first
            .choose(&mut self.rng)
            .or_else(|| second.choose(&mut self.rng))
            .copied()
    }

    fn choose_missile_target(&mut self, view: &BattleView, unit: UnitId) -> Option<UnitId> {
        let me = view.unit(unit)?;
        if !me.has_missile_attack() {
            return None;
        }
        let targets = view.viable_missile_targets(me);
        targets.choose(&mut self.rng).map(|e| e.id)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::Battlefield;
    use crate::config::RulesConfig;
    use crate::core::{ArmorTier, DieColor, Side, UnitTemplate};
    use crate::game::BattleState;

    fn squad(ap: u32) -> UnitTemplate {
        UnitTemplate {
            name: "Squad".to_string(),
            num_models: 5,
            wounds_per_model: 1,
            armor: ArmorTier::Medium,
            movement: 6.0,
            ap_cost: ap,
            missile_dice: vec![DieColor::Blue; 5],
            melee_dice: vec![DieColor::Blue; 5],
            attack_range: 18.0,
            keywords: vec![],
        }
    }

    fn battle() -> (BattleState, Vec<UnitId>) {
        let rules = RulesConfig::default();
        let field = Battlefield::new(&rules).with_control_points(&[Position::new(30.0, 20.0), Position::new(10.0, 20.0)]);
        let mut state = BattleState::new("Frank", "Dee", field, rules);
        let ids = vec![
            state.add_unit_at(Side::A, &squad(4), Position::new(10.0, 2.0)).unwrap(),
            state.add_unit_at(Side::A, &squad(12), Position::new(20.0, 2.0)).unwrap(),
            state.add_unit_at(Side::B, &squad(4), Position::new(15.0, 12.0)).unwrap(),
        ];
        state.player_mut(Side::A).remaining_ap = 5;
        (state, ids)
    }

    #[test]
    fn test_random_only_picks_affordable_units() {
        let (state, ids) = battle();
        let mut policy = RandomPolicy::with_seed(42);
        let view = BattleView::new(&state, Side::A);
        for _ in 0..20 {
            assert_eq!(policy.choose_unit(&view, &ids[..2]), Some(ids[0]));
        }
    }

    #[test]
    fn test_random_choices_are_legal() {
        let (state, ids) = battle();
        let mut policy = RandomPolicy::with_seed(7);
        let view = BattleView::new(&state, Side::A);
        let legal = [Position::new(30.0, 20.0), Position::new(10.0, 20.0), Position::new(15.0, 12.0)];
        for _ in 0..20 {
            let target = policy.choose_move_target(&view, ids[0]).unwrap();
            assert!(legal.contains(&target));
            assert_eq!(policy.choose_missile_target(&view, ids[0]), Some(ids[2]));
        }
    }

    #[test]
    fn test_random_seeded_is_deterministic() {
        let (state, ids) = battle();
        let view = BattleView::new(&state, Side::A);
        let mut first = RandomPolicy::with_seed(99);
        let mut second = RandomPolicy::with_seed(99);
        for _ in 0..10 {
            assert_eq!(
                first.choose_move_target(&view, ids[0]),
                second.choose_move_target(&view, ids[0])
            );
        }
    }
}
