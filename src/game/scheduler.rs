//! Turn scheduling: AP allocation, activation interleaving and scoring

use crate::core::{Side, UnitId};
use crate::error::RuleViolation;
use crate::game::activation::{ActivationController, ActivationReport};
use crate::game::controller::{ActivationPolicy, BattleView};
use crate::game::{BattleState, VerbosityLevel};
use crate::log_if_verbose;
use crate::Result;
use serde::{Deserialize, Serialize};

/// AP each side receives for a turn
///
/// Both sides start from half the larger army's total (rounded up), raised
/// to their own most expensive unit so that unit can always act, plus
/// whatever they left unspent last turn.
pub fn allocate_ap(
    total_a: u32,
    total_b: u32,
    largest_a: u32,
    largest_b: u32,
    carryover_a: u32,
    carryover_b: u32,
) -> (u32, u32) {
    let shared = total_a.max(total_b).div_ceil(2);
    (
        shared.max(largest_a) + carryover_a,
        shared.max(largest_b) + carryover_b,
    )
}

/// Side that activates first on `turn` (odd turns: A)
pub fn first_side(turn: u32) -> Side {
    if turn % 2 == 1 {
        Side::A
    } else {
        Side::B
    }
}

/// Everything that happened in one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub first: Side,
    /// AP granted to A and B at the start of the turn
    pub allocation: [u32; 2],
    /// AP left to carry into the next turn
    pub carryover: [u32; 2],
    pub activations: Vec<ActivationReport>,
    /// Scheduler-level issues (activation issues stay on each report)
    pub issues: Vec<RuleViolation>,
    /// Points each side earned this turn
    pub points: [u32; 2],
}

impl TurnReport {
    pub fn ap_spent(&self, side: Side) -> u32 {
        self.allocation[side.index()] - self.carryover[side.index()]
    }
}

/// Plays whole turns: allocates AP, interleaves activations, scores
pub struct TurnScheduler<'a> {
    state: &'a mut BattleState,
}

impl<'a> TurnScheduler<'a> {
    pub fn new(state: &'a mut BattleState) -> Self {
        TurnScheduler { state }
    }

    /// Grant this turn's AP to both players and return (A, B)
    pub fn allocate(&mut self) -> (u32, u32) {
        let s = &*self.state;
        let (ap_a, ap_b) = allocate_ap(
            s.total_ap(Side::A),
            s.total_ap(Side::B),
            s.largest_unit_cost(Side::A),
            s.largest_unit_cost(Side::B),
            s.player(Side::A).remaining_ap,
            s.player(Side::B).remaining_ap,
        );
        self.state.player_mut(Side::A).remaining_ap = ap_a;
        self.state.player_mut(Side::B).remaining_ap = ap_b;
        (ap_a, ap_b)
    }

    /// Play turn `turn` to completion
    pub fn play_turn(
        &mut self,
        turn: u32,
        policy_a: &mut dyn ActivationPolicy,
        policy_b: &mut dyn ActivationPolicy,
    ) -> Result<TurnReport> {
        self.state.begin_turn(turn);
        let (ap_a, ap_b) = self.allocate();
        let first = first_side(turn);
        log_if_verbose!(
            self.state.logger,
            VerbosityLevel::Normal,
            "Turn {turn}: {} has {ap_a} AP, {} has {ap_b} AP, side {first} first",
            self.state.player(Side::A).name,
            self.state.player(Side::B).name
        );

        let mut report = TurnReport {
            turn,
            first,
            allocation: [ap_a, ap_b],
            carryover: [0, 0],
            activations: Vec::new(),
            issues: Vec::new(),
            points: [0, 0],
        };

        let order = [first, first.opponent()];
        let mut active = [true, true];
        while active.iter().any(|&a| a) {
            for side in order {
                if !active[side.index()] {
                    continue;
                }
                let policy: &mut dyn ActivationPolicy = match side {
                    Side::A => &mut *policy_a,
                    Side::B => &mut *policy_b,
                };
                active[side.index()] = self.activate_next(side, policy, &mut report)?;
            }
        }

        report.carryover = [
            self.state.player(Side::A).remaining_ap,
            self.state.player(Side::B).remaining_ap,
        ];
        report.points = self.score_control_points();
        Ok(report)
    }

    /// Offer one activation to `side`; false once the side is done this turn
    fn activate_next(
        &mut self,
        side: Side,
        policy: &mut dyn ActivationPolicy,
        report: &mut TurnReport,
    ) -> Result<bool> {
        let available = self.state.player(side).remaining_ap;
        if available == 0 {
            return Ok(false);
        }

        let candidates = self.state.ready_units(side);
        if candidates.is_empty() {
            self.record(report, RuleViolation::NoLegalAction { side });
            return Ok(false);
        }

        let choice = policy.choose_unit(&BattleView::new(self.state, side), &candidates);
        let Some(unit) = choice else {
            self.record(report, RuleViolation::NoLegalAction { side });
            return Ok(false);
        };
        if !candidates.contains(&unit) {
            self.record(report, RuleViolation::InvalidTarget { unit, target: unit });
            return Ok(false);
        }

        self.state
            .logger
            .policy_choice(policy.name(), &describe_choice(self.state, unit));
        let activation = ActivationController::new(self.state).activate(unit, policy, available)?;
        let spent = activation.ap_spent;
        report.activations.push(activation);
        if spent == 0 {
            return Ok(false);
        }

        let player = self.state.player_mut(side);
        player.remaining_ap -= spent;
        Ok(player.remaining_ap > 0)
    }

    fn record(&mut self, report: &mut TurnReport, violation: RuleViolation) {
        self.state.logger.rule_violation(&violation);
        report.issues.push(violation);
    }

    /// Award a point per control point to the side with strictly more
    /// models within scoring range
    pub fn score_control_points(&mut self) -> [u32; 2] {
        let radius = self.state.rules.scoring_radius;
        let mut points = [0, 0];
        for cp in self.state.battlefield.control_points() {
            let a = self.state.models_in_range(Side::A, &cp.position, radius);
            let b = self.state.models_in_range(Side::B, &cp.position, radius);
            if a > b {
                points[Side::A.index()] += 1;
            } else if b > a {
                points[Side::B.index()] += 1;
            }
        }
        for side in Side::both() {
            self.state.player_mut(side).score += points[side.index()];
        }
        log_if_verbose!(
            self.state.logger,
            VerbosityLevel::Normal,
            "Scores: {} {} - {} {}",
            self.state.player(Side::A).name,
            self.state.player(Side::A).score,
            self.state.player(Side::B).score,
            self.state.player(Side::B).name
        );
        points
    }
}

fn describe_choice(state: &BattleState, unit: UnitId) -> String {
    match state.unit(unit) {
        Ok(u) => format!("activates {} ({unit})", u.name),
        Err(_) => format!("activates {unit}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::Battlefield;
    use crate::config::RulesConfig;
    use crate::core::{ArmorTier, DieColor, Position, UnitTemplate};
    use crate::game::scripted_controller::{ScriptedActivation, ScriptedPolicy};

    fn squad(ap: u32) -> UnitTemplate {
        UnitTemplate {
            name: "Squad".to_string(),
            num_models: 5,
            wounds_per_model: 1,
            armor: ArmorTier::Medium,
            movement: 6.0,
            ap_cost: ap,
            missile_dice: vec![],
            melee_dice: vec![DieColor::White; 5],
            attack_range: 0.0,
            keywords: vec![],
        }
    }

    fn battle(points: &[Position]) -> BattleState {
        let rules = RulesConfig::default();
        let field = Battlefield::new(&rules).with_control_points(points);
        BattleState::new("Frank", "Dee", field, rules)
    }

    #[test]
    fn test_allocation_example() {
        assert_eq!(allocate_ap(40, 30, 5, 8, 0, 2), (20, 22));
    }

    #[test]
    fn test_allocation_floors_at_largest_unit() {
        // Half of 9 rounds up to 5, but a 7 AP unit must be able to act
        assert_eq!(allocate_ap(9, 7, 4, 7, 0, 0), (5, 7));
        assert_eq!(allocate_ap(0, 0, 0, 0, 3, 0), (3, 0));
    }

    #[test]
    fn test_first_side_alternates() {
        assert_eq!(first_side(1), Side::A);
        assert_eq!(first_side(2), Side::B);
        assert_eq!(first_side(3), Side::A);
    }

    #[test]
    fn test_turn_interleaves_sides() {
        let mut state = battle(&[]);
        let a1 = state.add_unit_at(Side::A, &squad(4), Position::new(5.0, 5.0)).unwrap();
        let a2 = state.add_unit_at(Side::A, &squad(4), Position::new(15.0, 5.0)).unwrap();
        let b1 = state.add_unit_at(Side::B, &squad(4), Position::new(5.0, 35.0)).unwrap();
        let b2 = state.add_unit_at(Side::B, &squad(4), Position::new(15.0, 35.0)).unwrap();
        // Half of 8 is 4; carried AP lets every unit act
        state.player_mut(Side::A).remaining_ap = 4;
        state.player_mut(Side::B).remaining_ap = 4;

        let mut policy_a = ScriptedPolicy::new(vec![ScriptedActivation::hold(a1), ScriptedActivation::hold(a2)]);
        let mut policy_b = ScriptedPolicy::new(vec![ScriptedActivation::hold(b1), ScriptedActivation::hold(b2)]);

        let report = TurnScheduler::new(&mut state).play_turn(2, &mut policy_a, &mut policy_b).unwrap();
        let order: Vec<UnitId> = report.activations.iter().map(|a| a.unit).collect();
        // Even turn: B opens
        assert_eq!(order, vec![b1, a1, b2, a2]);
        assert_eq!(report.allocation, [8, 8]);
        assert_eq!(report.carryover, [0, 0]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_unaffordable_choice_stops_side_and_carries_ap() {
        let mut state = battle(&[]);
        let cheap = state.add_unit_at(Side::A, &squad(3), Position::new(5.0, 5.0)).unwrap();
        let pricey = state.add_unit_at(Side::A, &squad(6), Position::new(15.0, 5.0)).unwrap();
        let enemy = state.add_unit_at(Side::B, &squad(3), Position::new(5.0, 35.0)).unwrap();

        // A: 9 total -> 5 shared, floored at 6. Cheap leaves 3, pricey needs 6.
        let mut policy_a = ScriptedPolicy::new(vec![ScriptedActivation::hold(cheap), ScriptedActivation::hold(pricey)]);
        let mut policy_b = ScriptedPolicy::new(vec![ScriptedActivation::hold(enemy)]);

        let report = TurnScheduler::new(&mut state).play_turn(1, &mut policy_a, &mut policy_b).unwrap();
        assert_eq!(report.allocation, [6, 5]);
        assert_eq!(report.carryover[Side::A.index()], 3);
        assert_eq!(report.ap_spent(Side::A), 3);

        let refused = report.activations.iter().find(|a| a.unit == pricey).unwrap();
        assert_eq!(refused.ap_spent, 0);
        assert!(!state.unit(pricey).unwrap().has_activated);

        // B ran out of units with AP left over
        assert!(report.issues.contains(&RuleViolation::NoLegalAction { side: Side::B }));
        assert_eq!(state.player(Side::B).remaining_ap, 2);
    }

    #[test]
    fn test_carryover_feeds_next_turn() {
        let mut state = battle(&[]);
        state.add_unit_at(Side::A, &squad(4), Position::new(5.0, 5.0)).unwrap();
        state.add_unit_at(Side::B, &squad(4), Position::new(5.0, 35.0)).unwrap();
        state.player_mut(Side::B).remaining_ap = 2;

        let (a, b) = TurnScheduler::new(&mut state).allocate();
        assert_eq!((a, b), (4, 6));
    }

    #[test]
    fn test_scoring_needs_strict_majority() {
        let mut state = battle(&[Position::new(10.0, 20.0), Position::new(40.0, 20.0), Position::new(55.0, 5.0)]);
        // Point 0: 5 vs 5 tie; point 1: 5 vs 0 for A; point 2: empty
        state.add_unit_at(Side::A, &squad(4), Position::new(10.0, 19.0)).unwrap();
        state.add_unit_at(Side::B, &squad(4), Position::new(11.0, 21.0)).unwrap();
        state.add_unit_at(Side::A, &squad(4), Position::new(41.0, 20.0)).unwrap();

        let points = TurnScheduler::new(&mut state).score_control_points();
        assert_eq!(points, [1, 0]);
        assert_eq!(state.player(Side::A).score, 1);
        assert_eq!(state.player(Side::B).score, 0);
    }
}
