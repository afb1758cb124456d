//! Per-unit activation state machine
//!
//! `Unactivated -> (LockedMelee | Free) -> Activated`
//!
//! A unit locked in melee either fights one round or, with Disengage,
//! breaks away and continues as a free unit that may not charge. A free
//! unit may regenerate instead of acting; otherwise it moves, shoots and
//! attempts a charge. Every path ends with the unit marked as activated.

use crate::core::dice::roll_d6;
use crate::core::{Phase, Position, Side, UnitId};
use crate::error::RuleViolation;
use crate::game::combat::{self, Exchange, ExchangeOutcome};
use crate::game::controller::{ActivationPolicy, BattleView};
use crate::game::{BattleState, VerbosityLevel};
use crate::log_if_verbose;
use crate::{Result, SkirmishError};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationState {
    Unactivated,
    LockedMelee,
    Free,
    Activated,
}

/// A charge attempt and how it went
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeAttempt {
    pub target: UnitId,
    pub dice: [u32; 2],
    /// Distance measured after any overwatch fire
    pub distance: f64,
    pub overwatch: Option<ExchangeOutcome>,
    pub favorable: bool,
    pub succeeded: bool,
}

impl ChargeAttempt {
    pub fn roll(&self) -> u32 {
        self.dice[0] + self.dice[1]
    }
}

/// A charge lands when the 2d6 total covers the distance and the
/// favorability check agrees
pub fn charge_succeeds(roll: u32, distance: f64, favorable: bool) -> bool {
    roll as f64 >= distance && favorable
}

/// Everything one activation did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationReport {
    pub unit: UnitId,
    /// 0 when the activation did not happen
    pub ap_spent: u32,
    /// States visited, in order
    pub path: Vec<ActivationState>,
    pub disengaged: bool,
    pub regenerated: Option<u32>,
    pub moved: Option<(Position, Position)>,
    pub exchanges: Vec<ExchangeOutcome>,
    pub charge: Option<ChargeAttempt>,
    /// Last Stand casualties removed when the activation closed
    pub casualties_flushed: u32,
    pub issues: Vec<RuleViolation>,
}

impl ActivationReport {
    fn new(unit: UnitId) -> Self {
        ActivationReport {
            unit,
            ap_spent: 0,
            path: vec![ActivationState::Unactivated],
            disengaged: false,
            regenerated: None,
            moved: None,
            exchanges: Vec::new(),
            charge: None,
            casualties_flushed: 0,
            issues: Vec::new(),
        }
    }

    fn enter(&mut self, state: ActivationState) {
        self.path.push(state);
    }

    pub fn final_state(&self) -> ActivationState {
        self.path.last().copied().unwrap_or(ActivationState::Unactivated)
    }

    pub fn happened(&self) -> bool {
        self.ap_spent > 0
    }
}

/// Drives a single unit through its activation
pub struct ActivationController<'a> {
    state: &'a mut BattleState,
}

impl<'a> ActivationController<'a> {
    pub fn new(state: &'a mut BattleState) -> Self {
        ActivationController { state }
    }

    /// Run `unit`'s activation with `available_ap` left to its side
    ///
    /// Unaffordable units do not activate and report 0 AP spent. Errors are
    /// reserved for asking a dead, unknown or already-activated unit to act.
    pub fn activate(
        &mut self,
        unit: UnitId,
        policy: &mut dyn ActivationPolicy,
        available_ap: u32,
    ) -> Result<ActivationReport> {
        let (cost, owner, melee_target) = {
            let u = self.state.unit(unit)?;
            if !u.is_alive() || u.has_activated {
                return Err(SkirmishError::InvalidAction(format!(
                    "{} ({unit}) cannot activate",
                    u.name
                )));
            }
            (u.ap_cost, u.owner, u.melee_target)
        };

        let mut report = ActivationReport::new(unit);
        if cost > available_ap {
            self.record(
                &mut report,
                RuleViolation::InsufficientAp {
                    unit,
                    cost,
                    available: available_ap,
                },
            );
            return Ok(report);
        }

        let mut may_charge = true;
        match melee_target {
            Some(target) if !combat::melee_link_consistent(&self.state.units, unit) => {
                self.record(&mut report, RuleViolation::InconsistentMeleeLink { unit, target });
                combat::break_melee_lock(&mut self.state.units, unit);
                report.enter(ActivationState::Free);
            }
            Some(target) => {
                report.enter(ActivationState::LockedMelee);
                let can_disengage = self.state.unit(unit)?.caps.disengage;
                if can_disengage && policy.choose_disengage(&BattleView::new(self.state, owner), unit) {
                    self.disengage(unit, target, &mut report)?;
                    may_charge = false;
                    report.enter(ActivationState::Free);
                } else {
                    let outcome = self.exchange(Exchange::melee(unit, target), owner)?;
                    report.exchanges.push(outcome);
                    return self.finish(report, cost);
                }
            }
            None => report.enter(ActivationState::Free),
        }

        if self.try_regenerate(unit, &mut report)? {
            return self.finish(report, cost);
        }

        self.advance(unit, owner, policy, &mut report)?;
        let missile_target = self.shoot(unit, owner, policy, &mut report)?;
        if may_charge && self.state.unit(unit)?.is_alive() {
            self.charge(unit, owner, policy, missile_target, &mut report)?;
        }
        self.finish(report, cost)
    }

    fn record(&mut self, report: &mut ActivationReport, violation: RuleViolation) {
        self.state.logger.rule_violation(&violation);
        report.issues.push(violation);
    }

    /// Resolve one exchange and credit kills to `credited`
    fn exchange(&mut self, exchange: Exchange, credited: Side) -> Result<ExchangeOutcome> {
        let state = &mut *self.state;
        let outcome = combat::resolve_exchange(&mut state.units, exchange, &mut state.rng)?;
        state
            .player_mut(credited)
            .credit_kills(exchange.phase, outcome.models_killed());
        log_if_verbose!(
            state.logger,
            VerbosityLevel::Verbose,
            "{} {}{} {} with {} dice: {} unsaved of {} queued, {} models killed",
            exchange.attacker,
            if exchange.charging { "charges " } else { "" },
            exchange.phase,
            exchange.defender,
            outcome.dice_rolled,
            outcome.defense.queued - outcome.defense.saved,
            outcome.defense.queued,
            outcome.models_killed()
        );
        Ok(outcome)
    }

    fn disengage(&mut self, unit: UnitId, opponent: UnitId, report: &mut ActivationReport) -> Result<()> {
        let state = &mut *self.state;
        combat::break_melee_lock(&mut state.units, unit);
        let away_from = state.units.get(opponent)?.position;
        let me = state.units.get_mut(unit)?;
        if let (Some(from), Some(enemy)) = (me.position, away_from) {
            let to = state.battlefield.clamp(from.move_away(&enemy, me.movement));
            me.position = Some(to);
            report.moved = Some((from, to));
        }
        report.disengaged = true;
        log_if_verbose!(state.logger, VerbosityLevel::Normal, "{} disengages from {}", me.name, opponent);
        Ok(())
    }

    /// Regenerate instead of acting, for wounded units that pass the chance
    fn try_regenerate(&mut self, unit: UnitId, report: &mut ActivationReport) -> Result<bool> {
        let state = &mut *self.state;
        let me = state.units.get_mut(unit)?;
        if !me.caps.regenerate || me.models_destroyed() == 0 {
            return Ok(false);
        }
        let chance = state.rules.regenerate_chance.clamp(0.0, 1.0);
        if !state.rng.gen_bool(chance) {
            return Ok(false);
        }
        report.casualties_flushed += me.flush_pending_casualties();
        let restored = me.regenerate(&mut state.rng);
        report.regenerated = Some(restored);
        log_if_verbose!(state.logger, VerbosityLevel::Normal, "{} regenerates {} models", me.name, restored);
        Ok(true)
    }

    fn advance(
        &mut self,
        unit: UnitId,
        owner: Side,
        policy: &mut dyn ActivationPolicy,
        report: &mut ActivationReport,
    ) -> Result<()> {
        let Some(destination) = policy.choose_move_target(&BattleView::new(self.state, owner), unit) else {
            return Ok(());
        };
        let state = &mut *self.state;
        let me = state.units.get_mut(unit)?;
        let Some(from) = me.position else {
            return Ok(());
        };
        let to = state.battlefield.clamp(from.move_towards(&destination, me.movement));
        me.position = Some(to);
        report.moved = Some((from, to));
        log_if_verbose!(state.logger, VerbosityLevel::Verbose, "{} moves {} -> {}", me.name, from, to);
        Ok(())
    }

    /// Check that `target` is a living enemy within `reach` of `unit`
    fn validate_target(&self, unit: UnitId, target: UnitId, reach: f64) -> bool {
        let (Ok(me), Ok(other)) = (self.state.unit(unit), self.state.unit(target)) else {
            return false;
        };
        other.owner != me.owner
            && other.is_alive()
            && me.distance_to(other).is_some_and(|d| d <= reach)
    }

    fn shoot(
        &mut self,
        unit: UnitId,
        owner: Side,
        policy: &mut dyn ActivationPolicy,
        report: &mut ActivationReport,
    ) -> Result<Option<UnitId>> {
        let me = self.state.unit(unit)?;
        if !me.has_missile_attack() {
            return Ok(None);
        }
        let range = me.attack_range;
        let Some(target) = policy.choose_missile_target(&BattleView::new(self.state, owner), unit) else {
            return Ok(None);
        };
        if !self.validate_target(unit, target, range) {
            self.record(report, RuleViolation::InvalidTarget { unit, target });
            return Ok(None);
        }
        let cover = self.cover_for(target)?;
        let outcome = self.exchange(Exchange::missile(unit, target).with_cover(cover), owner)?;
        report.exchanges.push(outcome);
        Ok(Some(target))
    }

    fn cover_for(&self, unit: UnitId) -> Result<Option<crate::core::Keyword>> {
        Ok(self
            .state
            .unit(unit)?
            .position
            .and_then(|p| self.state.battlefield.terrain_at(&p)))
    }

    fn charge(
        &mut self,
        unit: UnitId,
        owner: Side,
        policy: &mut dyn ActivationPolicy,
        missile_target: Option<UnitId>,
        report: &mut ActivationReport,
    ) -> Result<()> {
        let view = BattleView::new(self.state, owner);
        let Some(target) = policy.choose_charge_target(&view, unit, missile_target) else {
            return Ok(());
        };
        if !self.validate_target(unit, target, self.state.rules.charge_radius) {
            self.record(report, RuleViolation::InvalidTarget { unit, target });
            return Ok(());
        }

        let dice = [roll_d6(&mut self.state.rng), roll_d6(&mut self.state.rng)];

        let defender = self.state.unit(target)?;
        let overwatch = if defender.caps.overwatch && !defender.has_activated && defender.has_missile_attack() {
            let cover = self.cover_for(unit)?;
            Some(self.exchange(Exchange::missile(target, unit).with_cover(cover), owner.opponent())?)
        } else {
            None
        };

        let mut attempt = ChargeAttempt {
            target,
            dice,
            distance: 0.0,
            overwatch,
            favorable: false,
            succeeded: false,
        };
        if !self.state.unit(unit)?.is_alive() {
            report.charge = Some(attempt);
            return Ok(());
        }

        let (me, other) = (self.state.unit(unit)?, self.state.unit(target)?);
        let (Some(from), Some(goal)) = (me.position, other.position) else {
            report.charge = Some(attempt);
            return Ok(());
        };
        attempt.distance = from.distance_to(&goal);
        attempt.favorable = policy.melee_favorable(&BattleView::new(self.state, owner), unit, target);
        attempt.succeeded = charge_succeeds(attempt.roll(), attempt.distance, attempt.favorable);
        log_if_verbose!(
            self.state.logger,
            VerbosityLevel::Normal,
            "{} charges {}: rolled {} for {:.1}\" ({})",
            unit,
            target,
            attempt.roll(),
            attempt.distance,
            if attempt.succeeded { "success" } else { "failed" }
        );

        if attempt.succeeded {
            let engagement = self.state.rules.engagement_radius;
            let contact = from.move_towards(&goal, (attempt.distance - engagement).max(0.0));
            self.state.unit_mut(unit)?.position = Some(contact);

            let outcome = self.exchange(Exchange::charge(unit, target), owner)?;
            report.exchanges.push(outcome);
            let both_alive = self.state.unit(unit)?.is_alive() && self.state.unit(target)?.is_alive();
            if both_alive {
                combat::lock_in_melee(&mut self.state.units, unit, target)?;
            }
        }
        report.charge = Some(attempt);
        Ok(())
    }

    fn finish(&mut self, mut report: ActivationReport, cost: u32) -> Result<ActivationReport> {
        let me = self.state.unit_mut(report.unit)?;
        me.has_activated = true;
        report.casualties_flushed += me.flush_pending_casualties();
        me.recompute_alive();
        let dead = !me.is_alive();
        if dead {
            combat::break_melee_lock(&mut self.state.units, report.unit);
        }
        report.ap_spent = cost;
        report.enter(ActivationState::Activated);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::Battlefield;
    use crate::config::RulesConfig;
    use crate::core::{ArmorTier, DieColor, UnitTemplate};
    use crate::game::scripted_controller::{ScriptedActivation, ScriptedPolicy};

    fn squad(name: &str, models: u32, keywords: &[&str]) -> UnitTemplate {
        UnitTemplate {
            name: name.to_string(),
            num_models: models,
            wounds_per_model: 1,
            armor: ArmorTier::Medium,
            movement: 6.0,
            ap_cost: 4,
            missile_dice: vec![DieColor::Blue; models as usize],
            melee_dice: vec![DieColor::Blue; models as usize],
            attack_range: 18.0,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn battle() -> BattleState {
        let rules = RulesConfig {
            regenerate_chance: 0.0,
            ..RulesConfig::default()
        };
        let mut state = BattleState::new("Frank", "Dee", Battlefield::new(&rules), rules);
        state.seed_rng(17);
        state
    }

    #[test]
    fn test_charge_rule_examples() {
        assert!(charge_succeeds(2 + 6, 7.0, true));
        assert!(!charge_succeeds(3 + 4, 9.0, true));
        assert!(charge_succeeds(7, 7.0, true));
        assert!(!charge_succeeds(12, 1.0, false));
    }

    #[test]
    fn test_insufficient_ap_spends_nothing() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 5.0)).unwrap();
        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit)]);

        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 3).unwrap();
        assert_eq!(report.ap_spent, 0);
        assert!(!report.happened());
        assert!(matches!(report.issues[0], RuleViolation::InsufficientAp { cost: 4, available: 3, .. }));
        assert!(!state.unit(unit).unwrap().has_activated);
    }

    #[test]
    fn test_free_activation_moves_and_marks_activated() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 5.0)).unwrap();
        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).moving_to(Position::new(10.0, 25.0))]);

        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();
        assert_eq!(report.ap_spent, 4);
        assert_eq!(
            report.path,
            vec![ActivationState::Unactivated, ActivationState::Free, ActivationState::Activated]
        );
        // Movement 6 toward a point 20 away
        let at = state.unit(unit).unwrap().position.unwrap();
        assert!((at.y - 11.0).abs() < 1e-9 && (at.x - 10.0).abs() < 1e-9);
        assert!(state.unit(unit).unwrap().has_activated);

        // A unit activates at most once per turn
        assert!(ActivationController::new(&mut state).activate(unit, &mut policy, 10).is_err());
    }

    #[test]
    fn test_invalid_missile_target_is_skipped() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 5.0)).unwrap();
        let friend = state.add_unit_at(Side::A, &squad("Friends", 5, &[]), Position::new(12.0, 5.0)).unwrap();
        let distant = state.add_unit_at(Side::B, &squad("Aliens", 5, &[]), Position::new(10.0, 39.0)).unwrap();

        for target in [friend, distant] {
            state.begin_turn(1);
            let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).shooting(target)]);
            let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();
            assert!(report.exchanges.is_empty());
            assert_eq!(report.issues, vec![RuleViolation::InvalidTarget { unit, target }]);
            assert_eq!(report.ap_spent, 4);
        }
    }

    #[test]
    fn test_locked_melee_fights_once_and_stops() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 10.0)).unwrap();
        let enemy = state.add_unit_at(Side::B, &squad("Aliens", 30, &[]), Position::new(10.0, 11.0)).unwrap();
        combat::lock_in_melee(&mut state.units, unit, enemy).unwrap();

        // Script asks for a move and shot; locked units ignore both
        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit)
            .moving_to(Position::new(40.0, 10.0))
            .shooting(enemy)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        assert_eq!(report.exchanges.len(), 1);
        assert_eq!(report.exchanges[0].phase, Phase::Melee);
        assert!(!report.exchanges[0].charging);
        assert!(report.moved.is_none());
        assert_eq!(report.path[1], ActivationState::LockedMelee);
        assert_eq!(state.unit(unit).unwrap().position, Some(Position::new(10.0, 10.0)));
        // 30 models cannot fall to five dice, so the lock holds
        assert_eq!(state.unit(unit).unwrap().melee_target, Some(enemy));
        assert_eq!(state.unit(enemy).unwrap().melee_target, Some(unit));
    }

    #[test]
    fn test_disengage_breaks_lock_and_skips_charge() {
        let mut state = battle();
        let unit = state
            .add_unit_at(Side::A, &squad("Scouts", 5, &["Disengage"]), Position::new(10.0, 10.0))
            .unwrap();
        let enemy = state.add_unit_at(Side::B, &squad("Aliens", 30, &[]), Position::new(10.0, 11.0)).unwrap();
        combat::lock_in_melee(&mut state.units, unit, enemy).unwrap();

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).disengaging().charging(enemy)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        assert!(report.disengaged);
        assert!(report.charge.is_none());
        assert!(report.exchanges.is_empty());
        assert_eq!(state.unit(unit).unwrap().melee_target, None);
        assert_eq!(state.unit(enemy).unwrap().melee_target, None);
        assert_eq!(state.unit(unit).unwrap().position, Some(Position::new(10.0, 4.0)));
        assert_eq!(
            report.path,
            vec![
                ActivationState::Unactivated,
                ActivationState::LockedMelee,
                ActivationState::Free,
                ActivationState::Activated
            ]
        );
    }

    #[test]
    fn test_one_sided_link_self_heals() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 10.0)).unwrap();
        let enemy = state.add_unit_at(Side::B, &squad("Aliens", 5, &[]), Position::new(10.0, 30.0)).unwrap();
        state.unit_mut(unit).unwrap().melee_target = Some(enemy);

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        assert_eq!(
            report.issues,
            vec![RuleViolation::InconsistentMeleeLink { unit, target: enemy }]
        );
        assert_eq!(report.path[1], ActivationState::Free);
        assert_eq!(state.unit(unit).unwrap().melee_target, None);
    }

    #[test]
    fn test_successful_charge_locks_both_units() {
        // Adjacent units: any 2d6 roll covers the distance
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 10.0)).unwrap();
        let enemy = state.add_unit_at(Side::B, &squad("Horde", 40, &[]), Position::new(10.0, 11.5)).unwrap();

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).charging(enemy)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        let charge = report.charge.as_ref().unwrap();
        assert!(charge.succeeded);
        assert!(charge.roll() >= 2);
        assert_eq!(report.exchanges.len(), 1);
        assert!(report.exchanges[0].charging);
        assert_eq!(state.unit(unit).unwrap().melee_target, Some(enemy));
        assert_eq!(state.unit(enemy).unwrap().melee_target, Some(unit));
        let gap = state.unit(unit).unwrap().distance_to(state.unit(enemy).unwrap()).unwrap();
        assert!(gap <= state.rules.engagement_radius + 1e-9);
    }

    #[test]
    fn test_unfavorable_charge_fails() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 10.0)).unwrap();
        let enemy = state.add_unit_at(Side::B, &squad("Horde", 40, &[]), Position::new(10.0, 11.5)).unwrap();

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).charging(enemy).unfavorable()]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        assert!(!report.charge.unwrap().succeeded);
        assert!(report.exchanges.is_empty());
        assert_eq!(state.unit(unit).unwrap().melee_target, None);
    }

    #[test]
    fn test_charge_out_of_radius_is_invalid() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 5, &[]), Position::new(10.0, 5.0)).unwrap();
        let enemy = state.add_unit_at(Side::B, &squad("Aliens", 5, &[]), Position::new(10.0, 30.0)).unwrap();

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).charging(enemy)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();
        assert!(report.charge.is_none());
        assert_eq!(report.issues, vec![RuleViolation::InvalidTarget { unit, target: enemy }]);
    }

    #[test]
    fn test_overwatch_fires_before_charge() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 40, &[]), Position::new(10.0, 10.0)).unwrap();
        let enemy = state
            .add_unit_at(Side::B, &squad("Sentries", 5, &["Overwatch"]), Position::new(10.0, 11.5))
            .unwrap();

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).charging(enemy)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        let charge = report.charge.unwrap();
        let overwatch = charge.overwatch.expect("sentries have not activated");
        assert_eq!(overwatch.attacker, enemy);
        assert_eq!(overwatch.defender, unit);
        assert_eq!(overwatch.phase, Phase::Missile);
        // Kills from overwatch belong to the defending side
        assert_eq!(state.player(Side::B).missile_kills, overwatch.models_killed());
    }

    #[test]
    fn test_activated_target_gives_no_overwatch() {
        let mut state = battle();
        let unit = state.add_unit_at(Side::A, &squad("Knights", 40, &[]), Position::new(10.0, 10.0)).unwrap();
        let enemy = state
            .add_unit_at(Side::B, &squad("Sentries", 5, &["Overwatch"]), Position::new(10.0, 11.5))
            .unwrap();
        state.unit_mut(enemy).unwrap().has_activated = true;

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).charging(enemy)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();
        assert!(report.charge.unwrap().overwatch.is_none());
    }

    #[test]
    fn test_last_stand_flushes_at_end_of_own_activation() {
        let mut state = battle();
        let unit = state
            .add_unit_at(Side::A, &squad("Guard", 3, &["Last Stand"]), Position::new(10.0, 10.0))
            .unwrap();
        {
            let guard = state.unit_mut(unit).unwrap();
            guard.models[0].take_damage(1);
            guard.pending_casualties = 1;
        }

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();
        assert_eq!(report.casualties_flushed, 1);
        assert_eq!(state.unit(unit).unwrap().num_models, 2);
        assert_eq!(state.unit(unit).unwrap().pending_casualties, 0);
    }

    #[test]
    fn test_regeneration_consumes_activation() {
        let rules = RulesConfig {
            regenerate_chance: 1.0,
            ..RulesConfig::default()
        };
        let mut state = BattleState::new("Frank", "Dee", Battlefield::new(&rules), rules);
        let unit = state
            .add_unit_at(Side::A, &squad("Trolls", 6, &["Regenerate"]), Position::new(10.0, 10.0))
            .unwrap();
        {
            let trolls = state.unit_mut(unit).unwrap();
            trolls.models.truncate(2);
            trolls.num_models = 2;
        }

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit).moving_to(Position::new(10.0, 30.0))]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        let restored = report.regenerated.unwrap();
        assert!((1..=4).contains(&restored));
        assert!(report.moved.is_none());
        assert_eq!(state.unit(unit).unwrap().num_models, 2 + restored);
        assert_eq!(report.ap_spent, 4);
    }

    #[test]
    fn test_last_stand_casualties_can_regenerate() {
        let rules = RulesConfig {
            regenerate_chance: 1.0,
            ..RulesConfig::default()
        };
        let mut state = BattleState::new("Frank", "Dee", Battlefield::new(&rules), rules);
        let unit = state
            .add_unit_at(Side::A, &squad("Ghouls", 3, &["Last Stand", "Regenerate"]), Position::new(10.0, 10.0))
            .unwrap();
        {
            let ghouls = state.unit_mut(unit).unwrap();
            ghouls.models[0].take_damage(1);
            ghouls.models[1].take_damage(1);
            ghouls.pending_casualties = 2;
        }

        let mut policy = ScriptedPolicy::new(vec![ScriptedActivation::hold(unit)]);
        let report = ActivationController::new(&mut state).activate(unit, &mut policy, 10).unwrap();

        let restored = report.regenerated.unwrap();
        assert!((1..=2).contains(&restored));
        assert_eq!(report.casualties_flushed, 2);
        let ghouls = state.unit(unit).unwrap();
        assert_eq!(ghouls.num_models, 1 + restored);
        assert_eq!(ghouls.living_models(), ghouls.num_models);
        assert_eq!(ghouls.pending_casualties, 0);
        assert!(ghouls.is_alive());
    }
}
