//! Single attack exchanges and melee locks
//!
//! An exchange is one unit attacking another once: the attacker rolls its
//! pool and the defender saves. The defender does not strike back inside
//! the same exchange; activations compose exchanges into fights.

use crate::core::{Capabilities, DefendReport, EntityStore, Keyword, Phase, Unit, UnitId, WoundPool};
use crate::{Result, SkirmishError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One attack to resolve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exchange {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub phase: Phase,
    pub charging: bool,
    /// Keyword the defender's terrain grants for this attack only
    pub cover: Option<Keyword>,
}

impl Exchange {
    pub fn missile(attacker: UnitId, defender: UnitId) -> Self {
        Exchange {
            attacker,
            defender,
            phase: Phase::Missile,
            charging: false,
            cover: None,
        }
    }

    pub fn melee(attacker: UnitId, defender: UnitId) -> Self {
        Exchange {
            phase: Phase::Melee,
            ..Exchange::missile(attacker, defender)
        }
    }

    pub fn charge(attacker: UnitId, defender: UnitId) -> Self {
        Exchange {
            charging: true,
            ..Exchange::melee(attacker, defender)
        }
    }

    pub fn with_cover(mut self, cover: Option<Keyword>) -> Self {
        self.cover = cover;
        self
    }
}

/// Damage inflicted in an exchange, split by phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WoundsByPhase {
    pub missile: u32,
    pub melee: u32,
}

impl WoundsByPhase {
    pub fn record(&mut self, phase: Phase, wounds: u32) {
        match phase {
            Phase::Missile => self.missile += wounds,
            Phase::Melee => self.melee += wounds,
        }
    }
}

impl std::ops::AddAssign for WoundsByPhase {
    fn add_assign(&mut self, rhs: Self) {
        self.missile += rhs.missile;
        self.melee += rhs.melee;
    }
}

/// Result of one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeOutcome {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub phase: Phase,
    pub charging: bool,
    /// Set when the defender was reduced to nothing by this exchange
    pub winner: Option<UnitId>,
    /// Models the winner has left, when there is a winner
    pub survivors: Option<u32>,
    pub wounds_by_phase: WoundsByPhase,
    pub dice_rolled: usize,
    pub rolled: WoundPool,
    pub defense: DefendReport,
}

impl ExchangeOutcome {
    pub fn models_killed(&self) -> u32 {
        self.defense.models_killed
    }

    pub fn defender_destroyed(&self) -> bool {
        self.winner.is_some()
    }
}

/// Resolve one attack between two living units
///
/// A destroyed defender has its melee lock broken on both ends before this
/// returns.
pub fn resolve_exchange<R: Rng + ?Sized>(
    units: &mut EntityStore<Unit>,
    exchange: Exchange,
    rng: &mut R,
) -> Result<ExchangeOutcome> {
    let (attacker, defender) = units.get_pair_mut(exchange.attacker, exchange.defender)?;
    if !attacker.is_alive() || !defender.is_alive() {
        return Err(SkirmishError::InvalidAction(format!(
            "exchange between {} and {} needs two living units",
            exchange.attacker, exchange.defender
        )));
    }

    let pool = attacker.attack_dice(exchange.phase, exchange.charging);
    let rolled = crate::core::dice::roll_pool(&pool, attacker.caps.slayer, rng);
    let modifier = attacker.save_modifier(exchange.phase);

    let defense = match exchange.cover {
        Some(keyword) if !defender.keywords.contains(&keyword) => {
            let own = defender.caps.clone();
            let mut granted = defender.keywords.clone();
            granted.push(keyword);
            defender.caps = Capabilities {
                shields: own.shields,
                ..Capabilities::from_keywords(&granted)
            };
            let report = defender.defend(rolled, modifier, &attacker.caps, exchange.phase, rng);
            defender.caps = own;
            report
        }
        _ => defender.defend(rolled, modifier, &attacker.caps, exchange.phase, rng),
    };

    let destroyed = !defender.is_alive();
    let mut wounds_by_phase = WoundsByPhase::default();
    wounds_by_phase.record(exchange.phase, defense.damage);
    let outcome = ExchangeOutcome {
        attacker: exchange.attacker,
        defender: exchange.defender,
        phase: exchange.phase,
        charging: exchange.charging,
        winner: destroyed.then_some(exchange.attacker),
        survivors: destroyed.then_some(attacker.num_models),
        wounds_by_phase,
        dice_rolled: pool.len(),
        rolled,
        defense,
    };

    if destroyed {
        break_melee_lock(units, exchange.defender);
    }
    Ok(outcome)
}

/// Clear `unit`'s melee lock on both ends; returns the former partner
pub fn break_melee_lock(units: &mut EntityStore<Unit>, unit: UnitId) -> Option<UnitId> {
    let partner = units.get_mut(unit).ok()?.melee_target.take()?;
    if let Ok(other) = units.get_mut(partner) {
        if other.melee_target == Some(unit) {
            other.melee_target = None;
        }
    }
    Some(partner)
}

/// Lock two units in melee with each other, releasing any previous partners
pub fn lock_in_melee(units: &mut EntityStore<Unit>, a: UnitId, b: UnitId) -> Result<()> {
    break_melee_lock(units, a);
    break_melee_lock(units, b);
    let (first, second) = units.get_pair_mut(a, b)?;
    first.melee_target = Some(b);
    second.melee_target = Some(a);
    Ok(())
}

/// True when `unit` and its melee target point at each other and both live
pub fn melee_link_consistent(units: &EntityStore<Unit>, unit: UnitId) -> bool {
    let Ok(me) = units.get(unit) else {
        return false;
    };
    let Some(target) = me.melee_target else {
        return true;
    };
    match units.get(target) {
        Ok(other) => other.is_alive() && other.melee_target == Some(unit),
        Err(_) => false,
    }
}
