//! Unit-versus-unit duels for balance evaluation
//!
//! Two units trade volleys with no board: first missile fire both ways
//! until a d20 says they close in, then melee until one unit is gone.

use crate::core::{EntityStore, Phase, Side, Unit, UnitId, UnitTemplate};
use crate::game::combat::{resolve_exchange, Exchange, WoundsByPhase};
use crate::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rounds after which a duel is called a draw
pub const MAX_DUEL_ROUNDS: u32 = 100;

/// Outcome of a single duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelResult {
    /// `None` when neither unit could finish the other
    pub winner: Option<Side>,
    /// Models the winner has left
    pub survivors: u32,
    pub rounds: u32,
    /// Damage dealt by A and by B, split by phase
    pub wounds_by_phase: [WoundsByPhase; 2],
}

/// Probability-driven switch from shooting to melee
///
/// Longer-ranged, slower opponents stay at range longer; Relentless units
/// pull the fight in.
pub fn closes_to_melee<R: Rng + ?Sized>(a: &Unit, b: &Unit, rng: &mut R) -> bool {
    let range_factor = (a.attack_range - b.movement).max(0.0) - (b.attack_range - a.movement).max(0.0);
    let melee_preference: i32 = [a, b]
        .iter()
        .map(|u| if u.caps.relentless { 1 } else { -1 })
        .sum();
    let roll = rng.gen_range(1..=20);
    roll as f64 > 5.0 + range_factor + melee_preference as f64
}

/// Fight one duel between fresh copies of `a` and `b`
pub fn simulate_duel<R: Rng + ?Sized>(a: &UnitTemplate, b: &UnitTemplate, rng: &mut R) -> Result<DuelResult> {
    let mut units = EntityStore::new();
    let id_a = units.next_id();
    units.insert(id_a, Unit::from_template(id_a, Side::A, a)?);
    let id_b = units.next_id();
    units.insert(id_b, Unit::from_template(id_b, Side::B, b)?);

    let mut phase = Phase::Missile;
    let mut wounds = [WoundsByPhase::default(); 2];
    let mut rounds = 0;

    while rounds < MAX_DUEL_ROUNDS {
        rounds += 1;
        if strike(&mut units, id_a, id_b, phase, &mut wounds[0], rng)?
            || strike(&mut units, id_b, id_a, phase, &mut wounds[1], rng)?
        {
            break;
        }
        if phase == Phase::Missile && closes_to_melee(units.get(id_a)?, units.get(id_b)?, rng) {
            phase = Phase::Melee;
        }
    }

    let alive_a = units.get(id_a)?.is_alive();
    let alive_b = units.get(id_b)?.is_alive();
    let winner = match (alive_a, alive_b) {
        (true, false) => Some(Side::A),
        (false, true) => Some(Side::B),
        _ => None,
    };
    let survivors = match winner {
        Some(Side::A) => units.get(id_a)?.living_models(),
        Some(Side::B) => units.get(id_b)?.living_models(),
        None => 0,
    };
    Ok(DuelResult {
        winner,
        survivors,
        rounds,
        wounds_by_phase: wounds,
    })
}

/// One attack; true once the defender is destroyed
///
/// The attack counts as the attacker's activation, so its own held-back
/// Last Stand casualties are removed afterwards.
fn strike<R: Rng + ?Sized>(
    units: &mut EntityStore<Unit>,
    attacker: UnitId,
    defender: UnitId,
    phase: Phase,
    wounds: &mut WoundsByPhase,
    rng: &mut R,
) -> Result<bool> {
    let exchange = Exchange {
        phase,
        ..Exchange::missile(attacker, defender)
    };
    let outcome = resolve_exchange(units, exchange, rng)?;
    *wounds += outcome.wounds_by_phase;

    let me = units.get_mut(attacker)?;
    me.has_activated = true;
    me.flush_pending_casualties();
    me.has_activated = false;
    Ok(!units.get(defender)?.is_alive() || !units.get(attacker)?.is_alive())
}

/// Aggregate over many duels between the same two templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuelStats {
    pub names: [String; 2],
    pub duels: usize,
    pub wins: [usize; 2],
    pub draws: usize,
    pub total_rounds: u64,
    pub total_wounds: [WoundsByPhase; 2],
}

impl DuelStats {
    pub fn record(&mut self, result: &DuelResult) {
        self.duels += 1;
        self.total_rounds += u64::from(result.rounds);
        match result.winner {
            Some(side) => self.wins[side.index()] += 1,
            None => self.draws += 1,
        }
        for side in Side::both() {
            self.total_wounds[side.index()] += result.wounds_by_phase[side.index()];
        }
    }

    pub fn win_rate(&self, side: Side) -> f64 {
        if self.duels == 0 {
            return 0.0;
        }
        self.wins[side.index()] as f64 / self.duels as f64 * 100.0
    }

    /// Average damage per duel dealt by `side` in `phase`
    pub fn avg_wounds(&self, side: Side, phase: Phase) -> f64 {
        if self.duels == 0 {
            return 0.0;
        }
        let wounds = &self.total_wounds[side.index()];
        let total = match phase {
            Phase::Missile => wounds.missile,
            Phase::Melee => wounds.melee,
        };
        f64::from(total) / self.duels as f64
    }
}

impl fmt::Display for DuelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Duels fought: {}", self.duels)?;
        for side in Side::both() {
            writeln!(f, "{} win rate: {:.2}%", self.names[side.index()], self.win_rate(side))?;
        }
        if self.draws > 0 {
            writeln!(f, "Draws: {}", self.draws)?;
        }
        write!(f, "Average wounds per duel:")?;
        for side in Side::both() {
            write!(
                f,
                "\n  {}: missile {:.2}, melee {:.2}",
                self.names[side.index()],
                self.avg_wounds(side, Phase::Missile),
                self.avg_wounds(side, Phase::Melee)
            )?;
        }
        Ok(())
    }
}

/// Run `count` duels in parallel, duel `i` seeded from `seed + i`
pub fn simulate_duels(a: &UnitTemplate, b: &UnitTemplate, count: usize, seed: u64) -> Result<DuelStats> {
    let results: Vec<DuelResult> = (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha12Rng::seed_from_u64(seed.wrapping_add(i as u64));
            simulate_duel(a, b, &mut rng)
        })
        .collect::<Result<_>>()?;

    let mut stats = DuelStats {
        names: [a.name.clone(), b.name.clone()],
        ..DuelStats::default()
    };
    for result in &results {
        stats.record(result);
    }
    Ok(stats)
}
