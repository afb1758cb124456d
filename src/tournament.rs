//! Tournament mode for running many battles in parallel and collecting statistics
//!
//! Every battle is independent: its seed is derived from the master seed and
//! the battle index, so a tournament is reproducible no matter how rayon
//! schedules the work.

use crate::config::RulesConfig;
use crate::core::Side;
use crate::game::{
    ActivationPolicy, BattleLoop, BattleResult, GeneticPolicy, HeuristicPolicy, RandomPolicy, Strategy,
    VerbosityLevel, ZeroPolicy,
};
use crate::loader::{init_battle, Roster};
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Policy used for one side of each battle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PolicyType {
    Zero,
    Random,
    Heuristic,
    Genetic(Strategy),
}

impl PolicyType {
    /// Instantiate the policy; `seed` feeds the ones that roll dice
    pub fn build(self, seed: u64) -> Box<dyn ActivationPolicy> {
        match self {
            PolicyType::Zero => Box::new(ZeroPolicy::new()),
            PolicyType::Random => Box::new(RandomPolicy::with_seed(seed)),
            PolicyType::Heuristic => Box::new(HeuristicPolicy::new()),
            PolicyType::Genetic(strategy) => Box::new(GeneticPolicy::with_seed(strategy, seed)),
        }
    }
}

/// Tournament settings
#[derive(Debug, Clone)]
pub struct TournamentConfig {
    /// Side A roster, then side B
    pub rosters: [Roster; 2],
    pub policies: [PolicyType; 2],
    pub rules: RulesConfig,
    pub battles: usize,
    pub seed: u64,
}

impl TournamentConfig {
    pub fn new(roster_a: Roster, roster_b: Roster, battles: usize) -> Self {
        TournamentConfig {
            rosters: [roster_a, roster_b],
            policies: [PolicyType::Heuristic, PolicyType::Heuristic],
            rules: RulesConfig::default(),
            battles,
            seed: 42,
        }
    }

    pub fn with_policies(mut self, a: PolicyType, b: PolicyType) -> Self {
        self.policies = [a, b];
        self
    }

    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Seed of battle `index`
    pub fn battle_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add((index as u64).wrapping_mul(0x9E3779B97F4A7C15))
    }
}

/// Statistics collected during a tournament
///
/// Only integer totals are accumulated so the result does not depend on
/// the order battles finish in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentStats {
    pub battles: usize,
    pub failures: usize,
    pub wins: [usize; 2],
    pub draws: usize,
    pub units_wiped: [usize; 2],
    pub units_fielded: [usize; 2],
    pub missile_kills: [u64; 2],
    pub melee_kills: [u64; 2],
    pub points: [u64; 2],
}

impl TournamentStats {
    pub fn record(&mut self, result: &BattleResult) {
        self.battles += 1;
        match result.winner {
            Some(side) => self.wins[side.index()] += 1,
            None => self.draws += 1,
        }
        for side in Side::both() {
            let i = side.index();
            self.units_wiped[i] += result.units_wiped[i];
            self.units_fielded[i] += result.units_total[i];
            self.missile_kills[i] += u64::from(result.missile_kills[i]);
            self.melee_kills[i] += u64::from(result.melee_kills[i]);
            self.points[i] += u64::from(result.scores[i]);
        }
    }

    fn per_battle(&self, total: u64) -> f64 {
        if self.battles == 0 {
            0.0
        } else {
            total as f64 / self.battles as f64
        }
    }

    pub fn win_rate(&self, side: Side) -> f64 {
        self.per_battle(self.wins[side.index()] as u64) * 100.0
    }

    pub fn draw_rate(&self) -> f64 {
        self.per_battle(self.draws as u64) * 100.0
    }

    /// Average percentage of the side's units destroyed per battle
    pub fn avg_wiped_percent(&self, side: Side) -> f64 {
        let fielded = self.units_fielded[side.index()];
        if fielded == 0 {
            return 0.0;
        }
        self.units_wiped[side.index()] as f64 / fielded as f64 * 100.0
    }

    pub fn avg_missile_kills(&self, side: Side) -> f64 {
        self.per_battle(self.missile_kills[side.index()])
    }

    pub fn avg_melee_kills(&self, side: Side) -> f64 {
        self.per_battle(self.melee_kills[side.index()])
    }

    pub fn avg_points(&self, side: Side) -> f64 {
        self.per_battle(self.points[side.index()])
    }
}

impl fmt::Display for TournamentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Battles played: {}", self.battles)?;
        if self.failures > 0 {
            writeln!(f, "Battles failed: {}", self.failures)?;
        }
        writeln!(
            f,
            "Wins: A {} ({:.1}%), B {} ({:.1}%), draws {} ({:.1}%)",
            self.wins[0],
            self.win_rate(Side::A),
            self.wins[1],
            self.win_rate(Side::B),
            self.draws,
            self.draw_rate()
        )?;
        writeln!(
            f,
            "Average units wiped: A {:.2}%, B {:.2}%",
            self.avg_wiped_percent(Side::A),
            self.avg_wiped_percent(Side::B)
        )?;
        writeln!(
            f,
            "Average kills: A missile {:.2} melee {:.2}, B missile {:.2} melee {:.2}",
            self.avg_missile_kills(Side::A),
            self.avg_melee_kills(Side::A),
            self.avg_missile_kills(Side::B),
            self.avg_melee_kills(Side::B)
        )?;
        write!(
            f,
            "Average points: A {:.2}, B {:.2}",
            self.avg_points(Side::A),
            self.avg_points(Side::B)
        )
    }
}

/// Play battle `index` of the tournament silently
pub fn play_battle(config: &TournamentConfig, index: usize) -> Result<BattleResult> {
    let seed = config.battle_seed(index);
    let mut state = init_battle(&config.rosters[0], &config.rosters[1], &config.rules, seed)?;

    // Derive policy seeds
    let mut policy_a = config.policies[0].build(seed.wrapping_add(0x1234_5678_9ABC_DEF0));
    let mut policy_b = config.policies[1].build(seed.wrapping_add(0xFEDC_BA98_7654_3210));

    let mut battle = BattleLoop::new(&mut state).with_verbosity(VerbosityLevel::Silent);
    battle.run_battle(&mut *policy_a, &mut *policy_b)
}

/// Run every battle of the tournament in parallel
///
/// A failing battle is counted and skipped; it never aborts the others.
pub fn run_battles(config: &TournamentConfig) -> TournamentStats {
    let stats = Arc::new(Mutex::new(TournamentStats::default()));

    (0..config.battles).into_par_iter().for_each(|index| {
        let outcome = play_battle(config, index);
        let mut stats = stats.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(result) => stats.record(&result),
            Err(e) => {
                stats.failures += 1;
                eprintln!("Warning: battle {index} failed: {e}");
            }
        }
    });

    let totals = stats.lock().unwrap_or_else(PoisonError::into_inner).clone();
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin::{aliens_roster, solar_knights_roster};

    fn config(battles: usize) -> TournamentConfig {
        TournamentConfig::new(solar_knights_roster(), aliens_roster(), battles)
            .with_policies(PolicyType::Heuristic, PolicyType::Random)
            .with_seed(2024)
    }

    #[test]
    fn test_battle_seeds_differ() {
        let config = config(3);
        assert_ne!(config.battle_seed(0), config.battle_seed(1));
        assert_eq!(config.battle_seed(0), 2024);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = TournamentStats::default();
        let result = BattleResult {
            winner: Some(Side::B),
            scores: [1, 3],
            turns_played: 4,
            units_wiped: [2, 1],
            units_total: [5, 5],
            missile_kills: [4, 6],
            melee_kills: [0, 10],
            turns: vec![],
        };
        stats.record(&result);
        stats.record(&BattleResult {
            winner: None,
            scores: [2, 2],
            ..result.clone()
        });
        assert_eq!(stats.battles, 2);
        assert_eq!(stats.wins, [0, 1]);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.win_rate(Side::B), 50.0);
        assert_eq!(stats.avg_wiped_percent(Side::A), 40.0);
        assert_eq!(stats.avg_melee_kills(Side::B), 10.0);
        assert_eq!(stats.avg_points(Side::A), 1.5);
        assert!(stats.to_string().contains("Battles played: 2"));
    }

    #[test]
    fn test_tournament_is_reproducible() {
        let config = config(6);
        let first = run_battles(&config);
        let second = run_battles(&config);
        assert_eq!(first.battles, 6);
        assert_eq!(first.failures, 0);
        assert_eq!(first.wins[0] + first.wins[1] + first.draws, 6);
        assert_eq!(first, second);
    }
}
