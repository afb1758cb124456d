//! Battle loop implementation
//!
//! Thin driver around the turn scheduler: deploys both forces, plays the
//! configured number of turns and decides the winner on points.

use crate::core::Side;
use crate::game::controller::{ActivationPolicy, BattleView};
use crate::game::scheduler::{TurnReport, TurnScheduler};
use crate::game::BattleState;
use crate::log_if_verbose;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Verbosity level for battle output
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during the battle
    Silent = 0,
    /// Minimal - only the battle outcome
    Minimal = 1,
    /// Normal - turns, activations and scores (default)
    #[default]
    Normal = 2,
    /// Verbose - every exchange, save and rule violation
    Verbose = 3,
}

/// Result of running a battle to completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    /// Side with more points, `None` on a draw
    pub winner: Option<Side>,
    /// Final scores for A and B
    pub scores: [u32; 2],
    pub turns_played: u32,
    /// Destroyed units per side
    pub units_wiped: [usize; 2],
    /// Units each side started with
    pub units_total: [usize; 2],
    /// Enemy models killed by each side's missile exchanges
    pub missile_kills: [u32; 2],
    /// Enemy models killed by each side's melee exchanges
    pub melee_kills: [u32; 2],
    /// Per-turn reports, in order
    pub turns: Vec<TurnReport>,
}

impl BattleResult {
    /// Percentage of `side`'s units destroyed
    pub fn wiped_percent(&self, side: Side) -> f64 {
        let total = self.units_total[side.index()];
        if total == 0 {
            return 0.0;
        }
        self.units_wiped[side.index()] as f64 / total as f64 * 100.0
    }

    /// Rule violations recorded anywhere in the battle
    pub fn issue_count(&self) -> usize {
        self.turns
            .iter()
            .map(|t| t.issues.len() + t.activations.iter().map(|a| a.issues.len()).sum::<usize>())
            .sum()
    }
}

/// Battle loop manager
pub struct BattleLoop<'a> {
    /// The battle state
    pub state: &'a mut BattleState,
    max_turns: u32,
    /// Verbosity level for output (cached from state.logger)
    pub verbosity: VerbosityLevel,
}

impl<'a> BattleLoop<'a> {
    /// Create a battle loop using the state's configured turn limit
    pub fn new(state: &'a mut BattleState) -> Self {
        let verbosity = state.logger.verbosity();
        let max_turns = state.rules.max_turns;
        BattleLoop {
            state,
            max_turns,
            verbosity,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set verbosity on the loop and on the battle's logger
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self.state.logger.set_verbosity(verbosity);
        self
    }

    /// Deploy, play every turn and score the battle
    pub fn run_battle(
        &mut self,
        policy_a: &mut dyn ActivationPolicy,
        policy_b: &mut dyn ActivationPolicy,
    ) -> Result<BattleResult> {
        self.state.deploy();
        log_if_verbose!(
            self.state.logger,
            VerbosityLevel::Normal,
            "{} ({}) vs {} ({}): {} turns",
            self.state.player(Side::A).name,
            policy_a.name(),
            self.state.player(Side::B).name,
            policy_b.name(),
            self.max_turns
        );

        let mut turns = Vec::with_capacity(self.max_turns as usize);
        for turn in 1..=self.max_turns {
            let report = TurnScheduler::new(self.state).play_turn(turn, policy_a, policy_b)?;
            turns.push(report);
        }

        let result = self.build_result(turns);
        self.announce(&result);

        policy_a.on_battle_end(&BattleView::new(self.state, Side::A), result.winner == Some(Side::A));
        policy_b.on_battle_end(&BattleView::new(self.state, Side::B), result.winner == Some(Side::B));
        Ok(result)
    }

    fn build_result(&self, turns: Vec<TurnReport>) -> BattleResult {
        let s = &*self.state;
        let scores = [s.player(Side::A).score, s.player(Side::B).score];
        let winner = match scores[0].cmp(&scores[1]) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        };
        BattleResult {
            winner,
            scores,
            turns_played: turns.len() as u32,
            units_wiped: [s.units_wiped(Side::A), s.units_wiped(Side::B)],
            units_total: [s.player(Side::A).units.len(), s.player(Side::B).units.len()],
            missile_kills: [s.player(Side::A).missile_kills, s.player(Side::B).missile_kills],
            melee_kills: [s.player(Side::A).melee_kills, s.player(Side::B).melee_kills],
            turns,
        }
    }

    fn announce(&self, result: &BattleResult) {
        match result.winner {
            Some(side) => {
                log_if_verbose!(
                    self.state.logger,
                    VerbosityLevel::Minimal,
                    "{} wins {} - {}",
                    self.state.player(side).name,
                    result.scores[side.index()],
                    result.scores[side.opponent().index()]
                );
            }
            None => {
                log_if_verbose!(
                    self.state.logger,
                    VerbosityLevel::Minimal,
                    "Draw at {} - {}",
                    result.scores[0],
                    result.scores[1]
                );
            }
        }
    }
}
