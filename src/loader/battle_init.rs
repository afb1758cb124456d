//! Battle initialization from rosters

use crate::battlefield::Battlefield;
use crate::config::RulesConfig;
use crate::core::Side;
use crate::game::BattleState;
use crate::loader::roster::Roster;
use crate::Result;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Commander name for a roster: its player, or the roster name
pub fn commander_name(roster: &Roster) -> String {
    roster.player.clone().unwrap_or_else(|| roster.name.clone())
}

/// Build a ready-to-run battle: generated board, both rosters instantiated,
/// battle RNG seeded
///
/// The board layout draws from its own generator so that the same seed
/// always produces the same board regardless of what the battle rolls.
pub fn init_battle(roster_a: &Roster, roster_b: &Roster, rules: &RulesConfig, seed: u64) -> Result<BattleState> {
    let mut board_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let field = Battlefield::generate(rules, &mut board_rng);

    let mut state = BattleState::new(commander_name(roster_a), commander_name(roster_b), field, rules.clone());
    state.seed_rng(seed);
    roster_a.instantiate(&mut state, Side::A)?;
    roster_b.instantiate(&mut state, Side::B)?;
    Ok(state)
}
