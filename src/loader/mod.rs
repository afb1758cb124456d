//! Roster loaders
//!
//! JSON roster files, the built-in demo forces, and battle initialization
//! from a pair of rosters.

pub mod battle_init;
pub mod builtin;
pub mod roster;

pub use battle_init::{commander_name, init_battle};
pub use builtin::{builtin_rosters, builtin_template};
pub use roster::{load_rosters, Roster, RosterEntry, RosterLoader};
