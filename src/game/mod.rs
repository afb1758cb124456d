//! Battle flow: combat, activations, turns and policies

pub mod activation;
pub mod combat;
pub mod controller;
pub mod game_loop;
pub mod genetic_controller;
pub mod heuristic_controller;
pub mod logger;
pub mod random_controller;
pub mod scheduler;
pub mod scripted_controller;
pub mod snapshot;
pub mod state;
pub mod zero_controller;

pub use activation::{ActivationController, ActivationReport, ActivationState, ChargeAttempt};
pub use combat::{resolve_exchange, Exchange, ExchangeOutcome, WoundsByPhase};
pub use controller::{ActivationPolicy, BattleView};
pub use game_loop::{BattleLoop, BattleResult, VerbosityLevel};
pub use genetic_controller::{GeneticPolicy, Strategy};
pub use heuristic_controller::HeuristicPolicy;
pub use logger::{BattleLogger, LogEntry, OutputMode};
pub use random_controller::RandomPolicy;
pub use scheduler::{allocate_ap, first_side, TurnReport, TurnScheduler};
pub use scripted_controller::{ScriptedActivation, ScriptedPolicy};
pub use snapshot::BoardSnapshot;
pub use state::BattleState;
pub use zero_controller::ZeroPolicy;
