//! Skirmish simulator - Main Binary
//!
//! Runs single battles, parallel tournaments and unit duels from the
//! command line.

use clap::{Parser, Subcommand, ValueEnum};
use skirmish_sim::{
    config::RulesConfig,
    core::{Side, UnitTemplate},
    duel::simulate_duels,
    game::{first_side, BattleLoop, BoardSnapshot, Strategy, VerbosityLevel},
    loader::{builtin_rosters, builtin_template, init_battle, load_rosters, Roster},
    tournament::{run_battles, PolicyType, TournamentConfig},
    Result, SkirmishError,
};
use std::path::PathBuf;
use std::time::Instant;

/// Policy type for each side
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Most expensive unit, nearest objective, first target (for testing)
    Zero,
    /// Makes random choices
    Random,
    /// Evaluation-based policy
    Heuristic,
    /// Weighted coin flips from a strategy vector (see --strategy1/--strategy2)
    Genetic,
}

impl PolicyArg {
    fn resolve(self, strategy: Option<Strategy>) -> PolicyType {
        match self {
            PolicyArg::Zero => PolicyType::Zero,
            PolicyArg::Random => PolicyType::Random,
            PolicyArg::Heuristic => PolicyType::Heuristic,
            PolicyArg::Genetic => PolicyType::Genetic(strategy.unwrap_or_default()),
        }
    }
}

/// Verbosity level for battle output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

/// Strategy weights as "capture,elimination,missile,melee"
fn parse_strategy(s: &str) -> std::result::Result<Strategy, String> {
    let weights: Vec<f64> = s
        .split(',')
        .map(|w| w.trim().parse::<f64>().map_err(|e| format!("invalid weight '{w}': {e}")))
        .collect::<std::result::Result<_, _>>()?;
    match weights.as_slice() {
        [capture, elimination, missile, melee] => Ok(Strategy::new(*capture, *elimination, *missile, *melee)),
        _ => Err(format!("expected 4 comma-separated weights, got {}", weights.len())),
    }
}

/// Options shared by battle and tourney
#[derive(clap::Args, Debug)]
struct MatchupArgs {
    /// Roster file (.json) for side A (default: built-in Solar Knights)
    #[arg(long, value_name = "ROSTER")]
    roster1: Option<PathBuf>,

    /// Roster file (.json) for side B (default: built-in Aliens)
    #[arg(long, value_name = "ROSTER")]
    roster2: Option<PathBuf>,

    /// Side A policy
    #[arg(long, value_enum, default_value = "heuristic")]
    p1: PolicyArg,

    /// Side B policy
    #[arg(long, value_enum, default_value = "heuristic")]
    p2: PolicyArg,

    /// Strategy weights for a genetic side A policy
    #[arg(long, value_parser = parse_strategy)]
    strategy1: Option<Strategy>,

    /// Strategy weights for a genetic side B policy
    #[arg(long, value_parser = parse_strategy)]
    strategy2: Option<Strategy>,

    /// Rules file (.json); missing fields keep their defaults
    #[arg(long, value_name = "RULES")]
    rules: Option<PathBuf>,

    /// Override the number of turns per battle
    #[arg(long)]
    max_turns: Option<u32>,

    /// Set random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

impl MatchupArgs {
    fn policies(&self) -> (PolicyType, PolicyType) {
        (self.p1.resolve(self.strategy1), self.p2.resolve(self.strategy2))
    }

    fn rules(&self) -> Result<RulesConfig> {
        let mut rules = match &self.rules {
            Some(path) => RulesConfig::load_from_file(path)?,
            None => RulesConfig::default(),
        };
        if let Some(turns) = self.max_turns {
            rules.max_turns = turns;
        }
        Ok(rules)
    }

    async fn rosters(&self) -> Result<[Roster; 2]> {
        let [default_a, default_b] = builtin_rosters();
        let paths: Vec<PathBuf> = [&self.roster1, &self.roster2].into_iter().flatten().cloned().collect();
        let mut loaded = load_rosters(&paths).await?.into_iter();
        let a = match self.roster1 {
            Some(_) => loaded.next().unwrap_or(default_a),
            None => default_a,
        };
        let b = match self.roster2 {
            Some(_) => loaded.next().unwrap_or(default_b),
            None => default_b,
        };
        Ok([a, b])
    }

    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[derive(Parser)]
#[command(name = "skirmish")]
#[command(about = "Dice-based skirmish battle simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one battle and print its log
    Battle {
        #[command(flatten)]
        matchup: MatchupArgs,

        /// Verbosity level for battle output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Print the final board snapshot as JSON
        #[arg(long)]
        dump_state: bool,
    },

    /// Run many battles in parallel and report statistics
    Tourney {
        #[command(flatten)]
        matchup: MatchupArgs,

        /// Number of battles to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        battles: usize,
    },

    /// Pit two unit templates against each other repeatedly
    Duel {
        /// First unit template name
        unit1: String,

        /// Second unit template name
        unit2: String,

        /// Extra roster files (.json) to look templates up in
        #[arg(long = "roster", value_name = "ROSTER")]
        rosters: Vec<PathBuf>,

        /// Number of duels
        #[arg(long, short = 'n', default_value_t = 100)]
        count: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Battle {
            matchup,
            verbosity,
            dump_state,
        } => run_battle(matchup, verbosity.into(), dump_state).await?,
        Commands::Tourney { matchup, battles } => run_tourney(matchup, battles).await?,
        Commands::Duel {
            unit1,
            unit2,
            rosters,
            count,
            seed,
        } => run_duel(unit1, unit2, rosters, count, seed).await?,
    }

    Ok(())
}

async fn run_battle(matchup: MatchupArgs, verbosity: VerbosityLevel, dump_state: bool) -> Result<()> {
    let [roster_a, roster_b] = matchup.rosters().await?;
    let rules = matchup.rules()?;
    let seed = matchup.seed();
    let (policy_a, policy_b) = matchup.policies();

    if verbosity >= VerbosityLevel::Minimal {
        println!("=== {} vs {} (seed {seed}) ===", roster_a.name, roster_b.name);
    }

    let mut state = init_battle(&roster_a, &roster_b, &rules, seed)?;
    let mut controller_a = policy_a.build(seed.wrapping_add(0x1234_5678_9ABC_DEF0));
    let mut controller_b = policy_b.build(seed.wrapping_add(0xFEDC_BA98_7654_3210));

    let result = {
        let mut battle = BattleLoop::new(&mut state).with_verbosity(verbosity);
        battle.run_battle(&mut *controller_a, &mut *controller_b)?
    };

    if verbosity >= VerbosityLevel::Minimal {
        println!(
            "Final score {} - {} after {} turns",
            result.scores[0], result.scores[1], result.turns_played
        );
        println!(
            "Units wiped: A {:.0}%, B {:.0}%",
            result.wiped_percent(Side::A),
            result.wiped_percent(Side::B)
        );
        println!(
            "Kills: A missile {} melee {}, B missile {} melee {}",
            result.missile_kills[0], result.melee_kills[0], result.missile_kills[1], result.melee_kills[1]
        );
        if result.issue_count() > 0 {
            println!("Rule violations recovered: {}", result.issue_count());
        }
    }

    if dump_state {
        let snapshot = BoardSnapshot::capture(&state, first_side(result.turns_played + 1));
        println!("{}", snapshot.to_json()?);
    }
    Ok(())
}

async fn run_tourney(matchup: MatchupArgs, battles: usize) -> Result<()> {
    println!("=== Skirmish Simulator - Tournament Mode ===\n");
    let [roster_a, roster_b] = matchup.rosters().await?;
    let seed = matchup.seed();
    let (policy_a, policy_b) = matchup.policies();
    println!("{} ({policy_a:?}) vs {} ({policy_b:?})", roster_a.name, roster_b.name);
    println!("Running {battles} battles with seed {seed}\n");

    let config = TournamentConfig::new(roster_a, roster_b, battles)
        .with_policies(policy_a, policy_b)
        .with_rules(matchup.rules()?)
        .with_seed(seed);

    let start = Instant::now();
    let stats = run_battles(&config);
    let elapsed = start.elapsed();

    println!("=== Tournament Complete ===");
    println!("{stats}");
    println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    println!("Battles per second: {:.2}", stats.battles as f64 / elapsed.as_secs_f64());
    Ok(())
}

async fn run_duel(unit1: String, unit2: String, roster_paths: Vec<PathBuf>, count: usize, seed: u64) -> Result<()> {
    let rosters = load_rosters(&roster_paths).await?;
    let find = |name: &str| -> Result<UnitTemplate> {
        rosters
            .iter()
            .find_map(|r| r.find_template(name).cloned())
            .or_else(|| builtin_template(name))
            .ok_or_else(|| SkirmishError::InvalidRoster(format!("Unknown unit template '{name}'")))
    };
    let a = find(&unit1)?;
    let b = find(&unit2)?;

    println!("=== {} vs {}: {count} duels ===\n", a.name, b.name);
    let stats = simulate_duels(&a, &b, count, seed)?;
    println!("{stats}");
    Ok(())
}
