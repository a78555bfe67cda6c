use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiss_pairing::config::AppConfig;
use swiss_pairing::simulate::{default_player_names, simulate};
use swiss_pairing::storage::{list_tournaments, StorageConfig};
use swiss_pairing::tournament::{MatchOutcome, Tournament};
use swiss_pairing::{compute_total_rounds, Pairing, PairingEngine, PairingRequest, PlayerId};

#[derive(Parser)]
#[command(name = "swiss-pairing")]
#[command(about = "Swiss-system round pairing with a local tournament tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Tournament to operate on
    #[arg(long, default_value = "default")]
    tournament: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Number of rounds a field of N players plays
    Rounds {
        #[arg(long)]
        players: usize,
    },

    /// Pair a round from a JSON file holding standings and history
    Pair {
        /// Path to the request file
        #[arg(long)]
        input: PathBuf,
    },

    /// Register one or more players
    Register {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Report the result of a match
    Report {
        player_a: PlayerId,
        player_b: PlayerId,

        #[arg(long, value_enum)]
        outcome: OutcomeArg,
    },

    /// Award a bye to a player
    Bye { player: PlayerId },

    /// Show current standings
    Standings,

    /// Pair the next round of the stored tournament
    NextRound,

    /// List stored tournaments
    List,

    /// Delete stored matches, and players unless --matches-only
    Reset {
        #[arg(long)]
        matches_only: bool,
    },

    /// Simulate a whole tournament with random results
    Simulate {
        /// Number of players
        #[arg(long, default_value = "8")]
        players: usize,

        /// Random seed (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    /// First player won
    A,
    Tie,
    /// Second player won
    B,
}

impl From<OutcomeArg> for MatchOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::A => MatchOutcome::PlayerAWins,
            OutcomeArg::Tie => MatchOutcome::Tie,
            OutcomeArg::B => MatchOutcome::PlayerBWins,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting swiss-pairing v{}", env!("CARGO_PKG_VERSION"));

    let engine = PairingEngine::new(config.pairing.clone());
    tracing::debug!(
        scoring = ?engine.config().scoring,
        max_passes_per_player = engine.config().max_passes_per_player,
        "Pairing engine configured"
    );
    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Rounds { players } => {
            println!("{}", compute_total_rounds(players));
        }

        Commands::Pair { input } => {
            let contents = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let request: PairingRequest = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse pairing request {:?}", input))?;

            let pairings = engine.get_pairings(&request.standings, &request.history)?;
            println!("{}", serde_json::to_string_pretty(&pairings)?);
        }

        Commands::Register { names } => {
            let mut tournament = Tournament::load(&storage, &cli.tournament)?;
            for name in names {
                let id = tournament.register_player(name.as_str());
                println!("{}\t{}", id, name);
            }
            tournament.save(&storage)?;
        }

        Commands::Report {
            player_a,
            player_b,
            outcome,
        } => {
            let mut tournament = Tournament::load(&storage, &cli.tournament)?;
            tournament.report_match(player_a, player_b, outcome.into())?;
            tournament.save(&storage)?;
        }

        Commands::Bye { player } => {
            let mut tournament = Tournament::load(&storage, &cli.tournament)?;
            tournament.report_bye(player)?;
            tournament.save(&storage)?;
        }

        Commands::Standings => {
            let tournament = Tournament::load(&storage, &cli.tournament)?;
            println!("{:>4}  {:<24} {:>4} {:>4} {:>4} {:>6}", "id", "name", "W", "T", "L", "played");
            for s in tournament.standings() {
                println!(
                    "{:>4}  {:<24} {:>4} {:>4} {:>4} {:>6}",
                    s.id,
                    s.name,
                    s.wins,
                    s.ties,
                    s.losses(),
                    s.matches_played
                );
            }
        }

        Commands::NextRound => {
            let tournament = Tournament::load(&storage, &cli.tournament)?;
            if tournament.count_players() == 0 {
                bail!("Tournament '{}' has no registered players", tournament.name());
            }

            let pairings = tournament.swiss_pairings(&engine)?;
            if pairings.is_empty() {
                println!(
                    "Tournament complete after {} rounds",
                    tournament.rounds_played()
                );
            }
            for pairing in &pairings {
                println!("{}", format_pairing(pairing));
            }
        }

        Commands::List => {
            for name in list_tournaments(&storage)? {
                println!("{}", name);
            }
        }

        Commands::Reset { matches_only } => {
            let mut tournament = Tournament::load(&storage, &cli.tournament)?;
            if matches_only {
                tournament.delete_matches();
            } else {
                tournament.delete_players();
            }
            tournament.save(&storage)?;
        }

        Commands::Simulate { players, seed } => {
            let seed = seed
                .or(config.simulation.seed)
                .unwrap_or_else(rand::random);
            let report = simulate(&default_player_names(players), seed, &engine)?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.repeated.is_empty() {
                bail!(
                    "Simulation with seed {} repeated {} pairings",
                    seed,
                    report.repeated.len()
                );
            }
        }
    }

    Ok(())
}

fn format_pairing(pairing: &Pairing) -> String {
    match &pairing.name2 {
        Some(name2) if !pairing.is_bye() => format!(
            "{} ({}) vs {} ({})",
            pairing.name1, pairing.id1, name2, pairing.id2
        ),
        _ => format!("{} ({}) has a bye", pairing.name1, pairing.id1),
    }
}
