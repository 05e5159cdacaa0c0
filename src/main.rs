//! Baduk-Engine: play Go against an automated opponent.
//!
//! ## Usage
//!
//! - `baduk-engine` - Show a demo game
//! - `baduk-engine serve` - Read commands on stdin, answer on stdout
//! - `baduk-engine demo` - Play a short scripted game against the opponent

use std::io;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use baduk_engine::board::Board;
use baduk_engine::config::{EngineConfig, StrategyKind};
use baduk_engine::constants::DEFAULT_BOARD_SIZE;
use baduk_engine::protocol::ProtocolServer;
use baduk_engine::store::SessionStore;

/// Baduk-Engine: Go against an automated opponent
#[derive(Parser)]
#[command(name = "baduk-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Board size for games created without one (9, 13 or 19)
    #[arg(long, env = "BADUK_BOARD_SIZE", default_value_t = DEFAULT_BOARD_SIZE)]
    board_size: usize,

    /// Opponent policy
    #[arg(long, env = "BADUK_STRATEGY", value_enum, default_value_t = StrategyKind::Heuristic)]
    strategy: StrategyKind,

    /// Time budget for one opponent move, in milliseconds
    #[arg(long, env = "BADUK_BUDGET_MS", default_value_t = 2000)]
    budget_ms: u64,

    /// RNG seed for the opponent
    #[arg(long, env = "BADUK_SEED")]
    seed: Option<u64>,

    /// Identity the commands act as
    #[arg(long, env = "BADUK_OWNER", default_value = "player")]
    owner: String,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, env = "BADUK_LOG", default_value = "warn")]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the text command protocol on stdin/stdout
    Serve,
    /// Play a short scripted game against the opponent
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    initialize_logging(cli.log_level);

    let config = EngineConfig {
        default_board_size: cli.board_size,
        strategy: cli.strategy,
        strategy_budget: Duration::from_millis(cli.budget_ms),
        seed: cli.seed,
    }
    .validated()?;
    info!(?config, "starting");

    let store = SessionStore::new(config);
    match cli.command {
        Some(Commands::Serve) => {
            let mut server = ProtocolServer::new(store, cli.owner);
            server.run(io::stdin().lock(), io::stdout())?;
        }
        Some(Commands::Demo) | None => run_demo(&store, &cli.owner)?,
    }
    Ok(())
}

fn run_demo(store: &SessionStore, owner: &str) -> anyhow::Result<()> {
    println!("Baduk-Engine: Go against an automated opponent\n");

    let game = store.create(owner, None)?;
    let center = game.board_size / 2;
    let script = [(center, center), (center - 2, center + 2), (center + 2, center - 2)];

    for (row, col) in script {
        match store.place(game.id, owner, row, col) {
            Ok(snap) => {
                let reply = snap
                    .ai_move
                    .map(|mv| mv.to_string())
                    .unwrap_or_else(|| "none".into());
                println!("Black at ({row}, {col}), opponent: {reply}");
                println!("{}", Board::try_from(snap.board).map_err(anyhow::Error::msg)?);
            }
            Err(err) => println!("Black at ({row}, {col}) rejected: {err}"),
        }
    }

    let snap = store.pass(game.id, owner)?;
    println!(
        "Black passes. Status: {:?}, captures human {} / opponent {}",
        snap.game_status, snap.captured_by_human, snap.captured_by_ai
    );
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}
