mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rps_core::{RpsConfig, SqliteLedger, SystemClock};
use rps_game::{build_service, GameContract};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rps")]
#[command(about = "Rock-paper-scissors on a versioned ledger")]
#[command(version)]
struct Cli {
    /// Data directory for the ledger and config.json
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new game
    Create {
        /// Game name
        name: String,
        /// Seconds until the game can be ended
        duration: String,
        /// Creating player
        player: String,
    },
    /// Join an existing game as the second player
    Join {
        /// Game name
        name: String,
        /// Joining player
        player: String,
    },
    /// End a game, starting reconstruction if its time is up
    End {
        /// Game name
        name: String,
    },
    /// Send a raw operation to the contract
    Invoke {
        /// Operation name, e.g. createGame
        function: String,
        /// Positional arguments
        args: Vec<String>,
    },
    /// Show game status
    Status {
        /// Game name
        name: String,
    },
    /// List games
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "rps={},rps_game={},rps_core={}",
            log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rps")
    });
    tokio::fs::create_dir_all(&data_dir).await?;

    let config = RpsConfig::load(&data_dir.join("config.json")).context("loading config.json")?;
    let ledger = SqliteLedger::open(&config.ledger_path(&data_dir)).await?;
    let service = build_service(&config, Arc::new(ledger), Arc::new(SystemClock))?;
    let contract = GameContract::new(Arc::new(service));

    let result = match cli.command {
        Commands::Create {
            name,
            duration,
            player,
        } => commands::invoke(&contract, "createGame", vec![name, duration, player]).await,
        Commands::Join { name, player } => {
            commands::invoke(&contract, "joinGame", vec![name, player]).await
        }
        Commands::End { name } => commands::invoke(&contract, "endGame", vec![name]).await,
        Commands::Invoke { function, args } => commands::invoke(&contract, &function, args).await,
        Commands::Status { name } => commands::show_game_status(contract.service(), &name).await,
        Commands::List => commands::list_games(contract.service()).await,
    };

    contract.service().drain_reconstructions().await;

    if let Err(e) = result {
        tracing::error!("Command failed: {:#}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
