//! # Courtside Register
//!
//! Terminal register for a sports venue: expense cards, walk-in sales,
//! payment settlement and the pre-scheduled team list.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Courtside Register                               │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  shell.rs ─────► reads lines, parses with clap, prints results   │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  commands/ ──► tickets, settlement, catalog, roster              │  │
//! │  │  state/ ─────► BoardState, SettlementState, RosterState,         │  │
//! │  │                StoreState, RemoteState, ConfigState              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                 │                                   │                   │
//! │                 ▼                                   ▼                   │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐  │
//! │  │  courtside.db (SQLite, WAL)  │   │  Backend functions + roster  │  │
//! │  │  ledgers, payments, slot     │   │  (HTTP, JSON)                │  │
//! │  └──────────────────────────────┘   └──────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr, so the shell owns stdout)
//! 2. Load configuration
//! 3. Open the local store and run migrations
//! 4. Restore both pending ledgers
//! 5. Build the backend and roster clients
//! 6. Fetch catalog and discounts for the active board
//! 7. Run the shell on stdin/stdout

pub mod commands;
pub mod error;
pub mod shell;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use directories::ProjectDirs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use courtside_api::{HttpBackend, RestRoster, RosterSource};
use courtside_core::LedgerScope;
use courtside_db::{Database, DbConfig, LocalStore, MemoryStore};

use shell::Shell;
use state::{
    BoardState, Boards, ConfigState, RemoteState, RosterState, SettlementState, StoreState,
};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "courtside-register", version, about = "Courtside POS register")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Local store file (overrides COURTSIDE_DB_PATH)
    #[arg(long, conflicts_with = "ephemeral")]
    pub db: Option<PathBuf>,

    /// Keep ledgers and payments in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

/// Runs the register until `quit` or end of input.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    info!("Starting Courtside register");

    let config = ConfigState::load_or_default(cli.config);

    let store: Arc<dyn LocalStore> = if cli.ephemeral {
        info!("Using in-memory local store");
        Arc::new(MemoryStore::new())
    } else {
        let db_path = match cli.db {
            Some(path) => path,
            None => get_database_path()?,
        };
        info!(?db_path, "Database path determined");
        Arc::new(Database::new(DbConfig::new(db_path)).await?)
    };

    let expense = store.load_ledger(LedgerScope::ExpensePending).await?;
    let walk_in = store.load_ledger(LedgerScope::WalkInPending).await?;

    let backend = Arc::new(HttpBackend::new(config.client_config())?);
    let roster: Option<Arc<dyn RosterSource>> = match config.roster_config() {
        Some(roster_config) => Some(Arc::new(RestRoster::new(&roster_config)?)),
        None => {
            info!("Roster database not configured");
            None
        }
    };

    let shell = Shell {
        boards: BoardState::new(Boards::new(expense, walk_in)),
        settlement: SettlementState::new(),
        roster: RosterState::new(),
        store: StoreState::new(store),
        remote: RemoteState::new(backend, roster),
        config,
    };

    info!("State initialized");

    // Mounting the board loads its catalog; the register works offline too
    if let Err(e) = commands::catalog::refresh_catalog(&shell.boards, &shell.remote).await {
        warn!(error = %e, "Catalog not loaded at startup");
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell.run(stdin, tokio::io::stdout()).await?;

    info!("Register closed");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=courtside=trace` - Trace the courtside crates only
/// - Default: `info,courtside=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,courtside=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path based on the platform.
///
/// ## Development Override
/// Set `COURTSIDE_DB_PATH` to use a custom path.
fn get_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("COURTSIDE_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "courtside", "pos")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("courtside.db"))
}
