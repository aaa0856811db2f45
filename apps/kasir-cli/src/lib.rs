//! # Kasir CLI
//!
//! The operator terminal of Kasir POS. Every command prints JSON on stdout;
//! logs and errors go to stderr.
//!
//! ## Module Structure
//! ```text
//! src/
//! ├── main.rs       ◄─── entry point, exit code
//! ├── lib.rs        ◄─── run(), logging setup
//! ├── cli.rs        ◄─── argument parsing (clap)
//! ├── config.rs     ◄─── KASIR_* environment
//! ├── error.rs      ◄─── ApiError {code, message}
//! └── commands/     ◄─── one function per command
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. parse arguments ─── help and version need nothing else             │
//! │  2. load AppConfig from the environment                                │
//! │  3. open the SQLite database, run pending migrations                   │
//! │  4. execute the command, render JSON                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use commands::AppContext;
use config::AppConfig;
use error::ApiError;
use kasir_db::{Database, DbConfig};

/// Runs one invocation. `args` excludes the program name.
pub async fn run(args: Vec<String>) -> Result<String, ApiError> {
    let cli = match Cli::try_parse_from(std::iter::once("kasir".to_string()).chain(args)) {
        Ok(cli) => cli,
        Err(err) => return usage_output(err),
    };

    let config = AppConfig::load()?;
    debug!(?config, "Configuration loaded");

    let db = Database::new(
        DbConfig::new(&config.db_path).max_connections(config.db_max_connections),
    )
    .await?;
    info!(path = %config.db_path.display(), "Database ready");

    let ctx = AppContext { db, config };
    let output = commands::execute(&ctx, cli.command).await;
    ctx.db.close().await;
    output
}

/// Help and version requests are output; any other parse failure is bad usage.
fn usage_output(err: clap::Error) -> Result<String, ApiError> {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Ok(err.to_string().trim_end().to_string())
        }
        _ => Err(ApiError::validation(err.to_string().trim_end())),
    }
}

/// Logs to stderr, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kasir=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
