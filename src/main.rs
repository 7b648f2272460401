//! Coreplus Server: the extension-driven API and admin site.
//!
//! Main entry point that loads configuration, composes the installed apps
//! and serves them, or prints the hook registry for operators.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use coreplus::compose;
use coreplus_api::{AppState, run_server};
use coreplus_core::config::AppConfig;
use coreplus_core::error::AppError;

/// Coreplus: pluggable API and admin site
#[derive(Debug, Parser)]
#[command(name = "coreplus-server", version, about, long_about = None)]
struct Cli {
    /// Configuration overlay loaded over `config/default.toml`
    #[arg(short, long, default_value = "development", env = "COREPLUS_ENV")]
    env: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the server (default)
    Serve,
    /// Print every hook and its contributors as JSON
    Hooks,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, cli.env).await,
        Commands::Hooks => print_hooks(config).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Coreplus failed");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn serve(config: AppConfig, env: String) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), env = %env, "Starting Coreplus");

    let state = compose(config).await?;
    spawn_reload_on_hangup(state.clone(), env);
    run_server(state).await
}

async fn print_hooks(config: AppConfig) -> Result<(), AppError> {
    let state = compose(config).await?;
    let hooks = state.hooks.describe().await?;
    println!("{}", serde_json::to_string_pretty(&hooks)?);
    Ok(())
}

/// Re-reads `[coreplus]` on SIGHUP and notifies the settings facade.
#[cfg(unix)]
fn spawn_reload_on_hangup(state: AppState, env: String) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(e) => {
                tracing::warn!(error = %e, "SIGHUP reload unavailable");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            match AppConfig::load(&env) {
                Ok(config) => {
                    state.settings.set_user_settings(config.coreplus);
                    let _ = state
                        .setting_changed
                        .send(coreplus_core::configs::SettingChanged::coreplus());
                    tracing::info!("Configuration reloaded");
                }
                Err(e) => tracing::error!(error = %e, "Configuration reload failed"),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_state: AppState, _env: String) {}
