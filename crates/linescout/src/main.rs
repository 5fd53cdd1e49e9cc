// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LineScout - sourcing marketplace backend.
//!
//! This is the binary entry point: the HTTP server plus a few operator
//! commands for migrations, account provisioning and config checks.

mod serve;
mod shutdown;
mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linescout_config::model::LineScoutConfig;
use linescout_config::ConfigError;
use linescout_core::{LineScoutError, Role};
use linescout_storage::Database;

/// LineScout - sourcing marketplace backend.
#[derive(Parser, Debug)]
#[command(name = "linescout", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./linescout.toml, then the XDG config dir).
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Manage accounts.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create an account and print its bearer token.
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// One of: user, agent, admin.
        #[arg(long, default_value = "user")]
        role: Role,
        #[arg(long)]
        phone: Option<String>,
        /// Token lifetime in days; omit for a non-expiring token.
        #[arg(long)]
        token_days: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate the configuration and print the effective values.
    Check,
}

fn load_config(path: Option<&PathBuf>) -> Result<LineScoutConfig, Vec<ConfigError>> {
    match path {
        Some(path) => linescout_config::load_and_validate_path(path),
        None => linescout_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            linescout_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.server.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Migrate) => run_migrate(&config).await,
        Some(Commands::User {
            action:
                UserCommands::Add {
                    email,
                    name,
                    role,
                    phone,
                    token_days,
                },
        }) => {
            let account = user::NewAccount {
                email,
                display_name: name,
                phone,
                role,
                token_days,
            };
            run_user_add(&config, account).await
        }
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => run_config_check(&config),
        None => {
            println!("linescout: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run_migrate(config: &LineScoutConfig) -> Result<(), LineScoutError> {
    let db = Database::from_config(&config.storage).await?;
    db.close().await?;
    println!("database migrated: {}", config.storage.database_path);
    Ok(())
}

async fn run_user_add(
    config: &LineScoutConfig,
    account: user::NewAccount,
) -> Result<(), LineScoutError> {
    let db = Database::from_config(&config.storage).await?;
    let (user, token) = user::add_user(&db, account).await?;
    db.close().await?;
    println!("id:    {}", user.id);
    println!("role:  {}", user.role);
    println!("token: {token}");
    Ok(())
}

fn run_config_check(config: &LineScoutConfig) -> Result<(), LineScoutError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| LineScoutError::Config(format!("failed to render config: {e}")))?;
    println!("configuration OK\n");
    print!("{rendered}");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("linescout={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_user_add() {
        let cli = Cli::try_parse_from([
            "linescout", "user", "add", "--email", "a@x.io", "--name", "Ada", "--role", "agent",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::User {
                action: UserCommands::Add { role, token_days, .. },
            }) => {
                assert_eq!(role, Role::Agent);
                assert!(token_days.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(
            Cli::try_parse_from([
                "linescout", "user", "add", "--email", "a@x.io", "--name", "Ada", "--role", "root",
            ])
            .is_err()
        );
    }

    #[test]
    fn loads_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linescout.toml");
        std::fs::write(&path, "[server]\nport = 9191\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9191);
    }

    #[test]
    fn explicit_config_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linescout.toml");
        std::fs::write(&path, "[server]\nprot = 9191\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[tokio::test]
    async fn migrate_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LineScoutConfig::default();
        config.storage.database_path = dir.path().join("ls.db").to_string_lossy().to_string();
        run_migrate(&config).await.unwrap();
        run_migrate(&config).await.unwrap();
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = linescout_config::load_and_validate_str("").expect("default config is valid");
        assert_eq!(config.server.port, LineScoutConfig::default().server.port);
    }
}
