// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `linescout serve` command implementation.
//!
//! Opens the database (running pending migrations), builds the messenger
//! selected by `[messaging]`, and serves the HTTP API until SIGINT/SIGTERM.

use linescout_config::model::LineScoutConfig;
use linescout_core::LineScoutError;
use linescout_gateway::{start_server, AppState, ServerConfig};
use linescout_notify::{messenger_from_config, Notifier};
use linescout_storage::Database;
use tracing::info;

use crate::shutdown;

/// Runs the `linescout serve` command.
pub async fn run_serve(config: LineScoutConfig) -> Result<(), LineScoutError> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting linescout serve");

    let db = Database::from_config(&config.storage).await?;
    let messenger = messenger_from_config(&config.messaging)?;
    info!(messenger = messenger.name(), "messenger initialized");

    let notifier = Notifier::new(db.clone(), messenger);
    let state = AppState::new(db.clone(), notifier, &config);
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let cancel = shutdown::install_signal_handler();
    let shutdown_signal = async move { cancel.cancelled().await };
    start_server(&server_config, state, shutdown_signal).await?;

    db.close().await?;
    info!("linescout serve shutdown complete");
    Ok(())
}
