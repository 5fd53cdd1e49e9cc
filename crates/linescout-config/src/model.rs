// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the LineScout backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use linescout_core::PaymentProvider;
use serde::{Deserialize, Serialize};

/// Top-level LineScout configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineScoutConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat gating settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Payment and payout settings.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Email/SMS delivery settings.
    #[serde(default)]
    pub messaging: MessagingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("linescout").join("linescout.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("linescout.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Chat gating configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Length of the free limited-human window, in minutes.
    #[serde(default = "default_limited_chat_minutes")]
    pub limited_chat_minutes: u32,

    /// Price of unlocking paid human chat.
    #[serde(default = "default_paid_chat_price")]
    pub paid_chat_price: f64,

    /// ISO 4217 currency code for all prices.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            limited_chat_minutes: default_limited_chat_minutes(),
            paid_chat_price: default_paid_chat_price(),
            currency: default_currency(),
        }
    }
}

fn default_limited_chat_minutes() -> u32 {
    30
}

fn default_paid_chat_price() -> f64 {
    5000.0
}

fn default_currency() -> String {
    "NGN".to_string()
}

/// Payment and payout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Provider used when neither an owner override nor a global setting exists.
    #[serde(default = "default_provider")]
    pub default_provider: PaymentProvider,

    /// Share of paid product value credited to the claiming agent, in percent.
    #[serde(default = "default_agent_commission_percent")]
    pub agent_commission_percent: f64,

    /// Smallest payout an owner may request.
    #[serde(default = "default_min_payout")]
    pub min_payout: f64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            agent_commission_percent: default_agent_commission_percent(),
            min_payout: default_min_payout(),
        }
    }
}

fn default_provider() -> PaymentProvider {
    PaymentProvider::Paystack
}

fn default_agent_commission_percent() -> f64 {
    5.0
}

fn default_min_payout() -> f64 {
    1000.0
}

/// Email/SMS relay configuration. Unset endpoints disable that medium.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagingConfig {
    /// HTTP endpoint accepting JSON email deliveries.
    #[serde(default)]
    pub email_endpoint: Option<String>,

    /// HTTP endpoint accepting JSON SMS deliveries.
    #[serde(default)]
    pub sms_endpoint: Option<String>,

    /// Bearer key sent to both endpoints.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender name shown to recipients.
    #[serde(default = "default_sender")]
    pub sender: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            email_endpoint: None,
            sms_endpoint: None,
            api_key: None,
            sender: default_sender(),
        }
    }
}

fn default_sender() -> String {
    "LineScout".to_string()
}

impl MessagingConfig {
    /// Whether any delivery endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        self.email_endpoint.is_some() || self.sms_endpoint.is_some()
    }
}
