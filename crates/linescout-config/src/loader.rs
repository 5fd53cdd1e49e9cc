// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./linescout.toml` > `~/.config/linescout/linescout.toml`
//! > `/etc/linescout/linescout.toml` with environment variable overrides via the
//! `LINESCOUT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LineScoutConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/linescout/linescout.toml` (system-wide)
/// 3. `~/.config/linescout/linescout.toml` (user XDG config)
/// 4. `./linescout.toml` (local directory)
/// 5. `LINESCOUT_*` environment variables
pub fn load_config() -> Result<LineScoutConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LineScoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LineScoutConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LineScoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LineScoutConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LineScoutConfig::default()))
        .merge(Toml::file("/etc/linescout/linescout.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("linescout/linescout.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("linescout.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `LINESCOUT_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LINESCOUT_PAYMENTS_MIN_PAYOUT` must map to
/// `payments.min_payout`, not `payments.min.payout`.
fn env_provider() -> Env {
    Env::prefixed("LINESCOUT_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("payments_", "payments.", 1)
            .replacen("messaging_", "messaging.", 1);
        mapped.into()
    })
}
