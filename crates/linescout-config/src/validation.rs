// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and percentage ranges.

use crate::diagnostic::ConfigError;
use crate::model::LineScoutConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LineScoutConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.chat.limited_chat_minutes == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.limited_chat_minutes must be at least 1".to_string(),
        });
    }

    if config.chat.paid_chat_price < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.paid_chat_price must be non-negative, got {}",
                config.chat.paid_chat_price
            ),
        });
    }

    if config.chat.currency.len() != 3 || !config.chat.currency.chars().all(|c| c.is_ascii_uppercase())
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.currency must be a 3-letter uppercase ISO code, got `{}`",
                config.chat.currency
            ),
        });
    }

    let commission = config.payments.agent_commission_percent;
    if !(0.0..=100.0).contains(&commission) {
        errors.push(ConfigError::Validation {
            message: format!(
                "payments.agent_commission_percent must be within 0..=100, got {commission}"
            ),
        });
    }

    if config.payments.min_payout < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "payments.min_payout must be non-negative, got {}",
                config.payments.min_payout
            ),
        });
    }

    for (key, endpoint) in [
        ("messaging.email_endpoint", &config.messaging.email_endpoint),
        ("messaging.sms_endpoint", &config.messaging.sms_endpoint),
    ] {
        if let Some(url) = endpoint
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be an http(s) URL, got `{url}`"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
