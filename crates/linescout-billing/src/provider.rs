// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Which payment provider a given owner should be sent to.

use linescout_core::{LineScoutError, PaymentProvider};
use linescout_storage::queries::payment_settings::{get_payment_provider, GLOBAL_SCOPE};
use linescout_storage::Database;
use serde::Serialize;
use strum::Display;

/// Where the resolved provider came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProviderSource {
    Owner,
    Global,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedProvider {
    pub provider: PaymentProvider,
    pub source: ProviderSource,
}

/// Per-owner override, else the global setting, else `default`.
pub async fn resolve_provider(
    db: &Database,
    owner_id: &str,
    default: PaymentProvider,
) -> Result<ResolvedProvider, LineScoutError> {
    if let Some(provider) = get_payment_provider(db, owner_id).await? {
        return Ok(ResolvedProvider {
            provider,
            source: ProviderSource::Owner,
        });
    }
    if let Some(provider) = get_payment_provider(db, GLOBAL_SCOPE).await? {
        return Ok(ResolvedProvider {
            provider,
            source: ProviderSource::Global,
        });
    }
    Ok(ResolvedProvider {
        provider: default,
        source: ProviderSource::Default,
    })
}
