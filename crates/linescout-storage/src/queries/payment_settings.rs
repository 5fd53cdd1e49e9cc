// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment provider selection: one global row plus optional per-owner overrides.

use linescout_core::{LineScoutError, PaymentProvider};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::rows::{enum_col, optional};

/// Scope key of the platform-wide setting.
pub const GLOBAL_SCOPE: &str = "global";

/// Set the provider for `scope` (`GLOBAL_SCOPE` or an owner id).
pub async fn set_payment_provider(
    db: &Database,
    scope: &str,
    provider: PaymentProvider,
    now: &str,
) -> Result<(), LineScoutError> {
    let scope = scope.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO payment_provider_settings (scope, provider, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(scope) DO UPDATE SET provider = excluded.provider,
                     updated_at = excluded.updated_at",
                params![scope, provider.to_string(), now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_payment_provider(
    db: &Database,
    scope: &str,
) -> Result<Option<PaymentProvider>, LineScoutError> {
    let scope = scope.to_string();
    db.connection()
        .call(move |conn| {
            optional(conn.query_row(
                "SELECT provider FROM payment_provider_settings WHERE scope = ?1",
                params![scope],
                |row| enum_col(row, 0),
            ))
        })
        .await
        .map_err(map_tr_err)
}
