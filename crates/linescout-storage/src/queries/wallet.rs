// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wallet transaction journal. Balances are computed by the billing crate.

use linescout_core::{LineScoutError, WalletTransaction};
use rusqlite::{params, Connection};

use crate::database::{map_tr_err, Database};
use crate::rows::{self, WALLET_TRANSACTION_COLUMNS};

/// Insert a journal row on an open connection. `false` when the reference already exists.
pub fn insert_wallet_transaction_sync(
    conn: &Connection,
    tx: &WalletTransaction,
) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO wallet_transactions (id, owner_id, kind, amount, reference, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(reference) DO NOTHING",
        params![
            tx.id,
            tx.owner_id,
            tx.kind.to_string(),
            tx.amount,
            tx.reference,
            tx.description,
            tx.created_at,
        ],
    )?;
    Ok(inserted > 0)
}

/// Append a credit or debit. Idempotent per reference: returns `false` on replay.
pub async fn insert_wallet_transaction(
    db: &Database,
    tx: &WalletTransaction,
) -> Result<bool, LineScoutError> {
    if !tx.amount.is_finite() || tx.amount <= 0.0 {
        return Err(LineScoutError::validation("wallet amount must be positive"));
    }
    let tx = tx.clone();
    db.connection()
        .call(move |conn| insert_wallet_transaction_sync(conn, &tx))
        .await
        .map_err(map_tr_err)
}

/// An owner's journal, newest first.
pub async fn list_wallet_transactions(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<WalletTransaction>, LineScoutError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WALLET_TRANSACTION_COLUMNS} FROM wallet_transactions
                 WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], rows::wallet_transaction)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
