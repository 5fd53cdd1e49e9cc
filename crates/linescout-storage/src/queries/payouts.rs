// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Withdrawal requests against wallet balances.
//!
//! Creation goes through the billing crate, which checks the available
//! balance and inserts the row in one transaction.

use linescout_core::{LineScoutError, PayoutRequest, PayoutStatus};
use rusqlite::{params, Connection};
use tracing::info;

use crate::database::{map_tr_err, Database};
use crate::rows::{self, optional, PAYOUT_COLUMNS};

fn load(conn: &Connection, id: &str) -> rusqlite::Result<Option<PayoutRequest>> {
    optional(conn.query_row(
        &format!("SELECT {PAYOUT_COLUMNS} FROM payout_requests WHERE id = ?1"),
        params![id],
        rows::payout,
    ))
}

/// Insert a payout row on an open connection or transaction.
pub fn insert_payout_request(conn: &Connection, payout: &PayoutRequest) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO payout_requests (id, owner_id, amount, status, bank_name, account_number,
             account_name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            payout.id,
            payout.owner_id,
            payout.amount,
            payout.status.to_string(),
            payout.bank_name,
            payout.account_number,
            payout.account_name,
            payout.created_at,
            payout.updated_at,
        ],
    )?;
    Ok(())
}

pub async fn get_payout_request(
    db: &Database,
    id: &str,
) -> Result<Option<PayoutRequest>, LineScoutError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| load(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Payout requests, newest first; all owners when `owner_id` is `None`.
pub async fn list_payout_requests(
    db: &Database,
    owner_id: Option<&str>,
) -> Result<Vec<PayoutRequest>, LineScoutError> {
    let owner_id = owner_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYOUT_COLUMNS} FROM payout_requests
                 WHERE ?1 IS NULL OR owner_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], rows::payout)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Advance a payout: `pending → approved | rejected`, `approved → paid | rejected`.
pub async fn update_payout_status(
    db: &Database,
    id: &str,
    next: PayoutStatus,
    now: &str,
) -> Result<PayoutRequest, LineScoutError> {
    let id = id.to_string();
    let now = now.to_string();
    let payout = db
        .connection()
        .call(move |conn| {
            let Some(current) = load(conn, &id)? else {
                return Ok(Err(LineScoutError::not_found("payout request", &id)));
            };
            if !current.status.can_transition_to(next) {
                return Ok(Err(LineScoutError::conflict(format!(
                    "payout cannot move from {} to {next}",
                    current.status
                ))));
            }
            let updated = conn.execute(
                "UPDATE payout_requests SET status = ?1, updated_at = ?2
                 WHERE id = ?3 AND status = ?4",
                params![next.to_string(), now, id, current.status.to_string()],
            )?;
            if updated == 0 {
                return Ok(Err(LineScoutError::conflict("payout changed concurrently")));
            }
            Ok(load(conn, &id)?.ok_or_else(|| LineScoutError::not_found("payout request", &id)))
        })
        .await
        .map_err(map_tr_err)??;
    info!(payout_id = %payout.id, status = %payout.status, "payout status updated");
    Ok(payout)
}
