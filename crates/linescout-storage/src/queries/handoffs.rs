// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handoffs: paid sourcing projects claimed by exactly one agent.
//!
//! Claiming is a single conditional UPDATE on `status = 'pending'`. SQLite
//! serializes writers, so of two racing claims exactly one touches a row.

use linescout_core::{new_id, Handoff, HandoffStatus, LineScoutError, PaymentStatus};
use rusqlite::{params, Connection};
use tracing::info;

use crate::database::{map_tr_err, Database};
use crate::queries::conversations::{self, link_handoff};
use crate::rows::{self, optional, HANDOFF_COLUMNS};

pub(crate) fn load(conn: &Connection, id: &str) -> rusqlite::Result<Option<Handoff>> {
    optional(conn.query_row(
        &format!("SELECT {HANDOFF_COLUMNS} FROM handoffs WHERE id = ?1"),
        params![id],
        rows::handoff,
    ))
}

/// Open a handoff for a paid, active conversation that has none yet.
pub async fn create_handoff(
    db: &Database,
    conversation_id: &str,
    summary: &str,
    now: &str,
) -> Result<Handoff, LineScoutError> {
    let conversation_id = conversation_id.to_string();
    let summary = summary.trim().to_string();
    let now = now.to_string();
    if summary.is_empty() {
        return Err(LineScoutError::validation("handoff summary must not be empty"));
    }
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(conversation) = conversations::load(&tx, &conversation_id)? else {
                return Ok(Err(LineScoutError::not_found("conversation", &conversation_id)));
            };
            if !conversation.is_active() {
                return Ok(Err(LineScoutError::conflict("conversation is cancelled")));
            }
            if conversation.payment_status != PaymentStatus::Paid {
                return Ok(Err(LineScoutError::conflict(
                    "conversation must be paid before a handoff is opened",
                )));
            }
            let handoff = Handoff {
                id: new_id(),
                conversation_id: conversation.id.clone(),
                user_id: conversation.user_id.clone(),
                agent_id: None,
                status: HandoffStatus::Pending,
                summary,
                claimed_at: None,
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            if link_handoff(&tx, &conversation.id, &handoff.id, &now)? == 0 {
                return Ok(Err(LineScoutError::conflict(
                    "conversation already has a handoff",
                )));
            }
            tx.execute(
                "INSERT INTO handoffs (id, conversation_id, user_id, status, summary, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    handoff.id,
                    handoff.conversation_id,
                    handoff.user_id,
                    handoff.status.to_string(),
                    handoff.summary,
                    handoff.created_at,
                    handoff.updated_at,
                ],
            )?;
            tx.commit()?;
            Ok(Ok(handoff))
        })
        .await
        .map_err(map_tr_err)?
}

pub async fn get_handoff(db: &Database, id: &str) -> Result<Option<Handoff>, LineScoutError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| load(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Claim a pending handoff for `agent_id`.
///
/// Losing a race, or claiming something already claimed, yields `Conflict`.
pub async fn claim_handoff(
    db: &Database,
    id: &str,
    agent_id: &str,
    now: &str,
) -> Result<Handoff, LineScoutError> {
    let id = id.to_string();
    let agent_id = agent_id.to_string();
    let now = now.to_string();
    let handoff = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let claimed = tx.execute(
                "UPDATE handoffs SET status = 'claimed', agent_id = ?1, claimed_at = ?2, updated_at = ?2
                 WHERE id = ?3 AND status = 'pending'",
                params![agent_id, now, id],
            )?;
            if claimed == 0 {
                let err = match load(&tx, &id)? {
                    Some(_) => LineScoutError::conflict("handoff is no longer pending"),
                    None => LineScoutError::not_found("handoff", &id),
                };
                return Ok(Err(err));
            }
            tx.execute(
                "UPDATE reorders SET status = 'assigned'
                 WHERE status = 'requested'
                   AND conversation_id = (SELECT conversation_id FROM handoffs WHERE id = ?1)",
                params![id],
            )?;
            let handoff = load(&tx, &id)?;
            tx.commit()?;
            Ok(handoff.ok_or_else(|| LineScoutError::not_found("handoff", &id)))
        })
        .await
        .map_err(map_tr_err)??;
    info!(handoff_id = %handoff.id, agent_id = ?handoff.agent_id, "handoff claimed");
    Ok(handoff)
}

/// Move a claimed handoff along its lifecycle, or cancel it.
///
/// Claiming goes through [`claim_handoff`]. Cancelling also cancels the
/// handoff's outstanding quotes.
pub async fn update_handoff_status(
    db: &Database,
    id: &str,
    next: HandoffStatus,
    now: &str,
) -> Result<Handoff, LineScoutError> {
    if next == HandoffStatus::Claimed || next == HandoffStatus::Pending {
        return Err(LineScoutError::validation(format!(
            "status `{next}` cannot be set directly"
        )));
    }
    let id = id.to_string();
    let now = now.to_string();
    let handoff = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(current) = load(&tx, &id)? else {
                return Ok(Err(LineScoutError::not_found("handoff", &id)));
            };
            if !current.status.can_transition_to(next) {
                return Ok(Err(LineScoutError::conflict(format!(
                    "handoff cannot move from {} to {next}",
                    current.status
                ))));
            }
            let updated = tx.execute(
                "UPDATE handoffs SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                params![next.to_string(), now, id, current.status.to_string()],
            )?;
            if updated == 0 {
                return Ok(Err(LineScoutError::conflict("handoff changed concurrently")));
            }
            if next == HandoffStatus::Cancelled {
                tx.execute(
                    "UPDATE quotes SET status = 'cancelled'
                     WHERE handoff_id = ?1 AND status IN ('sent', 'accepted')",
                    params![id],
                )?;
            }
            let handoff = load(&tx, &id)?;
            tx.commit()?;
            Ok(handoff.ok_or_else(|| LineScoutError::not_found("handoff", &id)))
        })
        .await
        .map_err(map_tr_err)??;
    info!(handoff_id = %handoff.id, status = %handoff.status, "handoff status updated");
    Ok(handoff)
}

/// Handoffs waiting for an agent, oldest first.
pub async fn list_pending_handoffs(db: &Database) -> Result<Vec<Handoff>, LineScoutError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HANDOFF_COLUMNS} FROM handoffs
                 WHERE status = 'pending' ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map([], rows::handoff)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Handoffs claimed by `agent_id`, most recently updated first.
pub async fn list_agent_handoffs(
    db: &Database,
    agent_id: &str,
) -> Result<Vec<Handoff>, LineScoutError> {
    let agent_id = agent_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HANDOFF_COLUMNS} FROM handoffs
                 WHERE agent_id = ?1 ORDER BY updated_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![agent_id], rows::handoff)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
