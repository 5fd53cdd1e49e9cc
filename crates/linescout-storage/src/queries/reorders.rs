// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repeat orders of a delivered project.
//!
//! A reorder opens a fresh AI-only conversation on the same route and
//! remembers the agent who delivered the original project.

use linescout_core::{new_id, HandoffStatus, LineScoutError, Reorder, ReorderStatus};
use rusqlite::params;
use tracing::info;

use crate::database::{map_tr_err, Database};
use crate::queries::{conversations, handoffs};
use crate::rows::{self, REORDER_COLUMNS};

pub async fn create_reorder(
    db: &Database,
    user_id: &str,
    source_handoff_id: &str,
    note: Option<&str>,
    now: &str,
) -> Result<Reorder, LineScoutError> {
    let user_id = user_id.to_string();
    let source_handoff_id = source_handoff_id.to_string();
    let note = note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    let now = now.to_string();
    let reorder = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(handoff) = handoffs::load(&tx, &source_handoff_id)? else {
                return Ok(Err(LineScoutError::not_found("handoff", &source_handoff_id)));
            };
            if handoff.user_id != user_id {
                return Ok(Err(LineScoutError::forbidden(
                    "only the buyer of a project can reorder it",
                )));
            }
            if handoff.status != HandoffStatus::Delivered {
                return Ok(Err(LineScoutError::conflict(
                    "only delivered projects can be reordered",
                )));
            }
            let Some(source) = conversations::load(&tx, &handoff.conversation_id)? else {
                return Ok(Err(LineScoutError::not_found(
                    "conversation",
                    &handoff.conversation_id,
                )));
            };
            let title = format!("Reorder: {}", handoff.summary);
            let conversation = conversations::insert_new(
                &tx,
                &user_id,
                source.route_type,
                Some(title.as_str()),
                &now,
            )?;
            let reorder = Reorder {
                id: new_id(),
                user_id,
                source_handoff_id,
                conversation_id: conversation.id,
                preferred_agent_id: handoff.agent_id,
                note,
                status: ReorderStatus::Requested,
                created_at: now,
            };
            tx.execute(
                "INSERT INTO reorders (id, user_id, source_handoff_id, conversation_id,
                     preferred_agent_id, note, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    reorder.id,
                    reorder.user_id,
                    reorder.source_handoff_id,
                    reorder.conversation_id,
                    reorder.preferred_agent_id,
                    reorder.note,
                    reorder.status.to_string(),
                    reorder.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(Ok(reorder))
        })
        .await
        .map_err(map_tr_err)??;
    info!(
        reorder_id = %reorder.id,
        source_handoff_id = %reorder.source_handoff_id,
        "reorder created"
    );
    Ok(reorder)
}

/// A buyer's reorders, newest first.
pub async fn list_reorders_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Reorder>, LineScoutError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REORDER_COLUMNS} FROM reorders
                 WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![user_id], rows::reorder)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
