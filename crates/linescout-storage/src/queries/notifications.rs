// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-app notification inbox for users and agents.

use linescout_core::{new_id, LineScoutError, Notification, TargetRole};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::rows::{self, NOTIFICATION_COLUMNS};

pub async fn create_notification(
    db: &Database,
    target_id: &str,
    target_role: TargetRole,
    kind: &str,
    title: &str,
    body: &str,
    now: &str,
) -> Result<Notification, LineScoutError> {
    let notification = Notification {
        id: new_id(),
        target_id: target_id.to_string(),
        target_role,
        kind: kind.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        read_at: None,
        created_at: now.to_string(),
    };
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notifications (id, target_id, target_role, kind, title, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    notification.id,
                    notification.target_id,
                    notification.target_role.to_string(),
                    notification.kind,
                    notification.title,
                    notification.body,
                    notification.created_at,
                ],
            )?;
            Ok(notification)
        })
        .await
        .map_err(map_tr_err)
}

/// Newest-first notifications for a recipient.
pub async fn list_notifications(
    db: &Database,
    target_id: &str,
    target_role: TargetRole,
    unread_only: bool,
    limit: usize,
) -> Result<Vec<Notification>, LineScoutError> {
    let target_id = target_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE target_id = ?1 AND target_role = ?2 AND (?3 = 0 OR read_at IS NULL)
                 ORDER BY created_at DESC, rowid DESC LIMIT ?4"
            ))?;
            let rows = stmt.query_map(
                params![target_id, target_role.to_string(), unread_only, limit],
                rows::notification,
            )?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn unread_count(
    db: &Database,
    target_id: &str,
    target_role: TargetRole,
) -> Result<i64, LineScoutError> {
    let target_id = target_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM notifications
                 WHERE target_id = ?1 AND target_role = ?2 AND read_at IS NULL",
                params![target_id, target_role.to_string()],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Mark one notification read. Someone else's notification reads as missing.
pub async fn mark_notification_read(
    db: &Database,
    id: &str,
    target_id: &str,
    now: &str,
) -> Result<(), LineScoutError> {
    let id = id.to_string();
    let target_id = target_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE notifications SET read_at = COALESCE(read_at, ?1)
                 WHERE id = ?2 AND target_id = ?3",
                params![now, id, target_id],
            )?;
            if updated == 0 {
                return Ok(Err(LineScoutError::not_found("notification", &id)));
            }
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}

/// Mark every unread notification of a recipient read. Returns how many changed.
pub async fn mark_all_read(
    db: &Database,
    target_id: &str,
    target_role: TargetRole,
    now: &str,
) -> Result<usize, LineScoutError> {
    let target_id = target_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications SET read_at = ?1
                 WHERE target_id = ?2 AND target_role = ?3 AND read_at IS NULL",
                params![now, target_id, target_role.to_string()],
            )
        })
        .await
        .map_err(map_tr_err)
}
