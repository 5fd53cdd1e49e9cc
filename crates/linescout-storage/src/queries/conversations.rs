// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle: fetch-or-create, limited human window, payment,
//! cancellation and guarded deletion.

use linescout_core::{
    new_id, ChatMode, Conversation, LineScoutError, PaymentStatus, ProjectStatus, RouteType,
};
use rusqlite::{params, Connection};

use crate::database::{map_tr_err, Database};
use crate::rows::{self, optional, CONVERSATION_COLUMNS};

pub(crate) fn load(conn: &Connection, id: &str) -> rusqlite::Result<Option<Conversation>> {
    optional(conn.query_row(
        &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
        params![id],
        rows::conversation,
    ))
}

/// Insert a fresh `ai_only / unpaid / active` conversation.
pub(crate) fn insert_new(
    conn: &Connection,
    user_id: &str,
    route_type: RouteType,
    title: Option<&str>,
    now: &str,
) -> rusqlite::Result<Conversation> {
    let conversation = Conversation {
        id: new_id(),
        user_id: user_id.to_string(),
        route_type,
        chat_mode: ChatMode::AiOnly,
        payment_status: PaymentStatus::Unpaid,
        project_status: ProjectStatus::Active,
        handoff_id: None,
        limited_ends_at: None,
        title: title.map(str::to_string),
        created_at: now.to_string(),
        updated_at: now.to_string(),
    };
    conn.execute(
        "INSERT INTO conversations (id, user_id, route_type, chat_mode, payment_status,
             project_status, title, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            conversation.id,
            conversation.user_id,
            conversation.route_type.to_string(),
            conversation.chat_mode.to_string(),
            conversation.payment_status.to_string(),
            conversation.project_status.to_string(),
            conversation.title,
            conversation.created_at,
            conversation.updated_at,
        ],
    )?;
    Ok(conversation)
}

/// Return the user's open conversation for `route_type`, creating one if needed.
///
/// "Open" means active and not yet handed off; the most recent one wins.
/// The boolean is `true` when a new row was created.
pub async fn get_or_create_conversation(
    db: &Database,
    user_id: &str,
    route_type: RouteType,
    now: &str,
) -> Result<(Conversation, bool), LineScoutError> {
    let user_id = user_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let existing = optional(tx.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     WHERE user_id = ?1 AND route_type = ?2
                       AND project_status = 'active' AND handoff_id IS NULL
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                params![user_id, route_type.to_string()],
                rows::conversation,
            ))?;
            let result = match existing {
                Some(conversation) => (conversation, false),
                None => (insert_new(&tx, &user_id, route_type, None, &now)?, true),
            };
            tx.commit()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, LineScoutError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| load(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// All of a user's conversations, newest first.
pub async fn list_conversations_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Conversation>, LineScoutError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![user_id], rows::conversation)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Distinguish "missing" from "wrong state" after a conditional update touched nothing.
fn refusal(conn: &Connection, id: &str, reason: &str) -> rusqlite::Result<LineScoutError> {
    Ok(match load(conn, id)? {
        Some(_) => LineScoutError::conflict(reason.to_string()),
        None => LineScoutError::not_found("conversation", id),
    })
}

/// Open the free limited-human window (`ai_only → limited_human`) until `ends_at`.
pub async fn request_limited_human(
    db: &Database,
    id: &str,
    ends_at: &str,
    now: &str,
) -> Result<Conversation, LineScoutError> {
    let id = id.to_string();
    let ends_at = ends_at.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE conversations
                 SET chat_mode = 'limited_human', limited_ends_at = ?1, updated_at = ?2
                 WHERE id = ?3 AND chat_mode = 'ai_only' AND project_status = 'active'",
                params![ends_at, now, id],
            )?;
            if updated == 0 {
                return Ok(Err(refusal(
                    conn,
                    &id,
                    "human chat can only be requested from an active AI-only conversation",
                )?));
            }
            Ok(load(conn, &id)?.ok_or_else(|| LineScoutError::not_found("conversation", &id)))
        })
        .await
        .map_err(map_tr_err)?
}

/// Mark a conversation paid and switch it to paid human chat.
pub(crate) fn mark_paid(conn: &Connection, id: &str, now: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE conversations
         SET payment_status = 'paid', chat_mode = 'paid_human', updated_at = ?1
         WHERE id = ?2 AND project_status = 'active'",
        params![now, id],
    )
}

/// Mark a conversation paid outside the chat-payment flow (admin tooling, imports).
pub async fn mark_conversation_paid(
    db: &Database,
    id: &str,
    now: &str,
) -> Result<Conversation, LineScoutError> {
    let id = id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            if mark_paid(conn, &id, &now)? == 0 {
                return Ok(Err(refusal(conn, &id, "cancelled conversations cannot be paid")?));
            }
            Ok(load(conn, &id)?.ok_or_else(|| LineScoutError::not_found("conversation", &id)))
        })
        .await
        .map_err(map_tr_err)?
}

/// Point a conversation at its handoff. Only succeeds while unlinked.
pub(crate) fn link_handoff(
    conn: &Connection,
    id: &str,
    handoff_id: &str,
    now: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE conversations SET handoff_id = ?1, updated_at = ?2
         WHERE id = ?3 AND handoff_id IS NULL",
        params![handoff_id, now, id],
    )
}

/// Cancel the project behind a conversation. Any reorder opened for it is closed.
pub async fn cancel_conversation(
    db: &Database,
    id: &str,
    now: &str,
) -> Result<Conversation, LineScoutError> {
    let id = id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE conversations SET project_status = 'cancelled', updated_at = ?1
                 WHERE id = ?2 AND project_status = 'active'",
                params![now, id],
            )?;
            if updated == 0 {
                return Ok(Err(refusal(&tx, &id, "conversation is already cancelled")?));
            }
            tx.execute(
                "UPDATE reorders SET status = 'closed' WHERE conversation_id = ?1",
                params![id],
            )?;
            let conversation = load(&tx, &id)?;
            tx.commit()?;
            Ok(conversation.ok_or_else(|| LineScoutError::not_found("conversation", &id)))
        })
        .await
        .map_err(map_tr_err)?
}

/// Delete a conversation and its messages.
///
/// Refused with `Conflict` when the conversation is paid or tied to a handoff.
pub async fn delete_conversation(db: &Database, id: &str) -> Result<(), LineScoutError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM conversations
                 WHERE id = ?1 AND payment_status = 'unpaid' AND handoff_id IS NULL",
                params![id],
            )?;
            if deleted == 0 {
                return Ok(Err(refusal(
                    conn,
                    &id,
                    "paid conversations and conversations with a handoff cannot be deleted",
                )?));
            }
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::seeded_db;

    const T0: &str = "2026-01-01T00:00:00.000Z";
    const T1: &str = "2026-01-01T00:05:00.000Z";

    #[tokio::test]
    async fn get_or_create_reuses_open_conversation() {
        let db = seeded_db().await;
        let (first, created) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T0)
            .await
            .unwrap();
        assert!(created);
        assert_eq!(first.chat_mode, ChatMode::AiOnly);
        assert_eq!(first.payment_status, PaymentStatus::Unpaid);

        let (again, created) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T1)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.id, first.id);

        let (other_route, created) =
            get_or_create_conversation(&db, "u1", RouteType::MachineSourcing, T1)
                .await
                .unwrap();
        assert!(created);
        assert_ne!(other_route.id, first.id);
    }

    #[tokio::test]
    async fn cancelled_conversation_is_not_reused() {
        let db = seeded_db().await;
        let (first, _) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T0)
            .await
            .unwrap();
        cancel_conversation(&db, &first.id, T1).await.unwrap();
        let (second, created) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T1)
            .await
            .unwrap();
        assert!(created);
        assert_ne!(second.id, first.id);
        assert_eq!(list_conversations_for_user(&db, "u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn limited_human_only_from_ai_only() {
        let db = seeded_db().await;
        let (c, _) = get_or_create_conversation(&db, "u1", RouteType::MachineSourcing, T0)
            .await
            .unwrap();
        let limited = request_limited_human(&db, &c.id, "2026-01-01T00:30:00.000Z", T0)
            .await
            .unwrap();
        assert_eq!(limited.chat_mode, ChatMode::LimitedHuman);
        assert_eq!(
            limited.limited_ends_at.as_deref(),
            Some("2026-01-01T00:30:00.000Z")
        );

        let again = request_limited_human(&db, &c.id, "2026-01-01T01:00:00.000Z", T1).await;
        assert!(matches!(again, Err(LineScoutError::Conflict(_))));

        let missing = request_limited_human(&db, "nope", "2026-01-01T01:00:00.000Z", T1).await;
        assert!(matches!(missing, Err(LineScoutError::NotFound { .. })));
    }

    #[tokio::test]
    async fn cancel_twice_conflicts() {
        let db = seeded_db().await;
        let (c, _) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T0)
            .await
            .unwrap();
        let cancelled = cancel_conversation(&db, &c.id, T1).await.unwrap();
        assert_eq!(cancelled.project_status, ProjectStatus::Cancelled);
        assert!(matches!(
            cancel_conversation(&db, &c.id, T1).await,
            Err(LineScoutError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn delete_unpaid_conversation() {
        let db = seeded_db().await;
        let (c, _) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T0)
            .await
            .unwrap();
        delete_conversation(&db, &c.id).await.unwrap();
        assert!(get_conversation(&db, &c.id).await.unwrap().is_none());
        assert!(matches!(
            delete_conversation(&db, &c.id).await,
            Err(LineScoutError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_paid_conversation_is_refused() {
        let db = seeded_db().await;
        let (c, _) = get_or_create_conversation(&db, "u1", RouteType::WhiteLabel, T0)
            .await
            .unwrap();
        mark_conversation_paid(&db, &c.id, T1).await.unwrap();

        let err = delete_conversation(&db, &c.id).await.unwrap_err();
        assert!(matches!(err, LineScoutError::Conflict(_)));
        let still_there = get_conversation(&db, &c.id).await.unwrap().unwrap();
        assert_eq!(still_there.payment_status, PaymentStatus::Paid);
        assert_eq!(still_there.chat_mode, ChatMode::PaidHuman);
    }
}
