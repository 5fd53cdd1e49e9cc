// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat messages and read receipts.

use linescout_core::{new_id, LineScoutError, Message, SenderType};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::conversations::load;
use crate::rows::{self, MESSAGE_COLUMNS};

/// Append a message, refusing senders the conversation's chat mode does not admit.
pub async fn insert_message(
    db: &Database,
    conversation_id: &str,
    sender_type: SenderType,
    sender_id: Option<&str>,
    content: &str,
    now: &str,
) -> Result<Message, LineScoutError> {
    let message = Message {
        id: new_id(),
        conversation_id: conversation_id.to_string(),
        sender_type,
        sender_id: sender_id.map(str::to_string),
        content: content.to_string(),
        created_at: now.to_string(),
        read_at: None,
    };
    db.connection()
        .call(move |conn| {
            let Some(conversation) = load(conn, &message.conversation_id)? else {
                return Ok(Err(LineScoutError::not_found(
                    "conversation",
                    &message.conversation_id,
                )));
            };
            if !conversation.accepts_message_from(sender_type, &message.created_at) {
                return Ok(Err(LineScoutError::conflict(format!(
                    "conversation does not accept {sender_type} messages in {} mode",
                    conversation.chat_mode
                ))));
            }
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender_type, sender_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    message.id,
                    message.conversation_id,
                    message.sender_type.to_string(),
                    message.sender_id,
                    message.content,
                    message.created_at,
                ],
            )?;
            conn.execute(
                "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
                params![message.created_at, message.conversation_id],
            )?;
            Ok(Ok(message))
        })
        .await
        .map_err(map_tr_err)?
}

/// Oldest-first history, capped at `limit` most recent messages.
pub async fn list_messages(
    db: &Database,
    conversation_id: &str,
    limit: usize,
) -> Result<Vec<Message>, LineScoutError> {
    let conversation_id = conversation_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM (
                     SELECT {MESSAGE_COLUMNS}, rowid AS seq FROM messages
                     WHERE conversation_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2
                 ) ORDER BY created_at ASC, seq ASC"
            ))?;
            let rows = stmt.query_map(params![conversation_id, limit], rows::message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Mark the other side's messages as read. Returns how many rows changed.
///
/// A buyer reads agent, AI and system messages; an agent reads the buyer's.
/// Ended or cancelled limited chats refuse read receipts.
pub async fn mark_messages_read(
    db: &Database,
    conversation_id: &str,
    reader: SenderType,
    now: &str,
) -> Result<usize, LineScoutError> {
    let conversation_id = conversation_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let Some(conversation) = load(conn, &conversation_id)? else {
                return Ok(Err(LineScoutError::not_found("conversation", &conversation_id)));
            };
            if !conversation.accepts_read_receipts(&now) {
                return Ok(Err(LineScoutError::conflict(
                    "limited chat has ended or was cancelled",
                )));
            }
            let senders = match reader {
                SenderType::User => "('agent', 'ai', 'system')",
                SenderType::Agent => "('user')",
                SenderType::Ai | SenderType::System => {
                    return Ok(Err(LineScoutError::validation(format!(
                        "{reader} cannot acknowledge messages"
                    ))));
                }
            };
            let updated = conn.execute(
                &format!(
                    "UPDATE messages SET read_at = ?1
                     WHERE conversation_id = ?2 AND read_at IS NULL AND sender_type IN {senders}"
                ),
                params![now, conversation_id],
            )?;
            Ok(Ok(updated))
        })
        .await
        .map_err(map_tr_err)?
}
