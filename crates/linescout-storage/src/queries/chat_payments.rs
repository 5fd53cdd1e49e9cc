// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payments that unlock paid human chat on a conversation.

use linescout_core::{new_id, ChatPayment, LineScoutError, PaymentProvider};
use rusqlite::{params, Connection};
use tracing::info;

use crate::database::{map_tr_err, Database};
use crate::queries::conversations::{self, mark_paid};
use crate::rows::{self, optional, CHAT_PAYMENT_COLUMNS};

fn by_reference(conn: &Connection, reference: &str) -> rusqlite::Result<Option<ChatPayment>> {
    optional(conn.query_row(
        &format!("SELECT {CHAT_PAYMENT_COLUMNS} FROM chat_payments WHERE reference = ?1"),
        params![reference],
        rows::chat_payment,
    ))
}

/// Record a confirmed chat payment and switch the conversation to paid human chat.
///
/// Replaying the same reference for the same conversation returns the stored
/// payment unchanged; a reference already used elsewhere conflicts.
pub async fn record_chat_payment(
    db: &Database,
    conversation_id: &str,
    amount: f64,
    provider: PaymentProvider,
    reference: &str,
    now: &str,
) -> Result<ChatPayment, LineScoutError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LineScoutError::validation("payment amount must be positive"));
    }
    if reference.trim().is_empty() {
        return Err(LineScoutError::validation("payment reference must not be empty"));
    }
    let conversation_id = conversation_id.to_string();
    let reference = reference.to_string();
    let now = now.to_string();
    let payment = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            if let Some(existing) = by_reference(&tx, &reference)? {
                if existing.conversation_id != conversation_id {
                    return Ok(Err(LineScoutError::conflict(format!(
                        "payment reference {reference} belongs to another conversation"
                    ))));
                }
                return Ok(Ok(existing));
            }
            let Some(conversation) = conversations::load(&tx, &conversation_id)? else {
                return Ok(Err(LineScoutError::not_found("conversation", &conversation_id)));
            };
            if !conversation.is_active() {
                return Ok(Err(LineScoutError::conflict("conversation is cancelled")));
            }
            let payment = ChatPayment {
                id: new_id(),
                conversation_id: conversation.id,
                user_id: conversation.user_id,
                amount,
                provider,
                reference,
                created_at: now.clone(),
            };
            tx.execute(
                "INSERT INTO chat_payments (id, conversation_id, user_id, amount, provider, reference, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    payment.id,
                    payment.conversation_id,
                    payment.user_id,
                    payment.amount,
                    payment.provider.to_string(),
                    payment.reference,
                    payment.created_at,
                ],
            )?;
            mark_paid(&tx, &payment.conversation_id, &now)?;
            tx.commit()?;
            Ok(Ok(payment))
        })
        .await
        .map_err(map_tr_err)??;
    info!(
        conversation_id = %payment.conversation_id,
        reference = %payment.reference,
        "chat payment recorded"
    );
    Ok(payment)
}
