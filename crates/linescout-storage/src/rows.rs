// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-to-model mapping shared by the query modules.
//!
//! Each `*_COLUMNS` constant lists the columns in the order its mapper reads them.

use std::str::FromStr;

use linescout_core::types::{
    ChatPayment, Conversation, Handoff, Message, Notification, PayoutRequest, Quote,
    QuotePayment, Reorder, User, WalletTransaction,
};
use rusqlite::types::Type;
use rusqlite::Row;

/// Read a text column into a strum-backed enum.
pub(crate) fn enum_col<T: FromStr>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    text.parse::<T>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected enum value `{text}`").into(),
        )
    })
}

/// Turn `QueryReturnedNoRows` into `None`.
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> rusqlite::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub(crate) const USER_COLUMNS: &str = "id, email, display_name, phone, role, created_at";

pub(crate) fn user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        phone: row.get(3)?,
        role: enum_col(row, 4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) const CONVERSATION_COLUMNS: &str = "id, user_id, route_type, chat_mode, \
     payment_status, project_status, handoff_id, limited_ends_at, title, created_at, updated_at";

pub(crate) fn conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        route_type: enum_col(row, 2)?,
        chat_mode: enum_col(row, 3)?,
        payment_status: enum_col(row, 4)?,
        project_status: enum_col(row, 5)?,
        handoff_id: row.get(6)?,
        limited_ends_at: row.get(7)?,
        title: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_type, sender_id, content, created_at, read_at";

pub(crate) fn message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_type: enum_col(row, 2)?,
        sender_id: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
        read_at: row.get(6)?,
    })
}

pub(crate) const HANDOFF_COLUMNS: &str = "id, conversation_id, user_id, agent_id, status, \
     summary, claimed_at, created_at, updated_at";

pub(crate) fn handoff(row: &Row<'_>) -> rusqlite::Result<Handoff> {
    Ok(Handoff {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        user_id: row.get(2)?,
        agent_id: row.get(3)?,
        status: enum_col(row, 4)?,
        summary: row.get(5)?,
        claimed_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(crate) const QUOTE_COLUMNS: &str = "id, handoff_id, agent_id, product_total, \
     shipping_total, deposit_percent, currency, notes, status, created_at";

pub(crate) fn quote(row: &Row<'_>) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: row.get(0)?,
        handoff_id: row.get(1)?,
        agent_id: row.get(2)?,
        product_total: row.get(3)?,
        shipping_total: row.get(4)?,
        deposit_percent: row.get(5)?,
        currency: row.get(6)?,
        notes: row.get(7)?,
        status: enum_col(row, 8)?,
        created_at: row.get(9)?,
    })
}

pub(crate) const QUOTE_PAYMENT_COLUMNS: &str =
    "id, quote_id, purpose, amount, status, provider, reference, paid_at, created_at";

pub(crate) fn quote_payment(row: &Row<'_>) -> rusqlite::Result<QuotePayment> {
    Ok(QuotePayment {
        id: row.get(0)?,
        quote_id: row.get(1)?,
        purpose: enum_col(row, 2)?,
        amount: row.get(3)?,
        status: enum_col(row, 4)?,
        provider: enum_col(row, 5)?,
        reference: row.get(6)?,
        paid_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub(crate) const CHAT_PAYMENT_COLUMNS: &str =
    "id, conversation_id, user_id, amount, provider, reference, created_at";

pub(crate) fn chat_payment(row: &Row<'_>) -> rusqlite::Result<ChatPayment> {
    Ok(ChatPayment {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        user_id: row.get(2)?,
        amount: row.get(3)?,
        provider: enum_col(row, 4)?,
        reference: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub(crate) const NOTIFICATION_COLUMNS: &str =
    "id, target_id, target_role, kind, title, body, read_at, created_at";

pub(crate) fn notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        target_id: row.get(1)?,
        target_role: enum_col(row, 2)?,
        kind: row.get(3)?,
        title: row.get(4)?,
        body: row.get(5)?,
        read_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) const WALLET_TRANSACTION_COLUMNS: &str =
    "id, owner_id, kind, amount, reference, description, created_at";

pub(crate) fn wallet_transaction(row: &Row<'_>) -> rusqlite::Result<WalletTransaction> {
    Ok(WalletTransaction {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind: enum_col(row, 2)?,
        amount: row.get(3)?,
        reference: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub(crate) const PAYOUT_COLUMNS: &str = "id, owner_id, amount, status, bank_name, \
     account_number, account_name, created_at, updated_at";

pub(crate) fn payout(row: &Row<'_>) -> rusqlite::Result<PayoutRequest> {
    Ok(PayoutRequest {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        amount: row.get(2)?,
        status: enum_col(row, 3)?,
        bank_name: row.get(4)?,
        account_number: row.get(5)?,
        account_name: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(crate) const REORDER_COLUMNS: &str = "id, user_id, source_handoff_id, conversation_id, \
     preferred_agent_id, note, status, created_at";

pub(crate) fn reorder(row: &Row<'_>) -> rusqlite::Result<Reorder> {
    Ok(Reorder {
        id: row.get(0)?,
        user_id: row.get(1)?,
        source_handoff_id: row.get(2)?,
        conversation_id: row.get(3)?,
        preferred_agent_id: row.get(4)?,
        note: row.get(5)?,
        status: enum_col(row, 6)?,
        created_at: row.get(7)?,
    })
}
