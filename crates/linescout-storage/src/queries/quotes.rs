// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quotes issued on handoffs and the payments recorded against them.

use linescout_core::{
    new_id, HandoffStatus, LineScoutError, PaymentProvider, PaymentPurpose, PaymentStatus, Quote,
    QuotePayment, QuoteStatus,
};
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::{info, warn};

use crate::database::{map_tr_err, Database};
use crate::queries::handoffs;
use crate::rows::{self, optional, QUOTE_COLUMNS, QUOTE_PAYMENT_COLUMNS};

/// Agent-supplied pricing for a new quote.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub product_total: f64,
    pub shipping_total: f64,
    pub deposit_percent: f64,
    pub currency: String,
    pub notes: Option<String>,
}

impl NewQuote {
    fn validate(&self) -> Result<(), LineScoutError> {
        for (name, value) in [
            ("product_total", self.product_total),
            ("shipping_total", self.shipping_total),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LineScoutError::validation(format!(
                    "{name} must be a non-negative amount"
                )));
            }
        }
        if self.product_total + self.shipping_total <= 0.0 {
            return Err(LineScoutError::validation("quote total must be positive"));
        }
        if !(0.0..=100.0).contains(&self.deposit_percent) {
            return Err(LineScoutError::validation(
                "deposit_percent must be between 0 and 100",
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(LineScoutError::validation("currency must not be empty"));
        }
        Ok(())
    }
}

/// A payment intent against a quote, awaiting provider confirmation.
#[derive(Debug, Clone)]
pub struct NewQuotePayment {
    pub quote_id: String,
    pub purpose: PaymentPurpose,
    pub amount: f64,
    pub provider: PaymentProvider,
    pub reference: String,
}

/// Outcome of confirming a payment reference.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmedPayment {
    pub payment: QuotePayment,
    /// `false` when the reference had already been confirmed.
    pub newly_paid: bool,
}

pub(crate) fn load(conn: &Connection, id: &str) -> rusqlite::Result<Option<Quote>> {
    optional(conn.query_row(
        &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"),
        params![id],
        rows::quote,
    ))
}

fn payment_by_reference(
    conn: &Connection,
    reference: &str,
) -> rusqlite::Result<Option<QuotePayment>> {
    optional(conn.query_row(
        &format!("SELECT {QUOTE_PAYMENT_COLUMNS} FROM quote_payments WHERE reference = ?1"),
        params![reference],
        rows::quote_payment,
    ))
}

/// Issue a quote on a handoff the agent has claimed and not yet closed.
pub async fn create_quote(
    db: &Database,
    handoff_id: &str,
    agent_id: &str,
    new_quote: NewQuote,
    now: &str,
) -> Result<Quote, LineScoutError> {
    new_quote.validate()?;
    let handoff_id = handoff_id.to_string();
    let agent_id = agent_id.to_string();
    let now = now.to_string();
    let quote = db
        .connection()
        .call(move |conn| {
            let Some(handoff) = handoffs::load(conn, &handoff_id)? else {
                return Ok(Err(LineScoutError::not_found("handoff", &handoff_id)));
            };
            if handoff.agent_id.as_deref() != Some(agent_id.as_str()) {
                return Ok(Err(LineScoutError::forbidden(
                    "only the assigned agent can quote this handoff",
                )));
            }
            if handoff.status == HandoffStatus::Pending || handoff.status.is_terminal() {
                return Ok(Err(LineScoutError::conflict(format!(
                    "cannot quote a {} handoff",
                    handoff.status
                ))));
            }
            let quote = Quote {
                id: new_id(),
                handoff_id,
                agent_id,
                product_total: new_quote.product_total,
                shipping_total: new_quote.shipping_total,
                deposit_percent: new_quote.deposit_percent,
                currency: new_quote.currency.trim().to_uppercase(),
                notes: new_quote.notes,
                status: QuoteStatus::Sent,
                created_at: now,
            };
            conn.execute(
                "INSERT INTO quotes (id, handoff_id, agent_id, product_total, shipping_total,
                     deposit_percent, currency, notes, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    quote.id,
                    quote.handoff_id,
                    quote.agent_id,
                    quote.product_total,
                    quote.shipping_total,
                    quote.deposit_percent,
                    quote.currency,
                    quote.notes,
                    quote.status.to_string(),
                    quote.created_at,
                ],
            )?;
            Ok(Ok(quote))
        })
        .await
        .map_err(map_tr_err)??;
    info!(quote_id = %quote.id, handoff_id = %quote.handoff_id, "quote created");
    Ok(quote)
}

pub async fn get_quote(db: &Database, id: &str) -> Result<Option<Quote>, LineScoutError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| load(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Quotes on a handoff, newest first.
pub async fn list_quotes_for_handoff(
    db: &Database,
    handoff_id: &str,
) -> Result<Vec<Quote>, LineScoutError> {
    let handoff_id = handoff_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUOTE_COLUMNS} FROM quotes
                 WHERE handoff_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![handoff_id], rows::quote)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Record an unpaid payment intent.
///
/// Idempotent on `reference`: repeating the same intent returns the stored
/// row, while reusing a reference for a different quote or purpose conflicts.
pub async fn record_quote_payment(
    db: &Database,
    payment: NewQuotePayment,
    now: &str,
) -> Result<QuotePayment, LineScoutError> {
    if !payment.amount.is_finite() || payment.amount <= 0.0 {
        return Err(LineScoutError::validation("payment amount must be positive"));
    }
    if payment.reference.trim().is_empty() {
        return Err(LineScoutError::validation("payment reference must not be empty"));
    }
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(quote) = load(&tx, &payment.quote_id)? else {
                return Ok(Err(LineScoutError::not_found("quote", &payment.quote_id)));
            };
            if quote.status == QuoteStatus::Cancelled {
                return Ok(Err(LineScoutError::conflict("quote has been cancelled")));
            }
            let inserted = tx.execute(
                "INSERT INTO quote_payments (id, quote_id, purpose, amount, status, provider,
                     reference, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'unpaid', ?5, ?6, ?7)
                 ON CONFLICT(reference) DO NOTHING",
                params![
                    new_id(),
                    payment.quote_id,
                    payment.purpose.to_string(),
                    payment.amount,
                    payment.provider.to_string(),
                    payment.reference,
                    now,
                ],
            )?;
            let Some(stored) = payment_by_reference(&tx, &payment.reference)? else {
                return Ok(Err(LineScoutError::Internal(
                    "payment row missing after insert".into(),
                )));
            };
            if inserted == 0
                && (stored.quote_id != payment.quote_id || stored.purpose != payment.purpose)
            {
                return Ok(Err(LineScoutError::conflict(format!(
                    "payment reference {} is already in use",
                    payment.reference
                ))));
            }
            tx.commit()?;
            Ok(Ok(stored))
        })
        .await
        .map_err(map_tr_err)?
}

/// Mark the payment with `reference` as paid and accept its quote.
///
/// Confirming twice is harmless; the second call reports `newly_paid = false`.
/// An unpaid payment on a cancelled quote is refused with `Conflict`: the
/// provider has to refund it instead.
pub async fn confirm_quote_payment(
    db: &Database,
    reference: &str,
    now: &str,
) -> Result<ConfirmedPayment, LineScoutError> {
    let reference = reference.to_string();
    let now = now.to_string();
    let confirmed = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(existing) = payment_by_reference(&tx, &reference)? else {
                return Ok(Err(LineScoutError::not_found("payment", &reference)));
            };
            if existing.status == PaymentStatus::Paid {
                return Ok(Ok(ConfirmedPayment {
                    newly_paid: false,
                    payment: existing,
                }));
            }
            let quote_cancelled = load(&tx, &existing.quote_id)?
                .is_some_and(|quote| quote.status == QuoteStatus::Cancelled);
            if quote_cancelled {
                warn!(
                    reference = %reference,
                    quote_id = %existing.quote_id,
                    "payment settled on a cancelled quote, refund required"
                );
                return Ok(Err(LineScoutError::conflict(format!(
                    "quote {} has been cancelled; payment {reference} must be refunded",
                    existing.quote_id
                ))));
            }
            tx.execute(
                "UPDATE quote_payments SET status = 'paid', paid_at = ?1
                 WHERE reference = ?2 AND status = 'unpaid'",
                params![now, reference],
            )?;
            tx.execute(
                "UPDATE quotes SET status = 'accepted' WHERE id = ?1 AND status = 'sent'",
                params![existing.quote_id],
            )?;
            let Some(payment) = payment_by_reference(&tx, &reference)? else {
                return Ok(Err(LineScoutError::Internal(
                    "payment row missing after confirmation".into(),
                )));
            };
            tx.commit()?;
            Ok(Ok(ConfirmedPayment {
                newly_paid: true,
                payment,
            }))
        })
        .await
        .map_err(map_tr_err)??;
    if confirmed.newly_paid {
        info!(
            reference = %confirmed.payment.reference,
            quote_id = %confirmed.payment.quote_id,
            amount = confirmed.payment.amount,
            "quote payment confirmed"
        );
    }
    Ok(confirmed)
}

/// All payments recorded against a quote, oldest first.
pub async fn list_quote_payments(
    db: &Database,
    quote_id: &str,
) -> Result<Vec<QuotePayment>, LineScoutError> {
    let quote_id = quote_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUOTE_PAYMENT_COLUMNS} FROM quote_payments
                 WHERE quote_id = ?1 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![quote_id], rows::quote_payment)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
