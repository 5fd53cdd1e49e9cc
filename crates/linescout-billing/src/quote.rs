// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quote payment aggregation.
//!
//! Only confirmed (`paid`) payments count. Sums come straight from SQLite
//! with `COALESCE(SUM(...), 0.0)`, so a quote without payments reads as zero
//! rather than NULL.

use linescout_core::{LineScoutError, Quote};
use linescout_storage::queries::quotes::get_quote;
use linescout_storage::{map_tr_err, Database};
use rusqlite::Connection;
use serde::Serialize;

/// Amounts below this are treated as settled.
const EPSILON: f64 = 0.005;

/// Paid totals for one quote, split by purpose.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaidByPurpose {
    pub deposit: f64,
    pub product_balance: f64,
    pub shipping: f64,
}

/// Where a quote stands financially.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotePaymentSummary {
    pub quote_id: String,
    pub currency: String,
    pub product_total: f64,
    pub shipping_total: f64,
    pub deposit_due: f64,
    pub deposit_paid: f64,
    pub product_balance_paid: f64,
    pub shipping_paid: f64,
    pub total_paid: f64,
    pub deposit_outstanding: f64,
    pub product_outstanding: f64,
    pub shipping_outstanding: f64,
    pub fully_paid: bool,
}

impl QuotePaymentSummary {
    /// Derive outstanding amounts from a quote and what has been paid on it.
    pub fn compute(quote: &Quote, paid: PaidByPurpose) -> Self {
        let deposit_due = quote.product_total * quote.deposit_percent / 100.0;
        let product_paid = paid.deposit + paid.product_balance;
        let product_outstanding = (quote.product_total - product_paid).max(0.0);
        let shipping_outstanding = (quote.shipping_total - paid.shipping).max(0.0);
        Self {
            quote_id: quote.id.clone(),
            currency: quote.currency.clone(),
            product_total: quote.product_total,
            shipping_total: quote.shipping_total,
            deposit_due,
            deposit_paid: paid.deposit,
            product_balance_paid: paid.product_balance,
            shipping_paid: paid.shipping,
            total_paid: product_paid + paid.shipping,
            deposit_outstanding: (deposit_due - paid.deposit).max(0.0),
            product_outstanding,
            shipping_outstanding,
            fully_paid: product_outstanding < EPSILON && shipping_outstanding < EPSILON,
        }
    }
}

/// Confirmed deposit and product-balance payments across every quote of a handoff.
pub(crate) fn product_paid_on(conn: &Connection, handoff_id: &str) -> rusqlite::Result<f64> {
    conn.query_row(
        "SELECT COALESCE(SUM(p.amount), 0.0)
         FROM quote_payments p JOIN quotes q ON q.id = p.quote_id
         WHERE q.handoff_id = ?1 AND p.status = 'paid'
           AND p.purpose IN ('deposit', 'product_balance')",
        rusqlite::params![handoff_id],
        |row| row.get(0),
    )
}

/// Read-only view over quote payments.
#[derive(Debug, Clone)]
pub struct QuoteLedger {
    db: Database,
}

impl QuoteLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Confirmed payment totals on a quote, by purpose.
    pub async fn paid_by_purpose(&self, quote_id: &str) -> Result<PaidByPurpose, LineScoutError> {
        let quote_id = quote_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT
                         COALESCE(SUM(CASE WHEN purpose = 'deposit' THEN amount END), 0.0),
                         COALESCE(SUM(CASE WHEN purpose = 'product_balance' THEN amount END), 0.0),
                         COALESCE(SUM(CASE WHEN purpose = 'shipping' THEN amount END), 0.0)
                     FROM quote_payments WHERE quote_id = ?1 AND status = 'paid'",
                    rusqlite::params![quote_id],
                    |row| {
                        Ok(PaidByPurpose {
                            deposit: row.get(0)?,
                            product_balance: row.get(1)?,
                            shipping: row.get(2)?,
                        })
                    },
                )
            })
            .await
            .map_err(map_tr_err)
    }

    pub async fn summary(&self, quote_id: &str) -> Result<QuotePaymentSummary, LineScoutError> {
        let quote = get_quote(&self.db, quote_id)
            .await?
            .ok_or_else(|| LineScoutError::not_found("quote", quote_id))?;
        let paid = self.paid_by_purpose(quote_id).await?;
        Ok(QuotePaymentSummary::compute(&quote, paid))
    }

}
