// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wallet balances, payout requests and commission credits.
//!
//! The balance is derived, never stored: credits minus debits minus every
//! payout that still holds funds (pending, approved or paid). A payout
//! request re-reads the balance inside the transaction that inserts it, so
//! two concurrent requests cannot both spend the same funds.

use linescout_config::model::PaymentsConfig;
use linescout_core::{
    new_id, Handoff, LineScoutError, PayoutRequest, PayoutStatus, TransactionKind,
    WalletTransaction,
};
use linescout_storage::queries::payouts::insert_payout_request;
use linescout_storage::queries::wallet::insert_wallet_transaction_sync;
use linescout_storage::{map_tr_err, Database};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commission::{
    agent_commission, commission_prefix, commission_reference, commission_top_up,
};
use crate::quote::product_paid_on;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletBalance {
    pub owner_id: String,
    pub credits: f64,
    pub debits: f64,
    /// Held by payout requests that were not rejected.
    pub reserved: f64,
    /// Never negative.
    pub available: f64,
}

/// Bank details and amount of a withdrawal.
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutDetails {
    pub amount: f64,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

fn balance_on(conn: &Connection, owner_id: &str) -> rusqlite::Result<WalletBalance> {
    let (credits, debits): (f64, f64) = conn.query_row(
        "SELECT
             COALESCE(SUM(CASE WHEN kind = 'credit' THEN amount END), 0.0),
             COALESCE(SUM(CASE WHEN kind = 'debit' THEN amount END), 0.0)
         FROM wallet_transactions WHERE owner_id = ?1",
        rusqlite::params![owner_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let reserved: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0.0) FROM payout_requests
         WHERE owner_id = ?1 AND status IN ('pending', 'approved', 'paid')",
        rusqlite::params![owner_id],
        |row| row.get(0),
    )?;
    Ok(WalletBalance {
        owner_id: owner_id.to_string(),
        credits,
        debits,
        reserved,
        available: (credits - debits - reserved).max(0.0),
    })
}

/// Wallet operations for users and agents.
#[derive(Debug, Clone)]
pub struct WalletLedger {
    db: Database,
    commission_percent: f64,
    min_payout: f64,
}

impl WalletLedger {
    pub fn new(db: Database, config: &PaymentsConfig) -> Self {
        Self {
            db,
            commission_percent: config.agent_commission_percent,
            min_payout: config.min_payout,
        }
    }

    pub async fn balance(&self, owner_id: &str) -> Result<WalletBalance, LineScoutError> {
        let owner_id = owner_id.to_string();
        self.db
            .connection()
            .call(move |conn| balance_on(conn, &owner_id))
            .await
            .map_err(map_tr_err)
    }

    /// Request a withdrawal of `details.amount` from the owner's available balance.
    pub async fn request_payout(
        &self,
        owner_id: &str,
        details: PayoutDetails,
        now: &str,
    ) -> Result<PayoutRequest, LineScoutError> {
        if !details.amount.is_finite() || details.amount <= 0.0 {
            return Err(LineScoutError::validation("payout amount must be positive"));
        }
        if details.amount < self.min_payout {
            return Err(LineScoutError::validation(format!(
                "payout amount must be at least {}",
                self.min_payout
            )));
        }
        for (field, value) in [
            ("bank_name", &details.bank_name),
            ("account_number", &details.account_number),
            ("account_name", &details.account_name),
        ] {
            if value.trim().is_empty() {
                return Err(LineScoutError::validation(format!("{field} must not be empty")));
            }
        }

        let payout = PayoutRequest {
            id: new_id(),
            owner_id: owner_id.to_string(),
            amount: details.amount,
            status: PayoutStatus::Pending,
            bank_name: details.bank_name.trim().to_string(),
            account_number: details.account_number.trim().to_string(),
            account_name: details.account_name.trim().to_string(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        };
        let payout = self
            .db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let balance = balance_on(&tx, &payout.owner_id)?;
                if payout.amount > balance.available {
                    return Ok(Err(LineScoutError::validation(format!(
                        "payout of {} exceeds available balance of {}",
                        payout.amount, balance.available
                    ))));
                }
                insert_payout_request(&tx, &payout)?;
                tx.commit()?;
                Ok(Ok(payout))
            })
            .await
            .map_err(map_tr_err)??;
        info!(
            payout_id = %payout.id,
            owner_id = %payout.owner_id,
            amount = payout.amount,
            "payout requested"
        );
        Ok(payout)
    }

    /// Top the claiming agent's commission up to what the handoff's confirmed
    /// product payments earn.
    ///
    /// `trigger` names the event (the `paid` transition or a payment
    /// reference) and makes the credit idempotent. Owed and already credited
    /// amounts are read in the same transaction as the insert. Returns `None`
    /// when nothing further is owed.
    pub async fn credit_handoff_commission(
        &self,
        handoff: &Handoff,
        trigger: &str,
        now: &str,
    ) -> Result<Option<WalletTransaction>, LineScoutError> {
        let Some(agent_id) = handoff.agent_id.clone() else {
            return Err(LineScoutError::conflict("handoff has no assigned agent"));
        };
        if !handoff.status.earns_commission() {
            return Err(LineScoutError::conflict(format!(
                "commission is not due on a {} handoff",
                handoff.status
            )));
        }

        let percent = self.commission_percent;
        let handoff_id = handoff.id.clone();
        let reference = commission_reference(&handoff.id, trigger);
        let now = now.to_string();
        let credit = self
            .db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let owed = agent_commission(product_paid_on(&tx, &handoff_id)?, percent);
                let credited: f64 = tx.query_row(
                    "SELECT COALESCE(SUM(amount), 0.0) FROM wallet_transactions
                     WHERE kind = 'credit' AND instr(reference, ?1) = 1",
                    rusqlite::params![commission_prefix(&handoff_id)],
                    |row| row.get(0),
                )?;
                let amount = commission_top_up(owed, credited);
                if amount <= 0.0 {
                    return Ok(None);
                }
                let credit = WalletTransaction {
                    id: new_id(),
                    owner_id: agent_id,
                    kind: TransactionKind::Credit,
                    amount,
                    reference,
                    description: format!("Commission on handoff {handoff_id}"),
                    created_at: now,
                };
                if !insert_wallet_transaction_sync(&tx, &credit)? {
                    return Ok(None);
                }
                tx.commit()?;
                Ok(Some(credit))
            })
            .await
            .map_err(map_tr_err)?;

        match &credit {
            Some(credit) => info!(
                handoff_id = %handoff.id,
                agent_id = %credit.owner_id,
                amount = credit.amount,
                reference = %credit.reference,
                "commission credited"
            ),
            None => debug!(handoff_id = %handoff.id, trigger, "no further commission owed"),
        }
        Ok(credit)
    }
}
