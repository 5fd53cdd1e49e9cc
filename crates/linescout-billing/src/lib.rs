// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Money handling for the LineScout marketplace.
//!
//! This crate provides:
//! - **Quote ledger**: paid amounts per purpose and what is still outstanding
//! - **Wallet ledger**: balances from credits, debits and reserved payouts, and payout requests
//! - **Commission**: the agent's cut of product payments on a handoff
//! - **Provider resolution**: per-owner override, global setting, configured default

pub mod commission;
pub mod provider;
pub mod quote;
pub mod wallet;

pub use provider::{resolve_provider, ProviderSource, ResolvedProvider};
pub use quote::{QuoteLedger, QuotePaymentSummary};
pub use wallet::{PayoutDetails, WalletBalance, WalletLedger};

#[cfg(test)]
pub(crate) mod test_support;
