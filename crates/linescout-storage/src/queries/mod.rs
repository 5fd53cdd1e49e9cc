// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for operations on storage entities.
//!
//! Multi-statement operations run inside one rusqlite transaction within a
//! single `call` closure. Closures that can refuse an operation for a domain
//! reason return `Ok(Err(LineScoutError))`, keeping SQL failures and policy
//! refusals apart.

pub mod chat_payments;
pub mod conversations;
pub mod handoffs;
pub mod messages;
pub mod notifications;
pub mod payment_settings;
pub mod payouts;
pub mod quotes;
pub mod reorders;
pub mod users;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_support;
