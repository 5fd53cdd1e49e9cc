// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the LineScout backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for
//! conversations, handoffs, quotes, payments, notifications, wallets and
//! reorders.

pub mod database;
pub mod migrations;
pub mod queries;
mod rows;

pub use database::{map_tr_err, Database};
