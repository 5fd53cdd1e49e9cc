// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the LineScout sourcing marketplace backend.
//!
//! This crate provides the error type, the domain model shared by storage,
//! billing and the HTTP gateway, and the traits behind which third-party
//! delivery services are consumed.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LineScoutError;
pub use traits::Messenger;
pub use types::*;

/// Current UTC time formatted the way every persisted timestamp is stored.
pub fn now_timestamp() -> String {
    format_timestamp(chrono::Utc::now())
}

/// Format a UTC instant as a storage timestamp (`2026-01-01T00:00:00.000Z`).
pub fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Generate a new entity identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
