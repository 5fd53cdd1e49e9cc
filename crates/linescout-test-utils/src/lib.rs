// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for LineScout integration tests.
//!
//! Provides a mock messenger and a harness that runs the full HTTP router
//! in-process over a temporary SQLite database, without external services.
//!
//! # Components
//!
//! - [`TestHarness`] - seeded database, bearer tokens and request helpers
//! - [`MockMessenger`] - captures outbound email and SMS

pub mod harness;
pub mod mock_messenger;

pub use harness::{TestHarness, TestPrincipal, TestResponse};
pub use mock_messenger::MockMessenger;
