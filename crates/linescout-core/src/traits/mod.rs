// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits at the seams between LineScout and third-party services.

pub mod messenger;

pub use messenger::{Messenger, OutboundEmail, OutboundSms};
