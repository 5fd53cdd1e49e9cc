// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger trait for email/SMS delivery providers.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::LineScoutError;

/// An email to hand to the delivery provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A text message to hand to the delivery provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundSms {
    pub to: String,
    pub body: String,
}

/// Black-box delivery service for transactional email and SMS.
///
/// Implementations are thin wrappers; they do not retry.
#[async_trait]
pub trait Messenger: Send + Sync + 'static {
    /// Returns the provider name used in logs.
    fn name(&self) -> &str;

    /// Delivers one email.
    async fn send_email(&self, email: &OutboundEmail) -> Result<(), LineScoutError>;

    /// Delivers one SMS.
    async fn send_sms(&self, sms: &OutboundSms) -> Result<(), LineScoutError>;
}
