// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger that writes deliveries to the log instead of sending them.

use async_trait::async_trait;
use linescout_core::traits::{OutboundEmail, OutboundSms};
use linescout_core::{LineScoutError, Messenger};
use tracing::info;

/// Used when no delivery endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    fn name(&self) -> &str {
        "log"
    }

    async fn send_email(&self, email: &OutboundEmail) -> Result<(), LineScoutError> {
        info!(to = %email.to, subject = %email.subject, "email delivery (log only)");
        Ok(())
    }

    async fn send_sms(&self, sms: &OutboundSms) -> Result<(), LineScoutError> {
        info!(to = %sms.to, chars = sms.body.chars().count(), "sms delivery (log only)");
        Ok(())
    }
}
