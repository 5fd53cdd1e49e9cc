// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messenger for deterministic testing.
//!
//! `MockMessenger` implements `Messenger` and captures every email and SMS
//! for assertion in tests. It can also be switched into a failing mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use linescout_core::traits::{OutboundEmail, OutboundSms};
use linescout_core::{LineScoutError, Messenger};
use tokio::sync::Mutex;

/// A recording email/SMS provider.
#[derive(Default)]
pub struct MockMessenger {
    emails: Arc<Mutex<Vec<OutboundEmail>>>,
    sms: Arc<Mutex<Vec<OutboundSms>>>,
    failing: AtomicBool,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail with a provider error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent_emails(&self) -> Vec<OutboundEmail> {
        self.emails.lock().await.clone()
    }

    pub async fn sent_sms(&self) -> Vec<OutboundSms> {
        self.sms.lock().await.clone()
    }

    /// Emails sent to `to`.
    pub async fn emails_to(&self, to: &str) -> Vec<OutboundEmail> {
        self.emails
            .lock()
            .await
            .iter()
            .filter(|e| e.to == to)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.emails.lock().await.clear();
        self.sms.lock().await.clear();
    }

    fn check(&self) -> Result<(), LineScoutError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LineScoutError::Provider {
                message: "mock messenger failure".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send_email(&self, email: &OutboundEmail) -> Result<(), LineScoutError> {
        self.check()?;
        self.emails.lock().await.push(email.clone());
        Ok(())
    }

    async fn send_sms(&self, sms: &OutboundSms) -> Result<(), LineScoutError> {
        self.check()?;
        self.sms.lock().await.push(sms.clone());
        Ok(())
    }
}
