// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification dispatch: persist first, deliver best-effort.

use std::sync::Arc;

use linescout_core::traits::{OutboundEmail, OutboundSms};
use linescout_core::{now_timestamp, LineScoutError, Messenger, Notification, TargetRole};
use linescout_storage::queries::{notifications, users};
use linescout_storage::Database;
use tracing::{debug, warn};

/// Stores in-app notifications and mirrors them to email and SMS.
///
/// Only persisting the notification can fail the call. Delivery problems are
/// logged at `warn!`.
#[derive(Clone)]
pub struct Notifier {
    db: Database,
    messenger: Arc<dyn Messenger>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("messenger", &self.messenger.name())
            .finish_non_exhaustive()
    }
}

impl Notifier {
    pub fn new(db: Database, messenger: Arc<dyn Messenger>) -> Self {
        Self { db, messenger }
    }

    pub async fn notify(
        &self,
        target_id: &str,
        target_role: TargetRole,
        kind: &str,
        title: &str,
        body: &str,
    ) -> Result<Notification, LineScoutError> {
        let notification = notifications::create_notification(
            &self.db,
            target_id,
            target_role,
            kind,
            title,
            body,
            &now_timestamp(),
        )
        .await?;
        self.deliver(&notification).await;
        Ok(notification)
    }

    async fn deliver(&self, notification: &Notification) {
        let recipient = match users::get_user(&self.db, &notification.target_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(target_id = %notification.target_id, "recipient unknown, delivery skipped");
                return;
            }
            Err(e) => {
                warn!(error = %e, target_id = %notification.target_id, "recipient lookup failed");
                return;
            }
        };

        let email = OutboundEmail {
            to: recipient.email.clone(),
            subject: notification.title.clone(),
            body: notification.body.clone(),
        };
        if let Err(e) = self.messenger.send_email(&email).await {
            warn!(
                error = %e,
                messenger = self.messenger.name(),
                notification_id = %notification.id,
                "email delivery failed"
            );
        }

        if let Some(phone) = recipient.phone {
            let sms = OutboundSms {
                to: phone,
                body: format!("{}: {}", notification.title, notification.body),
            };
            if let Err(e) = self.messenger.send_sms(&sms).await {
                warn!(
                    error = %e,
                    messenger = self.messenger.name(),
                    notification_id = %notification.id,
                    "sms delivery failed"
                );
            }
        }
    }
}
