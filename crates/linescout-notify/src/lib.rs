// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email/SMS delivery and in-app notification dispatch.
//!
//! [`HttpMessenger`] relays deliveries to configured HTTP endpoints,
//! [`LogMessenger`] only logs them, and [`Notifier`] stores a notification
//! row before fanning it out through whichever messenger is installed.

pub mod http;
pub mod log;
pub mod notifier;

use std::sync::Arc;

use linescout_config::model::MessagingConfig;
use linescout_core::{LineScoutError, Messenger};

pub use http::HttpMessenger;
pub use log::LogMessenger;
pub use notifier::Notifier;

/// Pick the messenger for a config: HTTP relay when an endpoint is set, else logging.
pub fn messenger_from_config(
    config: &MessagingConfig,
) -> Result<Arc<dyn Messenger>, LineScoutError> {
    if config.is_enabled() {
        Ok(Arc::new(HttpMessenger::new(config)?))
    } else {
        Ok(Arc::new(LogMessenger))
    }
}
