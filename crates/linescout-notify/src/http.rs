// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-over-HTTP relay for email and SMS deliveries.
//!
//! Each delivery is a single POST with a bearer key. There is no retry; the
//! caller decides whether a failed delivery matters.

use std::time::Duration;

use async_trait::async_trait;
use linescout_config::model::MessagingConfig;
use linescout_core::traits::{OutboundEmail, OutboundSms};
use linescout_core::{LineScoutError, Messenger};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct SmsPayload<'a> {
    from: &'a str,
    to: &'a str,
    body: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpMessenger {
    client: reqwest::Client,
    email_endpoint: Option<String>,
    sms_endpoint: Option<String>,
    sender: String,
}

impl HttpMessenger {
    pub fn new(config: &MessagingConfig) -> Result<Self, LineScoutError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                LineScoutError::Config(format!("invalid messaging api_key header value: {e}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LineScoutError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            email_endpoint: config.email_endpoint.clone(),
            sms_endpoint: config.sms_endpoint.clone(),
            sender: config.sender.clone(),
        })
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<(), LineScoutError> {
        let response = self
            .client
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| LineScoutError::Provider {
                message: format!("delivery request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        debug!(status = %status, endpoint, "delivery response received");
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(LineScoutError::Provider {
            message: format!("delivery endpoint returned {status}: {body}"),
            source: None,
        })
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    fn name(&self) -> &str {
        "http"
    }

    async fn send_email(&self, email: &OutboundEmail) -> Result<(), LineScoutError> {
        let Some(endpoint) = self.email_endpoint.as_deref() else {
            debug!(to = %email.to, "no email endpoint configured, skipping");
            return Ok(());
        };
        let payload = EmailPayload {
            from: &self.sender,
            to: &email.to,
            subject: &email.subject,
            body: &email.body,
        };
        self.post(endpoint, &payload).await
    }

    async fn send_sms(&self, sms: &OutboundSms) -> Result<(), LineScoutError> {
        let Some(endpoint) = self.sms_endpoint.as_deref() else {
            debug!(to = %sms.to, "no sms endpoint configured, skipping");
            return Ok(());
        };
        let payload = SmsPayload {
            from: &self.sender,
            to: &sms.to,
            body: &sms.body,
        };
        self.post(endpoint, &payload).await
    }
}
