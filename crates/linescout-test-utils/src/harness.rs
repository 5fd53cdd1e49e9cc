// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end API testing.
//!
//! `TestHarness` opens a temp SQLite database, seeds one principal per role
//! (plus a second buyer and a second agent for authorization checks), wires an
//! [`AppState`] with a [`MockMessenger`], and drives the router in-process
//! through `tower::ServiceExt::oneshot`.
//!
//! The request helpers panic on transport failures; they are meant for tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use linescout_config::model::{ChatConfig, LineScoutConfig, PaymentsConfig, StorageConfig};
use linescout_core::{LineScoutError, Role, User};
use linescout_gateway::{build_router, AppState};
use linescout_notify::Notifier;
use linescout_storage::queries::users;
use linescout_storage::Database;
use serde_json::Value;
use tower::ServiceExt;

use crate::mock_messenger::MockMessenger;

const SEED_TIME: &str = "2026-01-01T00:00:00.000Z";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: LineScoutConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: LineScoutConfig::default(),
        }
    }

    /// Override chat gating (window length, paid chat price, currency).
    pub fn with_chat(mut self, chat: ChatConfig) -> Self {
        self.config.chat = chat;
        self
    }

    /// Override commission and payout settings.
    pub fn with_payments(mut self, payments: PaymentsConfig) -> Self {
        self.config.payments = payments;
        self
    }

    /// Build the harness, creating the temp database and seeded principals.
    pub async fn build(self) -> Result<TestHarness, LineScoutError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| LineScoutError::Storage {
            source: Box::new(e),
        })?;
        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path,
            wal_mode: true,
        };
        let db = Database::from_config(&config.storage).await?;

        let messenger = Arc::new(MockMessenger::new());
        let notifier = Notifier::new(db.clone(), messenger.clone());
        let state = AppState::new(db.clone(), notifier, &config);

        let user = seed_principal(&db, "u1", Role::User).await?;
        let other_user = seed_principal(&db, "u2", Role::User).await?;
        let agent = seed_principal(&db, "a1", Role::Agent).await?;
        let other_agent = seed_principal(&db, "a2", Role::Agent).await?;
        let admin = seed_principal(&db, "admin", Role::Admin).await?;

        Ok(TestHarness {
            db,
            messenger,
            state,
            config,
            user,
            other_user,
            agent,
            other_agent,
            admin,
            _temp_dir: temp_dir,
        })
    }
}

/// A seeded account and the bearer token that authenticates it.
#[derive(Debug, Clone)]
pub struct TestPrincipal {
    pub user: User,
    pub token: String,
}

impl TestPrincipal {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Status and decoded JSON body of a router response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: StatusCode,
    /// `Value::Null` when the body is empty.
    pub body: Value,
}

impl TestResponse {
    /// Shorthand for `self.body[key]` as a string.
    pub fn str(&self, key: &str) -> &str {
        self.body[key].as_str().unwrap_or_default()
    }
}

/// A complete API environment over a temp database.
pub struct TestHarness {
    pub db: Database,
    /// Captures email and SMS deliveries.
    pub messenger: Arc<MockMessenger>,
    pub state: AppState,
    pub config: LineScoutConfig,
    /// Buyer `u1`, with a phone number on file.
    pub user: TestPrincipal,
    /// Buyer `u2`.
    pub other_user: TestPrincipal,
    /// Agent `a1`.
    pub agent: TestPrincipal,
    /// Agent `a2`.
    pub other_agent: TestPrincipal,
    pub admin: TestPrincipal,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

async fn seed_principal(
    db: &Database,
    id: &str,
    role: Role,
) -> Result<TestPrincipal, LineScoutError> {
    let user = User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        display_name: id.to_uppercase(),
        phone: (role == Role::User).then(|| format!("+23480000{id}")),
        role,
        created_at: SEED_TIME.to_string(),
    };
    users::create_user(db, &user).await?;
    let token = format!("token-{id}");
    users::create_auth_session(db, &token, id, None).await?;
    Ok(TestPrincipal { user, token })
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default configuration.
    pub async fn new() -> Result<Self, LineScoutError> {
        Self::builder().build().await
    }

    /// A fresh router over the shared state.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, path: &str, who: &TestPrincipal) -> TestResponse {
        self.request(Method::GET, path, Some(&who.token), None).await
    }

    pub async fn post(&self, path: &str, who: &TestPrincipal, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(&who.token), Some(body))
            .await
    }

    /// POST with no body.
    pub async fn post_empty(&self, path: &str, who: &TestPrincipal) -> TestResponse {
        self.request(Method::POST, path, Some(&who.token), None).await
    }

    pub async fn put(&self, path: &str, who: &TestPrincipal, body: Value) -> TestResponse {
        self.request(Method::PUT, path, Some(&who.token), Some(body))
            .await
    }

    pub async fn delete(&self, path: &str, who: &TestPrincipal) -> TestResponse {
        self.request(Method::DELETE, path, Some(&who.token), None)
            .await
    }
}
