// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `linescout user add`: provision an account and its bearer token.

use linescout_core::{format_timestamp, new_id, now_timestamp, LineScoutError, Role, User};
use linescout_storage::queries::users;
use linescout_storage::Database;
use tracing::info;

/// Input for [`add_user`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Token lifetime; `None` never expires.
    pub token_days: Option<u32>,
}

/// Generate an opaque 256-bit bearer token.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Create the account and issue a token for it.
pub async fn add_user(
    db: &Database,
    account: NewAccount,
) -> Result<(User, String), LineScoutError> {
    let email = account.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(LineScoutError::validation(format!("invalid email address: {email}")));
    }
    if account.display_name.trim().is_empty() {
        return Err(LineScoutError::validation("display name must not be empty"));
    }
    if users::find_user_by_email(db, &email).await?.is_some() {
        return Err(LineScoutError::conflict(format!(
            "a user with email {email} already exists"
        )));
    }

    let user = User {
        id: new_id(),
        email,
        display_name: account.display_name.trim().to_string(),
        phone: account.phone.filter(|p| !p.trim().is_empty()),
        role: account.role,
        created_at: now_timestamp(),
    };
    users::create_user(db, &user).await?;

    let token = generate_token();
    let expires_at = account.token_days.map(|days| {
        format_timestamp(chrono::Utc::now() + chrono::Duration::days(i64::from(days)))
    });
    users::create_auth_session(db, &token, &user.id, expires_at.as_deref()).await?;

    info!(user_id = %user.id, role = %user.role, "user provisioned");
    Ok((user, token))
}
