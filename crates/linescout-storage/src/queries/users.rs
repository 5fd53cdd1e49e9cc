// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Accounts and bearer-token lookup.

use linescout_core::{LineScoutError, User};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::rows::{self, optional, USER_COLUMNS};

/// Insert a new account. Fails with `Conflict` when the email is taken.
pub async fn create_user(db: &Database, user: &User) -> Result<(), LineScoutError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, display_name, phone, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(email) DO NOTHING",
                params![
                    user.id,
                    user.email,
                    user.display_name,
                    user.phone,
                    user.role.to_string(),
                    user.created_at,
                ],
            )?;
            if inserted == 0 {
                return Ok(Err(LineScoutError::conflict(format!(
                    "email {} is already registered",
                    user.email
                ))));
            }
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}

pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, LineScoutError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            optional(conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                rows::user,
            ))
        })
        .await
        .map_err(map_tr_err)
}

pub async fn find_user_by_email(db: &Database, email: &str) -> Result<Option<User>, LineScoutError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            optional(conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                rows::user,
            ))
        })
        .await
        .map_err(map_tr_err)
}

/// Register a bearer token for a user. `expires_at = None` never expires.
pub async fn create_auth_session(
    db: &Database,
    token: &str,
    user_id: &str,
    expires_at: Option<&str>,
) -> Result<(), LineScoutError> {
    let token = token.to_string();
    let user_id = user_id.to_string();
    let expires_at = expires_at.map(str::to_string);
    let now = linescout_core::now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO auth_sessions (token, user_id, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![token, user_id, expires_at, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Resolve a bearer token to its user, ignoring tokens expired at `now`.
pub async fn principal_for_token(
    db: &Database,
    token: &str,
    now: &str,
) -> Result<Option<User>, LineScoutError> {
    let token = token.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            optional(conn.query_row(
                "SELECT u.id, u.email, u.display_name, u.phone, u.role, u.created_at
                 FROM auth_sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?1 AND (s.expires_at IS NULL OR s.expires_at > ?2)",
                params![token, now],
                rows::user,
            ))
        })
        .await
        .map_err(map_tr_err)
}
