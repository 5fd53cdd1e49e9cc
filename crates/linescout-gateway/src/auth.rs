// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication middleware.
//!
//! `Authorization: Bearer <token>` is looked up in `auth_sessions`; on success
//! the caller's [`User`] is attached as a request extension. Missing, unknown
//! and expired tokens all answer 401.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use linescout_core::{now_timestamp, LineScoutError, User};
use linescout_storage::queries::users::principal_for_token;

use crate::error::ApiError;
use crate::server::AppState;

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(LineScoutError::Unauthorized)?;

    let user: User = principal_for_token(&state.db, token, &now_timestamp())
        .await?
        .ok_or_else(|| {
            tracing::debug!("unknown or expired bearer token");
            LineScoutError::Unauthorized
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
