// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`LineScoutError`] to HTTP responses.
//!
//! Client errors carry their message. Anything classified as internal is
//! logged and answered with a generic body so storage or provider details
//! never reach the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linescout_core::error::ErrorClass;
use linescout_core::LineScoutError;
use serde::Serialize;
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error wrapper. Anything convertible to [`LineScoutError`] works with `?`.
#[derive(Debug)]
pub struct ApiError(pub LineScoutError);

impl<E: Into<LineScoutError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.status_class() {
            ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorClass::Forbidden => StatusCode::FORBIDDEN,
            ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Conflict => StatusCode::CONFLICT,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0.status_class() {
            ErrorClass::Internal => {
                error!(error = %self.0, "request failed");
                "internal server error".to_string()
            }
            ErrorClass::Unauthorized => "unauthorized".to_string(),
            _ => {
                warn!(status = status.as_u16(), error = %self.0, "request rejected");
                self.0.to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
