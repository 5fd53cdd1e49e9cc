// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the LineScout backend.

use thiserror::Error;

/// The primary error type returned by storage, billing and service code.
///
/// The gateway maps each variant onto an HTTP status; see
/// [`LineScoutError::status_class`].
#[derive(Debug, Error)]
pub enum LineScoutError {
    /// Missing, unknown or expired credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed to act on this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The request conflicts with the current state of the entity
    /// (lost claim, illegal status transition, refused delete).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Third-party provider errors (email/SMS relay, payment gateway).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an error, used for HTTP status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Unauthorized,
    Forbidden,
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl LineScoutError {
    /// Shorthand for a [`LineScoutError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a [`LineScoutError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a [`LineScoutError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Shorthand for a [`LineScoutError::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn status_class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized => ErrorClass::Unauthorized,
            Self::Forbidden(_) => ErrorClass::Forbidden,
            Self::Validation(_) => ErrorClass::BadRequest,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Conflict(_) => ErrorClass::Conflict,
            Self::Storage { .. }
            | Self::Config(_)
            | Self::Provider { .. }
            | Self::Internal(_) => ErrorClass::Internal,
        }
    }
}
