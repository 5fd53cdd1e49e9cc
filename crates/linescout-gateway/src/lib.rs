// SPDX-FileCopyrightText: 2026 LineScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API gateway for the LineScout backend.
//!
//! Every `/v1` route sits behind bearer-token authentication that resolves the
//! caller to a [`linescout_core::User`]. Handlers authorize against that user,
//! call into storage and billing, and map failures through [`error::ApiError`].

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use extract::ApiJson;
pub use server::{build_router, start_server, AppState, ServerConfig};
