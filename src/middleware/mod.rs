// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (session gate, security headers, validated JSON).

pub mod auth;
pub mod security;
pub mod validation;

pub use auth::{require_session, SessionUser};
pub use validation::ValidJson;
