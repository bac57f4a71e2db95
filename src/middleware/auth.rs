// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate for routes that need a signed-in user.

use crate::error::AppError;
use crate::models::Identity;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Signed-in user, inserted as a request extension by [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionUser(pub Identity);

/// Middleware that requires a signed-in session.
///
/// Waits for the session store's initial lookup so a request arriving right
/// after startup is not rejected before the session is known.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = state.session.wait_resolved().await;

    let Some(identity) = session.identity else {
        tracing::debug!(path = %request.uri().path(), "Rejected request without session");
        return Err(AppError::Unauthorized);
    };

    request.extensions_mut().insert(SessionUser(identity));
    Ok(next.run(request).await)
}
