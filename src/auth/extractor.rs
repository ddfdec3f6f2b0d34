// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Axum extractor for verified session claims.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims is SessionClaims
//! }
//! ```
//!
//! When the route guard already ran, the claims come from request
//! extensions; otherwise the extractor verifies the request credentials
//! itself, so handlers outside guarded prefixes can still opt in.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::claims::SessionClaims;
use super::error::AuthError;
use super::guard;
use crate::state::AppState;

/// Extractor for verified session claims.
pub struct Auth(pub SessionClaims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<SessionClaims>().cloned() {
            return Ok(Auth(claims));
        }

        let claims = guard::authenticate(state, &parts.headers).await?;
        Ok(Auth(claims))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` instead of rejecting when no valid credential is
/// present.
pub struct OptionalAuth(pub Option<SessionClaims>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(claims)) => Ok(OptionalAuth(Some(claims))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
