// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! First-party session endpoints.
//!
//! `generate` issues a session token for a fixed test subject and sets
//! it as an HTTP-only cookie; `verify` reads the cookie back and
//! returns the decoded claims. Together they exercise the full
//! issue/publish/verify loop against the live server key.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use crate::auth::{guard, AuthError};
use crate::config::SESSION_TTL_SECS;
use crate::error::ApiError;
use crate::models::{TokenResponse, VerifyResponse};
use crate::state::AppState;

/// Subject used by the test issuance endpoint.
const TEST_SUBJECT: &str = "test-user-123";
/// Sample wallet claim carried by test sessions.
const TEST_WALLET: &str = "0x1234567890abcdef";

/// Issue a session token and set it as a cookie.
#[utoipa::path(
    get,
    path = "/auth/session/generate",
    tag = "Session",
    responses(
        (status = 200, description = "Token issued and set as cookie", body = TokenResponse),
        (status = 500, description = "Signing failed")
    )
)]
pub async fn generate_session(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.issuer.issue(
        TEST_SUBJECT,
        Some(TEST_WALLET.to_string()),
        SESSION_TTL_SECS,
    )?;

    let cookie = guard::session_cookie(
        &state.settings.cookie_name,
        &token,
        state.settings.cookie_secure,
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(TokenResponse {
            success: true,
            message: "Token generated and set in cookie".to_string(),
            token,
        }),
    ))
}

/// Verify the session cookie and return its claims.
#[utoipa::path(
    get,
    path = "/auth/session/verify",
    tag = "Session",
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn verify_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, AuthError> {
    let token = guard::cookie_value(&headers, &state.settings.cookie_name)
        .ok_or(AuthError::MissingToken)?;

    let payload = state.issuer.verify(token)?;

    Ok(Json(VerifyResponse {
        success: true,
        message: "Token verified successfully".to_string(),
        payload,
    }))
}
