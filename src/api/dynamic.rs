// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

use axum::{extract::State, http::HeaderMap, Json};

use crate::auth::{guard, AuthError};
use crate::models::DynamicVerifyResponse;
use crate::state::AppState;

/// Verify a Dynamic.xyz bearer token.
///
/// The token is verified against the provider's published JWKS with the
/// configured issuer allow-list. Network failures reaching the JWKS
/// endpoint deny the request rather than skipping verification.
#[utoipa::path(
    post,
    path = "/auth/dynamic/verify",
    tag = "Session",
    responses(
        (status = 200, description = "Token is valid", body = DynamicVerifyResponse),
        (status = 401, description = "Missing, invalid, or unverifiable token")
    )
)]
pub async fn verify_dynamic(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DynamicVerifyResponse>, AuthError> {
    let token = guard::bearer_token(&headers)?.ok_or(AuthError::MissingToken)?;

    let decoded = state.dynamic.verify(token).await?;

    Ok(Json(DynamicVerifyResponse {
        message: "Token verified successfully".to_string(),
        decoded,
    }))
}
