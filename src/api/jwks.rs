// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

use axum::{extract::State, http::header, response::IntoResponse, Json};

use crate::state::AppState;

/// How long clients may cache the published JWKS.
const JWKS_CACHE_CONTROL: &str = "public, max-age=3600";

/// JWKS publication endpoint.
///
/// Serves the public half of the server signing key in standard JWKS
/// form so external verifiers can check first-party tokens. The
/// document is derived once at startup from validated key material, so
/// its bytes are stable across requests.
#[utoipa::path(
    get,
    path = "/.well-known/jwks.json",
    tag = "Keys",
    responses(
        (status = 200, description = "The JSON Web Key Set", body = crate::auth::JsonWebKeySet)
    )
)]
pub async fn jwks(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, JWKS_CACHE_CONTROL)],
        Json(state.keys.jwks()),
    )
}
