// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{guard, JsonWebKey, JsonWebKeySet, SessionClaims},
    models::{DynamicVerifyResponse, MeResponse, TokenResponse, VerifyResponse},
    state::AppState,
};

pub mod dynamic;
pub mod health;
pub mod jwks;
pub mod me;
pub mod session;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/.well-known/jwks.json", get(jwks::jwks))
        .route("/auth/session/generate", get(session::generate_session))
        .route("/auth/session/verify", get(session::verify_session))
        .route("/auth/dynamic/verify", post(dynamic::verify_dynamic))
        .route("/v1/me", get(me::me))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // The guard scopes itself to the configured protected prefixes,
        // so it wraps the whole surface.
        .layer(middleware::from_fn_with_state(state.clone(), guard::guard))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        jwks::jwks,
        session::generate_session,
        session::verify_session,
        dynamic::verify_dynamic,
        me::me,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            JsonWebKey,
            JsonWebKeySet,
            SessionClaims,
            TokenResponse,
            VerifyResponse,
            DynamicVerifyResponse,
            MeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Keys", description = "Signing key publication"),
        (name = "Session", description = "Token issuance and verification"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
