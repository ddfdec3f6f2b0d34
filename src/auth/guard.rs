// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Route guard middleware.
//!
//! Applied with `axum::middleware::from_fn_with_state`, the guard
//! protects configured path prefixes. Each request is evaluated
//! independently:
//!
//! 1. Path not under a protected prefix → pass through untouched
//! 2. Session cookie present → first-party verification
//! 3. Otherwise `Authorization: Bearer` → third-party verification
//! 4. Neither → `MissingToken`
//!
//! Failures follow the configured [`GuardMode`]: `deny` answers with the
//! typed 401, `redirect` answers 303 to the login path (browser flows).
//! On success the decoded claims are inserted into request extensions
//! for the [`Auth`](super::extractor::Auth) extractor.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::claims::SessionClaims;
use super::error::AuthError;
use crate::config::{GuardMode, Settings, SESSION_TTL_SECS};
use crate::state::AppState;

/// Guard middleware entry point.
pub async fn guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if !is_protected(&state.settings, request.uri().path()) {
        return next.run(request).await;
    }

    match authenticate(&state, request.headers()).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!(path = %request.uri().path(), error = %e, "guard rejected request");
            match &state.settings.guard_mode {
                GuardMode::Deny => e.into_response(),
                GuardMode::Redirect { location } => {
                    (StatusCode::SEE_OTHER, [(header::LOCATION, location.clone())]).into_response()
                }
            }
        }
    }
}

fn is_protected(settings: &Settings, path: &str) -> bool {
    settings
        .protected_paths
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
}

/// Verify whatever credential the request carries.
///
/// The session cookie wins when both are present; a cookie that fails
/// verification is a failure, not a reason to fall back to the bearer
/// token.
pub(crate) async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionClaims, AuthError> {
    if let Some(token) = cookie_value(headers, &state.settings.cookie_name) {
        return state.issuer.verify(token);
    }

    match bearer_token(headers)? {
        Some(token) => state.dynamic.verify(token).await,
        None => Err(AuthError::MissingToken),
    }
}

/// Extract a cookie value from the `Cookie` header.
pub(crate) fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Extract a bearer token from the `Authorization` header.
///
/// `Ok(None)` when the header is absent; `InvalidAuthHeader` when it is
/// present but not a bearer credential.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(Some(token))
}

/// Build the `Set-Cookie` value for a freshly issued session token.
pub(crate) fn session_cookie(name: &str, token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_TTL_SECS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testkeys;
    use axum::http::HeaderValue;

    fn state() -> AppState {
        AppState::from_settings(testkeys::test_settings()).expect("state")
    }

    #[test]
    fn cookie_parsing_handles_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; formation_auth_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            cookie_value(&headers, "formation_auth_token"),
            Some("abc.def.ghi")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap(), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(bearer_token(&headers).unwrap(), Some("tok"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidAuthHeader)
        ));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn session_cookie_format() {
        let cookie = session_cookie("formation_auth_token", "abc", false);
        assert_eq!(
            cookie,
            "formation_auth_token=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=86400"
        );
        assert!(session_cookie("formation_auth_token", "abc", true).ends_with("; Secure"));
    }

    #[tokio::test]
    async fn no_credentials_is_missing_token() {
        let state = state();
        let headers = HeaderMap::new();
        assert!(matches!(
            authenticate(&state, &headers).await,
            Err(AuthError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn valid_cookie_authenticates() {
        let state = state();
        let token = state.issuer.issue("test-user-123", None, 3600).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("formation_auth_token={token}")).unwrap(),
        );

        let claims = authenticate(&state, &headers).await.expect("authenticated");
        assert_eq!(claims.sub, "test-user-123");
    }

    #[tokio::test]
    async fn invalid_cookie_does_not_fall_back_to_bearer() {
        let state = state();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("formation_auth_token=not.a.token"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer also-garbage"),
        );

        // Malformed, not a JWKS fetch attempt against the bearer path.
        assert!(matches!(
            authenticate(&state, &headers).await,
            Err(AuthError::Malformed)
        ));
    }

    #[test]
    fn prefix_matching_scopes_the_guard() {
        let settings = testkeys::test_settings();
        assert!(is_protected(&settings, "/v1/me"));
        assert!(is_protected(&settings, "/v1"));
        assert!(!is_protected(&settings, "/health"));
        assert!(!is_protected(&settings, "/.well-known/jwks.json"));
    }
}
