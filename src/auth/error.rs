// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Authentication error taxonomy.
//!
//! Every verification failure is typed so callers can distinguish an
//! expired token from a malformed one or an unknown signing key. All
//! verification failures map to 401 at the HTTP boundary; only
//! configuration and internal errors surface as 500. Remote JWKS fetch
//! failures deny the request (fail closed) rather than falling back to
//! stale or unverified data.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Required key material or configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// No bearer token or session cookie was presented.
    #[error("no authentication token found")]
    MissingToken,
    /// Authorization header present but not `Bearer <token>`.
    #[error("invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token cannot be parsed (bad structure, base64, or JSON).
    #[error("token is malformed")]
    Malformed,
    /// Token header algorithm is outside the RS256 allow-list.
    #[error("token algorithm is not allowed")]
    UnsupportedAlgorithm,
    /// Signature check failed.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// `exp` is in the past.
    #[error("token has expired")]
    Expired,
    /// `nbf` is in the future.
    #[error("token is not yet valid")]
    NotYetValid,
    /// `iss` does not match the configured issuer.
    #[error("token issuer is invalid")]
    InvalidIssuer,
    /// `aud` does not match the configured audience.
    #[error("token audience is invalid")]
    InvalidAudience,
    /// The token's `kid` was not found in the remote JWKS, even after a
    /// cache-bypassing re-fetch.
    #[error("no key matching the token's key ID was found")]
    KeyNotFound,
    /// The remote JWKS document could not be fetched or parsed.
    ///
    /// Kept distinct from [`AuthError::KeyNotFound`] so operators can tell
    /// provider outages apart from stale or forged key IDs.
    #[error("failed to fetch remote JWKS: {0}")]
    JwksFetch(String),
    /// Unexpected internal failure during verification.
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Configuration(_) => "configuration_error",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::Malformed => "malformed_token",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "token_expired",
            AuthError::NotYetValid => "token_not_yet_valid",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::JwksFetch(_) => "jwks_fetch_error",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthHeader
            | AuthError::Malformed
            | AuthError::UnsupportedAlgorithm
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::NotYetValid
            | AuthError::InvalidIssuer
            | AuthError::InvalidAudience
            | AuthError::KeyNotFound
            | AuthError::JwksFetch(_) => StatusCode::UNAUTHORIZED,
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            // Both verifiers convert through here only after the header
            // parsed, so a segment that no longer base64-decodes is
            // corruption of the signed material, not an unparseable token.
            ErrorKind::Base64(_) => AuthError::InvalidSignature,
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm,
            _ => AuthError::Malformed,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_token_returns_401() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_token");
    }

    #[tokio::test]
    async fn configuration_error_returns_500() {
        let response = AuthError::Configuration("JWT_KEY_ID is not set".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "configuration_error");
        assert!(body["error"].as_str().unwrap().contains("JWT_KEY_ID"));
    }

    #[tokio::test]
    async fn jwks_fetch_error_fails_closed_with_401() {
        let response = AuthError::JwksFetch("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn key_not_found_and_fetch_error_are_distinct_codes() {
        assert_ne!(
            AuthError::KeyNotFound.error_code(),
            AuthError::JwksFetch("timeout".into()).error_code()
        );
    }
}
