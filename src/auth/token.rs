// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! First-party session tokens: issuance and verification.
//!
//! Tokens are signed RS256 with the server key; the key id travels in the
//! token header so any verifier (this service or an external consumer of
//! the published JWKS) can select the right public key. Verification uses
//! an explicit RS256 allow-list — a token claiming `none` or an HMAC
//! algorithm is rejected before any signature work.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};

use super::claims::SessionClaims;
use super::error::AuthError;
use super::keys::KeyMaterial;

/// Clock skew tolerance for first-party tokens (seconds).
///
/// Zero: issuer and verifier share a clock, so there is no skew to absorb.
const CLOCK_SKEW_LEEWAY: u64 = 0;

/// Issues and verifies first-party session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    /// Create an issuer bound to the server key material.
    pub fn new(keys: Arc<KeyMaterial>, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Issue a signed session token.
    ///
    /// Pure signing operation — transport (cookie vs. header) is the
    /// caller's concern.
    pub fn issue(
        &self,
        subject: &str,
        wallet: Option<String>,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let claims = SessionClaims::session(
            subject,
            wallet,
            self.issuer.clone(),
            self.audience.clone(),
            ttl_seconds,
        );

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.keys.key_id().to_string());

        encode(&header, &claims, self.keys.encoding_key())
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Verify a first-party token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<SessionClaims>(token, self.keys.decoding_key(), &validation)
            .map_err(AuthError::from)?;

        Ok(token_data.claims)
    }
}
