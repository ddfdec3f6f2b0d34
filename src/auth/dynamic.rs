// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Third-party token verification against the Dynamic.xyz JWKS.
//!
//! Dynamic issues RS256 tokens signed by keys it publishes at a JWKS
//! endpoint. Verification selects the key by the token's `kid` via
//! [`RemoteJwks`], pins the algorithm to RS256, and enforces the
//! configured issuer. Audience enforcement is optional because Dynamic
//! environments differ in whether they set `aud`.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::claims::SessionClaims;
use super::error::AuthError;
use super::remote::RemoteJwks;

/// Clock skew tolerance for third-party tokens (seconds).
///
/// The provider's clock is not ours; a small leeway avoids rejecting
/// tokens issued moments ago.
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifies tokens issued by the external identity provider.
#[derive(Clone)]
pub struct DynamicVerifier {
    jwks: Arc<RemoteJwks>,
    issuer: String,
    audience: Option<String>,
}

impl DynamicVerifier {
    /// Create a verifier bound to a remote key resolver.
    pub fn new(
        jwks: Arc<RemoteJwks>,
        issuer: impl Into<String>,
        audience: Option<String>,
    ) -> Self {
        Self {
            jwks,
            issuer: issuer.into(),
            audience,
        }
    }

    /// The remote key resolver backing this verifier.
    pub fn jwks(&self) -> &Arc<RemoteJwks> {
        &self.jwks
    }

    /// Verify a provider token and return its claims.
    pub async fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm);
        }
        // Provider tokens always carry a kid; without one there is no way
        // to pick a key, so the token is unverifiable.
        let kid = header.kid.ok_or(AuthError::Malformed)?;

        let decoding_key = self.jwks.resolve(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let token_data =
            decode::<SessionClaims>(token, &decoding_key, &validation).map_err(AuthError::from)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn verifier() -> DynamicVerifier {
        let jwks = Arc::new(RemoteJwks::new("http://127.0.0.1:1/.well-known/jwks"));
        DynamicVerifier::new(jwks, "app.dynamic.test", None)
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let v = verifier();
        assert!(matches!(v.verify("nonsense").await, Err(AuthError::Malformed)));
    }

    #[tokio::test]
    async fn hmac_token_is_rejected_without_network() {
        let v = verifier();
        let claims = SessionClaims::session("u", None, "app.dynamic.test", "aud", 3600);
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"guessable"),
        )
        .unwrap();

        // Unreachable JWKS URL: if this errored with JwksFetch, the
        // algorithm check ran after a network call.
        assert!(matches!(
            v.verify(&forged).await,
            Err(AuthError::UnsupportedAlgorithm)
        ));
    }

    #[tokio::test]
    async fn rs256_token_without_kid_is_malformed() {
        let v = verifier();
        let claims = SessionClaims::session("u", None, "app.dynamic.test", "aud", 3600);
        let pem = crate::auth::testkeys::private_key_pem();
        let token = encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
        )
        .unwrap();

        assert!(matches!(v.verify(&token).await, Err(AuthError::Malformed)));
    }

    #[tokio::test]
    async fn unreachable_jwks_fails_closed() {
        let v = verifier();
        let claims = SessionClaims::session("u", None, "app.dynamic.test", "aud", 3600);
        let pem = crate::auth::testkeys::private_key_pem();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("dyn-key-1".to_string());
        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
        )
        .unwrap();

        assert!(matches!(v.verify(&token).await, Err(AuthError::JwksFetch(_))));
    }
}
