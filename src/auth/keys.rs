// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Server key material and JWKS publication.
//!
//! The signing key is an RSA private key supplied as PEM through the
//! environment. It is parsed once at startup; the public half is derived
//! from it and published as a JSON Web Key Set so external verifiers can
//! match the `kid` embedded in issued token headers.
//!
//! ## Security
//!
//! - The private key never leaves this struct and is excluded from
//!   `Debug` output and logs
//! - The JWKS document contains only public components (`n`, `e`)
//! - `kid` is stable across publication and issuance so a token maps to
//!   exactly one published key

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::{
    pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey, traits::PublicKeyParts, RsaPrivateKey,
    RsaPublicKey,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::AuthError;
use crate::config::Settings;

/// JWK (JSON Web Key) entry published in the JWKS document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JsonWebKey {
    /// Key type (always "RSA").
    pub kty: String,
    /// Key ID matching the `kid` in issued token headers.
    pub kid: String,
    /// Public key use (always "sig").
    #[serde(rename = "use")]
    pub key_use: String,
    /// Algorithm (RS256).
    pub alg: String,
    /// RSA modulus, base64url without padding.
    pub n: String,
    /// RSA public exponent, base64url without padding.
    pub e: String,
}

/// JWKS (JSON Web Key Set) container.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JsonWebKeySet {
    /// Published public keys.
    pub keys: Vec<JsonWebKey>,
}

/// Server-held RSA key material.
///
/// Loaded once at startup and shared immutably (behind an `Arc`) between
/// the token issuer, the first-party verifier, and the JWKS endpoint.
pub struct KeyMaterial {
    key_id: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Base64url RSA modulus of the public key.
    modulus: String,
    /// Base64url RSA public exponent.
    exponent: String,
}

impl KeyMaterial {
    /// Load key material from settings.
    ///
    /// Fails with [`AuthError::Configuration`] if the PEM cannot be parsed
    /// as an RSA private key.
    pub fn load(settings: &Settings) -> Result<Self, AuthError> {
        Self::from_pem(&settings.key_id, &settings.private_key_pem)
    }

    /// Build key material from a key id and an RSA private key PEM
    /// (PKCS#8 or PKCS#1).
    pub fn from_pem(key_id: &str, pem: &str) -> Result<Self, AuthError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| {
                AuthError::Configuration(format!("JWT_PRIVATE_KEY is not a valid RSA key: {e}"))
            })?;

        let public_key = RsaPublicKey::from(&private_key);
        let modulus = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let exponent = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::Configuration(format!("cannot build signing key: {e}")))?;

        // Build the verification key from the published components so the
        // first-party verifier exercises exactly what the JWKS exposes.
        let decoding_key = DecodingKey::from_rsa_components(&modulus, &exponent)
            .map_err(|e| AuthError::Configuration(format!("cannot build verification key: {e}")))?;

        Ok(Self {
            key_id: key_id.to_string(),
            encoding_key,
            decoding_key,
            modulus,
            exponent,
        })
    }

    /// Key identifier embedded in token headers and the JWKS.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Signing key for the token issuer.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Verification key for the first-party verifier.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Public key as a JWK entry.
    pub fn to_jwk(&self) -> JsonWebKey {
        JsonWebKey {
            kty: "RSA".to_string(),
            kid: self.key_id.clone(),
            key_use: "sig".to_string(),
            alg: "RS256".to_string(),
            n: self.modulus.clone(),
            e: self.exponent.clone(),
        }
    }

    /// Publish the JWKS document.
    ///
    /// Pure function of the key material: byte-stable for a given key and
    /// regenerated on each request, so rotation only requires a restart
    /// with new configuration.
    pub fn jwks(&self) -> JsonWebKeySet {
        JsonWebKeySet {
            keys: vec![self.to_jwk()],
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Private key material is deliberately omitted.
        f.debug_struct("KeyMaterial")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testkeys;

    #[test]
    fn jwks_contains_single_rs256_signing_key() {
        let keys = KeyMaterial::from_pem("test-key-1", testkeys::private_key_pem())
            .expect("key material");
        let jwks = keys.jwks();

        assert_eq!(jwks.keys.len(), 1);
        let jwk = &jwks.keys[0];
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "test-key-1");
        assert_eq!(jwk.key_use, "sig");
        assert_eq!(jwk.alg, "RS256");
        assert!(!jwk.n.is_empty());
        assert_eq!(jwk.e, "AQAB");
    }

    #[test]
    fn jwks_is_byte_stable_for_same_key_material() {
        let keys = KeyMaterial::from_pem("test-key-1", testkeys::private_key_pem())
            .expect("key material");
        let first = serde_json::to_string(&keys.jwks()).unwrap();
        let second = serde_json::to_string(&keys.jwks()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_pem_is_configuration_error() {
        let err = KeyMaterial::from_pem("kid", "not a pem").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn debug_output_redacts_private_key() {
        let keys = KeyMaterial::from_pem("test-key-1", testkeys::private_key_pem())
            .expect("key material");
        let debug = format!("{keys:?}");
        assert!(debug.contains("test-key-1"));
        assert!(!debug.contains("PRIVATE KEY"));
    }
}
