// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

use std::sync::Arc;

use crate::auth::{AuthError, DynamicVerifier, KeyMaterial, RemoteJwks, TokenIssuer};
use crate::config::Settings;

/// Shared application state.
///
/// Everything here is cheap to clone: key material sits behind `Arc`s and
/// the verifiers share the remote JWKS cache.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub keys: Arc<KeyMaterial>,
    pub issuer: TokenIssuer,
    pub dynamic: DynamicVerifier,
}

impl AppState {
    /// Build state from validated settings.
    ///
    /// Fails with [`AuthError::Configuration`] if the private key cannot
    /// be parsed. No network calls happen here; the remote JWKS cache
    /// fills lazily on first third-party verification.
    pub fn from_settings(settings: Settings) -> Result<Self, AuthError> {
        let keys = Arc::new(KeyMaterial::load(&settings)?);
        let issuer = TokenIssuer::new(
            keys.clone(),
            settings.issuer.as_str(),
            settings.audience.as_str(),
        );
        let jwks = Arc::new(RemoteJwks::new(settings.dynamic_jwks_url.as_str()));
        let dynamic = DynamicVerifier::new(
            jwks,
            settings.dynamic_issuer.as_str(),
            settings.dynamic_audience.clone(),
        );

        Ok(Self {
            settings: Arc::new(settings),
            keys,
            issuer,
            dynamic,
        })
    }
}
