// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Remote JWKS fetching, caching, and key resolution.
//!
//! The identity provider (Dynamic.xyz) publishes its signing keys at a
//! JWKS endpoint. Incoming third-party tokens carry a `kid`; this module
//! resolves it to a verification key.
//!
//! ## Cache behavior
//!
//! - The whole document is cached with a TTL; reads never block on other
//!   reads
//! - Concurrent cache misses coalesce into a single remote fetch (a fetch
//!   gate with a double-check after acquisition)
//! - A `kid` missing from a cached snapshot triggers exactly one
//!   cache-bypassing re-fetch before `KeyNotFound`, tolerating key
//!   rotation races without masking forged key IDs
//! - Lookup failures are never cached; a later valid `kid` resolves
//!   normally
//! - Fetch failures and timeouts deny verification (fail closed); an
//!   expired cache entry is never served

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Bound on a single remote fetch, including connect time.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// A JWKS snapshot, tagged with how it was obtained.
enum Snapshot {
    /// Served from cache; may predate a key rotation.
    Cached(JwkSet),
    /// Fetched within the current resolution; authoritative.
    Fresh(JwkSet),
}

/// Remote JWKS resolver with caching and fetch coalescing.
#[derive(Clone)]
pub struct RemoteJwks {
    jwks_url: String,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Serializes cache-filling fetches so concurrent misses collapse
    /// into one request. Never held across a cache read by other tasks.
    fetch_gate: Arc<Mutex<()>>,
    client: reqwest::Client,
}

impl RemoteJwks {
    /// Create a resolver for the given JWKS endpoint.
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            fetch_gate: Arc::new(Mutex::new(())),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create with a custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The configured JWKS endpoint.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Resolve a `kid` to a verification key.
    pub async fn resolve(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let started = Instant::now();

        let jwks = match self.snapshot().await? {
            Snapshot::Fresh(jwks) => jwks,
            Snapshot::Cached(jwks) => {
                if let Some(jwk) = find_key(&jwks, kid) {
                    return jwk_to_decoding_key(jwk);
                }
                // The cached snapshot may predate a rotation; bypass the
                // cache once before giving up.
                debug!(kid = %kid, "kid not in cached JWKS, forcing re-fetch");
                self.refresh_since(started).await?
            }
        };

        match find_key(&jwks, kid) {
            Some(jwk) => jwk_to_decoding_key(jwk),
            None => {
                warn!(kid = %kid, "kid not present in remote JWKS");
                Err(AuthError::KeyNotFound)
            }
        }
    }

    /// Force refresh the cache. Used by the readiness probe.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.refresh_since(Instant::now()).await?;
        Ok(())
    }

    /// Check whether a fresh JWKS document is cached.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        match &*cache {
            Some(entry) => entry.fetched_at.elapsed() < self.cache_ttl,
            None => false,
        }
    }

    /// Get a JWKS snapshot, fetching on cache miss.
    async fn snapshot(&self) -> Result<Snapshot, AuthError> {
        if let Some(jwks) = self.cached().await {
            return Ok(Snapshot::Cached(jwks));
        }

        let _gate = self.fetch_gate.lock().await;

        // Another task may have filled the cache while we waited.
        if let Some(jwks) = self.cached().await {
            return Ok(Snapshot::Cached(jwks));
        }

        let jwks = self.fetch_jwks().await?;
        self.store(jwks.clone()).await;
        Ok(Snapshot::Fresh(jwks))
    }

    /// Fetch bypassing the cache, unless a fetch completed after `started`
    /// (a concurrent retry already did the work).
    async fn refresh_since(&self, started: Instant) -> Result<JwkSet, AuthError> {
        let _gate = self.fetch_gate.lock().await;

        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at >= started {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        self.store(jwks.clone()).await;
        Ok(jwks)
    }

    async fn cached(&self) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache.as_ref().and_then(|entry| {
            (entry.fetched_at.elapsed() < self.cache_ttl).then(|| entry.jwks.clone())
        })
    }

    async fn store(&self, jwks: JwkSet) {
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        });
    }

    /// Fetch the JWKS document from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::JwksFetch("request timed out".to_string())
                } else {
                    AuthError::JwksFetch(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::JwksFetch(format!("invalid JWKS document: {e}")))
    }
}

/// Find a key by `kid` in a JWKS document.
fn find_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}

/// Convert a JWK to a verification key.
///
/// Only RSA keys are accepted; the third-party verifier pins RS256, so a
/// matching `kid` with any other key type cannot have signed the token.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|e| AuthError::Internal(format!("invalid RSA key in JWKS: {e}"))),
        _ => Err(AuthError::UnsupportedAlgorithm),
    }
}
