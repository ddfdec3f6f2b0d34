// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Shared RSA fixtures for unit tests.
//!
//! Key generation is expensive, so each key is generated once per test
//! process. 2048-bit keys keep test execution fast; production keys are
//! whatever the operator provisions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use rand::rngs::OsRng;
use rsa::{pkcs8::EncodePrivateKey, RsaPrivateKey};

use crate::config::{GuardMode, Settings};

fn generate_pem() -> String {
    let key = RsaPrivateKey::new(&mut OsRng, 2048).expect("generate test RSA key");
    key.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
        .expect("encode test key as PEM")
        .to_string()
}

/// The default test signing key.
pub(crate) fn private_key_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(generate_pem)
}

/// A second, unrelated key for wrong-key and rotation tests.
pub(crate) fn other_private_key_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(generate_pem)
}

/// JWKS document for an arbitrary key, in published wire form.
pub(crate) fn jwks_document(kid: &str, pem: &str) -> serde_json::Value {
    let keys = super::keys::KeyMaterial::from_pem(kid, pem).expect("key material");
    serde_json::to_value(keys.jwks()).expect("serialize JWKS")
}

/// Handle to a locally spawned JWKS endpoint.
pub(crate) struct JwksServer {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
    document: Arc<RwLock<serde_json::Value>>,
}

impl JwksServer {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Swap the served document, simulating a provider key rotation.
    pub fn rotate(&self, document: serde_json::Value) {
        *self.document.write().unwrap() = document;
    }
}

/// Serve a JWKS document on an ephemeral local port, counting fetches.
pub(crate) async fn spawn_jwks_server(document: serde_json::Value) -> JwksServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let document = Arc::new(RwLock::new(document));

    let hits_handler = hits.clone();
    let document_handler = document.clone();
    let app = axum::Router::new().route(
        "/.well-known/jwks",
        axum::routing::get(move || {
            let hits = hits_handler.clone();
            let document = document_handler.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                let document = document.read().unwrap().clone();
                axum::Json(document)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local JWKS server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve local JWKS");
    });

    JwksServer {
        url: format!("http://{addr}/.well-known/jwks"),
        hits,
        document,
    }
}

/// Settings wired to the default test key, with a JWKS URL that is never
/// reachable (tests that need a live endpoint override it).
pub(crate) fn test_settings() -> Settings {
    Settings {
        private_key_pem: private_key_pem().to_string(),
        key_id: "test-key-1".to_string(),
        issuer: "https://formation.test".to_string(),
        audience: "formation-marketplace".to_string(),
        cookie_name: "formation_auth_token".to_string(),
        cookie_secure: false,
        dynamic_jwks_url: "http://127.0.0.1:1/.well-known/jwks".to_string(),
        dynamic_issuer: "app.dynamic.test".to_string(),
        dynamic_audience: None,
        protected_paths: vec!["/v1".to_string()],
        guard_mode: GuardMode::Deny,
    }
}
