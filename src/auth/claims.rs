// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Decoded token claims.
//!
//! Both verifiers produce the same structured claim set: required
//! standard fields plus an open extension map for provider-specific
//! claims (Dynamic.xyz adds wallet metadata, session identifiers, and so
//! on). Verification never yields a bare boolean — a successful result is
//! always a [`SessionClaims`] value, a failure is a typed
//! [`AuthError`](super::AuthError).

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Claims carried by a verified token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    /// Subject — the canonical user identifier.
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Audience. Third-party providers may send a string or an array, so
    /// this stays a raw JSON value; audience enforcement happens during
    /// signature validation, not here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub aud: Option<Value>,

    /// Issued-at timestamp (Unix seconds).
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp (Unix seconds).
    pub exp: i64,

    /// Not-before timestamp (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Wallet address bound to the session (first-party custom claim).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,

    /// Provider-specific claims not covered by the fields above.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: HashMap<String, Value>,
}

impl SessionClaims {
    /// Build claims for a new first-party session token.
    pub fn session(
        subject: impl Into<String>,
        wallet: Option<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl_seconds: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: subject.into(),
            iss: issuer.into(),
            aud: Some(Value::String(audience.into())),
            iat: now,
            exp: now + ttl_seconds,
            nbf: None,
            wallet,
            extra: HashMap::new(),
        }
    }
}
