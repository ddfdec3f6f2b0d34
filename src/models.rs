// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive
//! `Serialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::SessionClaims;

/// Response for session token issuance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Whether issuance succeeded.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The signed session token (also set as a cookie).
    pub token: String,
}

/// Response for session verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Whether verification succeeded.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The decoded claims.
    pub payload: SessionClaims,
}

/// Response for third-party token verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DynamicVerifyResponse {
    /// Human-readable outcome.
    pub message: String,
    /// The decoded claims.
    pub decoded: SessionClaims,
}

/// The authenticated identity behind a protected route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    /// Canonical user identifier (`sub`).
    pub user_id: String,
    /// Token issuer.
    pub issuer: String,
    /// Wallet address bound to the session, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    /// Session expiry (Unix seconds).
    pub expires_at: i64,
}

impl From<SessionClaims> for MeResponse {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            issuer: claims.iss,
            wallet: claims.wallet,
            expires_at: claims.exp,
        }
    }
}
