// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! Formation Auth Server - JWT session service for the Formation marketplace
//!
//! This crate issues and verifies RS256 session tokens, publishes the
//! server's public key as a JWKS document, and verifies third-party
//! logins from Dynamic.xyz against the provider's published keys.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Key material, token issuance and verification, route guard
//! - `config` - Environment-driven settings
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
