// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

//! # Authentication Module
//!
//! JWT issuance and verification for the Formation marketplace API.
//!
//! ## Token flows
//!
//! 1. **First-party sessions**: the server signs RS256 tokens with its
//!    own key and publishes the public half at
//!    `/.well-known/jwks.json`. Tokens travel in the
//!    `formation_auth_token` cookie and are verified locally.
//! 2. **Third-party logins**: Dynamic.xyz signs tokens with keys
//!    published at its JWKS endpoint. Tokens arrive as
//!    `Authorization: Bearer` and are verified against a cached copy of
//!    that document.
//!
//! ## Security
//!
//! - RS256 only; `none` and HMAC algorithms are rejected up front
//! - Remote JWKS is cached with TTL; concurrent misses coalesce into a
//!   single fetch, and an unknown `kid` forces at most one re-fetch
//! - Fetch failures deny verification (fail closed)
//! - Every failure is a typed [`AuthError`]; verification never returns
//!   a bare boolean

pub mod claims;
pub mod dynamic;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod keys;
pub mod remote;
pub mod token;

#[cfg(test)]
pub(crate) mod testkeys;

pub use claims::SessionClaims;
pub use dynamic::DynamicVerifier;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use keys::{JsonWebKey, JsonWebKeySet, KeyMaterial};
pub use remote::RemoteJwks;
pub use token::TokenIssuer;
