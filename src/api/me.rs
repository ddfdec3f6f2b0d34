// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

use axum::Json;

use crate::auth::Auth;
use crate::models::MeResponse;

/// Return the identity behind the current session.
///
/// Sits under the guarded `/v1` prefix; the claims arrive through the
/// [`Auth`] extractor, from request extensions when the guard already
/// verified the credential.
#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "Session",
    responses(
        (status = 200, description = "The authenticated identity", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(Auth(claims): Auth) -> Json<MeResponse> {
    Json(MeResponse::from(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionClaims;

    #[tokio::test]
    async fn me_projects_claims() {
        let claims = SessionClaims::session(
            "test-user-123",
            Some("0x1234567890abcdef".to_string()),
            "https://formation.test",
            "formation-marketplace",
            3600,
        );
        let Json(body) = me(Auth(claims)).await;
        assert_eq!(body.user_id, "test-user-123");
        assert_eq!(body.issuer, "https://formation.test");
        assert_eq!(body.wallet.as_deref(), Some("0x1234567890abcdef"));
    }
}
