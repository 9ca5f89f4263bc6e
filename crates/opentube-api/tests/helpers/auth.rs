//! JWT minting for tests.

#![allow(dead_code)]

use jsonwebtoken::{encode, EncodingKey, Header};
use opentube_api::auth::models::JwtClaims;
use uuid::Uuid;

/// Signing secret shared with `test_config`.
pub const TEST_JWT_SECRET: &str = "test-secret-key-at-least-16-chars";

/// Mint a signed token for the given user and role.
pub fn mint_token(user_id: Uuid, role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id,
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("sign test token")
}

/// A regular user identity and its bearer token.
pub fn user_token() -> (Uuid, String) {
    let id = Uuid::new_v4();
    let token = mint_token(id, "user");
    (id, token)
}

/// An admin identity and its bearer token.
pub fn admin_token() -> (Uuid, String) {
    let id = Uuid::new_v4();
    let token = mint_token(id, "admin");
    (id, token)
}
