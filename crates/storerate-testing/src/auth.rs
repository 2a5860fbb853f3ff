//! Mock auth helpers for integration tests.
//!
//! Handlers authenticate callers from a signed bearer token. `MockAuth` signs one
//! for an arbitrary user/role so tests don't need to go through login.

use http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use storerate_auth_types::token::{JwtSecret, issue_access_token};
use storerate_domain::user::UserRole;

/// Secret shared by test routers and `MockAuth`.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests-only";

pub fn test_secret() -> JwtSecret {
    JwtSecret::new(TEST_JWT_SECRET)
}

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    pub fn admin() -> Self {
        Self::new(Uuid::now_v7(), UserRole::Admin)
    }

    /// Signed token for this identity, valid against [`test_secret`].
    pub fn token(&self) -> String {
        let (token, _) = issue_access_token(self.user_id, self.user_role, &test_secret())
            .expect("sign test token");
        token
    }

    /// `Authorization: Bearer ...` header pair.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .expect("bearer header value");
        (AUTHORIZATION, value)
    }
}
