//! Bearer-token identity extractor.

use axum::extract::{FromRef, FromRequestParts};
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;
use uuid::Uuid;

use storerate_domain::user::UserRole;

use crate::token::{JwtSecret, validate_access_token};

/// Authenticated caller, resolved from `Authorization: Bearer <jwt>`.
///
/// Returns 401 if the header is absent, not a bearer token, or fails validation.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send`. Validate synchronously,
    // then hand back a 'static async block so no borrow of `parts` is captured.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let result = bearer_token(parts)
            .ok_or(StatusCode::UNAUTHORIZED)
            .and_then(|token| {
                validate_access_token(token, &secret).map_err(|_| StatusCode::UNAUTHORIZED)
            });

        async move {
            let info = result?;
            Ok(Self {
                user_id: info.user_id,
                user_role: info.user_role,
            })
        }
    }
}
