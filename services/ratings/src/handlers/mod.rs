pub mod auth;
pub mod rating;
pub mod store;
pub mod user;

use storerate_auth_types::identity::Identity;
use storerate_domain::user::UserRole;

use crate::error::RatingsServiceError;

/// Roles are disjoint, so every gated route names exactly one.
pub(crate) fn require_role(identity: &Identity, role: UserRole) -> Result<(), RatingsServiceError> {
    if identity.user_role != role {
        return Err(RatingsServiceError::Forbidden);
    }
    Ok(())
}
