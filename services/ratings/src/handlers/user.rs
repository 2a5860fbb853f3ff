use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storerate_auth_types::identity::Identity;
use storerate_domain::pagination::PageRequest;
use storerate_domain::user::UserRole;

use crate::domain::types::{StoreSummary, User, UserFilter, UserProfile};
use crate::error::RatingsServiceError;
use crate::handlers::require_role;
use crate::state::AppState;
use crate::usecase::user::{CreateUserInput, CreateUserUseCase, GetUserUseCase, ListUsersUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: UserRole,
    pub store_id: Option<Uuid>,
    #[serde(serialize_with = "storerate_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "storerate_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            store_id: user.store_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct StoreSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub average_rating: f64,
}

impl From<StoreSummary> for StoreSummaryResponse {
    fn from(store: StoreSummary) -> Self {
        Self {
            id: store.id,
            name: store.name,
            average_rating: store.average_rating,
        }
    }
}

#[derive(Serialize)]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Present for store owners.
    pub store: Option<StoreSummaryResponse>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user: profile.user.into(),
            store: profile.owned_store.map(Into::into),
        }
    }
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: String,
    pub store_id: Option<Uuid>,
}

pub async fn create_user(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), RatingsServiceError> {
    require_role(&identity, UserRole::Admin)?;
    let role = body
        .role
        .parse::<UserRole>()
        .map_err(|_| RatingsServiceError::InvalidRole)?;
    let usecase = CreateUserUseCase {
        users: state.user_repo(),
        stores: state.store_repo(),
        passwords: state.passwords(),
    };
    let user = usecase
        .execute(CreateUserInput {
            name: body.name,
            email: body.email,
            password: body.password,
            address: body.address,
            role,
            store_id: body.store_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_users(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserProfileResponse>>, RatingsServiceError> {
    require_role(&identity, UserRole::Admin)?;
    let role = query
        .role
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(str::parse::<UserRole>)
        .transpose()
        .map_err(|_| RatingsServiceError::InvalidRole)?;
    let filter = UserFilter {
        name: non_empty(query.name),
        email: non_empty(query.email),
        address: non_empty(query.address),
        role,
    };
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
    };
    let users = usecase
        .execute(&filter, PageRequest::from_query(query.per_page, query.page))
        .await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfileResponse>, RatingsServiceError> {
    require_role(&identity, UserRole::Admin)?;
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let profile = usecase.execute(id).await?;
    Ok(Json(profile.into()))
}

/// Blank query values mean "no filter".
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
