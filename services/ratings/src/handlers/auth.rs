use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use storerate_auth_types::identity::Identity;

use crate::error::RatingsServiceError;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::account::{
    AuthSession, LoginUseCase, RegisterInput, RegisterUseCase, UpdatePasswordInput,
    UpdatePasswordUseCase,
};

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
    /// Unix seconds.
    pub expires_at: u64,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.access_token,
            expires_at: session.expires_at,
        }
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), RatingsServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        passwords: state.passwords(),
        secret: state.jwt_secret.clone(),
    };
    let session = usecase
        .execute(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
            address: body.address,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, RatingsServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        passwords: state.passwords(),
        secret: state.jwt_secret.clone(),
    };
    let session = usecase.execute(&body.email, &body.password).await?;
    Ok(Json(session.into()))
}

// ── PUT /auth/password ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn update_password(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, RatingsServiceError> {
    let usecase = UpdatePasswordUseCase {
        users: state.user_repo(),
        passwords: state.passwords(),
    };
    usecase
        .execute(
            identity.user_id,
            UpdatePasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
