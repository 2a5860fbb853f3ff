use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storerate_auth_types::identity::Identity;
use storerate_domain::user::UserRole;

use crate::domain::types::DashboardStats;
use crate::error::RatingsServiceError;
use crate::handlers::require_role;
use crate::state::AppState;
use crate::usecase::rating::{DashboardStatsUseCase, SubmitRatingInput, SubmitRatingUseCase};

// ── POST /ratings ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRatingRequest {
    pub store_id: Uuid,
    /// Taken as raw JSON so that `4.5` or `"5"` is rejected as `INVALID_RATING`.
    pub rating: serde_json::Value,
}

fn rating_value(raw: &serde_json::Value) -> Result<i32, RatingsServiceError> {
    raw.as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(RatingsServiceError::InvalidRating)
}

#[derive(Serialize)]
pub struct SubmitRatingResponse {
    pub store_id: Uuid,
    pub rating: i32,
    pub average_rating: f64,
}

/// Creates or overwrites the caller's rating of a store.
pub async fn submit_rating(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<SubmitRatingRequest>,
) -> Result<Json<SubmitRatingResponse>, RatingsServiceError> {
    require_role(&identity, UserRole::User)?;
    let value = rating_value(&body.rating)?;
    let usecase = SubmitRatingUseCase {
        ratings: state.rating_repo(),
        users: state.user_repo(),
    };
    let average_rating = usecase
        .execute(
            identity.user_id,
            SubmitRatingInput {
                store_id: body.store_id,
                value,
            },
        )
        .await?;
    Ok(Json(SubmitRatingResponse {
        store_id: body.store_id,
        rating: value,
        average_rating,
    }))
}

// ── GET /ratings/stats ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DashboardStatsResponse {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_stores: stats.total_stores,
            total_ratings: stats.total_ratings,
        }
    }
}

pub async fn dashboard_stats(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, RatingsServiceError> {
    require_role(&identity, UserRole::Admin)?;
    let usecase = DashboardStatsUseCase {
        users: state.user_repo(),
        stores: state.store_repo(),
        ratings: state.rating_repo(),
    };
    Ok(Json(usecase.execute().await?.into()))
}
