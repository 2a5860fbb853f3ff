use std::collections::BTreeMap;

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

use crate::domain::types::{
    RatingStatistics, RatingWithRater, Store, StoreFilter, StoreListing, StoreReport,
};
use crate::error::RatingsServiceError;
use crate::handlers::require_role;
use crate::handlers::user::non_empty;
use crate::state::AppState;
use crate::usecase::rating::RecomputeAverageUseCase;
use crate::usecase::report::GetStoreReportUseCase;
use crate::usecase::store::{
    CreateStoreInput, CreateStoreUseCase, CreatedStore, DeleteStoreUseCase, ListStoresUseCase,
    OwnerOptions,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StoreResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub average_rating: f64,
    #[serde(serialize_with = "storerate_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "storerate_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            average_rating: store.average_rating,
            created_at: store.created_at,
            updated_at: store.updated_at,
        }
    }
}

// ── POST /stores ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OwnerRequest {
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner: Option<OwnerRequest>,
}

#[derive(Serialize)]
pub struct OwnerCredentialsResponse {
    pub email: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct CreateStoreResponse {
    pub store: StoreResponse,
    pub owner: Option<OwnerCredentialsResponse>,
}

impl From<CreatedStore> for CreateStoreResponse {
    fn from(created: CreatedStore) -> Self {
        Self {
            store: created.store.into(),
            owner: created.owner.map(|o| OwnerCredentialsResponse {
                email: o.email,
                name: o.name,
            }),
        }
    }
}

pub async fn create_store(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<CreateStoreResponse>), RatingsServiceError> {
    require_role(&identity, UserRole::Admin)?;
    let usecase = CreateStoreUseCase {
        repo: state.store_repo(),
        passwords: state.passwords(),
    };
    let created = usecase
        .execute(CreateStoreInput {
            name: body.name,
            email: body.email,
            address: body.address,
            owner: body.owner.map(|o| OwnerOptions {
                name: o.name,
                password: o.password,
            }),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

// ── GET /stores ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub address: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Serialize)]
pub struct StoreListingResponse {
    #[serde(flatten)]
    pub store: StoreResponse,
    /// The caller's own rating; always null for non-customers.
    pub user_rating: Option<i32>,
}

impl From<StoreListing> for StoreListingResponse {
    fn from(listing: StoreListing) -> Self {
        Self {
            store: listing.store.into(),
            user_rating: listing.viewer_rating,
        }
    }
}

pub async fn list_stores(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Vec<StoreListingResponse>>, RatingsServiceError> {
    let filter = StoreFilter {
        name: non_empty(query.name),
        address: non_empty(query.address),
    };
    let usecase = ListStoresUseCase {
        stores: state.store_repo(),
        ratings: state.rating_repo(),
    };
    let listings = usecase
        .execute(
            identity.user_id,
            identity.user_role,
            &filter,
            PageRequest::from_query(query.per_page, query.page),
        )
        .await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

// ── DELETE /stores/{id} ──────────────────────────────────────────────────────

pub async fn delete_store(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, RatingsServiceError> {
    require_role(&identity, UserRole::Admin)?;
    let usecase = DeleteStoreUseCase {
        repo: state.store_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /stores/{id}/average ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AverageResponse {
    pub store_id: Uuid,
    pub average_rating: f64,
}

pub async fn recompute_average(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AverageResponse>, RatingsServiceError> {
    require_role(&identity, UserRole::Admin)?;
    let usecase = RecomputeAverageUseCase {
        repo: state.rating_repo(),
    };
    let average_rating = usecase.execute(id).await?;
    Ok(Json(AverageResponse {
        store_id: id,
        average_rating,
    }))
}

// ── GET /stores/my-ratings ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RaterResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct ReportRatingResponse {
    pub id: Uuid,
    pub rating: i32,
    pub user: RaterResponse,
    #[serde(serialize_with = "storerate_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "storerate_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<RatingWithRater> for ReportRatingResponse {
    fn from(item: RatingWithRater) -> Self {
        Self {
            id: item.rating.id,
            rating: item.rating.value,
            user: RaterResponse {
                id: item.rater.id,
                name: item.rater.name,
                email: item.rater.email,
            },
            created_at: item.rating.created_at,
            updated_at: item.rating.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub average: f64,
    pub count: u64,
    pub min: i32,
    pub max: i32,
    pub distribution: BTreeMap<i32, u64>,
}

impl From<RatingStatistics> for StatisticsResponse {
    fn from(stats: RatingStatistics) -> Self {
        Self {
            average: stats.average,
            count: stats.count,
            min: stats.min,
            max: stats.max,
            distribution: stats.distribution,
        }
    }
}

#[derive(Serialize)]
pub struct StoreReportResponse {
    pub store: StoreResponse,
    pub ratings: Vec<ReportRatingResponse>,
    pub statistics: StatisticsResponse,
}

impl From<StoreReport> for StoreReportResponse {
    fn from(report: StoreReport) -> Self {
        Self {
            store: report.store.into(),
            ratings: report.ratings.into_iter().map(Into::into).collect(),
            statistics: report.statistics.into(),
        }
    }
}

pub async fn my_store_report(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<StoreReportResponse>, RatingsServiceError> {
    require_role(&identity, UserRole::StoreOwner)?;
    let usecase = GetStoreReportUseCase {
        ratings: state.rating_repo(),
        users: state.user_repo(),
    };
    let report = usecase.execute_for_owner(identity.user_id).await?;
    Ok(Json(report.into()))
}
