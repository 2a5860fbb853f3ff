use chrono::Utc;
use uuid::Uuid;

use storerate_domain::user::UserRole;

use crate::domain::repository::{RatingRepository, StoreRepository, UserRepository};
use crate::domain::types::{DashboardStats, Rating, validate_rating};
use crate::error::RatingsServiceError;

// ── SubmitOrUpdateRating ─────────────────────────────────────────────────────

pub struct SubmitRatingInput {
    pub store_id: Uuid,
    pub value: i32,
}

pub struct SubmitRatingUseCase<R: RatingRepository, U: UserRepository> {
    pub ratings: R,
    pub users: U,
}

impl<R: RatingRepository, U: UserRepository> SubmitRatingUseCase<R, U> {
    /// Returns the store's average after the write.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: SubmitRatingInput,
    ) -> Result<f64, RatingsServiceError> {
        if !validate_rating(input.value) {
            return Err(RatingsServiceError::InvalidRating);
        }
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(RatingsServiceError::UserNotFound)?;
        if user.role != UserRole::User {
            return Err(RatingsServiceError::Forbidden);
        }

        let now = Utc::now();
        let rating = Rating {
            id: Uuid::now_v7(),
            user_id,
            store_id: input.store_id,
            value: input.value,
            created_at: now,
            updated_at: now,
        };
        self.ratings.submit(&rating).await
    }
}

// ── RecomputeAverage ─────────────────────────────────────────────────────────

pub struct RecomputeAverageUseCase<R: RatingRepository> {
    pub repo: R,
}

impl<R: RatingRepository> RecomputeAverageUseCase<R> {
    pub async fn execute(&self, store_id: Uuid) -> Result<f64, RatingsServiceError> {
        self.repo.recompute_average(store_id).await
    }
}

// ── DashboardStats ───────────────────────────────────────────────────────────

pub struct DashboardStatsUseCase<U: UserRepository, S: StoreRepository, R: RatingRepository> {
    pub users: U,
    pub stores: S,
    pub ratings: R,
}

impl<U: UserRepository, S: StoreRepository, R: RatingRepository> DashboardStatsUseCase<U, S, R> {
    pub async fn execute(&self) -> Result<DashboardStats, RatingsServiceError> {
        Ok(DashboardStats {
            total_users: self.users.count().await?,
            total_stores: self.stores.count().await?,
            total_ratings: self.ratings.count().await?,
        })
    }
}
