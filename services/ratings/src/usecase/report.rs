use uuid::Uuid;

use storerate_domain::user::UserRole;

use crate::domain::repository::{RatingRepository, UserRepository};
use crate::domain::types::{RatingStatistics, StoreReport};
use crate::error::RatingsServiceError;

// ── GetStoreReport ───────────────────────────────────────────────────────────

pub struct GetStoreReportUseCase<R: RatingRepository, U: UserRepository> {
    pub ratings: R,
    pub users: U,
}

impl<R: RatingRepository, U: UserRepository> GetStoreReportUseCase<R, U> {
    pub async fn execute(&self, store_id: Uuid) -> Result<StoreReport, RatingsServiceError> {
        let (store, ratings) = self
            .ratings
            .store_with_ratings(store_id)
            .await?
            .ok_or(RatingsServiceError::StoreNotFound)?;
        let values: Vec<i32> = ratings.iter().map(|r| r.rating.value).collect();
        Ok(StoreReport {
            store,
            statistics: RatingStatistics::from_values(&values),
            ratings,
        })
    }

    /// Report for the store owned by `owner_id`. Only the owner can see it.
    pub async fn execute_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<StoreReport, RatingsServiceError> {
        let owner = self
            .users
            .find_by_id(owner_id)
            .await?
            .ok_or(RatingsServiceError::UserNotFound)?;
        if owner.role != UserRole::StoreOwner {
            return Err(RatingsServiceError::Forbidden);
        }
        let store_id = owner.store_id.ok_or(RatingsServiceError::Forbidden)?;
        self.execute(store_id).await
    }
}
