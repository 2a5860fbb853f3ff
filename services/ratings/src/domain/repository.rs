#![allow(async_fn_in_trait)]

use uuid::Uuid;

use storerate_domain::pagination::PageRequest;

use crate::domain::types::{
    Rating, RatingWithRater, Store, StoreFilter, User, UserFilter, UserProfile, UserRecord,
};
use crate::error::RatingsServiceError;

/// Repository for accounts of every role.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RatingsServiceError>;

    /// Lookup for login; includes the password hash.
    async fn find_record_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, RatingsServiceError>;

    async fn find_password_hash(&self, id: Uuid) -> Result<Option<String>, RatingsServiceError>;

    /// The store-owner account linked to `store_id`, if any.
    async fn find_owner_of_store(
        &self,
        store_id: Uuid,
    ) -> Result<Option<User>, RatingsServiceError>;

    /// Insert a user. Fails with `UserAlreadyExists` on a duplicate email and
    /// `StoreAlreadyOwned` when the linked store already has an owner.
    async fn create(&self, record: &UserRecord) -> Result<(), RatingsServiceError>;

    /// Returns `false` when no such user exists.
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, RatingsServiceError>;

    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, RatingsServiceError>;

    async fn list_profiles(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Vec<UserProfile>, RatingsServiceError>;

    async fn count(&self) -> Result<u64, RatingsServiceError>;
}

/// Repository for stores and their provisioning lifecycle.
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, RatingsServiceError>;

    /// Insert `store` and, when given, its owner account in one transaction.
    /// Either both rows exist afterwards or neither does.
    async fn create_with_owner(
        &self,
        store: &Store,
        owner: Option<&UserRecord>,
    ) -> Result<(), RatingsServiceError>;

    /// Delete the store's ratings, its owner account, then the store, in one
    /// transaction. `StoreNotFound` leaves everything untouched.
    async fn delete_cascade(&self, id: Uuid) -> Result<(), RatingsServiceError>;

    async fn list(
        &self,
        filter: &StoreFilter,
        page: PageRequest,
    ) -> Result<Vec<Store>, RatingsServiceError>;

    async fn count(&self) -> Result<u64, RatingsServiceError>;
}

/// Repository for ratings and the per-store average they feed.
pub trait RatingRepository: Send + Sync {
    /// Upsert on `(user_id, store_id)` and refresh the store's average in the
    /// same transaction. Returns the new average.
    async fn submit(&self, rating: &Rating) -> Result<f64, RatingsServiceError>;

    /// Recompute and persist the store's average. Returns the stored value.
    async fn recompute_average(&self, store_id: Uuid) -> Result<f64, RatingsServiceError>;

    /// The store and all its ratings with their raters, newest first, read in one
    /// transaction so the stored average matches the listed ratings.
    async fn store_with_ratings(
        &self,
        store_id: Uuid,
    ) -> Result<Option<(Store, Vec<RatingWithRater>)>, RatingsServiceError>;

    /// `(store_id, value)` pairs for the ratings `user_id` gave among `store_ids`.
    async fn values_by_user(
        &self,
        user_id: Uuid,
        store_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, i32)>, RatingsServiceError>;

    async fn count(&self) -> Result<u64, RatingsServiceError>;
}

/// Port for password hashing.
pub trait PasswordPort: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, RatingsServiceError>;
    async fn verify(&self, password: &str, password_hash: &str)
    -> Result<bool, RatingsServiceError>;
}
