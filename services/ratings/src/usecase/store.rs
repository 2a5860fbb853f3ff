use std::collections::HashMap;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use storerate_domain::pagination::PageRequest;
use storerate_domain::user::UserRole;

use crate::domain::repository::{PasswordPort, RatingRepository, StoreRepository};
use crate::domain::types::{
    Store, StoreFilter, StoreListing, User, UserRecord, validate_address, validate_email,
    validate_name, validate_password,
};
use crate::error::RatingsServiceError;

// ── CreateStore ──────────────────────────────────────────────────────────────

/// Requests an owner account alongside the store. The owner logs in with the store's email.
pub struct OwnerOptions {
    pub name: String,
    pub password: String,
}

pub struct CreateStoreInput {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner: Option<OwnerOptions>,
}

/// Login details of a freshly provisioned owner. Never carries the password.
#[derive(Debug, Clone)]
pub struct OwnerCredentials {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CreatedStore {
    pub store: Store,
    pub owner: Option<OwnerCredentials>,
}

pub struct CreateStoreUseCase<R: StoreRepository, P: PasswordPort> {
    pub repo: R,
    pub passwords: P,
}

impl<R: StoreRepository, P: PasswordPort> CreateStoreUseCase<R, P> {
    pub async fn execute(&self, input: CreateStoreInput) -> Result<CreatedStore, RatingsServiceError> {
        let name = input.name.trim();
        let email = input.email.trim();
        let address = input.address.trim();
        if !validate_name(name) {
            return Err(RatingsServiceError::InvalidName);
        }
        if !validate_email(email) {
            return Err(RatingsServiceError::InvalidEmail);
        }
        if !validate_address(address) {
            return Err(RatingsServiceError::InvalidAddress);
        }
        if let Some(owner) = &input.owner {
            if !validate_name(&owner.name) {
                return Err(RatingsServiceError::InvalidName);
            }
            if !validate_password(&owner.password) {
                return Err(RatingsServiceError::InvalidPassword);
            }
        }

        let now = Utc::now();
        let store = Store {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            email: email.to_owned(),
            address: address.to_owned(),
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        };

        let owner = match input.owner {
            Some(owner) => {
                let password_hash = self.passwords.hash(&owner.password).await?;
                Some(UserRecord {
                    user: User {
                        id: Uuid::now_v7(),
                        name: owner.name.trim().to_owned(),
                        email: store.email.clone(),
                        address: store.address.clone(),
                        role: UserRole::StoreOwner,
                        store_id: Some(store.id),
                        created_at: now,
                        updated_at: now,
                    },
                    password_hash,
                })
            }
            None => None,
        };

        self.repo.create_with_owner(&store, owner.as_ref()).await?;

        let owner = owner.map(|record| OwnerCredentials {
            email: record.user.email,
            name: record.user.name,
        });
        info!(
            store_id = %store.id,
            with_owner = owner.is_some(),
            owner_email = owner.as_ref().map(|o| o.email.as_str()),
            "store provisioned"
        );
        Ok(CreatedStore { store, owner })
    }
}

// ── DeleteStore ──────────────────────────────────────────────────────────────

pub struct DeleteStoreUseCase<R: StoreRepository> {
    pub repo: R,
}

impl<R: StoreRepository> DeleteStoreUseCase<R> {
    pub async fn execute(&self, store_id: Uuid) -> Result<(), RatingsServiceError> {
        self.repo.delete_cascade(store_id).await?;
        info!(%store_id, "store deleted");
        Ok(())
    }
}

// ── ListStores ───────────────────────────────────────────────────────────────

pub struct ListStoresUseCase<S: StoreRepository, R: RatingRepository> {
    pub stores: S,
    pub ratings: R,
}

impl<S: StoreRepository, R: RatingRepository> ListStoresUseCase<S, R> {
    /// Customers additionally see their own rating of each listed store.
    pub async fn execute(
        &self,
        viewer_id: Uuid,
        viewer_role: UserRole,
        filter: &StoreFilter,
        page: PageRequest,
    ) -> Result<Vec<StoreListing>, RatingsServiceError> {
        let stores = self.stores.list(filter, page).await?;

        let own_ratings: HashMap<Uuid, i32> = if viewer_role == UserRole::User {
            let ids: Vec<Uuid> = stores.iter().map(|s| s.id).collect();
            self.ratings
                .values_by_user(viewer_id, &ids)
                .await?
                .into_iter()
                .collect()
        } else {
            HashMap::new()
        };

        Ok(stores
            .into_iter()
            .map(|store| StoreListing {
                viewer_rating: own_ratings.get(&store.id).copied(),
                store,
            })
            .collect())
    }
}
