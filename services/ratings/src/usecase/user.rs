use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use storerate_domain::pagination::PageRequest;
use storerate_domain::user::UserRole;

use crate::domain::repository::{PasswordPort, StoreRepository, UserRepository};
use crate::domain::types::{
    User, UserFilter, UserProfile, UserRecord, validate_address, validate_email, validate_name,
    validate_password,
};
use crate::error::RatingsServiceError;

// ── CreateUser (admin) ───────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: UserRole,
    /// Required for `StoreOwner`, ignored for other roles.
    pub store_id: Option<Uuid>,
}

pub struct CreateUserUseCase<U: UserRepository, S: StoreRepository, P: PasswordPort> {
    pub users: U,
    pub stores: S,
    pub passwords: P,
}

impl<U: UserRepository, S: StoreRepository, P: PasswordPort> CreateUserUseCase<U, S, P> {
    pub async fn execute(&self, input: CreateUserInput) -> Result<User, RatingsServiceError> {
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
        if !validate_password(&input.password) {
            return Err(RatingsServiceError::InvalidPassword);
        }

        let store_id = match input.role {
            UserRole::StoreOwner => Some(input.store_id.ok_or(RatingsServiceError::StoreRequired)?),
            UserRole::Admin | UserRole::User => None,
        };
        if let Some(store_id) = store_id {
            if self.stores.find_by_id(store_id).await?.is_none() {
                return Err(RatingsServiceError::StoreNotFound);
            }
            if self.users.find_owner_of_store(store_id).await?.is_some() {
                return Err(RatingsServiceError::StoreAlreadyOwned);
            }
        }
        if self.users.find_record_by_email(email).await?.is_some() {
            return Err(RatingsServiceError::UserAlreadyExists);
        }

        let password_hash = self.passwords.hash(&input.password).await?;
        let now = Utc::now();
        let record = UserRecord {
            user: User {
                id: Uuid::now_v7(),
                name: name.to_owned(),
                email: email.to_owned(),
                address: address.to_owned(),
                role: input.role,
                store_id,
                created_at: now,
                updated_at: now,
            },
            password_hash,
        };
        self.users.create(&record).await?;
        info!(user_id = %record.user.id, role = %record.user.role, "user created");
        Ok(record.user)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, id: Uuid) -> Result<UserProfile, RatingsServiceError> {
        self.repo
            .find_profile(id)
            .await?
            .ok_or(RatingsServiceError::UserNotFound)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Vec<UserProfile>, RatingsServiceError> {
        self.repo.list_profiles(filter, page).await
    }
}
