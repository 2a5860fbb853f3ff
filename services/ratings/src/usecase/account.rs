use anyhow::Context as _;
use chrono::Utc;
use uuid::Uuid;

use storerate_auth_types::token::{JwtSecret, issue_access_token};
use storerate_domain::user::UserRole;

use crate::domain::repository::{PasswordPort, UserRepository};
use crate::domain::types::{
    User, UserRecord, validate_address, validate_email, validate_name, validate_password,
};
use crate::error::RatingsServiceError;

/// A signed-in user and their bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: u64,
}

fn open_session(user: User, secret: &JwtSecret) -> Result<AuthSession, RatingsServiceError> {
    let (access_token, expires_at) =
        issue_access_token(user.id, user.role, secret).context("issue access token")?;
    Ok(AuthSession {
        user,
        access_token,
        expires_at,
    })
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

/// Self-service sign-up. Always creates a customer (`user` role).
pub struct RegisterUseCase<U: UserRepository, P: PasswordPort> {
    pub users: U,
    pub passwords: P,
    pub secret: JwtSecret,
}

impl<U: UserRepository, P: PasswordPort> RegisterUseCase<U, P> {
    pub async fn execute(&self, input: RegisterInput) -> Result<AuthSession, RatingsServiceError> {
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
                role: UserRole::User,
                store_id: None,
                created_at: now,
                updated_at: now,
            },
            password_hash,
        };
        self.users.create(&record).await?;
        open_session(record.user, &self.secret)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<U: UserRepository, P: PasswordPort> {
    pub users: U,
    pub passwords: P,
    pub secret: JwtSecret,
}

impl<U: UserRepository, P: PasswordPort> LoginUseCase<U, P> {
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn execute(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, RatingsServiceError> {
        let record = self
            .users
            .find_record_by_email(email.trim())
            .await?
            .ok_or(RatingsServiceError::InvalidCredentials)?;
        if !self
            .passwords
            .verify(password, &record.password_hash)
            .await?
        {
            return Err(RatingsServiceError::InvalidCredentials);
        }
        open_session(record.user, &self.secret)
    }
}

// ── UpdatePassword ───────────────────────────────────────────────────────────

pub struct UpdatePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct UpdatePasswordUseCase<U: UserRepository, P: PasswordPort> {
    pub users: U,
    pub passwords: P,
}

impl<U: UserRepository, P: PasswordPort> UpdatePasswordUseCase<U, P> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdatePasswordInput,
    ) -> Result<(), RatingsServiceError> {
        if !validate_password(&input.new_password) {
            return Err(RatingsServiceError::InvalidPassword);
        }
        let current_hash = self
            .users
            .find_password_hash(user_id)
            .await?
            .ok_or(RatingsServiceError::UserNotFound)?;
        if !self
            .passwords
            .verify(&input.current_password, &current_hash)
            .await?
        {
            return Err(RatingsServiceError::InvalidCredentials);
        }

        let new_hash = self.passwords.hash(&input.new_password).await?;
        if !self.users.update_password(user_id, &new_hash).await? {
            return Err(RatingsServiceError::UserNotFound);
        }
        Ok(())
    }
}
