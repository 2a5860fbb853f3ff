use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use storerate_auth_types::token::JwtSecret;

use crate::infra::db::{DbRatingRepository, DbStoreRepository, DbUserRepository};
use crate::infra::password::Argon2Passwords;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn store_repo(&self) -> DbStoreRepository {
        DbStoreRepository {
            db: self.db.clone(),
        }
    }

    pub fn rating_repo(&self) -> DbRatingRepository {
        DbRatingRepository {
            db: self.db.clone(),
        }
    }

    pub fn passwords(&self) -> Argon2Passwords {
        Argon2Passwords
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
