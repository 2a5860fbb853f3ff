use chrono::{DateTime, Utc};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use storerate_domain::user::UserRole;
use storerate_ratings::domain::repository::{PasswordPort, StoreRepository, UserRepository};
use storerate_ratings::domain::types::{Rating, Store, User, UserRecord};
use storerate_ratings::error::RatingsServiceError;
use storerate_ratings::infra::db::{DbRatingRepository, DbStoreRepository, DbUserRepository};
use storerate_ratings_migration::Migrator;

// ── Database ─────────────────────────────────────────────────────────────────

/// Fresh in-memory SQLite database with all migrations applied.
pub async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

pub fn user_repo(db: &DatabaseConnection) -> DbUserRepository {
    DbUserRepository { db: db.clone() }
}

pub fn store_repo(db: &DatabaseConnection) -> DbStoreRepository {
    DbStoreRepository { db: db.clone() }
}

pub fn rating_repo(db: &DatabaseConnection) -> DbRatingRepository {
    DbRatingRepository { db: db.clone() }
}

// ── PlainPasswords ───────────────────────────────────────────────────────────

/// Reversible stand-in for Argon2 so tests stay fast.
pub struct PlainPasswords;

impl PasswordPort for PlainPasswords {
    async fn hash(&self, password: &str) -> Result<String, RatingsServiceError> {
        Ok(format!("plain:{password}"))
    }

    async fn verify(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, RatingsServiceError> {
        Ok(password_hash == format!("plain:{password}"))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const PASSWORD: &str = "Secret@12";

pub fn new_store(email: &str) -> Store {
    let now = Utc::now();
    Store {
        id: Uuid::now_v7(),
        name: "Neighbourhood Corner Store".into(),
        email: email.into(),
        address: "10 Station Road".into(),
        average_rating: 0.0,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_user_record(email: &str, role: UserRole, store_id: Option<Uuid>) -> UserRecord {
    let now = Utc::now();
    UserRecord {
        user: User {
            id: Uuid::now_v7(),
            name: "Integration Test Account".into(),
            email: email.into(),
            address: "22 Willow Way".into(),
            role,
            store_id,
            created_at: now,
            updated_at: now,
        },
        password_hash: format!("plain:{PASSWORD}"),
    }
}

pub async fn seed_store(db: &DatabaseConnection, email: &str) -> Store {
    let store = new_store(email);
    store_repo(db)
        .create_with_owner(&store, None)
        .await
        .expect("seed store");
    store
}

pub async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    role: UserRole,
    store_id: Option<Uuid>,
) -> User {
    let record = new_user_record(email, role, store_id);
    user_repo(db).create(&record).await.expect("seed user");
    record.user
}

pub async fn seed_customer(db: &DatabaseConnection) -> User {
    let email = format!("{}@customers.example.com", Uuid::now_v7().simple());
    seed_user(db, &email, UserRole::User, None).await
}

pub fn rating_at(user_id: Uuid, store_id: Uuid, value: i32, at: DateTime<Utc>) -> Rating {
    Rating {
        id: Uuid::now_v7(),
        user_id,
        store_id,
        value,
        created_at: at,
        updated_at: at,
    }
}

pub fn rating(user_id: Uuid, store_id: Uuid, value: i32) -> Rating {
    rating_at(user_id, store_id, value, Utc::now())
}
