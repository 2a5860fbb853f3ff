use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionError, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use storerate_core::sea_ext::is_unique_violation;
use storerate_domain::pagination::PageRequest;
use storerate_domain::user::UserRole;
use storerate_ratings_schema::{ratings, stores, users};

use crate::domain::repository::{RatingRepository, StoreRepository, UserRepository};
use crate::domain::types::{
    Rater, Rating, RatingWithRater, Store, StoreFilter, StoreSummary, User, UserFilter,
    UserProfile, UserRecord,
};
use crate::error::RatingsServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RatingsServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_record_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, RatingsServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(record_from_model).transpose()
    }

    async fn find_password_hash(&self, id: Uuid) -> Result<Option<String>, RatingsServiceError> {
        let hash = users::Entity::find_by_id(id)
            .select_only()
            .column(users::Column::Password)
            .into_tuple::<String>()
            .one(&self.db)
            .await
            .context("find password hash")?;
        Ok(hash)
    }

    async fn find_owner_of_store(
        &self,
        store_id: Uuid,
    ) -> Result<Option<User>, RatingsServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::StoreId.eq(store_id))
            .filter(users::Column::Role.eq(UserRole::StoreOwner.as_str()))
            .one(&self.db)
            .await
            .context("find store owner")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, record: &UserRecord) -> Result<(), RatingsServiceError> {
        match insert_user(&self.db, record).await {
            Ok(()) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                // users has two unique keys; find out which one was hit.
                let email_taken = users::Entity::find()
                    .filter(users::Column::Email.eq(record.user.email.as_str()))
                    .count(&self.db)
                    .await
                    .context("check user email")?
                    > 0;
                if email_taken {
                    Err(RatingsServiceError::UserAlreadyExists)
                } else {
                    Err(RatingsServiceError::StoreAlreadyOwned)
                }
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, RatingsServiceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Password, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update password")?;
        Ok(result.rows_affected > 0)
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, RatingsServiceError> {
        let row = users::Entity::find_by_id(id)
            .find_also_related(stores::Entity)
            .one(&self.db)
            .await
            .context("find user profile")?;
        row.map(profile_from_models).transpose()
    }

    async fn list_profiles(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Vec<UserProfile>, RatingsServiceError> {
        let mut query = users::Entity::find();
        if let Some(name) = filter.name.as_deref() {
            query = query.filter(users::Column::Name.contains(name));
        }
        if let Some(email) = filter.email.as_deref() {
            query = query.filter(users::Column::Email.contains(email));
        }
        if let Some(address) = filter.address.as_deref() {
            query = query.filter(users::Column::Address.contains(address));
        }
        if let Some(role) = filter.role {
            query = query.filter(users::Column::Role.eq(role.as_str()));
        }
        let rows = query
            .order_by_asc(users::Column::Name)
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .find_also_related(stores::Entity)
            .all(&self.db)
            .await
            .context("list users")?;
        rows.into_iter().map(profile_from_models).collect()
    }

    async fn count(&self) -> Result<u64, RatingsServiceError> {
        let count = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        Ok(count)
    }
}

async fn insert_user<C: ConnectionTrait>(conn: &C, record: &UserRecord) -> Result<(), DbErr> {
    let user = &record.user;
    users::ActiveModel {
        id: Set(user.id),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        password: Set(record.password_hash.clone()),
        address: Set(user.address.clone()),
        role: Set(user.role.as_str().to_owned()),
        store_id: Set(user.store_id),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
    .insert(conn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> Result<User, RatingsServiceError> {
    let role = model
        .role
        .parse::<UserRole>()
        .context("parse stored user role")?;
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        address: model.address,
        role,
        store_id: model.store_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn record_from_model(mut model: users::Model) -> Result<UserRecord, RatingsServiceError> {
    let password_hash = std::mem::take(&mut model.password);
    Ok(UserRecord {
        user: user_from_model(model)?,
        password_hash,
    })
}

fn profile_from_models(
    (user, store): (users::Model, Option<stores::Model>),
) -> Result<UserProfile, RatingsServiceError> {
    Ok(UserProfile {
        owned_store: store.map(|s| StoreSummary {
            id: s.id,
            name: s.name,
            average_rating: s.average_rating,
        }),
        user: user_from_model(user)?,
    })
}

// ── Store repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStoreRepository {
    pub db: DatabaseConnection,
}

impl StoreRepository for DbStoreRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, RatingsServiceError> {
        let model = stores::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find store by id")?;
        Ok(model.map(store_from_model))
    }

    async fn create_with_owner(
        &self,
        store: &Store,
        owner: Option<&UserRecord>,
    ) -> Result<(), RatingsServiceError> {
        let result = self
            .db
            .transaction::<_, (), RatingsServiceError>(|txn| {
                let store = store.clone();
                let owner = owner.cloned();
                Box::pin(async move {
                    let existing = stores::Entity::find()
                        .filter(stores::Column::Email.eq(store.email.as_str()))
                        .count(txn)
                        .await
                        .context("check store email")?;
                    if existing > 0 {
                        return Err(RatingsServiceError::StoreAlreadyExists);
                    }

                    stores::ActiveModel {
                        id: Set(store.id),
                        name: Set(store.name.clone()),
                        email: Set(store.email.clone()),
                        address: Set(store.address.clone()),
                        average_rating: Set(store.average_rating),
                        created_at: Set(store.created_at),
                        updated_at: Set(store.updated_at),
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| {
                        conflict_or_internal(e, RatingsServiceError::StoreAlreadyExists, "insert store")
                    })?;

                    if let Some(owner) = owner {
                        let taken = users::Entity::find()
                            .filter(users::Column::Email.eq(owner.user.email.as_str()))
                            .count(txn)
                            .await
                            .context("check owner email")?;
                        if taken > 0 {
                            return Err(RatingsServiceError::UserAlreadyExists);
                        }
                        insert_user(txn, &owner).await.map_err(|e| {
                            conflict_or_internal(
                                e,
                                RatingsServiceError::UserAlreadyExists,
                                "insert store owner",
                            )
                        })?;
                    }
                    Ok(())
                })
            })
            .await;
        flatten_transaction(result, "create store")
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<(), RatingsServiceError> {
        let result = self
            .db
            .transaction::<_, (), RatingsServiceError>(|txn| {
                Box::pin(async move {
                    let store = stores::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .context("find store for delete")?;
                    if store.is_none() {
                        return Err(RatingsServiceError::StoreNotFound);
                    }

                    ratings::Entity::delete_many()
                        .filter(ratings::Column::StoreId.eq(id))
                        .exec(txn)
                        .await
                        .context("delete store ratings")?;
                    users::Entity::delete_many()
                        .filter(users::Column::StoreId.eq(id))
                        .filter(users::Column::Role.eq(UserRole::StoreOwner.as_str()))
                        .exec(txn)
                        .await
                        .context("delete store owner")?;
                    stores::Entity::delete_by_id(id)
                        .exec(txn)
                        .await
                        .context("delete store")?;
                    Ok(())
                })
            })
            .await;
        flatten_transaction(result, "delete store")
    }

    async fn list(
        &self,
        filter: &StoreFilter,
        page: PageRequest,
    ) -> Result<Vec<Store>, RatingsServiceError> {
        let mut query = stores::Entity::find();
        if let Some(name) = filter.name.as_deref() {
            query = query.filter(stores::Column::Name.contains(name));
        }
        if let Some(address) = filter.address.as_deref() {
            query = query.filter(stores::Column::Address.contains(address));
        }
        let models = query
            .order_by_asc(stores::Column::Name)
            .order_by_asc(stores::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list stores")?;
        Ok(models.into_iter().map(store_from_model).collect())
    }

    async fn count(&self) -> Result<u64, RatingsServiceError> {
        let count = stores::Entity::find()
            .count(&self.db)
            .await
            .context("count stores")?;
        Ok(count)
    }
}

fn store_from_model(model: stores::Model) -> Store {
    Store {
        id: model.id,
        name: model.name,
        email: model.email,
        address: model.address,
        average_rating: model.average_rating,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Rating repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRatingRepository {
    pub db: DatabaseConnection,
}

impl RatingRepository for DbRatingRepository {
    async fn submit(&self, rating: &Rating) -> Result<f64, RatingsServiceError> {
        let result = self
            .db
            .transaction::<_, f64, RatingsServiceError>(|txn| {
                let rating = rating.clone();
                Box::pin(async move {
                    // Serializes concurrent submissions for the same store.
                    stores::Entity::find_by_id(rating.store_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock store")?
                        .ok_or(RatingsServiceError::StoreNotFound)?;

                    ratings::Entity::insert(ratings::ActiveModel {
                        id: Set(rating.id),
                        value: Set(rating.value),
                        user_id: Set(rating.user_id),
                        store_id: Set(rating.store_id),
                        created_at: Set(rating.created_at),
                        updated_at: Set(rating.updated_at),
                    })
                    .on_conflict(
                        OnConflict::columns([ratings::Column::UserId, ratings::Column::StoreId])
                            .update_columns([ratings::Column::Value, ratings::Column::UpdatedAt])
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await
                    .context("upsert rating")?;

                    let average = refresh_average(txn, rating.store_id)
                        .await
                        .context("recompute store average")?;
                    average.ok_or(RatingsServiceError::StoreNotFound)
                })
            })
            .await;
        flatten_transaction(result, "submit rating")
    }

    async fn recompute_average(&self, store_id: Uuid) -> Result<f64, RatingsServiceError> {
        refresh_average(&self.db, store_id)
            .await
            .context("recompute store average")?
            .ok_or(RatingsServiceError::StoreNotFound)
    }

    async fn store_with_ratings(
        &self,
        store_id: Uuid,
    ) -> Result<Option<(Store, Vec<RatingWithRater>)>, RatingsServiceError> {
        let result = self
            .db
            .transaction::<_, Option<(Store, Vec<RatingWithRater>)>, RatingsServiceError>(|txn| {
                Box::pin(async move {
                    // Shared lock: waits out in-flight submissions, which hold the row exclusively.
                    let Some(store) = stores::Entity::find_by_id(store_id)
                        .lock_shared()
                        .one(txn)
                        .await
                        .context("lock store for report")?
                    else {
                        return Ok(None);
                    };
                    let rows = ratings::Entity::find()
                        .filter(ratings::Column::StoreId.eq(store_id))
                        .order_by_desc(ratings::Column::CreatedAt)
                        .order_by_desc(ratings::Column::Id)
                        .find_also_related(users::Entity)
                        .all(txn)
                        .await
                        .context("list store ratings")?;
                    let ratings = rows
                        .into_iter()
                        .map(|(rating, user)| -> Result<_, RatingsServiceError> {
                            let user = user.context("rating without rater")?;
                            Ok(RatingWithRater {
                                rating: rating_from_model(rating),
                                rater: Rater {
                                    id: user.id,
                                    name: user.name,
                                    email: user.email,
                                },
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Some((store_from_model(store), ratings)))
                })
            })
            .await;
        flatten_transaction(result, "read store report")
    }

    async fn values_by_user(
        &self,
        user_id: Uuid,
        store_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, i32)>, RatingsServiceError> {
        if store_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = ratings::Entity::find()
            .select_only()
            .column(ratings::Column::StoreId)
            .column(ratings::Column::Value)
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::StoreId.is_in(store_ids.iter().copied()))
            .into_tuple::<(Uuid, i32)>()
            .all(&self.db)
            .await
            .context("list ratings by user")?;
        Ok(rows)
    }

    async fn count(&self) -> Result<u64, RatingsServiceError> {
        let count = ratings::Entity::find()
            .count(&self.db)
            .await
            .context("count ratings")?;
        Ok(count)
    }
}

/// One statement, so the stored average always matches the ledger it was read from.
const REFRESH_AVERAGE_SQL: &str = r#"
    UPDATE stores
    SET average_rating = COALESCE(
        (SELECT CAST(AVG(value) AS DOUBLE PRECISION) FROM ratings WHERE store_id = $1),
        0.0
    )
    WHERE id = $1
"#;

/// Rewrites `stores.average_rating` from the ratings table and returns the stored value,
/// or `None` when the store does not exist.
async fn refresh_average<C: ConnectionTrait>(
    conn: &C,
    store_id: Uuid,
) -> Result<Option<f64>, DbErr> {
    conn.execute(Statement::from_sql_and_values(
        conn.get_database_backend(),
        REFRESH_AVERAGE_SQL,
        [store_id.into()],
    ))
    .await?;
    let average = stores::Entity::find_by_id(store_id)
        .select_only()
        .column(stores::Column::AverageRating)
        .into_tuple::<f64>()
        .one(conn)
        .await?;
    Ok(average)
}

fn rating_from_model(model: ratings::Model) -> Rating {
    Rating {
        id: model.id,
        user_id: model.user_id,
        store_id: model.store_id,
        value: model.value,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn conflict_or_internal(
    err: DbErr,
    conflict: RatingsServiceError,
    context: &'static str,
) -> RatingsServiceError {
    if is_unique_violation(&err) {
        conflict
    } else {
        anyhow::Error::new(err).context(context).into()
    }
}

fn flatten_transaction<T>(
    result: Result<T, TransactionError<RatingsServiceError>>,
    context: &'static str,
) -> Result<T, RatingsServiceError> {
    result.map_err(|err| match err {
        TransactionError::Connection(e) => anyhow::Error::new(e).context(context).into(),
        TransactionError::Transaction(e) => e,
    })
}
