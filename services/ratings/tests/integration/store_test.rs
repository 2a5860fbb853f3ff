use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use storerate_domain::pagination::PageRequest;
use storerate_domain::user::UserRole;
use storerate_ratings::domain::repository::{RatingRepository, StoreRepository, UserRepository};
use storerate_ratings::domain::types::StoreFilter;
use storerate_ratings::error::RatingsServiceError;
use storerate_ratings::usecase::store::{
    CreateStoreInput, CreateStoreUseCase, DeleteStoreUseCase, ListStoresUseCase, OwnerOptions,
};
use storerate_ratings_schema::{ratings, stores, users};

use crate::helpers::{
    PASSWORD, PlainPasswords, rating, rating_repo, seed_customer, seed_store, seed_user,
    store_repo, test_db, user_repo,
};

fn create_input(email: &str, with_owner: bool) -> CreateStoreInput {
    CreateStoreInput {
        name: "Riverside Hardware Supplies".into(),
        email: email.into(),
        address: "4 River Walk".into(),
        owner: with_owner.then(|| OwnerOptions {
            name: "Riverside Hardware Owner".into(),
            password: PASSWORD.into(),
        }),
    }
}

async fn stores_with_email(db: &sea_orm::DatabaseConnection, email: &str) -> u64 {
    stores::Entity::find()
        .filter(stores::Column::Email.eq(email))
        .count(db)
        .await
        .unwrap()
}

// ── createStore ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_provision_store_and_owner_together() {
    let db = test_db().await;
    let usecase = CreateStoreUseCase {
        repo: store_repo(&db),
        passwords: PlainPasswords,
    };

    let created = usecase
        .execute(create_input("hardware@example.com", true))
        .await
        .unwrap();

    let credentials = created.owner.expect("owner credentials");
    assert_eq!(credentials.email, "hardware@example.com");
    assert_eq!(credentials.name, "Riverside Hardware Owner");

    let owner = user_repo(&db)
        .find_owner_of_store(created.store.id)
        .await
        .unwrap()
        .expect("owner row");
    assert_eq!(owner.role, UserRole::StoreOwner);
    assert_eq!(owner.email, created.store.email);
    assert_eq!(owner.address, created.store.address);
    assert_eq!(owner.store_id, Some(created.store.id));

    let hash = user_repo(&db)
        .find_password_hash(owner.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hash, format!("plain:{PASSWORD}"));
}

#[tokio::test]
async fn should_provision_store_without_owner() {
    let db = test_db().await;
    let usecase = CreateStoreUseCase {
        repo: store_repo(&db),
        passwords: PlainPasswords,
    };

    let created = usecase
        .execute(create_input("solo@example.com", false))
        .await
        .unwrap();

    assert!(created.owner.is_none());
    assert_eq!(created.store.average_rating, 0.0);
    let stored = store_repo(&db)
        .find_by_id(created.store.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.email, "solo@example.com");
    assert_eq!(users::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn should_reject_duplicate_store_email() {
    let db = test_db().await;
    seed_store(&db, "taken@example.com").await;
    let usecase = CreateStoreUseCase {
        repo: store_repo(&db),
        passwords: PlainPasswords,
    };

    let result = usecase
        .execute(create_input("taken@example.com", true))
        .await;

    assert!(matches!(result, Err(RatingsServiceError::StoreAlreadyExists)));
    assert_eq!(stores_with_email(&db, "taken@example.com").await, 1);
    assert_eq!(users::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn should_roll_back_store_when_owner_email_is_taken() {
    let db = test_db().await;
    seed_user(&db, "clash@example.com", UserRole::User, None).await;
    let usecase = CreateStoreUseCase {
        repo: store_repo(&db),
        passwords: PlainPasswords,
    };

    let result = usecase
        .execute(create_input("clash@example.com", true))
        .await;

    // The owner check runs after the store insert; the store must not survive it.
    assert!(matches!(result, Err(RatingsServiceError::UserAlreadyExists)));
    assert_eq!(stores_with_email(&db, "clash@example.com").await, 0);
    assert_eq!(users::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn should_allow_store_email_of_existing_user_without_owner() {
    let db = test_db().await;
    seed_user(&db, "shared@example.com", UserRole::User, None).await;
    let usecase = CreateStoreUseCase {
        repo: store_repo(&db),
        passwords: PlainPasswords,
    };

    let created = usecase
        .execute(create_input("shared@example.com", false))
        .await
        .unwrap();

    assert!(created.owner.is_none());
    assert_eq!(stores_with_email(&db, "shared@example.com").await, 1);
}

// ── deleteStore ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_store_with_its_ratings_and_owner() {
    let db = test_db().await;
    let created = CreateStoreUseCase {
        repo: store_repo(&db),
        passwords: PlainPasswords,
    }
    .execute(create_input("doomed@example.com", true))
    .await
    .unwrap();
    let other = seed_store(&db, "survivor@example.com").await;
    let customer = seed_customer(&db).await;
    rating_repo(&db)
        .submit(&rating(customer.id, created.store.id, 4))
        .await
        .unwrap();
    rating_repo(&db)
        .submit(&rating(customer.id, other.id, 2))
        .await
        .unwrap();

    DeleteStoreUseCase {
        repo: store_repo(&db),
    }
    .execute(created.store.id)
    .await
    .unwrap();

    assert!(
        store_repo(&db)
            .find_by_id(created.store.id)
            .await
            .unwrap()
            .is_none()
    );
    let remaining_for_store = ratings::Entity::find()
        .filter(ratings::Column::StoreId.eq(created.store.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining_for_store, 0);
    assert!(
        user_repo(&db)
            .find_owner_of_store(created.store.id)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(stores_with_email(&db, "doomed@example.com").await, 0);

    // Unrelated rows stay.
    assert!(user_repo(&db).find_by_id(customer.id).await.unwrap().is_some());
    assert_eq!(ratings::Entity::find().count(&db).await.unwrap(), 1);
    assert!(store_repo(&db).find_by_id(other.id).await.unwrap().is_some());
}

#[tokio::test]
async fn should_leave_data_untouched_when_deleting_missing_store() {
    let db = test_db().await;
    let store = seed_store(&db, "kept@example.com").await;
    let customer = seed_customer(&db).await;
    rating_repo(&db)
        .submit(&rating(customer.id, store.id, 5))
        .await
        .unwrap();

    let result = DeleteStoreUseCase {
        repo: store_repo(&db),
    }
    .execute(Uuid::now_v7())
    .await;

    assert!(matches!(result, Err(RatingsServiceError::StoreNotFound)));
    assert_eq!(stores::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(users::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(ratings::Entity::find().count(&db).await.unwrap(), 1);
}

// ── listStores ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_stores_with_filters_and_own_rating() {
    let db = test_db().await;
    let rated = seed_store(&db, "rated@example.com").await;
    let unrated = seed_store(&db, "unrated@example.com").await;
    let customer = seed_customer(&db).await;
    rating_repo(&db)
        .submit(&rating(customer.id, rated.id, 3))
        .await
        .unwrap();

    let usecase = ListStoresUseCase {
        stores: store_repo(&db),
        ratings: rating_repo(&db),
    };

    let listings = usecase
        .execute(
            customer.id,
            UserRole::User,
            &StoreFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(listings.len(), 2);
    let rated_listing = listings.iter().find(|l| l.store.id == rated.id).unwrap();
    assert_eq!(rated_listing.viewer_rating, Some(3));
    assert_eq!(rated_listing.store.average_rating, 3.0);
    let unrated_listing = listings.iter().find(|l| l.store.id == unrated.id).unwrap();
    assert_eq!(unrated_listing.viewer_rating, None);

    let filtered = usecase
        .execute(
            customer.id,
            UserRole::User,
            &StoreFilter {
                name: Some("Nowhere Near".into()),
                address: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert!(filtered.is_empty());

    let paged = usecase
        .execute(
            customer.id,
            UserRole::User,
            &StoreFilter::default(),
            PageRequest {
                per_page: 1,
                page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(paged.len(), 1);
}
