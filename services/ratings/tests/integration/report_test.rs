use chrono::{Duration, Utc};
use uuid::Uuid;

use storerate_domain::user::UserRole;
use storerate_ratings::domain::repository::RatingRepository;
use storerate_ratings::error::RatingsServiceError;
use storerate_ratings::infra::db::{DbRatingRepository, DbUserRepository};
use storerate_ratings::usecase::rating::{SubmitRatingInput, SubmitRatingUseCase};
use storerate_ratings::usecase::report::GetStoreReportUseCase;

use crate::helpers::{
    rating_at, rating_repo, seed_customer, seed_store, seed_user, test_db, user_repo,
};

fn report_usecase(
    db: &sea_orm::DatabaseConnection,
) -> GetStoreReportUseCase<DbRatingRepository, DbUserRepository> {
    GetStoreReportUseCase {
        ratings: rating_repo(db),
        users: user_repo(db),
    }
}

#[tokio::test]
async fn should_report_all_zeros_without_ratings() {
    let db = test_db().await;
    let store = seed_store(&db, "quiet@example.com").await;

    let report = report_usecase(&db).execute(store.id).await.unwrap();

    assert_eq!(report.store.id, store.id);
    assert!(report.ratings.is_empty());
    let stats = report.statistics;
    assert_eq!(stats.average, 0.0);
    assert_eq!(stats.count, 0);
    assert_eq!(stats.min, 0);
    assert_eq!(stats.max, 0);
    assert_eq!(
        stats.distribution.into_iter().collect::<Vec<_>>(),
        vec![(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]
    );
}

#[tokio::test]
async fn should_order_ratings_newest_first_by_creation() {
    let db = test_db().await;
    let store = seed_store(&db, "busy@example.com").await;
    let oldest = seed_customer(&db).await;
    let middle = seed_customer(&db).await;
    let newest = seed_customer(&db).await;
    let base = Utc::now() - Duration::hours(3);
    let repo = rating_repo(&db);
    repo.submit(&rating_at(oldest.id, store.id, 2, base))
        .await
        .unwrap();
    repo.submit(&rating_at(middle.id, store.id, 4, base + Duration::hours(1)))
        .await
        .unwrap();
    repo.submit(&rating_at(newest.id, store.id, 5, base + Duration::hours(2)))
        .await
        .unwrap();
    // Updating keeps the original creation time, so the oldest stays last.
    repo.submit(&rating_at(oldest.id, store.id, 1, Utc::now()))
        .await
        .unwrap();

    let report = report_usecase(&db).execute(store.id).await.unwrap();

    let order: Vec<Uuid> = report.ratings.iter().map(|r| r.rater.id).collect();
    assert_eq!(order, vec![newest.id, middle.id, oldest.id]);
    assert_eq!(report.ratings[2].rating.value, 1);
    assert_eq!(report.ratings[0].rater.email, newest.email);
    assert_eq!(report.ratings[0].rater.name, newest.name);

    let stats = report.statistics;
    assert_eq!(stats.count, 3);
    assert_eq!(stats.min, 1);
    assert_eq!(stats.max, 5);
    assert!((stats.average - 10.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.distribution[&1], 1);
    assert_eq!(stats.distribution[&2], 0);
    assert_eq!(stats.distribution[&4], 1);
    assert_eq!(stats.distribution[&5], 1);
}

#[tokio::test]
async fn should_resolve_owner_report_to_own_store() {
    let db = test_db().await;
    let mine = seed_store(&db, "mine@example.com").await;
    let theirs = seed_store(&db, "theirs@example.com").await;
    let owner = seed_user(&db, "mine@example.com", UserRole::StoreOwner, Some(mine.id)).await;
    let customer = seed_customer(&db).await;
    let repo = rating_repo(&db);
    repo.submit(&rating_at(customer.id, mine.id, 4, Utc::now()))
        .await
        .unwrap();
    repo.submit(&rating_at(customer.id, theirs.id, 1, Utc::now()))
        .await
        .unwrap();

    let report = report_usecase(&db).execute_for_owner(owner.id).await.unwrap();

    assert_eq!(report.store.id, mine.id);
    assert_eq!(report.ratings.len(), 1);
    assert_eq!(report.statistics.average, 4.0);
}

#[tokio::test]
async fn should_forbid_customer_from_owner_report() {
    let db = test_db().await;
    let customer = seed_customer(&db).await;

    let result = report_usecase(&db).execute_for_owner(customer.id).await;

    assert!(matches!(result, Err(RatingsServiceError::Forbidden)));
}

#[tokio::test]
async fn should_return_store_not_found_for_unknown_store() {
    let db = test_db().await;
    let result = report_usecase(&db).execute(Uuid::now_v7()).await;
    assert!(matches!(result, Err(RatingsServiceError::StoreNotFound)));
}

#[tokio::test]
async fn should_report_stored_average_matching_listed_ratings() {
    let db = test_db().await;
    let store = seed_store(&db, "steady@example.com").await;
    let submit = SubmitRatingUseCase {
        ratings: rating_repo(&db),
        users: user_repo(&db),
    };
    for value in [5, 2, 4] {
        let customer = seed_customer(&db).await;
        submit
            .execute(
                customer.id,
                SubmitRatingInput {
                    store_id: store.id,
                    value,
                },
            )
            .await
            .unwrap();
    }

    let report = report_usecase(&db).execute(store.id).await.unwrap();

    assert_eq!(report.ratings.len(), 3);
    assert!((report.store.average_rating - report.statistics.average).abs() < 1e-9);
    assert!((report.statistics.average - 11.0 / 3.0).abs() < 1e-9);
}
