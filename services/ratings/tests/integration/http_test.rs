use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use serde_json::{Value, json};
use uuid::Uuid;

use storerate_core::middleware::X_REQUEST_ID;
use storerate_domain::user::UserRole;
use storerate_ratings::router::build_router;
use storerate_ratings::state::AppState;
use storerate_testing::auth::{MockAuth, test_secret};

use crate::helpers::{PASSWORD, seed_customer, seed_store, test_db};

async fn server() -> (TestServer, sea_orm::DatabaseConnection) {
    let db = test_db().await;
    let state = AppState {
        db: db.clone(),
        jwt_secret: test_secret(),
    };
    (TestServer::new(build_router(state)).unwrap(), db)
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

#[tokio::test]
async fn should_answer_health_checks_with_request_id() {
    let (server, _db) = server().await;

    let response = server.get("/healthz").await;

    response.assert_status_ok();
    assert!(!response.header(X_REQUEST_ID).is_empty());
}

#[tokio::test]
async fn should_reject_missing_token() {
    let (server, _db) = server().await;

    let response = server.get("/stores").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_customer_from_creating_stores() {
    let (server, _db) = server().await;
    let (name, value) = MockAuth::new(Uuid::now_v7(), UserRole::User).header();

    let response = server
        .post("/stores")
        .add_header(name, value)
        .json(&json!({
            "name": "Unauthorised Pop-up Stall",
            "email": "popup@example.com",
            "address": "Market Square",
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_provision_store_and_serve_owner_report() {
    let (server, _db) = server().await;
    let (name, value) = MockAuth::admin().header();

    let created = server
        .post("/stores")
        .add_header(name, value)
        .json(&json!({
            "name": "Riverside Hardware Supply",
            "email": "hardware@example.com",
            "address": "8 Wharf Street",
            "owner": { "name": "Riverside Hardware Owner", "password": PASSWORD },
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let created: Value = created.json();
    assert_eq!(created["owner"]["email"], "hardware@example.com");
    assert_eq!(created["store"]["average_rating"], 0.0);

    let session = server
        .post("/auth/login")
        .json(&json!({ "email": "hardware@example.com", "password": PASSWORD }))
        .await;
    session.assert_status_ok();
    let session: Value = session.json();
    assert_eq!(session["user"]["role"], "store_owner");
    let token = session["token"].as_str().unwrap();

    let (name, value) = bearer(token);
    let report = server.get("/stores/my-ratings").add_header(name, value).await;
    report.assert_status_ok();
    let report: Value = report.json();
    assert_eq!(report["store"]["id"], created["store"]["id"]);
    assert_eq!(report["ratings"], json!([]));
    assert_eq!(report["statistics"]["count"], 0);
    assert_eq!(
        report["statistics"]["distribution"],
        json!({ "1": 0, "2": 0, "3": 0, "4": 0, "5": 0 })
    );
}

#[tokio::test]
async fn should_submit_and_update_rating() {
    let (server, db) = server().await;
    let store = seed_store(&db, "bakery@example.com").await;
    let customer = seed_customer(&db).await;
    let auth = MockAuth::new(customer.id, UserRole::User);

    for value in [4, 5] {
        let (name, header) = auth.header();
        let response = server
            .post("/ratings")
            .add_header(name, header)
            .json(&json!({ "store_id": store.id, "rating": value }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["rating"], value);
        assert_eq!(body["average_rating"], f64::from(value));
    }

    let (name, header) = auth.header();
    let listing = server.get("/stores").add_header(name, header).await;
    listing.assert_status_ok();
    let listing: Value = listing.json();
    assert_eq!(listing[0]["user_rating"], 5);
    assert_eq!(listing[0]["average_rating"], 5.0);
}

#[tokio::test]
async fn should_reject_out_of_range_rating() {
    let (server, db) = server().await;
    let store = seed_store(&db, "range@example.com").await;
    let customer = seed_customer(&db).await;
    let (name, value) = MockAuth::new(customer.id, UserRole::User).header();

    let response = server
        .post("/ratings")
        .add_header(name, value)
        .json(&json!({ "store_id": store.id, "rating": 6 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_RATING");
}

#[tokio::test]
async fn should_reject_non_integer_rating_as_invalid() {
    let (server, db) = server().await;
    let store = seed_store(&db, "fractional@example.com").await;
    let customer = seed_customer(&db).await;
    let auth = MockAuth::new(customer.id, UserRole::User);

    for rating in [json!(4.5), json!("5")] {
        let (name, value) = auth.header();
        let response = server
            .post("/ratings")
            .add_header(name, value)
            .json(&json!({ "store_id": store.id, "rating": rating }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["kind"], "INVALID_RATING");
    }
}

#[tokio::test]
async fn should_return_not_found_when_deleting_unknown_store() {
    let (server, _db) = server().await;
    let (name, value) = MockAuth::admin().header();

    let response = server
        .delete(&format!("/stores/{}", Uuid::now_v7()))
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "STORE_NOT_FOUND");
}

#[tokio::test]
async fn should_report_dashboard_totals_to_admin() {
    let (server, db) = server().await;
    seed_store(&db, "one@example.com").await;
    seed_store(&db, "two@example.com").await;
    seed_customer(&db).await;
    let (name, value) = MockAuth::admin().header();

    let response = server.get("/ratings/stats").add_header(name, value).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_stores"], 2);
    assert_eq!(body["total_users"], 1);
    assert_eq!(body["total_ratings"], 0);
}
