use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use storerate_core::health::{healthz, readyz};
use storerate_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{login, register, update_password},
    rating::{dashboard_stats, submit_rating},
    store::{
        create_store, delete_store, list_stores, my_store_report, recompute_average,
    },
    user::{create_user, get_user, list_users},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/password", put(update_password))
        // Users (admin)
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        // Stores
        .route("/stores", get(list_stores).post(create_store))
        .route("/stores/my-ratings", get(my_store_report))
        .route("/stores/{id}", delete(delete_store))
        .route("/stores/{id}/average", post(recompute_average))
        // Ratings
        .route("/ratings", post(submit_rating))
        .route("/ratings/stats", get(dashboard_stats))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
