use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use storerate_auth_types::token::JwtSecret;
use storerate_core::tracing::init_tracing;
use storerate_ratings::config::RatingsConfig;
use storerate_ratings::router::build_router;
use storerate_ratings::state::AppState;
use storerate_ratings_migration::Migrator;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = RatingsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to apply migrations");
        info!("migrations applied");
    }

    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(config.jwt_secret),
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.ratings_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("ratings service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
