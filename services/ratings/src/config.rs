/// Ratings service configuration loaded from environment variables.
#[derive(Debug)]
pub struct RatingsConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for access tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 5000). Env var: `RATINGS_PORT`.
    pub ratings_port: u16,
    /// Apply pending migrations at startup (default true). Env var: `RUN_MIGRATIONS`.
    pub run_migrations: bool,
}

impl RatingsConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            ratings_port: std::env::var("RATINGS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
