use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Ratings service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum RatingsServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("store not found")]
    StoreNotFound,
    #[error("store email already registered")]
    StoreAlreadyExists,
    #[error("a user with this email already exists")]
    UserAlreadyExists,
    #[error("store already has an owner")]
    StoreAlreadyOwned,
    #[error("rating must be an integer between 1 and 5")]
    InvalidRating,
    #[error("name must be between 20 and 60 characters")]
    InvalidName,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("address must be between 1 and 400 characters")]
    InvalidAddress,
    #[error(
        "password must be 8-16 characters with at least one uppercase letter and one special character"
    )]
    InvalidPassword,
    #[error("role must be one of admin, user, store_owner")]
    InvalidRole,
    #[error("store owners must be linked to a store")]
    StoreRequired,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl RatingsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::StoreNotFound => "STORE_NOT_FOUND",
            Self::StoreAlreadyExists => "STORE_ALREADY_EXISTS",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::StoreAlreadyOwned => "STORE_ALREADY_OWNED",
            Self::InvalidRating => "INVALID_RATING",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::InvalidRole => "INVALID_ROLE",
            Self::StoreRequired => "STORE_REQUIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for RatingsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::StoreNotFound => StatusCode::NOT_FOUND,
            Self::StoreAlreadyExists | Self::UserAlreadyExists | Self::StoreAlreadyOwned => {
                StatusCode::CONFLICT
            }
            Self::InvalidRating
            | Self::InvalidName
            | Self::InvalidEmail
            | Self::InvalidAddress
            | Self::InvalidPassword
            | Self::InvalidRole
            | Self::StoreRequired => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and already visible in the TraceLayer span.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
