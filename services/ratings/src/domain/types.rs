use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use storerate_domain::user::UserRole;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Account as seen by the rest of the service. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: UserRole,
    /// Set iff `role` is `StoreOwner`.
    pub store_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with its stored password hash. Used for writes and login checks only.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    /// Mean of the store's rating values, 0 when unrated.
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One customer's rating of one store.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub value: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public details of the customer behind a rating.
#[derive(Debug, Clone)]
pub struct Rater {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct RatingWithRater {
    pub rating: Rating,
    pub rater: Rater,
}

#[derive(Debug, Clone)]
pub struct StoreSummary {
    pub id: Uuid,
    pub name: String,
    pub average_rating: f64,
}

/// A user plus the store they own, if any.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub owned_store: Option<StoreSummary>,
}

/// A store as listed to a caller, with the caller's own rating when they have one.
#[derive(Debug, Clone)]
pub struct StoreListing {
    pub store: Store,
    pub viewer_rating: Option<i32>,
}

/// Substring filters for the admin user list.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<UserRole>,
}

/// Substring filters for the store list.
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Aggregate view over a store's ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingStatistics {
    pub average: f64,
    pub count: u64,
    pub min: i32,
    pub max: i32,
    /// Occurrences per value; keys 1..=5 are always present.
    pub distribution: BTreeMap<i32, u64>,
}

impl RatingStatistics {
    pub fn from_values(values: &[i32]) -> Self {
        let mut distribution: BTreeMap<i32, u64> =
            (MIN_RATING..=MAX_RATING).map(|v| (v, 0)).collect();
        for value in values {
            if let Some(count) = distribution.get_mut(value) {
                *count += 1;
            }
        }
        Self {
            average: mean_rating(values),
            count: values.len() as u64,
            min: values.iter().copied().min().unwrap_or(0),
            max: values.iter().copied().max().unwrap_or(0),
            distribution,
        }
    }
}

/// Owner-facing report for one store.
#[derive(Debug, Clone)]
pub struct StoreReport {
    pub store: Store,
    /// Newest first.
    pub ratings: Vec<RatingWithRater>,
    pub statistics: RatingStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
}

/// Arithmetic mean with floating-point division; exactly 0 for no values.
pub fn mean_rating(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    sum as f64 / values.len() as f64
}

pub fn validate_rating(value: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&value)
}

/// Display names for users and stores: 20-60 characters after trimming.
pub fn validate_name(name: &str) -> bool {
    (20..=60).contains(&name.trim().chars().count())
}

/// 1-400 characters after trimming.
pub fn validate_address(address: &str) -> bool {
    (1..=400).contains(&address.trim().chars().count())
}

/// `local@domain.tld` with no whitespace and non-empty domain labels.
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// 8-16 characters with at least one uppercase letter and one special character.
pub fn validate_password(password: &str) -> bool {
    (8..=16).contains(&password.chars().count())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}
