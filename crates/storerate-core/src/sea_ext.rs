use sea_orm::{DbErr, SqlErr};

/// True when the database rejected a write because of a unique constraint.
///
/// Recognised for both PostgreSQL (`23505`) and SQLite (`2067`/`1555`).
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
