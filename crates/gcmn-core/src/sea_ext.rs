use sea_orm::{DbErr, SqlErr};

/// Message of a unique-constraint violation, if that is what `err` is.
///
/// The message names the violated index or column on every supported backend,
/// so callers can tell constraints apart with a substring check.
pub fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => Some(message),
        _ => None,
    }
}
