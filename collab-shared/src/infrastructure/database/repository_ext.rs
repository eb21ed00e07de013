//! Eliminates repeated `.map_err(|e| CollabError::Database(e))` patterns across
//! repository implementations, adding operation context and structured logging.

use tracing::error;

use crate::shared::{CollabError, CollabResult};

/// Extension trait for standardized repository error handling.
pub trait RepositoryErrorExt<T> {
    /// Maps a database error with operation and entity context, e.g.
    /// `.map_db_error("insert", "block")`.
    fn map_db_error(self, operation: &str, entity: &str) -> CollabResult<T>;

    /// Maps a database error with a custom message for call sites that don't
    /// fit the "{operation} {entity}" shape.
    fn map_db_error_msg(self, message: &str) -> CollabResult<T>;
}

impl<T> RepositoryErrorExt<T> for Result<T, sqlx::Error> {
    fn map_db_error(self, operation: &str, entity: &str) -> CollabResult<T> {
        self.map_err(|e| {
            error!(
                operation = %operation,
                entity = %entity,
                error = %e,
                "database error during {} {}",
                operation,
                entity
            );
            CollabError::Database(e)
        })
    }

    fn map_db_error_msg(self, message: &str) -> CollabResult<T> {
        self.map_err(|e| {
            error!(message = %message, error = %e, "database error: {}", message);
            CollabError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_db_error_preserves_ok() {
        let result: Result<i32, sqlx::Error> = Ok(42);
        let mapped = result.map_db_error("test", "entity").unwrap();
        assert_eq!(mapped, 42);
    }

    #[test]
    fn map_db_error_msg_preserves_ok() {
        let result: Result<String, sqlx::Error> = Ok("success".to_string());
        let mapped = result.map_db_error_msg("test message").unwrap();
        assert_eq!(mapped, "success");
    }
}
