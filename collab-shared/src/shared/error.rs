use thiserror::Error;

/// Error taxonomy for the collaboration server (spec section 7).
///
/// Each variant maps to exactly one wire-level `{type, retryable}` pair via
/// [`CollabError::kind`] and [`CollabError::retryable`].
#[derive(Error, Debug)]
pub enum CollabError {
    #[error("authentication required")]
    AuthRequired,

    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("duplicate resource: {0}")]
    DuplicateResource(String),

    #[error("block no longer exists: {0}")]
    BlockGone(String),

    #[error("not joined to a workflow")]
    NotJoined,

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthRequired,
    InvalidSession,
    AccessDenied,
    InsufficientPermissions,
    ValidationError,
    ResourceNotFound,
    DuplicateResource,
    BlockGone,
    NotJoined,
    RoomNotFound,
    Database,
    Configuration,
    OperationFailed,
    Unknown,
}

impl CollabError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollabError::AuthRequired => ErrorKind::AuthRequired,
            CollabError::InvalidSession(_) => ErrorKind::InvalidSession,
            CollabError::AccessDenied(_) => ErrorKind::AccessDenied,
            CollabError::InsufficientPermissions(_) => ErrorKind::InsufficientPermissions,
            CollabError::ValidationError(_) => ErrorKind::ValidationError,
            CollabError::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            CollabError::DuplicateResource(_) => ErrorKind::DuplicateResource,
            CollabError::BlockGone(_) => ErrorKind::BlockGone,
            CollabError::NotJoined => ErrorKind::NotJoined,
            CollabError::RoomNotFound(_) => ErrorKind::RoomNotFound,
            CollabError::Database(_) => ErrorKind::Database,
            CollabError::Configuration(_) => ErrorKind::Configuration,
            CollabError::OperationFailed(_) => ErrorKind::OperationFailed,
            CollabError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Per spec section 7: validation/not-found-on-delete/duplicate errors are
    /// non-retryable; database and unknown errors are retryable.
    pub fn retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::ValidationError
            | ErrorKind::DuplicateResource
            | ErrorKind::BlockGone
            | ErrorKind::NotJoined
            | ErrorKind::RoomNotFound
            | ErrorKind::AuthRequired
            | ErrorKind::InvalidSession
            | ErrorKind::AccessDenied
            | ErrorKind::InsufficientPermissions => false,
            ErrorKind::ResourceNotFound | ErrorKind::Database | ErrorKind::OperationFailed | ErrorKind::Unknown => true,
            ErrorKind::Configuration => false,
        }
    }

    /// A short machine-readable tag used in `operation-failed`/`operation-error` frames.
    pub fn wire_type(&self) -> &'static str {
        match self.kind() {
            ErrorKind::AuthRequired => "AuthRequired",
            ErrorKind::InvalidSession => "InvalidSession",
            ErrorKind::AccessDenied => "AccessDenied",
            ErrorKind::InsufficientPermissions => "InsufficientPermissions",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ResourceNotFound => "ResourceNotFound",
            ErrorKind::DuplicateResource => "DuplicateResource",
            ErrorKind::BlockGone => "BlockGone",
            ErrorKind::NotJoined => "NotJoined",
            ErrorKind::RoomNotFound => "RoomNotFound",
            ErrorKind::Database | ErrorKind::OperationFailed => "OperationFailed",
            ErrorKind::Configuration => "Configuration",
            ErrorKind::Unknown => "UnknownError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_non_retryable() {
        let err = CollabError::ValidationError("bad field".into());
        assert!(!err.retryable());
        assert_eq!(err.wire_type(), "ValidationError");
    }

    #[test]
    fn database_errors_are_retryable() {
        let err = CollabError::OperationFailed("insert failed".into());
        assert!(err.retryable());
    }

    #[test]
    fn block_gone_is_non_retryable() {
        let err = CollabError::BlockGone("b1".into());
        assert!(!err.retryable());
    }
}
