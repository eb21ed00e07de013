use crate::shared::error::CollabError;

pub type CollabResult<T> = Result<T, CollabError>;
