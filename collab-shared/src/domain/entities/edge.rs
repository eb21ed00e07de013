use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A directed connection between two blocks in the same workflow (I4, I5).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Edge {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub source_block_id: Uuid,
    pub target_block_id: Uuid,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub created_at: DateTime<Utc>,
}
