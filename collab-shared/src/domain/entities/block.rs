use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const CONTAINER_TYPE_LOOP: &str = "loop";
pub const CONTAINER_TYPE_PARALLEL: &str = "parallel";

/// A node in a workflow graph. `type` is free-form except for the two
/// reserved container types (section 3, I1-I3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Block {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub block_type: String,
    pub name: String,
    pub position_x: f64,
    pub position_y: f64,
    pub enabled: bool,
    pub horizontal_handles: bool,
    pub is_wide: bool,
    pub advanced_mode: bool,
    pub height: f64,
    pub sub_blocks: serde_json::Value,
    pub outputs: serde_json::Value,
    pub data: serde_json::Value,
    pub parent_id: Option<Uuid>,
    /// Constrained to the literal `"parent"` or absent (I2).
    pub extent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Is `block_type` one of the reserved container kinds that own a subflow?
pub fn is_container_type(block_type: &str) -> bool {
    matches!(block_type, CONTAINER_TYPE_LOOP | CONTAINER_TYPE_PARALLEL)
}

impl Block {
    pub fn is_container(&self) -> bool {
        is_container_type(&self.block_type)
    }
}
