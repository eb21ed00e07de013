use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Block;
use crate::shared::CollabResult;

/// Typed access to `workflow_blocks`.
///
/// Every write method takes the Mutation Engine's per-frame transaction
/// (spec 4.5: "all structural operations execute inside one database
/// transaction per frame"); reads used outside a mutation (snapshot
/// assembly, the consistency checker) take the pool directly.
#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn find_by_workflow(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Block>>;

    async fn find_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<Block>>;

    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, block: &Block) -> CollabResult<()>;

    /// Returns `true` iff a row matched.
    async fn update_position(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        x: f64,
        y: f64,
    ) -> CollabResult<bool>;

    async fn update_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        name: &str,
    ) -> CollabResult<bool>;

    /// Flips the stored `enabled` boolean, returning the new value if a row matched.
    async fn toggle_enabled(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<bool>>;

    async fn update_parent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        parent_id: Option<Uuid>,
        extent: Option<&str>,
    ) -> CollabResult<bool>;

    async fn update_wide(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        is_wide: bool,
    ) -> CollabResult<bool>;

    async fn update_advanced_mode(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        advanced_mode: bool,
    ) -> CollabResult<bool>;

    async fn toggle_handles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<bool>>;

    /// Generic `update` operation: overwrites whichever of `sub_blocks`,
    /// `outputs`, `data`, `height` are provided, leaving the rest untouched.
    #[allow(clippy::too_many_arguments)]
    async fn update_fields(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        sub_blocks: Option<serde_json::Value>,
        outputs: Option<serde_json::Value>,
        data: Option<serde_json::Value>,
        height: Option<f64>,
    ) -> CollabResult<bool>;

    /// Merges one key into the `sub_blocks` JSON object (the sub-block value
    /// path, 4.8). Returns `false` if the block does not exist.
    async fn update_sub_block_value(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        sub_block_id: &str,
        value: serde_json::Value,
    ) -> CollabResult<bool>;

    async fn delete(&self, tx: &mut Transaction<'_, Postgres>, workflow_id: Uuid, id: Uuid) -> CollabResult<bool>;

    /// IDs of every block with `parent_id = parent_id`, in insertion order
    /// (Subflow Node-List Rule, 4.5/9).
    async fn find_children_ids(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        parent_id: Uuid,
    ) -> CollabResult<Vec<Uuid>>;

    /// Deletes every direct child of `parent_id`, returning the deleted ids
    /// so the caller can cascade edge deletion (4.5 container *remove*).
    async fn delete_children_of(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        parent_id: Uuid,
    ) -> CollabResult<Vec<Uuid>>;
}
