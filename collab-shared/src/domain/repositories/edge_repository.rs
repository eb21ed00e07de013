use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Edge;
use crate::shared::CollabResult;

#[async_trait]
pub trait EdgeRepository: Send + Sync {
    async fn find_by_workflow(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Edge>>;

    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, edge: &Edge) -> CollabResult<()>;

    async fn delete(&self, tx: &mut Transaction<'_, Postgres>, workflow_id: Uuid, id: Uuid) -> CollabResult<bool>;

    /// Deletes every edge whose source or target is `block_id` (I5). Returns
    /// the number of rows removed.
    async fn delete_touching(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        block_id: Uuid,
    ) -> CollabResult<u64>;

    /// Deletes every edge whose source or target is in `block_ids`, for the
    /// container-block cascade (4.5 *remove*). Returns rows removed.
    async fn delete_touching_any(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        block_ids: &[Uuid],
    ) -> CollabResult<u64>;

    /// Orphan edges: edges whose source block no longer exists (4.11).
    async fn find_orphans(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Edge>>;
}
