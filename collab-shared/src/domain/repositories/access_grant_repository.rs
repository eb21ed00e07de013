use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Role;
use crate::shared::CollabResult;

/// Typed access to the `permissions` table backing `resolveAccess` (4.2).
#[async_trait]
pub trait AccessGrantRepository: Send + Sync {
    /// Looks up `(userId, entityType, entityId) → role`. Never cached — the
    /// service re-reads on every call (section 4.2, 5, 9).
    async fn find_role(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
    ) -> CollabResult<Option<Role>>;
}
