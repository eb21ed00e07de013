//! Consistency Checker (4.11).
//!
//! Read-only diagnostic: surfaces graph integrity problems without
//! attempting to repair them. Exposed over HTTP for operators, grounded on
//! the teacher's `HealthCheckService`'s pattern of composing several cheap
//! read-only checks into one report.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use collab_shared::domain::repositories::EdgeRepository;
use collab_shared::shared::CollabResult;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyIssue {
    pub code: String,
    pub message: String,
    pub edge_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub valid: bool,
    pub issues: Vec<ConsistencyIssue>,
}

pub struct ConsistencyChecker {
    pool: PgPool,
    edge_repository: Arc<dyn EdgeRepository>,
}

impl ConsistencyChecker {
    pub fn new(pool: PgPool, edge_repository: Arc<dyn EdgeRepository>) -> Self {
        Self { pool, edge_repository }
    }

    pub async fn check(&self, workflow_id: Uuid) -> CollabResult<ConsistencyReport> {
        let orphans = self.edge_repository.find_orphans(&self.pool, workflow_id).await?;

        let issues: Vec<ConsistencyIssue> = orphans
            .into_iter()
            .map(|edge| ConsistencyIssue {
                code: "ORPHAN_EDGE".to_string(),
                message: format!("edge {} references a block that no longer exists", edge.id),
                edge_id: Some(edge.id),
            })
            .collect();

        Ok(ConsistencyReport {
            valid: issues.is_empty(),
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_issues_is_valid() {
        let report = ConsistencyReport { valid: true, issues: vec![] };
        assert!(report.valid);
    }
}
