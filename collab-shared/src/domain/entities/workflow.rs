use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Parent of every block, edge, and subflow in the graph (section 3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workflow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub last_saved: Option<DateTime<Utc>>,
    pub is_deployed: bool,
    pub deployed_at: Option<DateTime<Utc>>,
    pub deployment_statuses: serde_json::Value,
    pub has_active_schedule: bool,
    pub has_active_webhook: bool,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(workspace_id: Uuid, owner_user_id: Uuid, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            owner_user_id,
            name,
            updated_at: now,
            last_saved: None,
            is_deployed: false,
            deployed_at: None,
            deployment_statuses: serde_json::json!({}),
            has_active_schedule: false,
            has_active_webhook: false,
            created_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_recognized() {
        let owner = Uuid::new_v4();
        let wf = Workflow::new(Uuid::new_v4(), owner, "w1".into());
        assert!(wf.is_owned_by(owner));
        assert!(!wf.is_owned_by(Uuid::new_v4()));
    }
}
