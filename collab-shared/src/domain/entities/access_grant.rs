use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Three-role model resolved per spec.md Open Question (a): ownership of a
/// workflow implies `Admin` regardless of any stored grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Write,
    Read,
}

impl Role {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "write" => Some(Role::Write),
            "read" => Some(Role::Read),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Write => "write",
            Role::Read => "read",
        }
    }
}

/// A `(userId, entityType, entityId) → role` row (section 3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessGrant {
    pub user_id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub permission_type: String,
    pub created_at: DateTime<Utc>,
}

impl AccessGrant {
    pub fn role(&self) -> Option<Role> {
        Role::from_str_opt(&self.permission_type)
    }
}
