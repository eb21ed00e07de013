use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata row associated 1:1 with a container block (I6, I7).
///
/// `id` equals the owning container block's id. `config.nodes` is the
/// server-maintained list of direct children; everything else in `config`
/// is opaque, type-specific configuration (iteration count, distribution
/// strategy, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subflow {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub subflow_type: String,
    pub config: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subflow {
    /// Default `config` for a newly-created `loop` subflow (4.5 *add*).
    pub fn default_loop_config(id: Uuid, data: &serde_json::Value) -> serde_json::Value {
        let iterations = data.get("count").and_then(|v| v.as_i64()).unwrap_or(5);
        let loop_type = data
            .get("loopType")
            .and_then(|v| v.as_str())
            .unwrap_or("for")
            .to_string();
        let for_each_items = data
            .get("collection")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        serde_json::json!({
            "id": id,
            "nodes": [],
            "iterations": iterations,
            "loopType": loop_type,
            "forEachItems": for_each_items,
        })
    }

    /// Default `config` for a newly-created `parallel` subflow (4.5 *add*).
    pub fn default_parallel_config(id: Uuid, data: &serde_json::Value) -> serde_json::Value {
        let distribution = data
            .get("collection")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let count = data.get("count").cloned();
        let parallel_type = data.get("parallelType").cloned();

        let mut config = serde_json::json!({
            "id": id,
            "nodes": [],
            "distribution": distribution,
        });
        if let Some(count) = count {
            config["count"] = count;
        }
        if let Some(parallel_type) = parallel_type {
            config["parallelType"] = parallel_type;
        }
        config
    }

    /// Rewrite `config.nodes` in place (Subflow Node-List Rule, section 4.5/9).
    pub fn set_nodes(config: &mut serde_json::Value, node_ids: Vec<Uuid>) {
        let nodes: Vec<serde_json::Value> = node_ids
            .into_iter()
            .map(|id| serde_json::Value::String(id.to_string()))
            .collect();
        config["nodes"] = serde_json::Value::Array(nodes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_config_uses_data_overrides() {
        let id = Uuid::new_v4();
        let data = serde_json::json!({"count": 7, "loopType": "for"});
        let config = Subflow::default_loop_config(id, &data);
        assert_eq!(config["iterations"], 7);
        assert_eq!(config["loopType"], "for");
        assert_eq!(config["nodes"], serde_json::json!([]));
    }

    #[test]
    fn loop_config_falls_back_to_defaults() {
        let id = Uuid::new_v4();
        let config = Subflow::default_loop_config(id, &serde_json::json!({}));
        assert_eq!(config["iterations"], 5);
        assert_eq!(config["loopType"], "for");
        assert_eq!(config["forEachItems"], "");
    }

    #[test]
    fn set_nodes_overwrites_existing_list() {
        let mut config = serde_json::json!({"nodes": ["stale"]});
        let fresh = vec![Uuid::new_v4(), Uuid::new_v4()];
        Subflow::set_nodes(&mut config, fresh.clone());
        let nodes = config["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], fresh[0].to_string());
    }
}
