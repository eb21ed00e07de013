//! Side-band HTTP surface: workflow-deletion notification (section 6) plus
//! the diagnostics routes (4.12). Everything here shares the `ApiResponse<T>`
//! envelope the teacher's handlers return.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use collab_shared::shared::api_response::{ApiError, ApiResponse};

use crate::collab::Broadcaster;
use crate::state::AppState;

pub async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct WorkflowDeletedRequest {
    pub workflow_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WorkflowDeletedResponse {
    pub success: bool,
}

/// `POST /api/workflow-deleted` — external notification that a workflow was
/// deleted elsewhere in the system; broadcasts, force-leaves every session,
/// and destroys the room if one is live.
pub async fn workflow_deleted(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WorkflowDeletedRequest>,
) -> Json<ApiResponse<WorkflowDeletedResponse>> {
    if let Some(handle) = state.rooms.get(body.workflow_id) {
        Broadcaster::workflow_deleted(
            &handle,
            body.workflow_id,
            "This workflow has been deleted".to_string(),
            chrono::Utc::now().timestamp_millis(),
        )
        .await;
        state.rooms.destroy(body.workflow_id).await;
    }

    Json(ApiResponse::success(WorkflowDeletedResponse { success: true }))
}

/// `GET /api/workflows/{workflowId}/consistency` (4.11, 4.12).
pub async fn get_consistency(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<Uuid>,
) -> Result<Json<ApiResponse<crate::consistency::ConsistencyReport>>, ApiError> {
    let report = state.consistency_checker.check(workflow_id).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomSummary {
    pub workflow_id: Uuid,
    pub connection_count: usize,
    pub unique_user_count: usize,
    pub presence: Vec<crate::protocol::PresenceEntry>,
}

/// `GET /api/workflows/{workflowId}/rooms` (4.12). Read-only: this never
/// opens a socket, it just reports whether a room is currently live.
pub async fn get_room_summary(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<Uuid>,
) -> Json<ApiResponse<RoomSummary>> {
    let Some(handle) = state.rooms.get(workflow_id) else {
        return Json(ApiResponse::success(RoomSummary {
            workflow_id,
            connection_count: 0,
            unique_user_count: 0,
            presence: Vec::new(),
        }));
    };

    let presence = handle.presence_snapshot().await;
    let (connection_count, unique_user_count) = {
        let room = handle.room.lock().await;
        (room.active_connections(), room.unique_user_count())
    };

    Json(ApiResponse::success(RoomSummary {
        workflow_id,
        connection_count,
        unique_user_count,
        presence,
    }))
}
