/**
 * Collaboration Protocol Integration Tests
 *
 * Drives a real collab-server instance over a live WebSocket connection,
 * the way a browser client would, plus the side-band HTTP diagnostics.
 */

mod common;

use chrono::Utc;
use collab_server::protocol::OutboundEvent;
use collab_shared::domain::entities::Role;
use collab_shared::shared::api_response::ApiResponse;
use common::*;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore] // Requires test database - run with: cargo test --test integration -- --ignored
async fn owner_joining_its_own_workflow_receives_a_snapshot() {
    let app = setup_test_app().await;
    let workflow = seed_owned_workflow(&app).await;

    let mut socket = connect_ws(&app, OWNER_TOKEN).await;
    send_json(
        &mut socket,
        &json!({"event": "join-workflow", "data": {"workflowId": workflow.id}}),
    )
    .await;

    match recv_event(&mut socket).await {
        OutboundEvent::WorkflowState(snapshot) => {
            assert!(snapshot.blocks.is_empty());
            assert!(snapshot.edges.is_empty());
        }
        other => panic!("expected workflow-state, got {other:?}"),
    }

    teardown_test_app(&app).await;
}

#[tokio::test]
#[ignore]
async fn joining_a_workflow_without_access_is_rejected() {
    let app = setup_test_app().await;
    let workflow = seed_owned_workflow(&app).await;

    // READ_ONLY_TOKEN's identity has no grant row and does not own the workflow.
    let mut socket = connect_ws(&app, READ_ONLY_TOKEN).await;
    send_json(
        &mut socket,
        &json!({"event": "join-workflow", "data": {"workflowId": workflow.id}}),
    )
    .await;

    match recv_event(&mut socket).await {
        OutboundEvent::JoinWorkflowError { .. } => {}
        other => panic!("expected join-workflow-error, got {other:?}"),
    }

    teardown_test_app(&app).await;
}

#[tokio::test]
#[ignore]
async fn adding_a_block_broadcasts_to_every_other_participant_in_the_room() {
    let app = setup_test_app().await;
    let workflow = seed_owned_workflow(&app).await;
    grant_role(
        &app,
        *collab_shared::testing::fixtures::TEST_EDITOR_USER_UUID,
        workflow.id,
        Role::Write,
    )
    .await;

    let mut owner = connect_ws(&app, OWNER_TOKEN).await;
    send_json(&mut owner, &json!({"event": "join-workflow", "data": {"workflowId": workflow.id}})).await;
    recv_event(&mut owner).await; // workflow-state
    recv_event(&mut owner).await; // presence-update (owner alone)

    let mut editor = connect_ws(&app, EDITOR_TOKEN).await;
    send_json(&mut editor, &json!({"event": "join-workflow", "data": {"workflowId": workflow.id}})).await;
    recv_event(&mut editor).await; // workflow-state
    recv_event(&mut editor).await; // presence-update (owner + editor)
    recv_event(&mut owner).await; // presence-update (owner + editor), re-broadcast on editor's join

    let block_id = Uuid::new_v4();
    send_json(
        &mut owner,
        &json!({
            "event": "workflow-operation",
            "data": {
                "operation": "add",
                "target": "block",
                "payload": {
                    "id": block_id,
                    "type": "agent",
                    "name": "new block",
                    "position": {"x": 10.0, "y": 20.0},
                    "data": {},
                },
                "timestamp": Utc::now().timestamp_millis(),
                "operationId": "op-1",
            }
        }),
    )
    .await;

    match recv_event(&mut editor).await {
        OutboundEvent::WorkflowOperationBroadcast(broadcast) => {
            assert_eq!(broadcast.operation, "add");
            assert_eq!(broadcast.target, "block");
        }
        other => panic!("expected workflow-operation broadcast, got {other:?}"),
    }

    match recv_event(&mut owner).await {
        OutboundEvent::OperationConfirmed { operation_id, .. } => {
            assert_eq!(operation_id.as_deref(), Some("op-1"));
        }
        other => panic!("expected operation-confirmed, got {other:?}"),
    }

    teardown_test_app(&app).await;
}

#[tokio::test]
#[ignore]
async fn read_only_role_cannot_add_a_block() {
    let app = setup_test_app().await;
    let workflow = seed_owned_workflow(&app).await;
    grant_role(
        &app,
        *collab_shared::testing::fixtures::TEST_READ_ONLY_USER_UUID,
        workflow.id,
        Role::Read,
    )
    .await;

    let mut socket = connect_ws(&app, READ_ONLY_TOKEN).await;
    send_json(&mut socket, &json!({"event": "join-workflow", "data": {"workflowId": workflow.id}})).await;
    recv_event(&mut socket).await; // workflow-state
    recv_event(&mut socket).await; // presence-update (reader alone)

    send_json(
        &mut socket,
        &json!({
            "event": "workflow-operation",
            "data": {
                "operation": "add",
                "target": "block",
                "payload": {
                    "id": Uuid::new_v4(),
                    "type": "agent",
                    "name": "should not land",
                    "position": {"x": 0.0, "y": 0.0},
                    "data": {},
                },
                "timestamp": Utc::now().timestamp_millis(),
            }
        }),
    )
    .await;

    match recv_event(&mut socket).await {
        OutboundEvent::OperationForbidden { kind, .. } => assert_eq!(kind, "InsufficientPermissions"),
        other => panic!("expected operation-forbidden, got {other:?}"),
    }

    teardown_test_app(&app).await;
}

#[tokio::test]
#[ignore]
async fn consistency_endpoint_reports_a_clean_workflow_as_valid() {
    let app = setup_test_app().await;
    let workflow = seed_owned_workflow(&app).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api/workflows/{}/consistency", app.base_url, workflow.id))
        .send()
        .await
        .expect("consistency request failed");

    assert!(response.status().is_success());
    let body: ApiResponse<collab_server::consistency::ConsistencyReport> =
        response.json().await.expect("failed to parse consistency response");
    let report = body.data.expect("consistency report missing from response");
    assert!(report.valid);
    assert!(report.issues.is_empty());

    teardown_test_app(&app).await;
}
