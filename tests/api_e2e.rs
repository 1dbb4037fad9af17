//! HTTP round trips against a server bound to an ephemeral port

mod common;

use common::memory_context;
use flowstash::server::create_router;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Start a server over a fresh, initialized memory store and return its base URL
async fn spawn_server() -> String {
    let (_, ctx) = memory_context();
    ctx.initialize().await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(Arc::new(ctx));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn health_check_responds() {
    let base = spawn_server().await;
    let body = reqwest::get(format!("{}/healthz", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn workflow_crud_cycle() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let workflow = json!({
        "id": "wf-1",
        "name": "Build",
        "mode": "command",
        "cmds": ["cargo build"],
        "color": "teal"
    });

    let created: Value = client
        .post(format!("{}/api/workflows", base))
        .json(&workflow)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["type"], "workflow");
    assert_eq!(created["color"], "teal");
    assert!(created["createdAt"].is_string());

    let duplicate = client
        .post(format!("{}/api/workflows", base))
        .json(&workflow)
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let mut renamed = created.clone();
    renamed["name"] = json!("Build all");
    let updated: Value = client
        .put(format!("{}/api/workflows/wf-1", base))
        .json(&renamed)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Build all");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let mismatched = client
        .put(format!("{}/api/workflows/other", base))
        .json(&renamed)
        .send()
        .await
        .unwrap();
    assert_eq!(mismatched.status(), StatusCode::BAD_REQUEST);

    let listing: Value = client
        .get(format!("{}/api/workflows", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["value"].as_array().unwrap().len(), 1);
    assert_eq!(listing["skipped"], 0);

    let deleted = client
        .delete(format!("{}/api/workflows/wf-1", base))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = client
        .get(format!("{}/api/workflows/wf-1", base))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn variables_are_served_separately() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/env-vars", base))
        .json(&json!({ "id": "e-1", "name": "RUST_LOG", "value": "debug" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let globals: Value = client
        .get(format!("{}/api/global-vars", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(globals["value"].as_array().unwrap().is_empty());

    let env: Value = client
        .get(format!("{}/api/env-vars/e-1", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(env["value"], "debug");
}

#[tokio::test]
async fn folder_tree_over_http() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let tree = json!({
        "id": "ops",
        "name": "Ops",
        "items": [
            { "id": "deploy", "type": "workflow", "name": "Deploy", "mode": "command", "cmds": ["./deploy"] },
            { "id": "db", "type": "folder", "name": "Database", "items": [
                { "id": "backup", "type": "workflow", "name": "Backup", "mode": "command" }
            ]}
        ]
    });

    let saved: Value = client
        .post(format!("{}/api/folders", base))
        .json(&tree)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["items"], json!(["deploy", "db"]));

    let loaded: Value = client
        .get(format!("{}/api/folders/ops", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loaded["skipped"], 0);
    assert_eq!(loaded["value"]["items"][1]["items"][0]["name"], "Backup");

    let report: Value = client
        .delete(format!("{}/api/folders/ops", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report, json!({ "removed": 4, "skipped": 0 }));

    let gone = client
        .get(format!("{}/api/workflows/backup", base))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn config_and_version_endpoints() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let version: Value = client
        .get(format!("{}/api/version", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(version["needsMigration"], false);
    assert_eq!(version["current"], version["target"]);

    let empty: Value = client
        .get(format!("{}/api/config", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty["value"]["tabs"], json!([]));
    assert_eq!(empty["value"]["platform"], "linux");

    let saved: Value = client
        .put(format!("{}/api/config", base))
        .json(&json!({
            "tabs": [{
                "id": "tab-1",
                "name": "Main",
                "items": [
                    { "id": "wf-1", "type": "workflow", "name": "Build", "mode": "command" },
                    "ghost"
                ]
            }]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["tabs"][0]["items"], json!(["wf-1", "ghost"]));
    assert_eq!(saved["version"], "2.0");

    let loaded: Value = client
        .get(format!("{}/api/config", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loaded["skipped"], 1);
    assert_eq!(loaded["value"]["tabs"][0]["items"][0]["id"], "wf-1");

    let blank_tab = client
        .put(format!("{}/api/config", base))
        .json(&json!({ "tabs": [{ "id": "", "name": "Nameless", "items": [] }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank_tab.status(), StatusCode::BAD_REQUEST);

    let modeless = client
        .put(format!("{}/api/config", base))
        .json(&json!({
            "tabs": [{ "id": "tab-1", "name": "Main", "items": [
                { "id": "wf-2", "type": "workflow", "name": "Deploy", "cmds": ["./deploy"] }
            ]}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(modeless.status(), StatusCode::BAD_REQUEST);

    let missing = client
        .get(format!("{}/api/workflows/wf-2", base))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_inline_folder_child_is_rejected() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/folders", base))
        .json(&json!({
            "id": "ops",
            "name": "Ops",
            "items": [{ "id": "w2", "type": "workflow", "name": "X" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let folder = client
        .get(format!("{}/api/folders/ops", base))
        .send()
        .await
        .unwrap();
    assert_eq!(folder.status(), StatusCode::NOT_FOUND);
}
