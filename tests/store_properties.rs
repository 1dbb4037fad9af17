//! Behavioural properties of the repositories over a memory backend

mod common;

use common::{memory_context, FlakyStorage};
use flowstash::model::{EnvVar, GlobalVar};
use flowstash::{FolderRecord, ItemRef, Platform, StoreContext, StoreError, StoragePort, TreeItem, Workflow};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn saved_record_reads_back_equal() {
    let (_, ctx) = memory_context();
    let saved = ctx
        .workflows
        .save(Workflow::command("wf-1", "Build", vec!["cargo build".into()]))
        .await
        .unwrap();

    let loaded = ctx.workflows.find_by_id("wf-1").await.unwrap();
    assert_eq!(loaded, saved);
    assert!(loaded.created_at.is_some());
    assert!(loaded.updated_at >= loaded.created_at);
}

#[tokio::test]
async fn resave_keeps_created_at_and_index() {
    let (_, ctx) = memory_context();
    let first = ctx.env_vars.save(EnvVar::new("e-1", "HOME", "/root")).await.unwrap();

    let mut edited = first.clone();
    edited.value = "/home/dev".into();
    let second = ctx.env_vars.save(edited).await.unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert_eq!(ctx.env_vars.count().await.unwrap(), 1);
    assert_eq!(ctx.env_vars.find_by_id("e-1").await.unwrap().value, "/home/dev");
}

#[tokio::test]
async fn count_tracks_saves_and_deletes() {
    let (_, ctx) = memory_context();
    for id in ["g-1", "g-2", "g-3"] {
        ctx.global_vars.save(GlobalVar::new(id, id, "v")).await.unwrap();
    }
    ctx.global_vars.delete("g-2").await.unwrap();

    assert_eq!(ctx.global_vars.count().await.unwrap(), 2);
    assert_eq!(ctx.global_vars.ids().await.unwrap(), vec!["g-1", "g-3"]);
    assert!(!ctx.global_vars.exists("g-2").await);
}

#[tokio::test]
async fn deleting_unknown_id_is_not_found() {
    let (_, ctx) = memory_context();
    let err = ctx.workflows.delete("ghost").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "workflow", .. }));
}

#[tokio::test]
async fn find_all_skips_records_missing_behind_index() {
    let (storage, ctx) = memory_context();
    ctx.workflows.save(Workflow::command("a", "A", vec![])).await.unwrap();
    ctx.workflows.save(Workflow::command("b", "B", vec![])).await.unwrap();
    storage.remove("workflow/a").await.unwrap();

    let listing = ctx.workflows.find_all().await.unwrap();
    assert_eq!(listing.skipped, 1);
    assert_eq!(listing.value.len(), 1);
    assert_eq!(listing.value[0].id, "b");
}

#[tokio::test]
async fn malformed_index_reads_as_empty() {
    let (storage, ctx) = memory_context();
    storage
        .set("workflow_index_linux", json!({ "ids": "not-a-list" }))
        .await
        .unwrap();

    let listing = ctx.workflows.find_all().await.unwrap();
    assert!(listing.value.is_empty());
    assert_eq!(ctx.workflows.count().await.unwrap(), 0);
}

#[tokio::test]
async fn platforms_do_not_share_indexes() {
    let storage = Arc::new(flowstash::MemoryStorage::new());
    let linux = StoreContext::new(storage.clone(), Platform::Linux).unwrap();
    let darwin = StoreContext::new(storage.clone(), Platform::Darwin).unwrap();

    linux.workflows.save(Workflow::command("wf", "Linux only", vec![])).await.unwrap();

    assert_eq!(linux.workflows.count().await.unwrap(), 1);
    assert_eq!(darwin.workflows.count().await.unwrap(), 0);
}

#[tokio::test]
async fn folder_tree_round_trips_in_order() {
    let (_, ctx) = memory_context();
    let tree = FolderRecord::new(
        "root",
        "Root",
        vec![
            ItemRef::Workflow(Box::new(Workflow::command("w1", "First", vec![]))),
            ItemRef::Folder(Box::new(FolderRecord::new(
                "sub",
                "Sub",
                vec![ItemRef::Workflow(Box::new(Workflow::command("w2", "Nested", vec![])))],
            ))),
            ItemRef::Workflow(Box::new(Workflow::command("w3", "Last", vec![]))),
        ],
    );

    let stored = ctx.folders.save_with_children(tree).await.unwrap();
    assert_eq!(
        stored.items,
        vec![ItemRef::id("w1"), ItemRef::id("sub"), ItemRef::id("w3")]
    );

    let loaded = ctx.folders.find_by_id_with_children("root").await.unwrap();
    assert_eq!(loaded.skipped, 0);
    let ids: Vec<&str> = loaded.value.items.iter().map(TreeItem::id).collect();
    assert_eq!(ids, vec!["w1", "sub", "w3"]);

    match &loaded.value.items[1] {
        TreeItem::Folder(sub) => {
            assert_eq!(sub.items.len(), 1);
            assert_eq!(sub.items[0].id(), "w2");
        }
        other => panic!("expected a folder, got {:?}", other),
    }
}

#[tokio::test]
async fn delete_with_children_removes_whole_subtree() {
    let (_, ctx) = memory_context();
    let tree = FolderRecord::new(
        "root",
        "Root",
        vec![
            ItemRef::Workflow(Box::new(Workflow::command("w1", "One", vec![]))),
            ItemRef::Workflow(Box::new(Workflow::command("w2", "Two", vec![]))),
            ItemRef::Folder(Box::new(FolderRecord::new(
                "sub",
                "Sub",
                vec![ItemRef::Workflow(Box::new(Workflow::command("w3", "Three", vec![])))],
            ))),
        ],
    );
    ctx.folders.save_with_children(tree).await.unwrap();

    let report = ctx.folders.delete_with_children("root").await.unwrap();
    assert_eq!(report.removed, 5);
    assert_eq!(report.skipped, 0);
    assert_eq!(ctx.folders.count().await.unwrap(), 0);
    assert_eq!(ctx.workflows.count().await.unwrap(), 0);
}

#[tokio::test]
async fn delete_with_children_tolerates_missing_child() {
    let (_, ctx) = memory_context();
    ctx.workflows.save(Workflow::command("w1", "One", vec![])).await.unwrap();
    ctx.folders
        .save(FolderRecord::new("root", "Root", vec![ItemRef::id("w1"), ItemRef::id("gone")]))
        .await
        .unwrap();

    let report = ctx.folders.delete_with_children("root").await.unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(report.skipped, 1);
    assert!(!ctx.folders.exists("root").await);
}

#[tokio::test]
async fn backend_failures_surface_as_storage_errors() {
    let storage = Arc::new(FlakyStorage::new());
    storage.poison("workflow/");
    let ctx = StoreContext::new(storage.clone(), Platform::Linux).unwrap();

    let err = ctx.workflows.find_by_id("wf-1").await.unwrap_err();
    match err {
        StoreError::Storage { operation, key, .. } => {
            assert_eq!(operation, "get");
            assert_eq!(key, "workflow/wf-1");
        }
        other => panic!("expected a storage error, got {:?}", other),
    }

    let err = ctx
        .workflows
        .save(Workflow::command("wf-1", "Build", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Storage { operation: "set", .. }));
    assert!(!ctx.workflows.exists("wf-1").await);
}

#[tokio::test]
async fn unreadable_version_falls_back_to_target() {
    let storage = Arc::new(FlakyStorage::new());
    storage.poison("version");
    let ctx = StoreContext::new(storage.clone(), Platform::Linux).unwrap();

    assert_eq!(
        ctx.versions.get_current_version().await,
        ctx.versions.target_version()
    );
    assert!(!ctx.versions.needs_migration().await);
}

#[tokio::test]
async fn blank_ids_are_rejected_before_any_write() {
    let (storage, ctx) = memory_context();
    let err = ctx.workflows.save(Workflow::command("  ", "Nameless", vec![])).await.unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert!(storage.is_empty().await);
}
