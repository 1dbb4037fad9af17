//! SQLite backend: data and schema version survive a reopen

use flowstash::config::{Backend, StorageConfig};
use flowstash::migration::CURRENT_SCHEMA_VERSION;
use flowstash::model::GlobalVar;
use flowstash::{FolderRecord, ItemRef, Platform, StoreContext, StoragePort, Workflow};
use tempfile::TempDir;

fn sqlite_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        backend: Backend::Sqlite,
        data_dir: dir.path().join("nested").to_string_lossy().into_owned(),
        platform: Some(Platform::Darwin),
    }
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);

    {
        let ctx = StoreContext::open(&config).await.unwrap();
        ctx.initialize().await.unwrap();
        ctx.folders
            .save_with_children(FolderRecord::new(
                "tools",
                "Tools",
                vec![ItemRef::Workflow(Box::new(Workflow::command("fmt", "Format", vec!["cargo fmt".into()])))],
            ))
            .await
            .unwrap();
        ctx.global_vars.save(GlobalVar::new("g-1", "ORG", "acme")).await.unwrap();
    }

    assert!(config.database_path().exists());

    let ctx = StoreContext::open(&config).await.unwrap();
    let report = ctx.initialize().await.unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.from, CURRENT_SCHEMA_VERSION);
    assert_eq!(ctx.platform(), Platform::Darwin);

    let tree = ctx.folders.find_by_id_with_children("tools").await.unwrap();
    assert_eq!(tree.value.items.len(), 1);
    assert_eq!(tree.value.items[0].id(), "fmt");
    assert_eq!(ctx.global_vars.find_by_id("g-1").await.unwrap().value, "acme");

    let keys = ctx.storage().keys("workflow").await.unwrap();
    assert_eq!(keys, vec!["workflow/fmt", "workflow_index_darwin"]);
}
