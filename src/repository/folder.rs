/// Folder repository
///
/// Folders reference their children (other folders or workflows) by id. This repository
/// turns those references into a materialized tree, saves trees given with inline
/// children, and deletes whole subtrees.
///
/// Child failures never fail the parent: unresolvable or undeletable children are logged,
/// counted and skipped. Recursion carries the set of ancestor folder ids, so a reference
/// back to an ancestor is cut off instead of looping.

use crate::error::{StoreError, StoreResult};
use crate::model::{Folder, FolderRecord, ItemRef, TreeItem, Workflow};
use crate::repository::{DeleteReport, EntityRepository, Outcome};
use crate::storage::{Platform, StoragePort};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Reject tagged inline items that failed to decode, at any depth
pub(crate) fn validate_inline(owner: &str, items: &[ItemRef]) -> StoreResult<()> {
    for item in items {
        if let Some(error) = item.malformed_inline() {
            return Err(StoreError::Validation(format!(
                "malformed inline item '{}' in '{}': {}",
                item.reference().unwrap_or("<no id>"),
                owner,
                error
            )));
        }
        if let ItemRef::Folder(child) = item {
            validate_inline(&child.id, &child.items)?;
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct FolderRepository {
    folders: EntityRepository<FolderRecord>,
    workflows: EntityRepository<Workflow>,
}

impl FolderRepository {
    pub fn new(storage: Arc<dyn StoragePort>, platform: Platform) -> Self {
        Self {
            folders: EntityRepository::new(Arc::clone(&storage), platform),
            workflows: EntityRepository::new(storage, platform),
        }
    }

    /// Plain record access (items left as stored)
    pub fn records(&self) -> &EntityRepository<FolderRecord> {
        &self.folders
    }

    pub async fn find_by_id(&self, id: &str) -> StoreResult<FolderRecord> {
        self.folders.find_by_id(id).await
    }

    pub async fn find_all(&self) -> StoreResult<Outcome<Vec<FolderRecord>>> {
        self.folders.find_all().await
    }

    /// Save a folder record
    ///
    /// Inline children are written through `save_with_children`, so only ids reach disk.
    pub async fn save(&self, folder: FolderRecord) -> StoreResult<FolderRecord> {
        self.save_with_children(folder).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.folders.delete(id).await
    }

    pub async fn exists(&self, id: &str) -> bool {
        self.folders.exists(id).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.folders.count().await
    }

    /// Load a folder with every child resolved, recursively
    ///
    /// Each child is tried as a folder first, then as a workflow. Children that are
    /// neither, or that would revisit an ancestor, are dropped and counted in `skipped`.
    pub async fn find_by_id_with_children(&self, id: &str) -> StoreResult<Outcome<Folder>> {
        let record = self.folders.find_by_id(id).await?;
        let mut ancestors = HashSet::new();
        let mut skipped = 0;
        let folder = self.materialize(record, &mut ancestors, &mut skipped).await;
        Ok(Outcome {
            value: folder,
            skipped,
        })
    }

    /// Resolve a single id into a folder tree or a workflow
    ///
    /// Shared with the config repository, which resolves tab items the same way.
    pub(crate) async fn resolve(
        &self,
        id: &str,
        ancestors: &mut HashSet<String>,
        skipped: &mut usize,
    ) -> Option<TreeItem> {
        if ancestors.contains(id) {
            tracing::warn!("🔁 Folder '{}' references one of its ancestors, cutting the cycle", id);
            return None;
        }

        match self.folders.find_by_id(id).await {
            Ok(record) => {
                let folder = self.materialize(record, ancestors, skipped).await;
                return Some(TreeItem::Folder(folder));
            }
            Err(e) if !e.is_not_found() => {
                tracing::debug!("Item '{}' did not load as a folder: {}", id, e);
            }
            Err(_) => {}
        }

        match self.workflows.find_by_id(id).await {
            Ok(workflow) => Some(TreeItem::Workflow(workflow)),
            Err(e) => {
                tracing::warn!("⚠️ Dropping item '{}': not a loadable folder or workflow ({})", id, e);
                None
            }
        }
    }

    fn materialize<'a>(
        &'a self,
        record: FolderRecord,
        ancestors: &'a mut HashSet<String>,
        skipped: &'a mut usize,
    ) -> BoxFuture<'a, Folder> {
        Box::pin(async move {
            ancestors.insert(record.id.clone());

            let mut items = Vec::with_capacity(record.items.len());
            for item in &record.items {
                let Some(child_id) = item.reference() else {
                    tracing::warn!("⚠️ Folder '{}' has an unusable item, skipping: {:?}", record.id, item);
                    *skipped += 1;
                    continue;
                };

                match self.resolve(child_id, ancestors, skipped).await {
                    Some(child) => items.push(child),
                    None => *skipped += 1,
                }
            }

            ancestors.remove(&record.id);
            Folder::from_record(record, items)
        })
    }

    /// Save a folder whose items may include inline folders and workflows
    ///
    /// Inline children are saved first (folders recursively), then replaced by their ids;
    /// bare ids pass through. The parent is written last.
    ///
    /// An item tagged `folder` or `workflow` that does not decode fails the whole save
    /// with `Validation` before anything is written.
    pub async fn save_with_children(&self, folder: FolderRecord) -> StoreResult<FolderRecord> {
        validate_inline(&folder.id, &folder.items)?;
        self.save_tree(folder).await
    }

    fn save_tree(&self, mut folder: FolderRecord) -> BoxFuture<'_, StoreResult<FolderRecord>> {
        Box::pin(async move {
            if folder.id.trim().is_empty() {
                return Err(StoreError::Validation("folder requires a non-empty id".into()));
            }

            let items = std::mem::take(&mut folder.items);
            let mut persisted = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    ItemRef::Id(id) => persisted.push(ItemRef::Id(id)),
                    ItemRef::Folder(child) => {
                        let saved = self.save_tree(*child).await?;
                        persisted.push(ItemRef::Id(saved.id));
                    }
                    ItemRef::Workflow(workflow) => {
                        let saved = self.workflows.save(*workflow).await?;
                        persisted.push(ItemRef::Id(saved.id));
                    }
                    unrecognized @ ItemRef::Unrecognized(_) => match unrecognized.reference() {
                        Some(id) => persisted.push(ItemRef::id(id)),
                        None => tracing::warn!(
                            "⚠️ Dropping unrecognized item from folder '{}': {:?}",
                            folder.id,
                            unrecognized
                        ),
                    },
                }
            }

            folder.items = persisted;
            self.folders.save(folder).await
        })
    }

    /// Delete a folder and everything beneath it, best effort
    ///
    /// Children are deleted as folders (recursively) when they are folders, otherwise
    /// as workflows. A child that is neither, or that fails to delete, is logged and
    /// skipped. Only a failure on the requested folder itself is returned.
    pub async fn delete_with_children(&self, id: &str) -> StoreResult<DeleteReport> {
        let mut report = DeleteReport::default();
        let mut ancestors = HashSet::new();
        self.delete_tree(id, &mut ancestors, &mut report).await?;

        tracing::info!(
            "🗑️ Deleted folder '{}' ({} records removed, {} skipped)",
            id,
            report.removed,
            report.skipped
        );
        Ok(report)
    }

    fn delete_tree<'a>(
        &'a self,
        id: &'a str,
        ancestors: &'a mut HashSet<String>,
        report: &'a mut DeleteReport,
    ) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let record = self.folders.find_by_id(id).await?;
            ancestors.insert(id.to_string());

            for item in &record.items {
                let Some(child_id) = item.reference() else {
                    tracing::warn!("⚠️ Folder '{}' has an unusable item, skipping: {:?}", id, item);
                    report.skipped += 1;
                    continue;
                };
                if ancestors.contains(child_id) {
                    tracing::warn!("🔁 Folder '{}' references ancestor '{}', not descending", id, child_id);
                    report.skipped += 1;
                    continue;
                }

                self.delete_child(child_id, ancestors, report).await;
            }

            ancestors.remove(id);
            self.folders.delete(id).await?;
            report.removed += 1;
            Ok(())
        })
    }

    async fn delete_child(
        &self,
        id: &str,
        ancestors: &mut HashSet<String>,
        report: &mut DeleteReport,
    ) {
        if self.folders.exists(id).await {
            if let Err(e) = self.delete_tree(id, ancestors, report).await {
                tracing::warn!("⚠️ Failed to delete child folder '{}': {}", id, e);
                report.skipped += 1;
            }
            return;
        }

        match self.workflows.delete(id).await {
            Ok(()) => report.removed += 1,
            Err(StoreError::NotFound { .. }) => {
                tracing::warn!("⚠️ Child '{}' is neither a folder nor a workflow, skipping", id);
                report.skipped += 1;
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to delete child workflow '{}': {}", id, e);
                report.skipped += 1;
            }
        }
    }
}
