//! Create, move, and delete tree nodes while keeping `path` consistent.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info};

use admin_core::error::AppError;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_core::traits::{HierarchyNode, HierarchyRepository};
use admin_core::types::path;
use admin_core::types::{EntityId, UserId};
use admin_entity::TreeNode;

use super::tree::build_tree;

/// Maintains the materialized-path invariant for one node kind.
///
/// For every live node, `path` is the parent's path followed by `/` and the
/// node id, or just the id for roots. Moves rewrite the whole subtree inside
/// one store transaction.
pub struct HierarchyManager<N, R> {
    repo: Arc<R>,
    ids: Arc<IdAllocator>,
    _node: PhantomData<fn() -> N>,
}

impl<N, R> Clone for HierarchyManager<N, R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            ids: Arc::clone(&self.ids),
            _node: PhantomData,
        }
    }
}

impl<N, R> std::fmt::Debug for HierarchyManager<N, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyManager")
            .field("node", &std::any::type_name::<N>())
            .finish()
    }
}

impl<N, R> HierarchyManager<N, R>
where
    N: HierarchyNode,
    R: HierarchyRepository<N>,
{
    /// Creates a manager over `repo`, allocating ids from `ids`.
    pub fn new(repo: Arc<R>, ids: Arc<IdAllocator>) -> Self {
        Self {
            repo,
            ids,
            _node: PhantomData,
        }
    }

    /// The underlying store.
    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Fetch a live node or fail with `NotFound`.
    pub async fn get(&self, id: N::Id) -> AppResult<N> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} {id} not found", N::KIND)))
    }

    /// All live nodes ordered by sort key, then id.
    pub async fn list(&self) -> AppResult<Vec<N>> {
        self.repo.find_all().await
    }

    /// Insert `node` under its `parent_id`, assigning a fresh id and path.
    pub async fn create(&self, mut node: N) -> AppResult<N> {
        let parent_path = match node.parent_id() {
            Some(parent_id) => Some(
                self.repo
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Parent {} {parent_id} not found", N::KIND))
                    })?
                    .path()
                    .to_string(),
            ),
            None => None,
        };

        let id = N::Id::from_raw(self.ids.next_id()?.value());
        node.set_id(id);
        node.set_path(path::child_path(parent_path.as_deref(), id.raw()));

        let created = self.repo.insert(&node).await?;
        info!(kind = N::KIND, id = %id, path = %created.path(), "Node created");
        Ok(created)
    }

    /// Persist an edited node.
    ///
    /// `node.parent_id()` is treated as authoritative. When it differs from
    /// the stored parent the node and its subtree are moved. The checks here
    /// fail fast; the store repeats them under its tree lock, so a move
    /// racing another move cannot close a cycle.
    pub async fn update(&self, mut node: N) -> AppResult<N> {
        let current = self.get(node.id()).await?;
        let old_path = current.path().to_string();

        let new_path = self.resolve_path(node.id(), node.parent_id()).await?;
        node.set_path(new_path);

        let saved = self.repo.save_with_cascade(&node).await?;
        if old_path != saved.path() {
            info!(
                kind = N::KIND,
                id = %saved.id(),
                old_path = %old_path,
                new_path = %saved.path(),
                "Subtree moved"
            );
        } else {
            debug!(kind = N::KIND, id = %saved.id(), "Node updated");
        }
        Ok(saved)
    }

    /// Reparent a node. `None` moves it to the root level.
    pub async fn move_node(&self, id: N::Id, new_parent: Option<N::Id>) -> AppResult<N> {
        let mut node = self.get(id).await?;
        node.set_parent_id(new_parent);
        self.update(node).await
    }

    /// Soft-delete a node with no recorded actor.
    pub async fn delete(&self, id: N::Id) -> AppResult<()> {
        self.remove(id, None).await
    }

    /// Soft-delete a node, stamping `deleted_by`.
    pub async fn soft_delete(&self, id: N::Id, actor: UserId) -> AppResult<()> {
        self.remove(id, Some(actor)).await
    }

    async fn remove(&self, id: N::Id, actor: Option<UserId>) -> AppResult<()> {
        self.get(id).await?;

        let children = self.repo.count_children(id).await?;
        if children > 0 {
            return Err(AppError::has_children(format!(
                "{} {id} still has {children} child node(s)",
                N::KIND
            )));
        }

        let dependents = self.repo.count_dependents(id).await?;
        if dependents > 0 {
            return Err(AppError::has_dependents(format!(
                "{} {id} is still referenced by {dependents} record(s)",
                N::KIND
            )));
        }

        self.repo.delete(id, actor).await?;
        info!(kind = N::KIND, id = %id, "Node deleted");
        Ok(())
    }

    /// Ancestors of a node, root first.
    pub async fn ancestors(&self, id: N::Id) -> AppResult<Vec<N>> {
        let node = self.get(id).await?;
        let ids: Vec<N::Id> = path::ancestor_ids(node.path())?
            .into_iter()
            .map(N::Id::from_raw)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<N::Id, N> = self
            .repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|n| (n.id(), n))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Every node below `id`, shallowest first, then by sort key and id.
    pub async fn descendants(&self, id: N::Id) -> AppResult<Vec<N>> {
        let node = self.get(id).await?;
        let mut nodes = self
            .repo
            .find_by_path_prefix(&path::descendant_prefix(node.path()))
            .await?;
        nodes.sort_by_key(|n| (path::depth(n.path()), n.sort(), n.id().raw()));
        Ok(nodes)
    }

    /// The whole forest of live nodes.
    pub async fn tree(&self) -> AppResult<Vec<TreeNode<N>>> {
        Ok(build_tree(self.repo.find_all().await?))
    }

    /// The subtree rooted at `id`.
    pub async fn subtree(&self, id: N::Id) -> AppResult<TreeNode<N>> {
        let root = self.get(id).await?;
        let mut nodes = vec![root];
        nodes.extend(self.descendants(id).await?);
        build_tree(nodes)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal(format!("{} {id} produced an empty tree", N::KIND)))
    }

    /// Path of `id` when placed under `parent`, rejecting cycles.
    async fn resolve_path(&self, id: N::Id, parent: Option<N::Id>) -> AppResult<String> {
        let Some(parent_id) = parent else {
            return Ok(path::child_path(None, id.raw()));
        };
        if parent_id == id {
            return Err(AppError::cycle_detected(format!(
                "{} {id} cannot be its own parent",
                N::KIND
            )));
        }

        let parent = self.repo.find_by_id(parent_id).await?.ok_or_else(|| {
            AppError::not_found(format!("Parent {} {parent_id} not found", N::KIND))
        })?;
        if path::contains_id(parent.path(), id.raw()) {
            return Err(AppError::cycle_detected(format!(
                "{} {id} cannot move under its descendant {parent_id}",
                N::KIND
            )));
        }

        Ok(path::child_path(Some(parent.path()), id.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::memory::{MemoryHierarchyRepository, TestNode};
    use admin_core::config::IdConfig;
    use admin_core::error::ErrorKind;
    use admin_core::types::OrganizationId;

    type Repo = MemoryHierarchyRepository<TestNode>;

    fn manager() -> (HierarchyManager<TestNode, Repo>, Arc<Repo>) {
        let repo = Arc::new(Repo::new());
        let ids = Arc::new(IdAllocator::new(&IdConfig::default()).unwrap());
        (HierarchyManager::new(repo.clone(), ids), repo)
    }

    fn oid(node: &TestNode) -> Option<i64> {
        Some(node.id.0)
    }

    #[tokio::test]
    async fn test_create_paths() {
        let (mgr, _) = manager();
        let root = mgr.create(TestNode::draft(None)).await.unwrap();
        assert_eq!(root.path, root.id.0.to_string());

        let child = mgr.create(TestNode::draft(oid(&root))).await.unwrap();
        assert_eq!(child.path, format!("{}/{}", root.path, child.id.0));

        let grandchild = mgr.create(TestNode::draft(oid(&child))).await.unwrap();
        assert_eq!(grandchild.path, format!("{}/{}", child.path, grandchild.id.0));
        assert!(grandchild.id > child.id);
    }

    #[tokio::test]
    async fn test_create_missing_parent() {
        let (mgr, _) = manager();
        let err = mgr.create(TestNode::draft(Some(999))).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_move_rebases_only_descendants() {
        let (mgr, repo) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(oid(&a))).await.unwrap();
        let c = mgr.create(TestNode::draft(oid(&b))).await.unwrap();
        let d = mgr.create(TestNode::draft(oid(&c))).await.unwrap();
        let other = mgr.create(TestNode::draft(None)).await.unwrap();
        let sibling = mgr.create(TestNode::draft(oid(&a))).await.unwrap();
        let before = repo.paths();

        let moved = mgr.move_node(b.id, Some(other.id)).await.unwrap();
        let after = repo.paths();

        assert_eq!(moved.path, format!("{}/{}", other.path, b.id.0));
        assert_eq!(after[&c.id.0], format!("{}/{}", moved.path, c.id.0));
        assert_eq!(after[&d.id.0], format!("{}/{}/{}", moved.path, c.id.0, d.id.0));
        for untouched in [a.id.0, other.id.0, sibling.id.0] {
            assert_eq!(after[&untouched], before[&untouched]);
        }
    }

    #[tokio::test]
    async fn test_move_to_root() {
        let (mgr, repo) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(oid(&a))).await.unwrap();
        let c = mgr.create(TestNode::draft(oid(&b))).await.unwrap();

        let moved = mgr.move_node(b.id, None).await.unwrap();
        assert_eq!(moved.path, b.id.0.to_string());
        assert_eq!(repo.paths()[&c.id.0], format!("{}/{}", b.id.0, c.id.0));
    }

    #[tokio::test]
    async fn test_cycles_rejected_and_paths_unchanged() {
        let (mgr, repo) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(oid(&a))).await.unwrap();
        let c = mgr.create(TestNode::draft(oid(&b))).await.unwrap();
        let before = repo.paths();

        let err = mgr.move_node(a.id, Some(a.id)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CycleDetected);

        let err = mgr.move_node(a.id, Some(c.id)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CycleDetected);

        assert_eq!(repo.paths(), before);
    }

    #[tokio::test]
    async fn test_cycle_check_uses_whole_segments() {
        let (mgr, repo) = manager();
        repo.seed(TestNode::new(1, None, "1", 0));
        repo.seed(TestNode::new(11, None, "11", 0));
        repo.seed(TestNode::new(111, Some(11), "11/111", 0));

        let moved = mgr
            .move_node(OrganizationId(1), Some(OrganizationId(111)))
            .await
            .unwrap();
        assert_eq!(moved.path, "11/111/1");
    }

    #[tokio::test]
    async fn test_delete_policies() {
        let (mgr, repo) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(oid(&a))).await.unwrap();

        let err = mgr.delete(a.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::HasChildren);

        repo.set_dependents(b.id, 2);
        let err = mgr.delete(b.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::HasDependents);

        repo.set_dependents(b.id, 0);
        mgr.soft_delete(b.id, UserId(42)).await.unwrap();
        assert_eq!(repo.deleted_by(b.id), Some(Some(UserId(42))));

        mgr.delete(a.id).await.unwrap();
        assert_eq!(repo.deleted_by(a.id), Some(None));

        let err = mgr.delete(a.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_ancestors_and_descendants() {
        let (mgr, _) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(oid(&a))).await.unwrap();
        let c = mgr.create(TestNode::draft(oid(&b))).await.unwrap();
        let d = mgr.create(TestNode::draft(oid(&a))).await.unwrap();

        let ancestors: Vec<_> = mgr.ancestors(c.id).await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ancestors, vec![a.id, b.id]);
        assert!(mgr.ancestors(a.id).await.unwrap().is_empty());

        let descendants: Vec<_> = mgr.descendants(a.id).await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(descendants, vec![b.id, d.id, c.id]);

        let subtree = mgr.subtree(b.id).await.unwrap();
        assert_eq!(subtree.node.id, b.id);
        assert_eq!(subtree.children.len(), 1);
        assert_eq!(mgr.tree().await.unwrap()[0].size(), 4);
    }

    #[tokio::test]
    async fn test_update_without_move_keeps_path() {
        let (mgr, repo) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(oid(&a))).await.unwrap();

        let mut edited = b.clone();
        edited.sort = 9;
        let saved = mgr.update(edited).await.unwrap();
        assert_eq!(saved.path, b.path);
        assert_eq!(saved.sort, 9);
        assert_eq!(repo.paths()[&b.id.0], b.path);
    }

    #[tokio::test]
    async fn test_crossed_moves_checked_before_either_commits() {
        let (mgr, repo) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(None)).await.unwrap();

        // Both moves read the tree before either is written, so each passes
        // the manager's own cycle check.
        let mut a_under_b = mgr.get(a.id).await.unwrap();
        a_under_b.parent_id = Some(b.id);
        let mut b_under_a = mgr.get(b.id).await.unwrap();
        b_under_a.parent_id = Some(a.id);

        repo.save_with_cascade(&a_under_b).await.unwrap();
        let err = repo.save_with_cascade(&b_under_a).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CycleDetected);

        let paths = repo.paths();
        assert_eq!(paths[&b.id.0], b.id.0.to_string());
        assert_eq!(paths[&a.id.0], format!("{}/{}", b.id.0, a.id.0));
    }

    #[tokio::test]
    async fn test_save_derives_path_from_current_parent() {
        let (mgr, repo) = manager();
        let a = mgr.create(TestNode::draft(None)).await.unwrap();
        let b = mgr.create(TestNode::draft(None)).await.unwrap();
        let x = mgr.create(TestNode::draft(None)).await.unwrap();

        let mut x_under_b = x.clone();
        x_under_b.parent_id = Some(b.id);
        x_under_b.path = format!("{}/{}", b.path, x.id.0);

        mgr.move_node(b.id, Some(a.id)).await.unwrap();
        let saved = repo.save_with_cascade(&x_under_b).await.unwrap();

        assert_eq!(saved.path, format!("{}/{}/{}", a.id.0, b.id.0, x.id.0));
        assert_eq!(repo.paths()[&x.id.0], saved.path);
    }
}
