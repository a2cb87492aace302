//! Capabilities shared by tree-shaped entities and their stores.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::{EntityId, UserId};

/// A node of a materialized-path tree (organizations, menus).
///
/// `path` is the slash-separated ancestor chain ending in the node's own id.
pub trait HierarchyNode: Clone + Send + Sync + 'static {
    /// The typed id of this node kind.
    type Id: EntityId;

    /// Human-readable name of the node kind, used in error messages.
    const KIND: &'static str;

    /// Node id.
    fn id(&self) -> Self::Id;

    /// Replace the node id.
    fn set_id(&mut self, id: Self::Id);

    /// Parent id, `None` for roots.
    fn parent_id(&self) -> Option<Self::Id>;

    /// Replace the parent id.
    fn set_parent_id(&mut self, parent_id: Option<Self::Id>);

    /// Materialized path.
    fn path(&self) -> &str;

    /// Replace the materialized path.
    fn set_path(&mut self, path: String);

    /// Sibling ordering key.
    fn sort(&self) -> i32;
}

/// Persistence capability the hierarchy manager works through.
///
/// Every method only sees live (not soft-deleted) rows.
#[async_trait]
pub trait HierarchyRepository<N: HierarchyNode>: Send + Sync + 'static {
    /// Find a node by id.
    async fn find_by_id(&self, id: N::Id) -> AppResult<Option<N>>;

    /// Fetch several nodes in one round trip. Order is unspecified.
    async fn find_by_ids(&self, ids: &[N::Id]) -> AppResult<Vec<N>>;

    /// Every node whose path starts with `prefix`.
    async fn find_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<N>>;

    /// All nodes ordered by `sort`, then id.
    async fn find_all(&self) -> AppResult<Vec<N>>;

    /// Persist a new node.
    ///
    /// The stored path is derived from the parent row as read under the
    /// store's tree lock; `node.path()` is ignored.
    async fn insert(&self, node: &N) -> AppResult<N>;

    /// Persist `node` under `node.parent_id()`.
    ///
    /// In one transaction, holding the store's tree lock, the store re-reads
    /// the node's current path and its parent's path, fails with
    /// `CycleDetected` when the parent lies in the node's subtree, derives
    /// the new path from the parent it read, saves the node, and rewrites the
    /// prefix of every descendant path. `node.path()` is ignored.
    async fn save_with_cascade(&self, node: &N) -> AppResult<N>;

    /// Number of live nodes whose parent is `id`.
    async fn count_children(&self, id: N::Id) -> AppResult<u64>;

    /// Number of association rows that still reference `id`.
    async fn count_dependents(&self, id: N::Id) -> AppResult<u64>;

    /// Soft-delete the node, recording the actor when known.
    async fn delete(&self, id: N::Id, deleted_by: Option<UserId>) -> AppResult<()>;
}
