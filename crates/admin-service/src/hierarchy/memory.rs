//! In-memory hierarchy store for service tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use admin_core::error::AppError;
use admin_core::result::AppResult;
use admin_core::traits::{HierarchyNode, HierarchyRepository};
use admin_core::types::path;
use admin_core::types::{EntityId, OrganizationId, UserId};

/// Minimal node used to exercise the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNode {
    pub id: OrganizationId,
    pub parent_id: Option<OrganizationId>,
    pub path: String,
    pub sort: i32,
}

impl TestNode {
    pub fn new(id: i64, parent: Option<i64>, path: &str, sort: i32) -> Self {
        Self {
            id: OrganizationId(id),
            parent_id: parent.map(OrganizationId),
            path: path.to_string(),
            sort,
        }
    }

    /// Unsaved node under `parent`.
    pub fn draft(parent: Option<i64>) -> Self {
        Self::new(0, parent, "", 0)
    }
}

impl HierarchyNode for TestNode {
    type Id = OrganizationId;
    const KIND: &'static str = "Node";

    fn id(&self) -> OrganizationId {
        self.id
    }
    fn set_id(&mut self, id: OrganizationId) {
        self.id = id;
    }
    fn parent_id(&self) -> Option<OrganizationId> {
        self.parent_id
    }
    fn set_parent_id(&mut self, parent_id: Option<OrganizationId>) {
        self.parent_id = parent_id;
    }
    fn path(&self) -> &str {
        &self.path
    }
    fn set_path(&mut self, path: String) {
        self.path = path;
    }
    fn sort(&self) -> i32 {
        self.sort
    }
}

/// Store keeping live nodes in a map; one lock makes every call atomic.
#[derive(Debug, Default)]
pub struct MemoryHierarchyRepository<N> {
    nodes: Mutex<BTreeMap<i64, N>>,
    dependents: Mutex<HashMap<i64, u64>>,
    deleted_by: Mutex<HashMap<i64, Option<UserId>>>,
}

impl<N: HierarchyNode> MemoryHierarchyRepository<N> {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(BTreeMap::new()),
            dependents: Mutex::new(HashMap::new()),
            deleted_by: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a node as-is, bypassing the manager.
    pub fn seed(&self, node: N) {
        self.nodes.lock().unwrap().insert(node.id().raw(), node);
    }

    pub fn set_dependents(&self, id: N::Id, count: u64) {
        self.dependents.lock().unwrap().insert(id.raw(), count);
    }

    pub fn deleted_by(&self, id: N::Id) -> Option<Option<UserId>> {
        self.deleted_by.lock().unwrap().get(&id.raw()).copied()
    }

    /// Current path of every live node, keyed by raw id.
    pub fn paths(&self) -> BTreeMap<i64, String> {
        self.nodes
            .lock()
            .unwrap()
            .iter()
            .map(|(id, node)| (*id, node.path().to_string()))
            .collect()
    }
}

#[async_trait]
impl<N: HierarchyNode> HierarchyRepository<N> for MemoryHierarchyRepository<N> {
    async fn find_by_id(&self, id: N::Id) -> AppResult<Option<N>> {
        Ok(self.nodes.lock().unwrap().get(&id.raw()).cloned())
    }

    async fn find_by_ids(&self, ids: &[N::Id]) -> AppResult<Vec<N>> {
        let nodes = self.nodes.lock().unwrap();
        Ok(ids.iter().filter_map(|id| nodes.get(&id.raw()).cloned()).collect())
    }

    async fn find_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<N>> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes
            .values()
            .filter(|n| n.path().starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> AppResult<Vec<N>> {
        let mut all: Vec<N> = self.nodes.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|n| (n.sort(), n.id().raw()));
        Ok(all)
    }

    async fn insert(&self, node: &N) -> AppResult<N> {
        let mut nodes = self.nodes.lock().unwrap();
        if nodes.contains_key(&node.id().raw()) {
            return Err(AppError::conflict("duplicate id"));
        }
        let mut node = node.clone();
        node.set_path(place(&nodes, &node)?);
        nodes.insert(node.id().raw(), node.clone());
        Ok(node)
    }

    async fn save_with_cascade(&self, node: &N) -> AppResult<N> {
        let mut nodes = self.nodes.lock().unwrap();
        let old_path = nodes
            .get(&node.id().raw())
            .map(|n| n.path().to_string())
            .ok_or_else(|| AppError::not_found("missing node"))?;
        let mut node = node.clone();
        node.set_path(place(&nodes, &node)?);

        if old_path != node.path() {
            for other in nodes.values_mut() {
                if path::is_descendant(other.path(), &old_path) {
                    let rebased = path::rebase(other.path(), &old_path, node.path())
                        .unwrap_or_else(|| other.path().to_string());
                    other.set_path(rebased);
                }
            }
        }
        nodes.insert(node.id().raw(), node.clone());
        Ok(node)
    }

    async fn count_children(&self, id: N::Id) -> AppResult<u64> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes.values().filter(|n| n.parent_id() == Some(id)).count() as u64)
    }

    async fn count_dependents(&self, id: N::Id) -> AppResult<u64> {
        Ok(self
            .dependents
            .lock()
            .unwrap()
            .get(&id.raw())
            .copied()
            .unwrap_or(0))
    }

    async fn delete(&self, id: N::Id, deleted_by: Option<UserId>) -> AppResult<()> {
        if self.nodes.lock().unwrap().remove(&id.raw()).is_none() {
            return Err(AppError::not_found("missing node"));
        }
        self.deleted_by.lock().unwrap().insert(id.raw(), deleted_by);
        Ok(())
    }
}

/// Path of `node` under its parent as currently stored.
fn place<N: HierarchyNode>(nodes: &BTreeMap<i64, N>, node: &N) -> AppResult<String> {
    let parent_path = match node.parent_id() {
        Some(parent_id) => Some(
            nodes
                .get(&parent_id.raw())
                .map(|p| p.path().to_string())
                .ok_or_else(|| AppError::not_found("missing parent"))?,
        ),
        None => None,
    };
    path::placed_under(parent_path.as_deref(), node.id().raw())
        .ok_or_else(|| AppError::cycle_detected("parent lies in the node's subtree"))
}
