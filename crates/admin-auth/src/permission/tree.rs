//! Arena representation of a menu tree.

use std::collections::HashMap;

use admin_core::types::MenuId;
use admin_entity::menu::Menu;
use admin_entity::session::MenuSnapshot;

/// One menu in the arena. Links are indices, not references.
#[derive(Debug, Clone)]
struct ArenaNode {
    id: MenuId,
    name: String,
    route: String,
    permission: Option<String>,
    sort: i32,
    parent: Option<usize>,
}

/// Menus stored in a flat `Vec` with parent and children index maps.
///
/// Children are kept ordered by `(sort, id)`. A node whose parent is not part
/// of the set is treated as a root.
#[derive(Debug, Clone, Default)]
pub struct PermissionTree {
    nodes: Vec<ArenaNode>,
    index: HashMap<MenuId, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl PermissionTree {
    /// Build from flat menu rows, linking them through `parent_id`.
    pub fn from_menus(menus: &[Menu]) -> Self {
        let mut tree = Self::default();
        let mut parents: Vec<Option<MenuId>> = Vec::with_capacity(menus.len());
        for menu in menus {
            if tree.index.contains_key(&menu.id) {
                continue;
            }
            tree.push(ArenaNode {
                id: menu.id,
                name: menu.name.clone(),
                route: menu.route.clone(),
                permission: menu.permission_code().map(str::to_string),
                sort: menu.sort,
                parent: None,
            });
            parents.push(menu.parent_id);
        }
        tree.link(|slot| parents.get(slot).copied().flatten());
        tree
    }

    /// Build from a nested snapshot, flattening it with an explicit stack.
    pub fn from_snapshot(snapshot: &[MenuSnapshot]) -> Self {
        let mut tree = Self::default();
        let mut parents: Vec<Option<MenuId>> = Vec::new();
        let mut stack: Vec<(&MenuSnapshot, Option<MenuId>)> =
            snapshot.iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent)) = stack.pop() {
            if tree.index.contains_key(&node.id) {
                continue;
            }
            tree.push(ArenaNode {
                id: node.id,
                name: node.name.clone(),
                route: node.route.clone(),
                permission: normalize(node.permission.as_deref()),
                sort: node.sort,
                parent: None,
            });
            parents.push(parent);
            stack.extend(node.children.iter().rev().map(|child| (child, Some(node.id))));
        }

        tree.link(|slot| parents.get(slot).copied().flatten());
        tree
    }

    /// Number of menus in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no menus.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is part of the tree.
    pub fn contains(&self, id: MenuId) -> bool {
        self.index.contains_key(&id)
    }

    /// Ids of the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: MenuId) -> Vec<MenuId> {
        let mut out = Vec::new();
        let mut cursor = self.index.get(&id).and_then(|&slot| self.nodes[slot].parent);
        while let Some(slot) = cursor {
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(self.nodes[slot].id);
            cursor = self.nodes[slot].parent;
        }
        out
    }

    /// Slots reachable from the roots in depth-first preorder.
    fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();

        while let Some(slot) = stack.pop() {
            if std::mem::replace(&mut visited[slot], true) {
                continue;
            }
            order.push(slot);
            stack.extend(self.children[slot].iter().rev().copied());
        }
        order
    }

    /// Permission codes in depth-first order, duplicates included.
    pub fn permission_codes(&self) -> impl Iterator<Item = &str> + '_ {
        self.preorder()
            .into_iter()
            .filter_map(move |slot| self.nodes[slot].permission.as_deref())
    }

    /// Render the nested snapshot stored with a session.
    pub fn to_snapshot(&self) -> Vec<MenuSnapshot> {
        let order = self.preorder();
        let mut built: Vec<Option<MenuSnapshot>> = vec![None; self.nodes.len()];

        // Children precede their parent in reverse preorder.
        for &slot in order.iter().rev() {
            let node = &self.nodes[slot];
            let children = self.children[slot]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[slot] = Some(MenuSnapshot {
                id: node.id,
                name: node.name.clone(),
                route: node.route.clone(),
                permission: node.permission.clone(),
                sort: node.sort,
                children,
            });
        }

        self.roots
            .iter()
            .filter_map(|&root| built[root].take())
            .collect()
    }

    fn push(&mut self, node: ArenaNode) {
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        self.children.push(Vec::new());
    }

    /// Resolve parent ids into indices, then order siblings and roots.
    fn link(&mut self, parent_of: impl Fn(usize) -> Option<MenuId>) {
        for slot in 0..self.nodes.len() {
            let parent = parent_of(slot)
                .and_then(|id| self.index.get(&id).copied())
                .filter(|&p| p != slot);
            self.nodes[slot].parent = parent;
            match parent {
                Some(p) => self.children[p].push(slot),
                None => self.roots.push(slot),
            }
        }

        let nodes = &self.nodes;
        let key = |slot: &usize| (nodes[*slot].sort, nodes[*slot].id);
        for siblings in &mut self.children {
            siblings.sort_by_key(key);
        }
        self.roots.sort_by_key(key);
    }
}

fn normalize(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_entity::menu::MenuKind;
    use admin_entity::status::RecordStatus;
    use chrono::Utc;

    fn menu(id: i64, parent: Option<i64>, sort: i32, permission: Option<&str>) -> Menu {
        let now = Utc::now();
        Menu {
            id: MenuId(id),
            name: format!("menu-{id}"),
            parent_id: parent.map(MenuId),
            path: String::new(),
            component: String::new(),
            icon: String::new(),
            kind: MenuKind::Menu,
            sort,
            status: RecordStatus::Enabled,
            permission: permission.map(str::to_string),
            route: format!("/m/{id}"),
            hidden: false,
            keep_alive: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[test]
    fn test_from_menus_orders_siblings() {
        let tree = PermissionTree::from_menus(&[
            menu(1, None, 2, None),
            menu(2, None, 1, None),
            menu(3, Some(1), 5, Some("a")),
            menu(4, Some(1), 0, Some("b")),
            menu(5, Some(1), 0, Some("c")),
        ]);
        let snapshot = tree.to_snapshot();
        let roots: Vec<i64> = snapshot.iter().map(|n| n.id.0).collect();
        assert_eq!(roots, vec![2, 1]);
        let kids: Vec<i64> = snapshot[1].children.iter().map(|n| n.id.0).collect();
        assert_eq!(kids, vec![4, 5, 3]);
    }

    #[test]
    fn test_orphans_become_roots() {
        let tree = PermissionTree::from_menus(&[menu(10, Some(99), 0, Some("x"))]);
        let snapshot = tree.to_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, MenuId(10));
    }

    #[test]
    fn test_blank_permissions_dropped() {
        let tree = PermissionTree::from_menus(&[
            menu(1, None, 0, Some("  ")),
            menu(2, Some(1), 0, Some(" user:read ")),
        ]);
        let codes: Vec<&str> = tree.permission_codes().collect();
        assert_eq!(codes, vec!["user:read"]);
        assert_eq!(tree.to_snapshot()[0].permission, None);
    }

    #[test]
    fn test_snapshot_roundtrip_through_arena() {
        let original = PermissionTree::from_menus(&[
            menu(1, None, 0, Some("a")),
            menu(2, Some(1), 0, None),
            menu(3, Some(2), 0, Some("c")),
        ])
        .to_snapshot();
        let rebuilt = PermissionTree::from_snapshot(&original);
        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt.ancestors(MenuId(3)), vec![MenuId(2), MenuId(1)]);
        assert_eq!(rebuilt.to_snapshot(), original);
    }

    #[test]
    fn test_self_parent_is_root() {
        let tree = PermissionTree::from_menus(&[menu(7, Some(7), 0, Some("p"))]);
        assert_eq!(tree.to_snapshot().len(), 1);
        assert!(tree.ancestors(MenuId(7)).is_empty());
    }
}
