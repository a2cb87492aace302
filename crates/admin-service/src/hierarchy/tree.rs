//! Nested tree assembly from flat node lists.

use std::collections::HashMap;

use admin_core::traits::HierarchyNode;
use admin_core::types::EntityId;
use admin_entity::TreeNode;

/// Nest `nodes` by `parent_id`.
///
/// Siblings are ordered by `(sort, id)`. Nodes whose parent is absent from
/// the list become roots, so a subtree slice renders with its top node as
/// the single root.
pub fn build_tree<N: HierarchyNode>(nodes: Vec<N>) -> Vec<TreeNode<N>> {
    let index: HashMap<N::Id, usize> = nodes
        .iter()
        .enumerate()
        .map(|(slot, node)| (node.id(), slot))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (slot, node) in nodes.iter().enumerate() {
        match node.parent_id().and_then(|p| index.get(&p).copied()) {
            Some(parent) if parent != slot => children[parent].push(slot),
            _ => roots.push(slot),
        }
    }

    let key = |slot: &usize| (nodes[*slot].sort(), nodes[*slot].id().raw());
    for siblings in &mut children {
        siblings.sort_by_key(key);
    }
    roots.sort_by_key(key);

    // Preorder with an explicit stack, then assemble bottom-up.
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(slot) = stack.pop() {
        order.push(slot);
        stack.extend(children[slot].iter().rev().copied());
    }

    let mut built: Vec<Option<TreeNode<N>>> = nodes.into_iter().map(|n| Some(TreeNode::leaf(n))).collect();
    for &slot in order.iter().rev() {
        let kids: Vec<TreeNode<N>> = children[slot]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        if let Some(node) = built[slot].as_mut() {
            node.children = kids;
        }
    }

    roots.into_iter().filter_map(|slot| built[slot].take()).collect()
}
