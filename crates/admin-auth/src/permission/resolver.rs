//! Permission set resolution and the OR-semantics check.

use std::collections::BTreeSet;

use admin_entity::session::MenuSnapshot;

/// Collects every non-empty permission code in the tree, depth-first.
pub fn resolve_permissions(menus: &[MenuSnapshot]) -> BTreeSet<String> {
    let mut granted = BTreeSet::new();
    let mut stack: Vec<&MenuSnapshot> = menus.iter().collect();

    while let Some(node) = stack.pop() {
        match node.permission.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                granted.insert(code.to_string());
            }
            _ => {}
        }
        stack.extend(node.children.iter());
    }
    granted
}

/// True when `required` is empty or shares at least one code with `granted`.
pub fn has_any<S: AsRef<str>>(granted: &BTreeSet<String>, required: &[S]) -> bool {
    required.is_empty() || required.iter().any(|code| granted.contains(code.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_core::types::MenuId;

    fn node(id: i64, permission: Option<&str>, children: Vec<MenuSnapshot>) -> MenuSnapshot {
        MenuSnapshot {
            id: MenuId(id),
            name: String::new(),
            route: String::new(),
            permission: permission.map(str::to_string),
            sort: 0,
            children,
        }
    }

    fn sample() -> Vec<MenuSnapshot> {
        vec![node(
            1,
            Some("user:read"),
            vec![node(2, None, vec![node(3, Some("user:write"), vec![])])],
        )]
    }

    #[test]
    fn test_collects_every_depth() {
        let granted = resolve_permissions(&sample());
        let expected: BTreeSet<String> =
            ["user:read", "user:write"].iter().map(|s| s.to_string()).collect();
        assert_eq!(granted, expected);
    }

    #[test]
    fn test_or_semantics() {
        let granted = resolve_permissions(&sample());
        assert!(!has_any(&granted, &["user:delete"]));
        assert!(has_any(&granted, &["user:write", "user:delete"]));
    }

    #[test]
    fn test_empty_requirement_passes() {
        let granted = BTreeSet::new();
        assert!(has_any::<&str>(&granted, &[]));
    }

    #[test]
    fn test_blank_codes_ignored() {
        let granted = resolve_permissions(&[node(1, Some(""), vec![node(2, Some("  "), vec![])])]);
        assert!(granted.is_empty());
    }
}
