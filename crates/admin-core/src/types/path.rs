//! Materialized-path arithmetic.
//!
//! A path is the slash-separated chain of ancestor ids ending with the
//! node's own id, e.g. `"100/205/307"`. Root nodes carry just their id.

use crate::error::AppError;
use crate::result::AppResult;

/// Segment separator.
pub const SEPARATOR: char = '/';

/// Path of a node with `id` under a parent at `parent_path`.
pub fn child_path(parent_path: Option<&str>, id: i64) -> String {
    match parent_path {
        Some(parent) if !parent.is_empty() => format!("{parent}{SEPARATOR}{id}"),
        _ => id.to_string(),
    }
}

/// Path of node `id` under a parent at `parent_path`, or `None` when that
/// parent is the node itself or lies below it.
pub fn placed_under(parent_path: Option<&str>, id: i64) -> Option<String> {
    match parent_path {
        Some(parent) if contains_id(parent, id) => None,
        _ => Some(child_path(parent_path, id)),
    }
}

/// All ids on the path, root first, including the node itself.
pub fn path_ids(path: &str) -> AppResult<Vec<i64>> {
    path.split(SEPARATOR)
        .map(|segment| {
            segment
                .parse::<i64>()
                .map_err(|_| AppError::internal(format!("Malformed path segment in '{path}'")))
        })
        .collect()
}

/// Ids of the strict ancestors, root first.
pub fn ancestor_ids(path: &str) -> AppResult<Vec<i64>> {
    let mut ids = path_ids(path)?;
    ids.pop();
    Ok(ids)
}

/// Whether `id` appears as a whole segment of `path`.
pub fn contains_id(path: &str, id: i64) -> bool {
    let needle = id.to_string();
    path.split(SEPARATOR).any(|segment| segment == needle)
}

/// Prefix shared by every strict descendant of the node at `path`.
pub fn descendant_prefix(path: &str) -> String {
    format!("{path}{SEPARATOR}")
}

/// Whether `candidate` lies strictly below `ancestor`.
pub fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate[ancestor.len()..].starts_with(SEPARATOR)
}

/// Move `path` from under `old_root` to under `new_root`.
///
/// Returns `None` when `path` is neither `old_root` itself nor one of its
/// descendants.
pub fn rebase(path: &str, old_root: &str, new_root: &str) -> Option<String> {
    if path == old_root {
        return Some(new_root.to_string());
    }
    if is_descendant(path, old_root) {
        return Some(format!("{new_root}{}", &path[old_root.len()..]));
    }
    None
}

/// Depth of the node, roots being 0.
pub fn depth(path: &str) -> usize {
    path.matches(SEPARATOR).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path() {
        assert_eq!(child_path(None, 100), "100");
        assert_eq!(child_path(Some(""), 100), "100");
        assert_eq!(child_path(Some("100/205"), 307), "100/205/307");
    }

    #[test]
    fn test_placed_under_rejects_own_subtree() {
        assert_eq!(placed_under(None, 7).as_deref(), Some("7"));
        assert_eq!(placed_under(Some("1/2"), 7).as_deref(), Some("1/2/7"));
        assert_eq!(placed_under(Some("1/7"), 7), None);
        assert_eq!(placed_under(Some("7/3/4"), 7), None);
        assert_eq!(placed_under(Some("1/77"), 7).as_deref(), Some("1/77/7"));
    }

    #[test]
    fn test_ancestor_ids() {
        assert_eq!(ancestor_ids("100/205/307").unwrap(), vec![100, 205]);
        assert!(ancestor_ids("100").unwrap().is_empty());
        assert!(path_ids("100/x").is_err());
    }

    #[test]
    fn test_contains_id_matches_whole_segments() {
        assert!(contains_id("100/205/307", 205));
        assert!(!contains_id("100/2050/307", 205));
        assert!(!contains_id("1005", 100));
    }

    #[test]
    fn test_is_descendant_rejects_sibling_with_common_prefix() {
        assert!(is_descendant("1/2/3", "1/2"));
        assert!(!is_descendant("1/22", "1/2"));
        assert!(!is_descendant("1/2", "1/2"));
    }

    #[test]
    fn test_rebase() {
        assert_eq!(rebase("1/2", "1/2", "9/2").as_deref(), Some("9/2"));
        assert_eq!(rebase("1/2/3/4", "1/2", "9/2").as_deref(), Some("9/2/3/4"));
        assert_eq!(rebase("1/22/3", "1/2", "9/2"), None);
        assert_eq!(depth("1/2/3"), 2);
    }
}
