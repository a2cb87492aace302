//! Query helpers shared by the repositories.

use sqlx::{Postgres, Transaction};

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::types::path::{descendant_prefix, placed_under};

/// Name of the unique constraint or index violated by `err`, if any.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}

/// Map a write error, turning unique violations on `constraint` into
/// a conflict carrying `conflict_message`.
pub(crate) fn map_write_error(
    err: sqlx::Error,
    constraint: &str,
    conflict_message: impl FnOnce() -> String,
    context: &'static str,
) -> AppError {
    if unique_violation(&err) == Some(constraint) {
        return AppError::conflict(conflict_message());
    }
    AppError::with_source(ErrorKind::Database, context, err)
}

/// `LIKE` pattern matching every strict descendant of `path`.
///
/// Paths only contain digits and `/`, so no escaping is needed.
pub(crate) fn descendant_pattern(path: &str) -> String {
    format!("{}%", descendant_prefix(path))
}

/// Rewrite the `old_path/` prefix of every descendant row to `new_path/`.
///
/// `table` is always a compile-time constant of the calling repository.
pub(crate) async fn rebase_descendants(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    old_path: &str,
    new_path: &str,
) -> AppResult<u64> {
    let sql = format!(
        "UPDATE {table} SET path = $1 || substr(path, char_length($2) + 1), updated_at = NOW() \
         WHERE path LIKE $3"
    );
    let result = sqlx::query(&sql)
        .bind(new_path)
        .bind(old_path)
        .bind(descendant_pattern(old_path))
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rebase descendant paths", e)
        })?;
    Ok(result.rows_affected())
}

/// Serialize structural writes on `table` until the transaction ends.
///
/// Every insert and save of a tree node takes this lock before reading the
/// paths it derives from, so no writer works from a path another writer is
/// about to change.
pub(crate) async fn lock_tree(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(table)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock tree", e))?;
    Ok(())
}

/// Current path of a live row, locked for the rest of the transaction.
pub(crate) async fn locked_path(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    id: i64,
) -> AppResult<Option<String>> {
    let sql = format!("SELECT path FROM {table} WHERE id = $1 AND deleted_at IS NULL FOR UPDATE");
    sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read node path", e))
}

/// Path of node `id` under `parent_id`, derived from the parent row as it
/// stands inside the transaction. Fails with `NotFound` for a missing parent
/// and `CycleDetected` when the parent lies in the node's own subtree.
pub(crate) async fn place_node(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    kind: &str,
    id: i64,
    parent_id: Option<i64>,
) -> AppResult<String> {
    let parent_path = match parent_id {
        Some(parent_id) => Some(
            locked_path(tx, table, parent_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Parent {kind} {parent_id} not found")))?,
        ),
        None => None,
    };
    placed_under(parent_path.as_deref(), id).ok_or_else(|| {
        AppError::cycle_detected(format!(
            "{kind} {id} cannot move under its descendant {}",
            parent_id.unwrap_or_default()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendant_pattern() {
        assert_eq!(descendant_pattern("1/22"), "1/22/%");
    }
}
