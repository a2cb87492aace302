//! User repository implementation.

use sqlx::{PgPool, Postgres, Transaction};

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_core::types::{OrganizationId, RoleId, UserId};
use admin_entity::role::Role;
use admin_entity::user::{User, UserFilter};

use super::support::{descendant_pattern, map_write_error, unique_violation};

const USERNAME_INDEX: &str = "sys_users_username_live_idx";
const EMAIL_INDEX: &str = "sys_users_email_live_idx";

/// Repository for user CRUD, filtering, and association management.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM sys_users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a live user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM sys_users WHERE username = $1 AND deleted_at IS NULL",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
        })
    }

    /// List users matching `filter`, newest first.
    pub async fn list(&self, filter: &UserFilter, page: &PageRequest) -> AppResult<PageResponse<User>> {
        const WHERE: &str = "WHERE deleted_at IS NULL \
             AND ($1::text IS NULL OR username ILIKE '%' || $1 || '%') \
             AND ($2::text IS NULL OR phone ILIKE '%' || $2 || '%') \
             AND ($3::record_status IS NULL OR status = $3)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM sys_users {WHERE}"))
            .bind(filter.username.as_deref())
            .bind(filter.phone.as_deref())
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM sys_users {WHERE} ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.username.as_deref())
        .bind(filter.phone.as_deref())
        .bind(filter.status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    /// Users belonging to the organization at `path` or any of its descendants.
    pub async fn list_by_organization_path(
        &self,
        path: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        const FROM: &str = "FROM sys_users u \
             JOIN sys_user_organizations uo ON uo.user_id = u.id \
             JOIN sys_organizations o ON o.id = uo.organization_id AND o.deleted_at IS NULL \
             WHERE u.deleted_at IS NULL AND (o.path = $1 OR o.path LIKE $2)";

        let pattern = descendant_pattern(path);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(DISTINCT u.id) {FROM}"))
            .bind(path)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count organization users", e)
            })?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT DISTINCT u.* {FROM} ORDER BY u.id ASC LIMIT $3 OFFSET $4"
        ))
        .bind(path)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list organization users", e)
        })?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    /// Insert a user together with its initial role and organization links.
    pub async fn create(
        &self,
        user: &User,
        role_ids: &[RoleId],
        organization_ids: &[OrganizationId],
    ) -> AppResult<User> {
        let mut tx = self.begin().await?;

        let created = sqlx::query_as::<_, User>(
            "INSERT INTO sys_users \
             (id, username, password_hash, email, phone, real_name, avatar, status, \
              created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.real_name)
        .bind(&user.avatar)
        .bind(user.status)
        .bind(user.created_by)
        .bind(user.updated_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| self.map_unique(e, user, "Failed to create user"))?;

        link_roles(&mut tx, user.id, role_ids).await?;
        link_organizations(&mut tx, user.id, organization_ids).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit user", e))?;
        Ok(created)
    }

    /// Persist profile fields of an existing user.
    pub async fn update(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE sys_users SET email = $2, phone = $3, real_name = $4, avatar = $5, \
             status = $6, updated_by = $7, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.real_name)
        .bind(&user.avatar)
        .bind(user.status)
        .bind(user.updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_unique(e, user, "Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))
    }

    /// Replace the stored password hash.
    pub async fn update_password(&self, id: UserId, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE sys_users SET password_hash = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    /// Stamp the last successful login.
    pub async fn touch_last_login(&self, id: UserId) -> AppResult<()> {
        sqlx::query("UPDATE sys_users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }

    /// Soft-delete users, returning how many rows were affected.
    pub async fn soft_delete(&self, ids: &[UserId], actor: Option<UserId>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sys_users SET deleted_at = NOW(), deleted_by = $2 \
             WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .bind(actor)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete users", e))?;
        Ok(result.rows_affected())
    }

    /// Replace all role links of a user.
    pub async fn replace_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM sys_user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear user roles", e))?;
        link_roles(&mut tx, user_id, role_ids).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit user roles", e))
    }

    /// Replace all organization links of a user.
    pub async fn replace_organizations(
        &self,
        user_id: UserId,
        organization_ids: &[OrganizationId],
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM sys_user_organizations WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear user organizations", e)
            })?;
        link_organizations(&mut tx, user_id, organization_ids).await?;
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit user organizations", e)
        })
    }

    /// Live roles granted to a user.
    pub async fn roles_of(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT r.* FROM sys_roles r \
             JOIN sys_user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 AND r.deleted_at IS NULL \
             ORDER BY r.sort ASC, r.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user roles", e))
    }

    /// Organizations a user belongs to.
    pub async fn organization_ids_of(&self, user_id: UserId) -> AppResult<Vec<OrganizationId>> {
        sqlx::query_scalar::<_, OrganizationId>(
            "SELECT organization_id FROM sys_user_organizations WHERE user_id = $1 \
             ORDER BY organization_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load user organizations", e)
        })
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    fn map_unique(&self, err: sqlx::Error, user: &User, context: &'static str) -> AppError {
        if unique_violation(&err) == Some(EMAIL_INDEX) {
            return AppError::conflict(format!(
                "Email '{}' already exists",
                user.email.as_deref().unwrap_or_default()
            ));
        }
        map_write_error(
            err,
            USERNAME_INDEX,
            || format!("Username '{}' already exists", user.username),
            context,
        )
    }
}

async fn link_roles(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    role_ids: &[RoleId],
) -> AppResult<()> {
    if role_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO sys_user_roles (user_id, role_id) \
         SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(role_ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to link user roles", e))?;
    Ok(())
}

async fn link_organizations(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    organization_ids: &[OrganizationId],
) -> AppResult<()> {
    if organization_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO sys_user_organizations (user_id, organization_id) \
         SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(organization_ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to link user organizations", e)
    })?;
    Ok(())
}
