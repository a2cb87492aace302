//! Organization CRUD and tree queries through the hierarchy manager.

use std::sync::Arc;

use tracing::info;

use admin_core::error::AppError;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_core::types::OrganizationId;
use admin_database::repositories::OrganizationRepository;
use admin_entity::TreeNode;
use admin_entity::organization::{CreateOrganization, Organization, UpdateOrganization};

use crate::context::RequestContext;
use crate::hierarchy::HierarchyManager;

/// Manages the organization tree.
#[derive(Debug, Clone)]
pub struct OrganizationService {
    /// Path-maintaining manager over the organization repository.
    hierarchy: HierarchyManager<Organization, OrganizationRepository>,
}

impl OrganizationService {
    /// Creates a new organization service.
    pub fn new(repo: Arc<OrganizationRepository>, ids: Arc<IdAllocator>) -> Self {
        Self {
            hierarchy: HierarchyManager::new(repo, ids),
        }
    }

    /// Gets an organization by ID.
    pub async fn get(&self, id: OrganizationId) -> AppResult<Organization> {
        self.hierarchy.get(id).await
    }

    /// Lists all organizations ordered by sort key.
    pub async fn list(&self) -> AppResult<Vec<Organization>> {
        self.hierarchy.list().await
    }

    /// Returns the whole organization forest.
    pub async fn tree(&self) -> AppResult<Vec<TreeNode<Organization>>> {
        self.hierarchy.tree().await
    }

    /// Creates an organization under its requested parent.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateOrganization,
    ) -> AppResult<Organization> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Organization name cannot be empty"));
        }
        if req.code.trim().is_empty() {
            return Err(AppError::validation("Organization code cannot be empty"));
        }

        let org = self.hierarchy.create(req.into_row(ctx.actor())).await?;
        info!(org_id = %org.id, code = %org.code, actor = %ctx.user_id, "Organization created");
        Ok(org)
    }

    /// Applies a partial update. A changed parent moves the whole subtree.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: OrganizationId,
        req: UpdateOrganization,
    ) -> AppResult<Organization> {
        if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Organization name cannot be empty"));
        }

        let mut org = self.hierarchy.get(id).await?;
        req.apply(&mut org, ctx.actor());
        self.hierarchy.update(org).await
    }

    /// Moves an organization under `new_parent` (or to the root level).
    pub async fn move_to(
        &self,
        ctx: &RequestContext,
        id: OrganizationId,
        new_parent: Option<OrganizationId>,
    ) -> AppResult<Organization> {
        let mut org = self.hierarchy.get(id).await?;
        org.parent_id = new_parent;
        org.updated_by = ctx.actor();
        self.hierarchy.update(org).await
    }

    /// Soft-deletes a leaf organization that no user belongs to.
    pub async fn delete(&self, ctx: &RequestContext, id: OrganizationId) -> AppResult<()> {
        self.hierarchy.soft_delete(id, ctx.user_id).await?;
        info!(org_id = %id, actor = %ctx.user_id, "Organization deleted");
        Ok(())
    }

    /// Ancestors of an organization, root first.
    pub async fn ancestors(&self, id: OrganizationId) -> AppResult<Vec<Organization>> {
        self.hierarchy.ancestors(id).await
    }

    /// Every organization below `id`.
    pub async fn descendants(&self, id: OrganizationId) -> AppResult<Vec<Organization>> {
        self.hierarchy.descendants(id).await
    }

    /// The subtree rooted at `id`.
    pub async fn subtree(&self, id: OrganizationId) -> AppResult<TreeNode<Organization>> {
        self.hierarchy.subtree(id).await
    }
}
