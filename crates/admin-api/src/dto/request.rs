//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use admin_core::types::pagination::{DEFAULT_PAGE_SIZE, PageRequest};
use admin_core::types::{AccessLogId, MenuId, OrganizationId, RoleId, UserId};
use admin_entity::RecordStatus;
use admin_entity::audit::AccessLogFilter;
use admin_entity::dict::{CreateDictItem, CreateDictType};
use admin_entity::menu::{CreateMenu, MenuKind};
use admin_entity::organization::CreateOrganization;
use admin_entity::role::CreateRole;
use admin_entity::user::{CreateUser, UpdateProfile, UserFilter};
use admin_service::user::ChangePasswordRequest;

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create organization request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    /// Unique business code.
    #[validate(length(min = 1, max = 64, message = "Code must be 1-64 characters"))]
    pub code: String,
    /// Parent organization; root level when absent.
    pub parent_id: Option<OrganizationId>,
    /// Sibling ordering key.
    #[serde(default)]
    pub sort: i32,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Description.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,
}

impl From<CreateOrganizationRequest> for CreateOrganization {
    fn from(req: CreateOrganizationRequest) -> Self {
        Self {
            name: req.name,
            code: req.code,
            parent_id: req.parent_id,
            sort: req.sort,
            status: req.status,
            description: req.description,
        }
    }
}

/// Create menu request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMenuRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    /// Parent menu; root level when absent.
    pub parent_id: Option<MenuId>,
    /// Front-end component.
    #[serde(default)]
    pub component: String,
    /// Icon name.
    #[serde(default)]
    pub icon: String,
    /// Page or action.
    #[serde(default)]
    pub kind: MenuKind,
    /// Sibling ordering key.
    #[serde(default)]
    pub sort: i32,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Permission code granted by this node.
    #[validate(length(max = 100))]
    pub permission: Option<String>,
    /// Front-end route.
    #[serde(default)]
    pub route: String,
    /// Hidden from navigation.
    #[serde(default)]
    pub hidden: bool,
    /// Keep the page alive between visits.
    #[serde(default)]
    pub keep_alive: bool,
}

impl From<CreateMenuRequest> for CreateMenu {
    fn from(req: CreateMenuRequest) -> Self {
        Self {
            name: req.name,
            parent_id: req.parent_id,
            component: req.component,
            icon: req.icon,
            kind: req.kind,
            sort: req.sort,
            status: req.status,
            permission: req.permission,
            route: req.route,
            hidden: req.hidden,
            keep_alive: req.keep_alive,
        }
    }
}

/// Create user request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username.
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    /// Initial password.
    #[validate(length(min = 6, message = "Password is too short"))]
    pub password: String,
    /// Email.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Real name.
    #[serde(default)]
    pub real_name: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: String,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Organizations to join.
    #[serde(default)]
    pub organization_ids: Vec<OrganizationId>,
    /// Roles to grant.
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            email: req.email,
            phone: req.phone,
            real_name: req.real_name,
            avatar: req.avatar,
            status: req.status,
            organization_ids: req.organization_ids,
            role_ids: req.role_ids,
        }
    }
}

/// Password change request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordBody {
    /// Current password. Required when changing one's own password.
    pub old_password: Option<String>,
    /// New password.
    #[validate(length(min = 6, message = "Password is too short"))]
    pub new_password: String,
}

impl From<ChangePasswordBody> for ChangePasswordRequest {
    fn from(body: ChangePasswordBody) -> Self {
        Self {
            old_password: body.old_password,
            new_password: body.new_password,
        }
    }
}

/// Create role request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoleRequest {
    /// Display name.
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,
    /// Unique role code.
    #[validate(length(min = 1, max = 64, message = "Code must be 1-64 characters"))]
    pub code: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Ordering key.
    #[serde(default)]
    pub sort: i32,
}

impl From<CreateRoleRequest> for CreateRole {
    fn from(req: CreateRoleRequest) -> Self {
        Self {
            name: req.name,
            code: req.code,
            description: req.description,
            status: req.status,
            sort: req.sort,
        }
    }
}

/// Create dictionary type request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDictTypeRequest {
    /// Display name.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    /// Unique lookup code.
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl From<CreateDictTypeRequest> for CreateDictType {
    fn from(req: CreateDictTypeRequest) -> Self {
        Self {
            name: req.name,
            code: req.code,
            status: req.status,
            description: req.description,
        }
    }
}

/// Create dictionary item request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDictItemRequest {
    /// Display label.
    #[validate(length(min = 1, max = 100))]
    pub label: String,
    /// Stored value.
    #[validate(length(min = 1, max = 100))]
    pub value: String,
    /// Ordering key.
    #[serde(default)]
    pub sort: i32,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
}

impl From<CreateDictItemRequest> for CreateDictItem {
    fn from(req: CreateDictItemRequest) -> Self {
        Self {
            label: req.label,
            value: req.value,
            sort: req.sort,
            status: req.status,
        }
    }
}

/// A list of user ids, for batch operations.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserIdsRequest {
    /// Target users.
    #[validate(length(min = 1, message = "At least one user id is required"))]
    pub ids: Vec<UserId>,
}

/// A list of access log ids, for batch deletion.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccessLogIdsRequest {
    /// Target entries.
    #[validate(length(min = 1, message = "At least one log id is required"))]
    pub ids: Vec<AccessLogId>,
}

/// Self-service profile update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Email address; blank or absent clears it.
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Real name.
    #[serde(default)]
    pub real_name: String,
}

impl UpdateProfileRequest {
    /// Treats a blank email as absent so it passes validation and clears.
    pub fn normalized(mut self) -> Self {
        self.email = non_blank(self.email);
        self
    }
}

impl From<UpdateProfileRequest> for UpdateProfile {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            email: req.email.unwrap_or_default(),
            phone: req.phone,
            real_name: req.real_name,
        }
    }
}

/// Replacement set of role grants.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleIdsRequest {
    /// Roles; an empty list revokes all.
    pub role_ids: Vec<RoleId>,
}

/// Replacement set of organization memberships.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationIdsRequest {
    /// Organizations; an empty list removes all memberships.
    pub organization_ids: Vec<OrganizationId>,
}

/// Replacement set of menu grants.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuIdsRequest {
    /// Menus; an empty list revokes all.
    pub menu_ids: Vec<MenuId>,
}

/// Replacement set of role members.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUsersRequest {
    /// Users holding the role afterwards.
    pub user_ids: Vec<UserId>,
}

/// Target parent of a move. `null` moves to the root level.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveOrganizationRequest {
    /// New parent.
    pub parent_id: Option<OrganizationId>,
}

/// Query string of `GET /users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Substring of the username.
    pub username: Option<String>,
    /// Substring of the phone number.
    pub phone: Option<String>,
    /// Exact status.
    pub status: Option<RecordStatus>,
}

impl UserListQuery {
    /// Splits into filter and paging.
    pub fn into_parts(self) -> (UserFilter, PageRequest) {
        let filter = UserFilter {
            username: non_blank(self.username),
            phone: non_blank(self.phone),
            status: self.status,
        };
        (filter, PageRequest::new(self.page, self.page_size))
    }
}

/// Query string of `GET /logs`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessLogQuery {
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Substring of the username.
    pub username: Option<String>,
    /// Substring of the path.
    pub path: Option<String>,
    /// Lower time bound (RFC 3339).
    pub start_time: Option<DateTime<Utc>>,
    /// Upper time bound (RFC 3339).
    pub end_time: Option<DateTime<Utc>>,
}

impl AccessLogQuery {
    /// Splits into filter and paging.
    pub fn into_parts(self) -> (AccessLogFilter, PageRequest) {
        let filter = AccessLogFilter {
            username: non_blank(self.username),
            path: non_blank(self.path),
            start_time: self.start_time,
            end_time: self.end_time,
        };
        (filter, PageRequest::new(self.page, self.page_size))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
