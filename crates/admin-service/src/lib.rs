//! # admin-service
//!
//! Business logic service layer for the admin backend. Each service
//! orchestrates repositories, the id allocator, and the token session
//! authority to implement application-level use cases.
//!
//! Services follow constructor injection - all dependencies are provided
//! at construction time via `Arc` references.

pub mod audit;
pub mod auth;
pub mod context;
pub mod dict;
pub mod hierarchy;
pub mod menu;
pub mod organization;
pub mod role;
pub mod user;

pub use audit::AccessLogService;
pub use auth::{AuthService, LoginResult, UserProfile};
pub use context::RequestContext;
pub use dict::DictService;
pub use hierarchy::HierarchyManager;
pub use menu::MenuService;
pub use organization::OrganizationService;
pub use role::RoleService;
pub use user::UserService;
