//! Repository implementations for all admin entities.

pub mod access_log;
pub mod dict;
pub mod menu;
pub mod organization;
pub mod role;
mod support;
pub mod user;

pub use access_log::AccessLogRepository;
pub use dict::DictRepository;
pub use menu::MenuRepository;
pub use organization::OrganizationRepository;
pub use role::RoleRepository;
pub use user::UserRepository;
