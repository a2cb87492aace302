//! Menu domain entities.

pub mod kind;
pub mod model;

pub use kind::MenuKind;
pub use model::{CreateMenu, Menu, UpdateMenu};
