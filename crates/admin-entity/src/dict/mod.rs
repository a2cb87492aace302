//! Dictionary domain entities.

pub mod model;

pub use model::{CreateDictItem, CreateDictType, DictItem, DictType, UpdateDictItem, UpdateDictType};
