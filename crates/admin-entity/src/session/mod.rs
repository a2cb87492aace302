//! Session whitelist entities.

pub mod snapshot;
pub mod whitelist;

pub use snapshot::MenuSnapshot;
pub use whitelist::WhitelistEntry;
