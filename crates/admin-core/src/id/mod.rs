//! Snowflake-style distributed identifier allocation.
//!
//! An id is a positive 64-bit integer laid out as
//! `[41-bit ms since epoch][10-bit machine id][12-bit sequence]`.

pub mod allocator;
pub mod clock;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use allocator::IdAllocator;
pub use clock::{Clock, ManualClock, SystemClock};

/// Width of the timestamp field.
pub const TIMESTAMP_BITS: u32 = 41;
/// Width of the machine id field.
pub const MACHINE_BITS: u32 = 10;
/// Width of the per-millisecond sequence field.
pub const SEQUENCE_BITS: u32 = 12;

/// Largest sequence value within one millisecond.
pub const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;

const MACHINE_SHIFT: u32 = SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + MACHINE_BITS;

/// A raw allocated identifier, before it is wrapped in an entity id type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributedId(pub i64);

impl DistributedId {
    /// Return the raw integer value.
    pub fn value(self) -> i64 {
        self.0
    }

    /// Split the id into its fields. The timestamp is returned as absolute
    /// Unix milliseconds given the allocator epoch.
    pub fn decompose(self, epoch_ms: i64) -> IdParts {
        decompose(self.0, epoch_ms)
    }
}

impl fmt::Display for DistributedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DistributedId> for i64 {
    fn from(id: DistributedId) -> i64 {
        id.0
    }
}

/// The individual fields of a decomposed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParts {
    /// Unix milliseconds at allocation time.
    pub timestamp_ms: i64,
    /// Machine id of the allocator that produced the id.
    pub machine_id: u16,
    /// Sequence within the millisecond.
    pub sequence: u16,
}

/// Assemble an id from its parts. `timestamp_offset_ms` is relative to the epoch.
pub(crate) fn compose(timestamp_offset_ms: i64, machine_id: u16, sequence: i64) -> i64 {
    (timestamp_offset_ms << TIMESTAMP_SHIFT)
        | (i64::from(machine_id) << MACHINE_SHIFT)
        | (sequence & MAX_SEQUENCE)
}

/// Split a raw id into its fields.
pub fn decompose(id: i64, epoch_ms: i64) -> IdParts {
    let machine_mask = (1_i64 << MACHINE_BITS) - 1;
    IdParts {
        timestamp_ms: (id >> TIMESTAMP_SHIFT) + epoch_ms,
        machine_id: ((id >> MACHINE_SHIFT) & machine_mask) as u16,
        sequence: (id & MAX_SEQUENCE) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_then_decompose() {
        let epoch = 1_577_836_800_000;
        let raw = compose(123_456, 1, 42);
        let parts = decompose(raw, epoch);
        assert_eq!(parts.timestamp_ms, epoch + 123_456);
        assert_eq!(parts.machine_id, 1);
        assert_eq!(parts.sequence, 42);
    }

    #[test]
    fn test_layout_matches_bit_widths() {
        assert_eq!(compose(1, 0, 0), 1 << 22);
        assert_eq!(compose(0, 1, 0), 1 << 12);
        assert_eq!(compose(0, 1023, 4095), (1 << 22) - 1);
    }
}
