//! Trait definitions for data block storage

use async_trait::async_trait;
use std::any::Any;

use crate::error::{DataStoreError, Result};

/// Addressable store of 16-bit values
///
/// Addresses handed to a block are already shifted by the slave context;
/// blocks never apply the Modbus +1 offset themselves.
///
/// Implementations:
/// - `SequentialBlock`: dense in-memory range
/// - `SparseBlock`: in-memory address map with gaps
/// - `SqliteBlock`: durable SQLite table shared by storage class
#[async_trait]
pub trait DataBlock: Send + Sync + 'static {
    /// Allow downcasting to concrete types
    fn as_any(&self) -> &dyn Any;

    /// True iff every address in `[address, address + count)` holds a value
    async fn contains(&self, address: u32, count: usize) -> Result<bool>;

    /// Read `count` values starting at `address`, ascending by address
    async fn read(&self, address: u32, count: usize) -> Result<Vec<u16>>;

    /// Store `values[i]` at `address + i`, overwriting existing entries
    async fn write(&self, address: u32, values: &[u16]) -> Result<()>;

    /// Restore the block to its default contents
    async fn reset(&self) -> Result<()> {
        Err(DataStoreError::Unsupported(format!(
            "{} cannot be reset",
            self.name()
        )))
    }

    /// Whether `reset` is implemented; overridden together with `reset`
    fn supports_reset(&self) -> bool {
        false
    }

    /// Whether values survive the process
    fn is_durable(&self) -> bool {
        false
    }

    /// Short backend name used in logs and errors
    fn name(&self) -> &'static str;
}

/// Exclusive end of `[address, address + count)`, `None` when it overflows
pub(crate) fn range_end(address: u32, count: usize) -> Option<u64> {
    u64::try_from(count)
        .ok()
        .and_then(|count| u64::from(address).checked_add(count))
}
