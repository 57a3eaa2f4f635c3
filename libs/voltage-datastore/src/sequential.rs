//! Dense in-memory data block
//!
//! Backs a contiguous address range `[start, start + len)` with a vector.
//! Bounds never change after construction.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::ops::Range;

use crate::error::{DataStoreError, Result};
use crate::traits::{range_end, DataBlock};

/// Addresses reachable by a request after the +1 shift: 0..=65536
pub const FULL_RANGE_LEN: usize = u16::MAX as usize + 2;

/// Contiguous in-memory block
pub struct SequentialBlock {
    start: u32,
    values: RwLock<Vec<u16>>,
    initial: Vec<u16>,
}

impl SequentialBlock {
    /// Block holding `values` at `start..start + values.len()`
    pub fn new(start: u32, values: Vec<u16>) -> Self {
        Self {
            start,
            initial: values.clone(),
            values: RwLock::new(values),
        }
    }

    /// `count` copies of `value` starting at `start`
    pub fn filled(start: u32, count: usize, value: u16) -> Self {
        Self::new(start, vec![value; count])
    }

    /// Zero-filled block covering every address a request can reach
    pub fn full_range() -> Self {
        Self::filled(0, FULL_RANGE_LEN, 0)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn len(&self) -> usize {
        self.initial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }

    /// Vector indices for `[address, address + count)`, `None` if any falls outside
    ///
    /// An empty range is inside when it starts within `[start, start + len]`.
    fn slots(&self, address: u32, count: usize) -> Option<Range<usize>> {
        if address < self.start {
            return None;
        }
        let end = range_end(address, count)?;
        let block_end = u64::from(self.start) + self.len() as u64;
        if end > block_end {
            return None;
        }
        let offset = (address - self.start) as usize;
        Some(offset..offset + count)
    }
}

#[async_trait]
impl DataBlock for SequentialBlock {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn contains(&self, address: u32, count: usize) -> Result<bool> {
        Ok(self.slots(address, count).is_some())
    }

    async fn read(&self, address: u32, count: usize) -> Result<Vec<u16>> {
        let slots = self
            .slots(address, count)
            .ok_or(DataStoreError::OutOfRange { address, count })?;
        Ok(self.values.read()[slots].to_vec())
    }

    async fn write(&self, address: u32, values: &[u16]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let slots = self
            .slots(address, values.len())
            .ok_or(DataStoreError::OutOfRange {
                address,
                count: values.len(),
            })?;
        self.values.write()[slots].copy_from_slice(values);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.values.write().copy_from_slice(&self.initial);
        Ok(())
    }

    fn supports_reset(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}
