//! In-memory data block with gaps
//!
//! Only explicitly stored addresses are defined. Gaps are never filled with
//! zeros, so a read spanning a gap fails.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::error::{DataStoreError, Result};
use crate::traits::{range_end, DataBlock};

/// Address-keyed in-memory block
pub struct SparseBlock {
    values: RwLock<BTreeMap<u32, u16>>,
    initial: BTreeMap<u32, u16>,
}

impl SparseBlock {
    pub fn new(entries: impl IntoIterator<Item = (u32, u16)>) -> Self {
        let initial: BTreeMap<u32, u16> = entries.into_iter().collect();
        Self {
            values: RwLock::new(initial.clone()),
            initial,
        }
    }

    /// Consecutive addresses from `start`; values past the address space are dropped
    pub fn from_values(start: u32, values: &[u16]) -> Self {
        Self::new(values.iter().enumerate().filter_map(|(offset, &value)| {
            u32::try_from(offset)
                .ok()
                .and_then(|offset| start.checked_add(offset))
                .map(|address| (address, value))
        }))
    }

    /// Number of defined addresses
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl Default for SparseBlock {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

fn covered(map: &BTreeMap<u32, u16>, address: u32, count: usize) -> bool {
    if count == 0 {
        return true;
    }
    match range_end(address, count) {
        Some(end) if end <= u64::from(u32::MAX) + 1 => {
            // BTreeMap keys are unique, so `count` keys in the range means no gaps
            let end = end - 1;
            map.range(address..=end as u32).count() == count
        },
        _ => false,
    }
}

#[async_trait]
impl DataBlock for SparseBlock {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn contains(&self, address: u32, count: usize) -> Result<bool> {
        Ok(covered(&self.values.read(), address, count))
    }

    async fn read(&self, address: u32, count: usize) -> Result<Vec<u16>> {
        let values = self.values.read();
        if !covered(&values, address, count) {
            return Err(DataStoreError::OutOfRange { address, count });
        }
        Ok(values.range(address..).take(count).map(|(_, v)| *v).collect())
    }

    async fn write(&self, address: u32, values: &[u16]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let fits = range_end(address, values.len())
            .is_some_and(|end| end <= u64::from(u32::MAX) + 1);
        if !fits {
            return Err(DataStoreError::OutOfRange {
                address,
                count: values.len(),
            });
        }

        let mut map = self.values.write();
        for (offset, &value) in values.iter().enumerate() {
            map.insert(address + offset as u32, value);
        }
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.values.write() = self.initial.clone();
        Ok(())
    }

    fn supports_reset(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "sparse"
    }
}
