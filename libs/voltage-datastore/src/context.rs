//! Slave context: one data block per storage class
//!
//! Requests arrive with 0-based wire addresses. The context shifts every
//! address by one (`block_address`) before handing it to a block, so blocks
//! only ever see store addresses.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SlaveConfig;
use crate::error::{DataStoreError, Result};
use crate::sequential::SequentialBlock;
use crate::sqlite_impl::{SqliteBlock, SqliteStore};
use crate::storage_class::StorageClass;
use crate::traits::DataBlock;

/// Store address for a 0-based request address
#[inline]
pub fn block_address(address: u16) -> u32 {
    u32::from(address) + 1
}

/// Four data blocks, fixed after construction
///
/// The same block may back several classes.
pub struct SlaveContext {
    discrete_inputs: Arc<dyn DataBlock>,
    coils: Arc<dyn DataBlock>,
    input_registers: Arc<dyn DataBlock>,
    holding_registers: Arc<dyn DataBlock>,
}

impl SlaveContext {
    pub fn new(
        discrete_inputs: Arc<dyn DataBlock>,
        coils: Arc<dyn DataBlock>,
        input_registers: Arc<dyn DataBlock>,
        holding_registers: Arc<dyn DataBlock>,
    ) -> Self {
        Self {
            discrete_inputs,
            coils,
            input_registers,
            holding_registers,
        }
    }

    pub fn builder() -> SlaveContextBuilder {
        SlaveContextBuilder::default()
    }

    /// Build blocks from configuration
    ///
    /// Opens one `SqliteStore` shared by every class configured as `sqlite`.
    ///
    /// # Example
    /// ```no_run
    /// use voltage_datastore::{SlaveConfig, SlaveContext, StorageClass};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// common::logging::init("info")?;
    ///
    /// let config = SlaveConfig::load("config/slave.yaml")?;
    /// let context = SlaveContext::from_config(&config).await?;
    /// context.write(StorageClass::HoldingRegister, 0, &[42]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn from_config(config: &SlaveConfig) -> Result<Self> {
        let store = if config.uses_database() {
            Some(SqliteStore::open(&config.database.url, &config.database.table).await?)
        } else {
            None
        };

        let mut builder = Self::builder();
        for class in StorageClass::ALL {
            if let Some(block_config) = config.block(class) {
                builder = builder.block(class, block_config.build(class, store.as_ref())?);
            }
        }
        Ok(builder.build())
    }

    pub fn block(&self, class: StorageClass) -> &Arc<dyn DataBlock> {
        match class {
            StorageClass::DiscreteInput => &self.discrete_inputs,
            StorageClass::Coil => &self.coils,
            StorageClass::InputRegister => &self.input_registers,
            StorageClass::HoldingRegister => &self.holding_registers,
        }
    }

    /// Whether `count` values starting at the request `address` are defined
    pub async fn validate(&self, class: StorageClass, address: u16, count: u16) -> Result<bool> {
        let address = block_address(address);
        let valid = self
            .block(class)
            .contains(address, usize::from(count))
            .await?;
        debug!("validate {} @{} x{}: {}", class, address, count, valid);
        Ok(valid)
    }

    /// Read `count` values; the caller is expected to `validate` first
    ///
    /// A block returning fewer values than requested is reported as
    /// `OutOfRange`, never padded.
    pub async fn read(&self, class: StorageClass, address: u16, count: u16) -> Result<Vec<u16>> {
        let address = block_address(address);
        let count = usize::from(count);
        debug!("read {} @{} x{}", class, address, count);

        let values = self.block(class).read(address, count).await?;
        if values.len() != count {
            warn!(
                "Short read of {} @{}: {} of {} values",
                class,
                address,
                values.len(),
                count
            );
            return Err(DataStoreError::OutOfRange { address, count });
        }
        Ok(values)
    }

    /// Write `values` starting at the request `address`
    ///
    /// Discrete classes only accept 0 and 1.
    pub async fn write(&self, class: StorageClass, address: u16, values: &[u16]) -> Result<()> {
        let address = block_address(address);
        debug!("write {} @{} x{}", class, address, values.len());

        if class.is_discrete() {
            if let Some(&value) = values.iter().find(|&&value| value > 1) {
                warn!("Rejected {} write @{}: value {}", class, address, value);
                return Err(DataStoreError::InvalidValue { class, value });
            }
        }
        self.block(class).write(address, values).await
    }

    /// Restore every block to its default contents
    ///
    /// Fails with `Unsupported` before touching anything if any block cannot
    /// be reset, or if the durable blocks are not all rows of one
    /// `SqliteStore`. That store is recreated in a single transaction
    /// before the in-memory blocks, which cannot fail; shared blocks are
    /// reset once.
    pub async fn reset(&self) -> Result<()> {
        let blocks = self.distinct_blocks();

        if let Some(block) = blocks.iter().find(|block| !block.supports_reset()) {
            return Err(DataStoreError::Unsupported(format!(
                "{} block cannot be reset",
                block.name()
            )));
        }

        if let Some(store) = self.durable_store()? {
            store.recreate().await?;
        }
        for block in blocks.iter().filter(|block| !block.is_durable()) {
            block.reset().await?;
        }

        info!("Slave context reset ({} blocks)", blocks.len());
        Ok(())
    }

    /// The single store behind every durable block, if any
    fn durable_store(&self) -> Result<Option<&Arc<SqliteStore>>> {
        let mut store: Option<&Arc<SqliteStore>> = None;
        for block in self.distinct_blocks() {
            if !block.is_durable() {
                continue;
            }
            let sqlite = block
                .as_any()
                .downcast_ref::<SqliteBlock>()
                .ok_or_else(|| {
                    DataStoreError::Unsupported(format!(
                        "{} block cannot be reset atomically",
                        block.name()
                    ))
                })?;
            match store {
                Some(seen) if !Arc::ptr_eq(seen, sqlite.store()) => {
                    return Err(DataStoreError::Unsupported(format!(
                        "durable blocks span tables {} and {}; reset would not be atomic",
                        seen.table(),
                        sqlite.store().table()
                    )))
                },
                _ => store = Some(sqlite.store()),
            }
        }
        Ok(store)
    }

    fn distinct_blocks(&self) -> Vec<&Arc<dyn DataBlock>> {
        let mut blocks: Vec<&Arc<dyn DataBlock>> = Vec::with_capacity(4);
        for class in StorageClass::ALL {
            let block = self.block(class);
            if !blocks.iter().any(|seen| same_block(seen, block)) {
                blocks.push(block);
            }
        }
        blocks
    }
}

fn same_block(a: &Arc<dyn DataBlock>, b: &Arc<dyn DataBlock>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl Default for SlaveContext {
    /// Four independent zero-filled full-range blocks
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for `SlaveContext`; unset classes get a full-range block
#[derive(Default)]
pub struct SlaveContextBuilder {
    discrete_inputs: Option<Arc<dyn DataBlock>>,
    coils: Option<Arc<dyn DataBlock>>,
    input_registers: Option<Arc<dyn DataBlock>>,
    holding_registers: Option<Arc<dyn DataBlock>>,
}

impl SlaveContextBuilder {
    pub fn block(mut self, class: StorageClass, block: Arc<dyn DataBlock>) -> Self {
        let slot = match class {
            StorageClass::DiscreteInput => &mut self.discrete_inputs,
            StorageClass::Coil => &mut self.coils,
            StorageClass::InputRegister => &mut self.input_registers,
            StorageClass::HoldingRegister => &mut self.holding_registers,
        };
        *slot = Some(block);
        self
    }

    pub fn discrete_inputs(self, block: Arc<dyn DataBlock>) -> Self {
        self.block(StorageClass::DiscreteInput, block)
    }

    pub fn coils(self, block: Arc<dyn DataBlock>) -> Self {
        self.block(StorageClass::Coil, block)
    }

    pub fn input_registers(self, block: Arc<dyn DataBlock>) -> Self {
        self.block(StorageClass::InputRegister, block)
    }

    pub fn holding_registers(self, block: Arc<dyn DataBlock>) -> Self {
        self.block(StorageClass::HoldingRegister, block)
    }

    pub fn build(self) -> SlaveContext {
        fn or_full_range(block: Option<Arc<dyn DataBlock>>) -> Arc<dyn DataBlock> {
            block.unwrap_or_else(|| Arc::new(SequentialBlock::full_range()))
        }

        SlaveContext::new(
            or_full_range(self.discrete_inputs),
            or_full_range(self.coils),
            or_full_range(self.input_registers),
            or_full_range(self.holding_registers),
        )
    }
}
