//! Slave data store configuration
//!
//! ```yaml
//! coils:
//!   type: sequential
//!   start: 0
//!   count: 100
//!   fill: 0
//! holding_registers:
//!   type: sqlite
//! input_registers:
//!   type: sparse
//!   entries:
//!     - { address: 1, value: 17 }
//! database:
//!   url: "sqlite://data/slave.db?mode=rwc"
//!   table: modbus_slave
//! ```
//!
//! Classes that are not configured get a zero-filled full-range block.

use figment::{providers::Env, Figment};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::{DataStoreError, Result};
use crate::sequential::SequentialBlock;
use crate::sparse::SparseBlock;
use crate::sqlite_impl::SqliteStore;
use crate::storage_class::StorageClass;
use crate::traits::DataBlock;

/// Environment variable prefix (`VOLTAGE_SLAVE_DATABASE__TABLE=...`)
pub const ENV_PREFIX: &str = "VOLTAGE_SLAVE_";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://voltage_slave.db?mode=rwc";
pub const DEFAULT_TABLE: &str = "modbus_slave";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaveConfig {
    pub discrete_inputs: Option<BlockConfig>,
    pub coils: Option<BlockConfig>,
    pub input_registers: Option<BlockConfig>,
    pub holding_registers: Option<BlockConfig>,
    pub database: DatabaseConfig,
}

/// Backing storage for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockConfig {
    /// Dense range; `values` wins over `count`/`fill` when given
    Sequential {
        #[serde(default)]
        start: u32,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        fill: u16,
        #[serde(default)]
        values: Vec<u16>,
    },
    Sparse {
        #[serde(default)]
        entries: Vec<SparseEntry>,
    },
    /// Rows of the shared table in `database`
    Sqlite,
    FullRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseEntry {
    pub address: u32,
    pub value: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite://path?mode=rwc` or `sqlite::memory:`
    pub url: String,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl SlaveConfig {
    /// Load from a YAML/TOML/JSON file, overridden by `VOLTAGE_SLAVE_*` variables
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        common::config_loader::load_config_from_file(path, Some(ENV_PREFIX))
            .map_err(|e| DataStoreError::Config(format!("{:#}", e)))
    }

    /// Load from `VOLTAGE_SLAVE_*` variables only
    pub fn from_env() -> Result<Self> {
        let config = Figment::new()
            .merge(Env::prefixed(ENV_PREFIX).split(common::config_loader::ENV_NESTING_SEPARATOR))
            .extract()?;
        Ok(config)
    }

    pub fn block(&self, class: StorageClass) -> Option<&BlockConfig> {
        match class {
            StorageClass::DiscreteInput => self.discrete_inputs.as_ref(),
            StorageClass::Coil => self.coils.as_ref(),
            StorageClass::InputRegister => self.input_registers.as_ref(),
            StorageClass::HoldingRegister => self.holding_registers.as_ref(),
        }
    }

    /// Whether any class is backed by the database
    pub fn uses_database(&self) -> bool {
        StorageClass::ALL
            .into_iter()
            .any(|class| matches!(self.block(class), Some(BlockConfig::Sqlite)))
    }
}

impl BlockConfig {
    /// Build the block; `store` must be open when `self` is `Sqlite`
    pub fn build(
        &self,
        class: StorageClass,
        store: Option<&Arc<SqliteStore>>,
    ) -> Result<Arc<dyn DataBlock>> {
        let block: Arc<dyn DataBlock> = match self {
            BlockConfig::Sequential {
                start,
                count,
                fill,
                values,
            } => match (count, values.is_empty()) {
                (Some(count), true) => Arc::new(SequentialBlock::filled(*start, *count, *fill)),
                (Some(count), false) if *count != values.len() => {
                    return Err(DataStoreError::Config(format!(
                        "{}: count {} conflicts with {} values",
                        class,
                        count,
                        values.len()
                    )))
                },
                (_, false) => Arc::new(SequentialBlock::new(*start, values.clone())),
                (None, true) => {
                    return Err(DataStoreError::Config(format!(
                        "{}: sequential block needs count or values",
                        class
                    )))
                },
            },
            BlockConfig::Sparse { entries } => Arc::new(SparseBlock::new(
                entries.iter().map(|entry| (entry.address, entry.value)),
            )),
            BlockConfig::Sqlite => {
                let store = store.ok_or_else(|| {
                    DataStoreError::Config(format!("{}: database store is not open", class))
                })?;
                Arc::new(store.block(class))
            },
            BlockConfig::FullRange => Arc::new(SequentialBlock::full_range()),
        };
        Ok(block)
    }
}
