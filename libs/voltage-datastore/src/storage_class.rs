//! The four Modbus storage classes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of addressable process data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    /// Read-only single bits
    DiscreteInput,
    /// Read-write single bits
    Coil,
    /// Read-only 16-bit registers
    InputRegister,
    /// Read-write 16-bit registers
    HoldingRegister,
}

impl StorageClass {
    pub const ALL: [StorageClass; 4] = [
        StorageClass::DiscreteInput,
        StorageClass::Coil,
        StorageClass::InputRegister,
        StorageClass::HoldingRegister,
    ];

    /// Class addressed by a standard Modbus function code
    ///
    /// Codes that do not touch one of the four tables (diagnostics, device
    /// identification, ...) map to `None`.
    pub fn from_function_code(code: u8) -> Option<Self> {
        match code {
            1 | 5 | 15 => Some(StorageClass::Coil),
            2 => Some(StorageClass::DiscreteInput),
            3 | 6 | 16 | 22 | 23 => Some(StorageClass::HoldingRegister),
            4 => Some(StorageClass::InputRegister),
            _ => None,
        }
    }

    /// One-character code stored in the class column of the persistent table
    pub fn code(self) -> &'static str {
        match self {
            StorageClass::DiscreteInput => "d",
            StorageClass::Coil => "c",
            StorageClass::InputRegister => "i",
            StorageClass::HoldingRegister => "h",
        }
    }

    /// Whether remote requesters may write this class
    pub fn is_writable(self) -> bool {
        matches!(self, StorageClass::Coil | StorageClass::HoldingRegister)
    }

    /// Whether values are single bits (0 or 1)
    pub fn is_discrete(self) -> bool {
        matches!(self, StorageClass::DiscreteInput | StorageClass::Coil)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageClass::DiscreteInput => "discrete_input",
            StorageClass::Coil => "coil",
            StorageClass::InputRegister => "input_register",
            StorageClass::HoldingRegister => "holding_register",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
