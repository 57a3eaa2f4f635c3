//! VoltageEMS Modbus codec primitives
//!
//! Frame-integrity and payload helpers shared by the RTU/ASCII transports
//! and the slave data store:
//!
//! - **checksum**: CRC16 (Modbus variant, RTU framing) and LRC (ASCII framing)
//! - **bits**: LSB-first coil/discrete-input packing with byte-count framing
//!
//! Everything here is pure and synchronous. The CRC16 lookup table is built
//! at compile time and shared read-only by every caller.

pub mod bits;
pub mod checksum;
pub mod error;

// Re-exports
pub use bits::{bits_to_values, pack_bits, pack_bits_framed, unpack_bits, values_to_bits};
pub use checksum::{check_crc, check_lrc, compute_crc, compute_lrc, crc_table, ChecksumWord};
pub use error::{CodecError, Result};
