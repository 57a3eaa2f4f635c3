//! Frame checksums for serial Modbus framing
//!
//! - CRC16 (Modbus variant): reflected polynomial 0xA001, seed 0xFFFF.
//!   Used by RTU framing.
//! - LRC: XOR fold of every element. Used by ASCII framing.
//!
//! Both accept byte slices as well as integer sequences; only the low byte of
//! each element contributes.

/// Reflected Modbus CRC16 polynomial
const CRC16_POLY: u16 = 0xA001;

/// Modbus seeds the CRC with all ones (generic CRC16/ARC starts at zero)
const CRC16_SEED: u16 = 0xFFFF;

/// Process-wide CRC16 lookup table, computed once at compile time
static CRC16_TABLE: [u16; 256] = build_crc16_table();

const fn build_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut crc = byte as u16;
        let mut round = 0;
        while round < 8 {
            crc = if crc & 0x0001 != 0 {
                (crc >> 1) ^ CRC16_POLY
            } else {
                crc >> 1
            };
            round += 1;
        }
        table[byte] = crc;
        byte += 1;
    }
    table
}

/// Element of a checksummed sequence
///
/// Implemented for the unsigned and signed integer types and for references
/// to them, so both `&[u8]` frames and integer lists can be passed directly.
pub trait ChecksumWord {
    /// The byte folded into the checksum
    fn low_byte(&self) -> u8;
}

macro_rules! impl_checksum_word {
    ($($ty:ty),*) => {
        $(
            impl ChecksumWord for $ty {
                #[inline]
                fn low_byte(&self) -> u8 {
                    (*self & 0xFF) as u8
                }
            }
        )*
    };
}

impl_checksum_word!(u8, u16, u32, u64, usize, i32, i64);

impl<T: ChecksumWord + ?Sized> ChecksumWord for &T {
    #[inline]
    fn low_byte(&self) -> u8 {
        (**self).low_byte()
    }
}

/// Read-only view of the shared CRC16 table
///
/// Lets a transport update a CRC incrementally while bytes arrive:
/// `crc = (crc >> 8) ^ crc_table()[((crc ^ byte as u16) & 0xFF) as usize]`.
pub fn crc_table() -> &'static [u16; 256] {
    &CRC16_TABLE
}

/// Compute the Modbus CRC16 of a byte or integer sequence
///
/// # Example
/// ```
/// use voltage_codec::compute_crc;
///
/// // Read one holding register from unit 1: 01 03 00 00 00 01 84 0A
/// let crc = compute_crc(&[0x01u8, 0x03, 0x00, 0x00, 0x00, 0x01]);
/// assert_eq!(crc.to_le_bytes(), [0x84, 0x0A]);
/// ```
pub fn compute_crc<I>(data: I) -> u16
where
    I: IntoIterator,
    I::Item: ChecksumWord,
{
    data.into_iter().fold(CRC16_SEED, |crc, word| {
        let index = (crc ^ u16::from(word.low_byte())) & 0xFF;
        (crc >> 8) ^ CRC16_TABLE[index as usize]
    })
}

/// Check that `data` hashes to `expected`
pub fn check_crc<I>(data: I, expected: u16) -> bool
where
    I: IntoIterator,
    I::Item: ChecksumWord,
{
    compute_crc(data) == expected
}

/// Compute the LRC (XOR fold) of a byte or integer sequence
pub fn compute_lrc<I>(data: I) -> u8
where
    I: IntoIterator,
    I::Item: ChecksumWord,
{
    data.into_iter().fold(0u8, |lrc, word| lrc ^ word.low_byte())
}

/// Check that `data` folds to `expected`
pub fn check_lrc<I>(data: I, expected: u8) -> bool
where
    I: IntoIterator,
    I::Item: ChecksumWord,
{
    compute_lrc(data) == expected
}
