//! Little-endian binary helpers shared by the record codecs.
//!
//! Reads go through `zerocopy` so that bounds are checked once and the
//! conversion is a plain load. Writes append to a `Vec<u8>`, which cannot fail.

use zerocopy::{FromBytes, I16, I32, LE, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { expected: usize, available: usize },
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data: expected {}, got {}",
                    expected, available
                )
            },
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Borrow `len` bytes starting at `offset`.
#[inline]
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    let end = offset.checked_add(len).unwrap_or(usize::MAX);
    if end > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: end,
            available: data.len(),
        });
    }
    Ok(&data[offset..end])
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use officeart::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    let bytes = slice_at(data, offset, 2)?;
    Ok(U16::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian i16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use officeart::common::binary::read_i16_le;
/// let data = [0xFF, 0xFF];
/// assert_eq!(read_i16_le(&data, 0).unwrap(), -1i16);
/// ```
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize) -> BinaryResult<i16> {
    let bytes = slice_at(data, offset, 2)?;
    Ok(I16::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use officeart::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = slice_at(data, offset, 4)?;
    Ok(U32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> BinaryResult<i32> {
    let bytes = slice_at(data, offset, 4)?;
    Ok(I32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

#[inline]
pub fn put_u16_le(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn put_i16_le(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn put_u32_le(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn put_i32_le(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Convert a length to a `u32` wire field.
///
/// # Panics
///
/// Panics when the length does not fit; that only happens for a tree built
/// with a payload larger than the format can describe.
#[inline]
pub fn wire_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("length {len} does not fit a 32-bit field"))
}

/// Parse a UTF-16LE string, stopping at the first null terminator.
///
/// Unpaired surrogates decode as U+FFFD and an odd trailing byte is ignored.
///
/// # Examples
///
/// ```
/// use officeart::common::binary::parse_utf16le_string;
/// let data = [0x48, 0x00, 0x69, 0x00, 0x00, 0x00, 0x21, 0x00];
/// assert_eq!(parse_utf16le_string(&data), "Hi");
/// ```
pub fn parse_utf16le_string(data: &[u8]) -> String {
    let Ok((units, _)) = <[U16<LE>]>::ref_from_prefix_with_elems(data, data.len() / 2) else {
        return String::new();
    };

    char::decode_utf16(units.iter().map(|u| u.get()).take_while(|&u| u != 0))
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
