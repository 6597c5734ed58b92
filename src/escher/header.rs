//! The 8-byte framing prefix shared by every Escher record.
//!
//! # Format
//!
//! - Bytes 0-1: Version (low 4 bits) | Instance (high 12 bits)
//! - Bytes 2-3: Record Type
//! - Bytes 4-7: Record Length (body bytes after the header)

use crate::common::error::{Error, Result};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::*;

/// Version value marking a container record.
pub const CONTAINER_VERSION: u8 = 0x0F;

const VERSION_MASK: u16 = 0x000F;
const INSTANCE_MAX: u16 = 0x0FFF;

/// Escher record header as laid out on the wire.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawRecordHeader {
    options: U16,
    record_type: U16,
    length: U32,
}

/// Decoded Escher record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHeader {
    /// Version (4 bits)
    pub version: u8,
    /// Instance (12 bits)
    pub instance: u16,
    /// Record type tag
    pub record_type: u16,
    /// Length of record data (excluding header)
    pub length: u32,
}

impl RecordHeader {
    /// Encoded size of a header.
    pub const SIZE: usize = 8;

    pub const fn new(version: u8, instance: u16, record_type: u16, length: u32) -> Self {
        Self {
            version,
            instance,
            record_type,
            length,
        }
    }

    /// Build a header from the packed version/instance field.
    pub const fn from_options(options: u16, record_type: u16, length: u32) -> Self {
        Self {
            version: (options & VERSION_MASK) as u8,
            instance: options >> 4,
            record_type,
            length,
        }
    }

    /// The packed version/instance field.
    ///
    /// # Panics
    ///
    /// Panics if the version does not fit 4 bits or the instance 12 bits.
    pub fn options(&self) -> u16 {
        assert!(
            self.version <= 0x0F,
            "record version {:#X} does not fit 4 bits",
            self.version
        );
        assert!(
            self.instance <= INSTANCE_MAX,
            "record instance {:#X} does not fit 12 bits",
            self.instance
        );
        (self.version as u16) | (self.instance << 4)
    }

    /// Decode a header from the start of `data`.
    ///
    /// Returns the header and the bytes following it.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8])> {
        Self::decode_at(data, 0)
    }

    /// Decode a header from the start of `data`, reporting `origin` as the
    /// absolute offset on failure.
    pub fn decode_at(data: &[u8], origin: usize) -> Result<(Self, &[u8])> {
        let (raw, rest) =
            RawRecordHeader::read_from_prefix(data).map_err(|_| Error::TruncatedHeader {
                offset: origin,
                available: data.len(),
            })?;

        Ok((
            Self::from_options(raw.options.get(), raw.record_type.get(), raw.length.get()),
            rest,
        ))
    }

    /// Encode the header into its 8-byte wire form.
    pub fn encode(&self) -> [u8; 8] {
        let raw = RawRecordHeader {
            options: U16::new(self.options()),
            record_type: U16::new(self.record_type),
            length: U32::new(self.length),
        };
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(raw.as_bytes());
        out
    }

    /// Check whether the version nibble marks a container.
    #[inline]
    pub const fn has_container_version(&self) -> bool {
        self.version == CONTAINER_VERSION
    }

    /// Total encoded size including the header itself.
    #[inline]
    pub const fn record_size(&self) -> usize {
        Self::SIZE + self.length as usize
    }
}
