// WMF headers
//
// A metafile may start with the 22-byte placeable header (Aldus format),
// followed by the 18-byte META_HEADER. Every field is kept as read so that
// a decoded stream writes back the same bytes.

use crate::common::error::{Error, Result};
use zerocopy::byteorder::little_endian::{I16, U16, U32};
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::*;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct PlaceableWire {
    key: U32,
    handle: U16,
    left: I16,
    top: I16,
    right: I16,
    bottom: I16,
    inch: U16,
    reserved: U32,
    checksum: U16,
}

/// Placeable metafile header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceableHeader {
    /// Metafile handle, zero on disk
    pub handle: u16,
    /// Left coordinate
    pub left: i16,
    /// Top coordinate
    pub top: i16,
    /// Right coordinate
    pub right: i16,
    /// Bottom coordinate
    pub bottom: i16,
    /// Units per inch
    pub inch: u16,
    pub reserved: u32,
    /// Checksum as stored
    pub checksum: u16,
}

impl PlaceableHeader {
    pub const KEY: u32 = 0x9AC6_CDD7;
    pub const SIZE: usize = 22;

    /// Create a header with a correct checksum.
    pub fn new(left: i16, top: i16, right: i16, bottom: i16, inch: u16) -> Self {
        let mut header = Self {
            handle: 0,
            left,
            top,
            right,
            bottom,
            inch,
            reserved: 0,
            checksum: 0,
        };
        header.checksum = header.compute_checksum();
        header
    }

    /// Check if data starts with a placeable header
    pub fn is_placeable(data: &[u8]) -> bool {
        U32::read_from_prefix(data).is_ok_and(|(key, _)| key.get() == Self::KEY)
    }

    /// Decode the placeable header at the start of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (wire, _) = PlaceableWire::read_from_prefix(data).map_err(|_| {
            Error::TruncatedWmfHeader {
                expected: Self::SIZE,
                available: data.len(),
            }
        })?;

        Ok(Self {
            handle: wire.handle.get(),
            left: wire.left.get(),
            top: wire.top.get(),
            right: wire.right.get(),
            bottom: wire.bottom.get(),
            inch: wire.inch.get(),
            reserved: wire.reserved.get(),
            checksum: wire.checksum.get(),
        })
    }

    fn to_wire(self) -> PlaceableWire {
        PlaceableWire {
            key: U32::new(Self::KEY),
            handle: U16::new(self.handle),
            left: I16::new(self.left),
            top: I16::new(self.top),
            right: I16::new(self.right),
            bottom: I16::new(self.bottom),
            inch: U16::new(self.inch),
            reserved: U32::new(self.reserved),
            checksum: U16::new(self.checksum),
        }
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.to_wire().as_bytes());
    }

    /// XOR of the ten 16-bit words before the checksum field.
    pub fn compute_checksum(&self) -> u16 {
        let wire = self.to_wire();
        wire.as_bytes()[..Self::SIZE - 2]
            .chunks_exact(2)
            .fold(0, |acc, w| acc ^ u16::from_le_bytes([w[0], w[1]]))
    }

    pub fn is_checksum_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Get width
    pub fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    /// Get height
    pub fn height(&self) -> i32 {
        self.bottom as i32 - self.top as i32
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct MetaWire {
    file_type: U16,
    header_size: U16,
    version: U16,
    size_words: U32,
    num_objects: U16,
    max_record: U32,
    num_params: U16,
}

/// WMF standard header (META_HEADER)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaHeader {
    /// File type (1 = memory, 2 = disk)
    pub file_type: u16,
    /// Header size in words (normally 9)
    pub header_size: u16,
    /// Windows version
    pub version: u16,
    /// Size of file in words
    pub size_words: u32,
    /// Number of objects
    pub num_objects: u16,
    /// Size of largest record in words
    pub max_record: u32,
    /// Not used (always 0)
    pub num_params: u16,
}

impl MetaHeader {
    pub const SIZE: usize = 18;
    pub const HEADER_WORDS: u16 = (Self::SIZE / 2) as u16;
    /// Windows 3.0 metafile version
    pub const VERSION_300: u16 = 0x0300;

    /// Header for an empty in-memory metafile.
    pub fn new() -> Self {
        Self {
            file_type: 1,
            header_size: Self::HEADER_WORDS,
            version: Self::VERSION_300,
            size_words: Self::HEADER_WORDS as u32,
            num_objects: 0,
            max_record: 0,
            num_params: 0,
        }
    }

    /// Decode the header at the start of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (wire, _) = MetaWire::read_from_prefix(data).map_err(|_| Error::TruncatedWmfHeader {
            expected: Self::SIZE,
            available: data.len(),
        })?;

        Ok(Self {
            file_type: wire.file_type.get(),
            header_size: wire.header_size.get(),
            version: wire.version.get(),
            size_words: wire.size_words.get(),
            num_objects: wire.num_objects.get(),
            max_record: wire.max_record.get(),
            num_params: wire.num_params.get(),
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let wire = MetaWire {
            file_type: U16::new(self.file_type),
            header_size: U16::new(self.header_size),
            version: U16::new(self.version),
            size_words: U32::new(self.size_words),
            num_objects: U16::new(self.num_objects),
            max_record: U32::new(self.max_record),
            num_params: U16::new(self.num_params),
        };
        out.extend_from_slice(wire.as_bytes());
    }
}

impl Default for MetaHeader {
    fn default() -> Self {
        Self::new()
    }
}
