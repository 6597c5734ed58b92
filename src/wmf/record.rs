// WMF records
//
// Each record is a u32 size in 16-bit words (the size and function fields
// included), a u16 function code, then the parameters.

use crate::common::binary::{put_u16_le, put_u32_le, read_u16_le, read_u32_le, wire_len};
use crate::common::error::{Error, Result};

/// WMF record function codes
pub mod function {
    pub const EOF: u16 = 0x0000;
    pub const SAVE_DC: u16 = 0x001E;
    pub const RESTORE_DC: u16 = 0x0127;
    pub const SET_BK_COLOR: u16 = 0x0201;
    pub const SET_BK_MODE: u16 = 0x0102;
    pub const SET_MAP_MODE: u16 = 0x0103;
    pub const SET_WINDOW_ORG: u16 = 0x020B;
    pub const SET_WINDOW_EXT: u16 = 0x020C;
    pub const LINE_TO: u16 = 0x0213;
    pub const MOVE_TO: u16 = 0x0214;
    pub const POLYGON: u16 = 0x0324;
    pub const POLYLINE: u16 = 0x0325;
    pub const RECTANGLE: u16 = 0x041B;
    pub const ELLIPSE: u16 = 0x0418;
    pub const TEXT_OUT: u16 = 0x0521;
    pub const EXT_TEXT_OUT: u16 = 0x0A32;
    pub const CREATE_PEN_INDIRECT: u16 = 0x02FA;
    pub const CREATE_BRUSH_INDIRECT: u16 = 0x02FC;
    pub const SELECT_OBJECT: u16 = 0x012D;
    pub const DELETE_OBJECT: u16 = 0x01F0;
    pub const STRETCH_DIB: u16 = 0x0F43;
}

/// WMF record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmfRecord {
    /// Record function
    pub function: u16,
    /// Record parameters; always an even number of bytes
    pub params: Vec<u8>,
}

impl WmfRecord {
    /// Size of the size and function fields.
    pub const HEADER_SIZE: usize = 6;
    /// Smallest legal size in words.
    pub const MIN_WORDS: u32 = 3;

    pub fn new(function: u16, params: Vec<u8>) -> Self {
        Self { function, params }
    }

    /// The end-of-file record.
    pub fn eof() -> Self {
        Self::new(function::EOF, Vec::new())
    }

    /// Check if this is an EOF record
    pub const fn is_eof(&self) -> bool {
        self.function == function::EOF
    }

    /// Encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.params.len()
    }

    /// Size field value in 16-bit words.
    pub fn size_words(&self) -> u32 {
        wire_len(self.encoded_len() / 2)
    }

    /// Decode the record at `offset`; returns it and the bytes consumed.
    ///
    /// The caller guarantees at least [`Self::HEADER_SIZE`] bytes at `offset`.
    pub fn decode(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let size = read_u32_le(data, offset).unwrap_or_default();
        let function = read_u16_le(data, offset + 4).unwrap_or_default();

        // Size is in words (16-bit), convert to bytes
        let size_bytes = (size as usize).saturating_mul(2);
        if size < Self::MIN_WORDS || size_bytes > data.len() - offset {
            return Err(Error::InvalidWmfRecordSize {
                offset,
                size_words: size,
            });
        }

        let params = data[offset + Self::HEADER_SIZE..offset + size_bytes].to_vec();
        Ok((Self { function, params }, size_bytes))
    }

    /// # Panics
    ///
    /// Panics if the parameters are an odd number of bytes or too large for
    /// the size field.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        assert!(
            self.params.len() % 2 == 0,
            "WMF record parameters must be whole words"
        );
        put_u32_le(out, wire_len(self.encoded_len() / 2));
        put_u16_le(out, self.function);
        out.extend_from_slice(&self.params);
    }
}
