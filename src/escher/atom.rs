//! The codec seam shared by every strongly-typed atom.
//!
//! An atom decoder receives exactly the body bytes its header declares and
//! reports how many of them it understood. Whatever it leaves over is kept on
//! the record as trailing bytes, so real files that pad their atoms still
//! round-trip.

use super::header::RecordHeader;
use super::parser::Decoder;
use super::record::Record;
use crate::common::error::{Error, Result};

/// Context handed to an atom decoder.
#[derive(Debug, Clone, Copy)]
pub struct AtomContext<'a> {
    header: RecordHeader,
    offset: usize,
    depth: usize,
    decoder: &'a Decoder,
}

impl<'a> AtomContext<'a> {
    pub(crate) fn new(header: RecordHeader, offset: usize, depth: usize, decoder: &'a Decoder) -> Self {
        Self {
            header,
            offset,
            depth,
            decoder,
        }
    }

    /// Header of the record being decoded.
    #[inline]
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    /// Absolute offset of the record's header.
    #[inline]
    pub fn record_offset(&self) -> usize {
        self.offset
    }

    /// Absolute offset of the record's body.
    #[inline]
    pub fn body_offset(&self) -> usize {
        self.offset + RecordHeader::SIZE
    }

    /// Fail with `TruncatedAtom` unless the body holds `expected` bytes.
    pub fn require(&self, body: &[u8], expected: usize) -> Result<()> {
        if body.len() < expected {
            return Err(self.truncated(body, expected));
        }
        Ok(())
    }

    /// The `TruncatedAtom` error for a body shorter than `expected`.
    pub fn truncated(&self, body: &[u8], expected: usize) -> Error {
        Error::TruncatedAtom {
            offset: self.offset,
            record_type: self.header.record_type,
            expected,
            available: body.len(),
        }
    }

    /// Decode a record nested inside this atom's body.
    ///
    /// `data` must start at `body_pos` within the body; the nested record
    /// counts one level deeper against the decoder's depth limit.
    pub fn decode_nested(&self, data: &[u8], body_pos: usize) -> Result<(Record, usize)> {
        self.decoder
            .decode_record(data, self.body_offset() + body_pos, self.depth + 1)
    }
}

/// Encode/decode contract for a typed atom body.
pub trait AtomCodec: Sized {
    /// Decode from the body bytes; returns the value and the number of bytes used.
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)>;

    /// Number of bytes [`encode_body`](Self::encode_body) writes.
    fn body_len(&self) -> usize;

    /// Append the encoded body.
    fn encode_body(&self, out: &mut Vec<u8>);
}
