//! Shape anchors.
//!
//! The client anchor layout belongs to the host application. Spreadsheet
//! hosts use the 18-byte cell anchor, presentation hosts an 8-byte rectangle
//! of shorts, and anything shorter is left to the host entirely. The child
//! anchor places a shape inside its group's coordinate space.

use super::atom::{AtomCodec, AtomContext};
use crate::common::binary::{
    put_i16_le, put_i32_le, put_u16_le, read_i16_le, read_i32_le, read_u16_le,
};
use crate::common::error::Result;

/// Client anchor (ClientAnchor, 0xF010).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAnchorRecord {
    /// Body under 8 bytes; all of it is kept as trailing data
    HostDefined,
    /// First four fields only (8-17 byte bodies)
    Short {
        flag: u16,
        col1: u16,
        dx1: u16,
        row1: u16,
    },
    /// Complete cell anchor (18 or more bytes)
    Full {
        flag: u16,
        col1: u16,
        dx1: u16,
        row1: u16,
        dy1: u16,
        col2: u16,
        dx2: u16,
        row2: u16,
        dy2: u16,
    },
}

impl ClientAnchorRecord {
    pub const SHORT_SIZE: usize = 8;
    pub const FULL_SIZE: usize = 18;
}

impl AtomCodec for ClientAnchorRecord {
    fn decode_body(body: &[u8], _ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let field = |i: usize| read_u16_le(body, i * 2).unwrap_or_default();

        Ok(if body.len() >= Self::FULL_SIZE {
            (
                Self::Full {
                    flag: field(0),
                    col1: field(1),
                    dx1: field(2),
                    row1: field(3),
                    dy1: field(4),
                    col2: field(5),
                    dx2: field(6),
                    row2: field(7),
                    dy2: field(8),
                },
                Self::FULL_SIZE,
            )
        } else if body.len() >= Self::SHORT_SIZE {
            (
                Self::Short {
                    flag: field(0),
                    col1: field(1),
                    dx1: field(2),
                    row1: field(3),
                },
                Self::SHORT_SIZE,
            )
        } else {
            (Self::HostDefined, 0)
        })
    }

    fn body_len(&self) -> usize {
        match self {
            Self::HostDefined => 0,
            Self::Short { .. } => Self::SHORT_SIZE,
            Self::Full { .. } => Self::FULL_SIZE,
        }
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        match *self {
            Self::HostDefined => {},
            Self::Short {
                flag,
                col1,
                dx1,
                row1,
            } => {
                for v in [flag, col1, dx1, row1] {
                    put_u16_le(out, v);
                }
            },
            Self::Full {
                flag,
                col1,
                dx1,
                row1,
                dy1,
                col2,
                dx2,
                row2,
                dy2,
            } => {
                for v in [flag, col1, dx1, row1, dy1, col2, dx2, row2, dy2] {
                    put_u16_le(out, v);
                }
            },
        }
    }
}

/// Child anchor (ChildAnchor, 0xF00F).
///
/// Normally four 32-bit coordinates. Bodies of 8 to 15 bytes hold four
/// 16-bit coordinates instead; `compact` records which form was read so the
/// same form is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildAnchorRecord {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub compact: bool,
}

impl ChildAnchorRecord {
    pub const SIZE: usize = 16;
    pub const COMPACT_SIZE: usize = 8;

    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            compact: false,
        }
    }
}

impl AtomCodec for ChildAnchorRecord {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        if body.len() >= Self::SIZE {
            let field = |i: usize| read_i32_le(body, i * 4).unwrap_or_default();
            return Ok((Self::new(field(0), field(1), field(2), field(3)), Self::SIZE));
        }

        ctx.require(body, Self::COMPACT_SIZE)?;
        let field = |i: usize| read_i16_le(body, i * 2).unwrap_or_default() as i32;
        Ok((
            Self {
                left: field(0),
                top: field(1),
                right: field(2),
                bottom: field(3),
                compact: true,
            },
            Self::COMPACT_SIZE,
        ))
    }

    fn body_len(&self) -> usize {
        if self.compact {
            Self::COMPACT_SIZE
        } else {
            Self::SIZE
        }
    }

    /// In compact form the coordinates are truncated to 16 bits.
    fn encode_body(&self, out: &mut Vec<u8>) {
        let coords = [self.left, self.top, self.right, self.bottom];
        if self.compact {
            for v in coords {
                put_i16_le(out, v as i16);
            }
        } else {
            for v in coords {
                put_i32_le(out, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::escher::header::RecordHeader;
    use crate::escher::parser::{decode, encode};
    use crate::escher::types::record_type;

    fn atom(record_type: u16, body: &[u8]) -> Vec<u8> {
        let mut data = RecordHeader::new(0, 0, record_type, body.len() as u32)
            .encode()
            .to_vec();
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_client_anchor_forms() {
        let full: Vec<u8> = (0u8..18).collect();
        let record = decode(&atom(record_type::CLIENT_ANCHOR, &full)).unwrap();
        assert!(matches!(
            record.as_client_anchor(),
            Some(ClientAnchorRecord::Full {
                flag: 0x0100,
                dy2: 0x1110,
                ..
            })
        ));
        assert!(record.trailing.is_empty());

        let short = [0x10, 0x00, 0x20, 0x00, 0x30, 0x00, 0x40, 0x00, 0x99, 0x99];
        let data = atom(record_type::CLIENT_ANCHOR, &short);
        let record = decode(&data).unwrap();
        assert_eq!(
            record.as_client_anchor(),
            Some(&ClientAnchorRecord::Short {
                flag: 0x10,
                col1: 0x20,
                dx1: 0x30,
                row1: 0x40,
            })
        );
        assert_eq!(record.trailing, [0x99, 0x99]);
        assert_eq!(encode(&record), data);
    }

    #[test]
    fn test_host_defined_client_anchor() {
        let data = atom(record_type::CLIENT_ANCHOR, &[1, 2, 3, 4]);
        let record = decode(&data).unwrap();
        assert_eq!(record.as_client_anchor(), Some(&ClientAnchorRecord::HostDefined));
        assert_eq!(record.trailing, [1, 2, 3, 4]);
        assert_eq!(encode(&record), data);
    }

    #[test]
    fn test_child_anchor() {
        let anchor = ChildAnchorRecord::new(-100, 200, 300, 400);
        let bytes = encode(&crate::Record::child_anchor(anchor));
        assert_eq!(bytes.len(), 24);
        assert_eq!(decode(&bytes).unwrap().as_child_anchor(), Some(&anchor));
    }

    #[test]
    fn test_compact_child_anchor() {
        let body = [0xFF, 0xFF, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00, 0xAB];
        let data = atom(record_type::CHILD_ANCHOR, &body);
        let record = decode(&data).unwrap();
        let anchor = record.as_child_anchor().unwrap();
        assert!(anchor.compact);
        assert_eq!((anchor.left, anchor.top, anchor.right, anchor.bottom), (-1, 2, 3, 4));
        assert_eq!(record.trailing, [0xAB]);
        assert_eq!(encode(&record), data);
    }

    #[test]
    fn test_short_child_anchor() {
        let data = atom(record_type::CHILD_ANCHOR, &[0; 6]);
        assert!(matches!(
            decode(&data).unwrap_err(),
            Error::TruncatedAtom {
                expected: 8,
                available: 6,
                ..
            }
        ));
    }
}
