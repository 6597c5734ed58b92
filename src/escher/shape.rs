//! Shape atoms: Sp (shape id and flags) and Spgr (group coordinate space).

use super::atom::{AtomCodec, AtomContext};
use crate::common::error::Result;
use bitflags::bitflags;
use zerocopy::byteorder::little_endian::{I32, U32};
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::*;

bitflags! {
    /// Shape flags for the Sp record (MS-ODRAW 2.2.40)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShapeFlags: u32 {
        /// Shape is a group
        const GROUP = 0x0001;
        /// Shape is a child of a group
        const CHILD = 0x0002;
        /// Shape is the topmost group (patriarch)
        const PATRIARCH = 0x0004;
        /// Shape has been deleted
        const DELETED = 0x0008;
        /// Shape is an OLE object
        const OLE_SHAPE = 0x0010;
        /// Shape has a valid master
        const HAVE_MASTER = 0x0020;
        /// Shape is flipped horizontally
        const FLIP_H = 0x0040;
        /// Shape is flipped vertically
        const FLIP_V = 0x0080;
        /// Shape is a connector
        const CONNECTOR = 0x0100;
        /// Shape has an anchor
        const HAVE_ANCHOR = 0x0200;
        /// Shape is a background shape
        const BACKGROUND = 0x0400;
        /// Shape has a shape type property
        const HAVE_SPT = 0x0800;
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct SpWire {
    spid: U32,
    flags: U32,
}

/// Shape atom (Sp). The shape type lives in the record instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRecord {
    pub shape_id: u32,
    /// Undefined bits are kept so that they survive a round trip
    pub flags: ShapeFlags,
}

impl ShapeRecord {
    pub const SIZE: usize = 8;

    pub fn new(shape_id: u32, flags: ShapeFlags) -> Self {
        Self { shape_id, flags }
    }
}

impl AtomCodec for ShapeRecord {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let (wire, _) =
            SpWire::read_from_prefix(body).map_err(|_| ctx.truncated(body, Self::SIZE))?;
        Ok((
            Self {
                shape_id: wire.spid.get(),
                flags: ShapeFlags::from_bits_retain(wire.flags.get()),
            },
            Self::SIZE,
        ))
    }

    fn body_len(&self) -> usize {
        Self::SIZE
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        let wire = SpWire {
            spid: U32::new(self.shape_id),
            flags: U32::new(self.flags.bits()),
        };
        out.extend_from_slice(wire.as_bytes());
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RectWire {
    left: I32,
    top: I32,
    right: I32,
    bottom: I32,
}

/// Shape group coordinate atom (Spgr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeGroupRecord {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ShapeGroupRecord {
    pub const SIZE: usize = 16;

    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }
}

impl AtomCodec for ShapeGroupRecord {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let (wire, _) =
            RectWire::read_from_prefix(body).map_err(|_| ctx.truncated(body, Self::SIZE))?;
        Ok((
            Self::new(wire.left.get(), wire.top.get(), wire.right.get(), wire.bottom.get()),
            Self::SIZE,
        ))
    }

    fn body_len(&self) -> usize {
        Self::SIZE
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        let wire = RectWire {
            left: I32::new(self.left),
            top: I32::new(self.top),
            right: I32::new(self.right),
            bottom: I32::new(self.bottom),
        };
        out.extend_from_slice(wire.as_bytes());
    }
}
