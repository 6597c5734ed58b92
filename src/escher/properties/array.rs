//! Array properties.
//!
//! An array payload is a 6-byte header followed by the elements:
//!
//! - Bytes 0-1: Number of elements in array
//! - Bytes 2-3: Number of elements in memory (kept as is)
//! - Bytes 4-5: Element size; a negative value `s` means `(-s) >> 2` bytes,
//!   and zero means every element carries its own u32 length prefix
//!
//! Some writers declare the complex length as `count * element_size`, i.e.
//! without the header. Such arrays are decoded with the header included and
//! re-encoded with the same short length.

use crate::common::binary::{put_u32_le, read_u32_le};
use smallvec::SmallVec;
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::*;

/// Encoded size of an array header.
pub const ARRAY_HEADER_SIZE: usize = 6;

/// Array element bytes; most elements are points or colors and stay inline.
pub type Element = SmallVec<[u8; 8]>;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawArrayHeader {
    element_count: U16,
    reserved: U16,
    element_size: U16,
}

/// Decoded array header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayHeader {
    pub element_count: u16,
    /// Elements in memory; preserved but not interpreted
    pub reserved: u16,
    /// Raw element size field
    pub element_size: u16,
}

impl ArrayHeader {
    pub const fn new(element_count: u16, element_size: u16) -> Self {
        Self {
            element_count,
            reserved: element_count,
            element_size,
        }
    }

    /// Actual element size in bytes.
    ///
    /// A negative size field encodes `(-size) >> 2`.
    #[inline]
    pub fn element_width(&self) -> usize {
        let size = self.element_size as i16 as i32;
        if size < 0 {
            ((-size) >> 2) as usize
        } else {
            size as usize
        }
    }

    /// Elements carry their own length prefix.
    #[inline]
    pub const fn is_variable(&self) -> bool {
        self.element_size == 0
    }

    fn decode(data: &[u8]) -> Option<(Self, &[u8])> {
        let (raw, rest) = RawArrayHeader::read_from_prefix(data).ok()?;
        Some((
            Self {
                element_count: raw.element_count.get(),
                reserved: raw.reserved.get(),
                element_size: raw.element_size.get(),
            },
            rest,
        ))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let raw = RawArrayHeader {
            element_count: U16::new(self.element_count),
            reserved: U16::new(self.reserved),
            element_size: U16::new(self.element_size),
        };
        out.extend_from_slice(raw.as_bytes());
    }
}

/// Structured payload of an array property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArrayProperty {
    header: Option<ArrayHeader>,
    elements: Vec<Element>,
    length_excludes_header: bool,
}

impl ArrayProperty {
    /// Create an empty array of fixed-size (or, for 0, length-prefixed) elements.
    pub fn new(element_size: u16) -> Self {
        Self {
            header: Some(ArrayHeader::new(0, element_size)),
            elements: Vec::new(),
            length_excludes_header: false,
        }
    }

    /// An array with a zero-length payload: no header, no elements.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn header(&self) -> Option<&ArrayHeader> {
        self.header.as_ref()
    }

    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[inline]
    pub fn element(&self, index: usize) -> Option<&[u8]> {
        self.elements.get(index).map(|e| e.as_slice())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The declared complex length leaves out the 6-byte header.
    #[inline]
    pub fn length_excludes_header(&self) -> bool {
        self.length_excludes_header
    }

    /// Append an element.
    ///
    /// An array without a header gets one sized to this element.
    ///
    /// # Panics
    ///
    /// Panics if a fixed-size array receives an element of another width, or
    /// the count would not fit 16 bits.
    pub fn push_element(&mut self, element: &[u8]) {
        let header = self
            .header
            .get_or_insert_with(|| ArrayHeader::new(0, element.len() as u16));
        if !header.is_variable() {
            assert_eq!(
                element.len(),
                header.element_width(),
                "array element width does not match the header"
            );
        }

        let count = header.element_count;
        let new_count = count
            .checked_add(1)
            .unwrap_or_else(|| panic!("array holds more than {} elements", u16::MAX));
        if header.reserved == count {
            header.reserved = new_count;
        }
        header.element_count = new_count;
        self.elements.push(Element::from_slice(element));
    }

    /// Remove and return the element at `index`.
    pub fn remove_element(&mut self, index: usize) -> Option<Element> {
        if index >= self.elements.len() {
            return None;
        }
        if let Some(header) = self.header.as_mut() {
            if header.reserved == header.element_count {
                header.reserved -= 1;
            }
            header.element_count -= 1;
        }
        Some(self.elements.remove(index))
    }

    /// Bytes the payload occupies in the complex data area.
    pub fn payload_len(&self) -> usize {
        let Some(header) = &self.header else {
            return 0;
        };
        let elements: usize = if header.is_variable() {
            self.elements.iter().map(|e| 4 + e.len()).sum()
        } else {
            self.elements.len() * header.element_width()
        };
        ARRAY_HEADER_SIZE + elements
    }

    /// Length written into the property header.
    pub fn declared_len(&self) -> usize {
        let len = self.payload_len();
        if self.length_excludes_header && len > ARRAY_HEADER_SIZE {
            len - ARRAY_HEADER_SIZE
        } else {
            len
        }
    }

    pub(crate) fn encode_payload(&self, out: &mut Vec<u8>) {
        let Some(header) = &self.header else {
            return;
        };
        header.encode(out);
        for element in &self.elements {
            if header.is_variable() {
                put_u32_le(out, element.len() as u32);
            }
            out.extend_from_slice(element);
        }
    }

    /// Decode an array payload from the complex data area.
    ///
    /// `area` is everything from the payload start to the end of the record
    /// body and `declared` the length from the property header. Returns the
    /// array and the bytes it spans, or `None` if the payload is not a
    /// self-consistent array.
    pub(crate) fn decode(area: &[u8], declared: usize) -> Option<(Self, usize)> {
        if declared == 0 {
            return Some((Self::empty(), 0));
        }

        let (header, rest) = ArrayHeader::decode(area)?;
        let count = header.element_count as usize;
        let width = header.element_width();

        let (span, length_excludes_header) =
            if width > 0 && count * width == declared && rest.len() >= declared {
                (declared + ARRAY_HEADER_SIZE, true)
            } else if declared >= ARRAY_HEADER_SIZE && declared <= area.len() {
                (declared, false)
            } else {
                return None;
            };

        let data = &area[ARRAY_HEADER_SIZE..span];
        let elements = if header.is_variable() {
            decode_variable(data, count)?
        } else if count * width != data.len() {
            return None;
        } else if width == 0 {
            vec![Element::new(); count]
        } else {
            data.chunks_exact(width).map(Element::from_slice).collect()
        };

        Some((
            Self {
                header: Some(header),
                elements,
                length_excludes_header,
            },
            span,
        ))
    }
}

fn decode_variable(data: &[u8], count: usize) -> Option<Vec<Element>> {
    let mut elements = Vec::with_capacity(count.min(data.len() / 4));
    let mut pos = 0;

    for _ in 0..count {
        let len = read_u32_le(data, pos).ok()? as usize;
        pos += 4;
        let element = data.get(pos..pos.checked_add(len)?)?;
        elements.push(Element::from_slice(element));
        pos += len;
    }

    (pos == data.len()).then_some(elements)
}
