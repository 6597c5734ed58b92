//! Property table wire codec.
//!
//! # Format
//!
//! A property table is `count` fixed 6-byte headers followed by the complex
//! payloads, in header order:
//!
//! - Bytes 0-1: Property id (number | blip flag | complex flag)
//! - Bytes 2-5: Simple value, or payload length for complex properties
//!
//! Decoding takes two passes: all headers first, then the payloads.

use super::array::ArrayProperty;
use super::ids::is_array_property;
use super::property::{Property, PropertyValue};
use crate::common::binary::wire_len;
use crate::common::error::{Error, Result};
use tracing::debug;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::*;

/// Encoded size of a property header.
pub const PROPERTY_HEADER_SIZE: usize = 6;

/// Single property header (6 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct PropertyHeaderWire {
    /// Property ID (with flags in high bits)
    id: U16,
    /// Property value or complex length
    value: U32,
}

/// Decode `count` properties from a property table body.
///
/// `origin` is the absolute offset of `body`. Returns the properties and the
/// number of body bytes they span.
pub fn decode_properties(body: &[u8], count: usize, origin: usize) -> Result<(Vec<Property>, usize)> {
    // Pass 1: Parse all property headers
    let mut headers = Vec::with_capacity(count.min(body.len() / PROPERTY_HEADER_SIZE));
    let mut rest = body;
    for index in 0..count {
        let (header, tail) = PropertyHeaderWire::read_from_prefix(rest).map_err(|_| {
            Error::TruncatedProperty {
                offset: origin + index * PROPERTY_HEADER_SIZE,
                index,
                declared_count: count,
            }
        })?;
        headers.push(header);
        rest = tail;
    }

    // Pass 2: Read complex data in header order
    let mut pos = count * PROPERTY_HEADER_SIZE;
    let mut properties = Vec::with_capacity(count);

    for header in headers {
        let (number, is_blip_id, is_complex) = Property::split_id(header.id.get());
        let raw = header.value.get();

        if !is_complex {
            properties.push(Property {
                number,
                is_blip_id,
                value: PropertyValue::Simple(raw),
            });
            continue;
        }

        let declared = raw as usize;
        let area = &body[pos..];
        if declared > area.len() {
            return Err(Error::TruncatedComplexPayload {
                offset: origin + pos,
                number,
                declared,
                available: area.len(),
            });
        }

        let (value, span) = if is_array_property(number) {
            match ArrayProperty::decode(area, declared) {
                Some((array, span)) => (PropertyValue::Array(array), span),
                None => {
                    debug!(
                        target: "officeart::escher",
                        property = format_args!("{:#06X}", number),
                        offset = origin + pos,
                        length = declared,
                        "array payload is not self-consistent, keeping raw bytes"
                    );
                    (PropertyValue::Complex(area[..declared].to_vec()), declared)
                },
            }
        } else {
            (PropertyValue::Complex(area[..declared].to_vec()), declared)
        };

        pos += span;
        properties.push(Property {
            number,
            is_blip_id,
            value,
        });
    }

    Ok((properties, pos))
}

/// Bytes [`encode_properties`] writes for `properties`.
pub fn encoded_properties_len(properties: &[Property]) -> usize {
    properties
        .iter()
        .map(|p| PROPERTY_HEADER_SIZE + p.payload_len())
        .sum()
}

/// Write property headers followed by complex payloads, in stored order.
///
/// # Panics
///
/// Panics if a complex payload is larger than a 32-bit length can describe.
pub fn encode_properties(properties: &[Property], out: &mut Vec<u8>) {
    for property in properties {
        let value = match &property.value {
            PropertyValue::Simple(v) => *v,
            PropertyValue::Complex(data) => wire_len(data.len()),
            PropertyValue::Array(array) => wire_len(array.declared_len()),
        };
        let header = PropertyHeaderWire {
            id: U16::new(property.id()),
            value: U32::new(value),
        };
        out.extend_from_slice(header.as_bytes());
    }

    for property in properties {
        match &property.value {
            PropertyValue::Simple(_) => {},
            PropertyValue::Complex(data) => out.extend_from_slice(data),
            PropertyValue::Array(array) => array.encode_payload(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escher::properties::ids::property_id;

    #[test]
    fn test_two_pass_decode() {
        let body = [
            0x81, 0x01, 0x04, 0x00, 0x00, 0x08, // fill color
            0x80, 0x83, 0x04, 0x00, 0x00, 0x00, // shape name, 4 bytes
            0x04, 0x41, 0x01, 0x00, 0x00, 0x00, // blip to display, blip id
            b'A', 0x00, b'B', 0x00,
        ];

        let (props, used) = decode_properties(&body, 3, 100).unwrap();

        assert_eq!(used, body.len());
        assert_eq!(props[0].as_u32(), Some(0x0800_0004));
        assert_eq!(props[1].number, property_id::SHAPE_NAME);
        assert_eq!(props[1].as_complex(), Some(&[b'A', 0, b'B', 0][..]));
        assert!(props[2].is_blip_id);
        assert!(!props[2].is_complex());

        let mut out = Vec::new();
        encode_properties(&props, &mut out);
        assert_eq!(out, body);
        assert_eq!(encoded_properties_len(&props), body.len());
    }

    #[test]
    fn test_truncated_property() {
        let body = [0x81, 0x01, 0x04, 0x00, 0x00, 0x08, 0x82, 0x01];
        let err = decode_properties(&body, 2, 16).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedProperty {
                offset: 22,
                index: 1,
                declared_count: 2
            }
        ));
    }

    #[test]
    fn test_truncated_complex_payload() {
        let body = [0x80, 0x83, 0x08, 0x00, 0x00, 0x00, 0x41, 0x00];
        let err = decode_properties(&body, 1, 8).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedComplexPayload {
                offset: 14,
                number: 0x0380,
                declared: 8,
                available: 2
            }
        ));
    }

    #[test]
    fn test_array_length_excluding_header() {
        // Vertices declared as 8 bytes: two 4-byte points without the header
        let body = [
            0x45, 0x81, 0x08, 0x00, 0x00, 0x00, //
            0x02, 0x00, 0x02, 0x00, 0xF0, 0xFF, //
            0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00,
        ];

        let (props, used) = decode_properties(&body, 1, 0).unwrap();
        assert_eq!(used, body.len());
        let array = props[0].as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert!(array.length_excludes_header());

        let mut out = Vec::new();
        encode_properties(&props, &mut out);
        assert_eq!(out, body);
    }

    #[test]
    fn test_bad_array_kept_opaque() {
        let body = [
            0x45, 0x81, 0x03, 0x00, 0x00, 0x00, //
            0x07, 0x08, 0x09,
        ];
        let (props, _) = decode_properties(&body, 1, 0).unwrap();
        assert_eq!(props[0].as_complex(), Some(&[0x07, 0x08, 0x09][..]));

        let mut out = Vec::new();
        encode_properties(&props, &mut out);
        assert_eq!(out, body);
    }
}
