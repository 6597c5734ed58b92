//! The record tree node.
//!
//! A [`Record`] owns its body outright; nothing in a decoded tree borrows from
//! the input buffer. The header is never stored: [`Record::header`] derives
//! the declared length (and, for property tables, the instance) from the
//! current content, so a mutated tree always encodes with consistent framing.

use super::anchor::{ChildAnchorRecord, ClientAnchorRecord};
use super::atom::AtomCodec;
use super::blip::BlipRecord;
use super::bse::BlipStoreEntry;
use super::drawing::{DrawingGroupRecord, DrawingRecord, SplitMenuColorsRecord};
use super::header::{CONTAINER_VERSION, RecordHeader};
use super::properties::OptionsRecord;
use super::shape::{ShapeGroupRecord, ShapeRecord};
use super::types::record_type;
use crate::common::binary::wire_len;
use crate::common::error::Result;
use std::io::Write;

/// Header versions written by the record constructors.
pub mod default_version {
    pub const ATOM: u8 = 0x00;
    pub const SPGR: u8 = 0x01;
    pub const SP: u8 = 0x02;
    pub const BSE: u8 = 0x02;
    pub const OPT: u8 = 0x03;
    pub const CONTAINER: u8 = super::CONTAINER_VERSION;
}

/// One node of an Escher record tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Version nibble, preserved as decoded
    pub version: u8,
    /// Instance field; ignored on encode for property tables
    pub instance: u16,
    /// Record type tag
    pub record_type: u16,
    /// Decoded content
    pub body: RecordBody,
    /// Body bytes a typed atom did not consume; always empty for containers
    pub trailing: Vec<u8>,
}

/// Content of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    /// Child records in document order
    Container(Vec<Record>),
    /// Opaque atom payload
    Atom(Vec<u8>),
    Options(OptionsRecord),
    BlipStoreEntry(BlipStoreEntry),
    Blip(BlipRecord),
    Shape(ShapeRecord),
    ShapeGroup(ShapeGroupRecord),
    ClientAnchor(ClientAnchorRecord),
    ChildAnchor(ChildAnchorRecord),
    Drawing(DrawingRecord),
    DrawingGroup(DrawingGroupRecord),
    SplitMenuColors(SplitMenuColorsRecord),
}

impl RecordBody {
    fn len(&self) -> usize {
        match self {
            Self::Container(children) => children.iter().map(Record::encoded_len).sum(),
            Self::Atom(data) => data.len(),
            Self::Options(v) => v.body_len(),
            Self::BlipStoreEntry(v) => v.body_len(),
            Self::Blip(v) => v.body_len(),
            Self::Shape(v) => v.body_len(),
            Self::ShapeGroup(v) => v.body_len(),
            Self::ClientAnchor(v) => v.body_len(),
            Self::ChildAnchor(v) => v.body_len(),
            Self::Drawing(v) => v.body_len(),
            Self::DrawingGroup(v) => v.body_len(),
            Self::SplitMenuColors(v) => v.body_len(),
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::Container(children) => {
                for child in children {
                    child.serialize_into(out);
                }
            },
            Self::Atom(data) => out.extend_from_slice(data),
            Self::Options(v) => v.encode_body(out),
            Self::BlipStoreEntry(v) => v.encode_body(out),
            Self::Blip(v) => v.encode_body(out),
            Self::Shape(v) => v.encode_body(out),
            Self::ShapeGroup(v) => v.encode_body(out),
            Self::ClientAnchor(v) => v.encode_body(out),
            Self::ChildAnchor(v) => v.encode_body(out),
            Self::Drawing(v) => v.encode_body(out),
            Self::DrawingGroup(v) => v.encode_body(out),
            Self::SplitMenuColors(v) => v.encode_body(out),
        }
    }
}

impl Record {
    /// Build a record from its parts.
    pub fn new(version: u8, instance: u16, record_type: u16, body: RecordBody) -> Self {
        Self {
            version,
            instance,
            record_type,
            body,
            trailing: Vec::new(),
        }
    }

    /// Create an empty container.
    pub fn container(record_type: u16, instance: u16) -> Self {
        Self::new(
            default_version::CONTAINER,
            instance,
            record_type,
            RecordBody::Container(Vec::new()),
        )
    }

    /// Create an opaque atom.
    pub fn atom(record_type: u16, instance: u16, data: Vec<u8>) -> Self {
        Self::new(default_version::ATOM, instance, record_type, RecordBody::Atom(data))
    }

    /// Create a property table record (Opt).
    pub fn options(options: OptionsRecord) -> Self {
        let instance = options.len() as u16;
        Self::new(
            default_version::OPT,
            instance,
            record_type::OPT,
            RecordBody::Options(options),
        )
    }

    /// Create a BLIP store entry; the instance carries the Windows blip type.
    pub fn blip_store_entry(entry: BlipStoreEntry) -> Self {
        let instance = entry.blip_type_win32 as u16;
        Self::new(
            default_version::BSE,
            instance,
            record_type::BSE,
            RecordBody::BlipStoreEntry(entry),
        )
    }

    /// Create a blip atom of the given blip type tag.
    pub fn blip(record_type: u16, instance: u16, blip: BlipRecord) -> Self {
        Self::new(default_version::ATOM, instance, record_type, RecordBody::Blip(blip))
    }

    /// Create a shape atom (Sp); the instance carries the shape type.
    pub fn shape(shape_type: u16, shape: ShapeRecord) -> Self {
        Self::new(
            default_version::SP,
            shape_type,
            record_type::SP,
            RecordBody::Shape(shape),
        )
    }

    /// Create a shape group coordinate atom (Spgr).
    pub fn shape_group(group: ShapeGroupRecord) -> Self {
        Self::new(
            default_version::SPGR,
            0,
            record_type::SPGR,
            RecordBody::ShapeGroup(group),
        )
    }

    pub fn client_anchor(anchor: ClientAnchorRecord) -> Self {
        Self::new(
            default_version::ATOM,
            0,
            record_type::CLIENT_ANCHOR,
            RecordBody::ClientAnchor(anchor),
        )
    }

    pub fn child_anchor(anchor: ChildAnchorRecord) -> Self {
        Self::new(
            default_version::ATOM,
            0,
            record_type::CHILD_ANCHOR,
            RecordBody::ChildAnchor(anchor),
        )
    }

    /// Create a drawing atom (Dg); the instance carries the drawing id.
    pub fn drawing(drawing_id: u16, drawing: DrawingRecord) -> Self {
        Self::new(
            default_version::ATOM,
            drawing_id,
            record_type::DG,
            RecordBody::Drawing(drawing),
        )
    }

    pub fn drawing_group(group: DrawingGroupRecord) -> Self {
        Self::new(
            default_version::ATOM,
            0,
            record_type::DGG,
            RecordBody::DrawingGroup(group),
        )
    }

    pub fn split_menu_colors(colors: SplitMenuColorsRecord) -> Self {
        Self::new(
            default_version::ATOM,
            SplitMenuColorsRecord::INSTANCE,
            record_type::SPLIT_MENU_COLORS,
            RecordBody::SplitMenuColors(colors),
        )
    }

    /// The header this record encodes with, derived from its content.
    pub fn header(&self) -> RecordHeader {
        let instance = match &self.body {
            RecordBody::Options(options) => options.len() as u16,
            _ => self.instance,
        };
        RecordHeader::new(
            self.version,
            instance,
            self.record_type,
            wire_len(self.body_len()),
        )
    }

    /// Encoded body length, trailing bytes included.
    #[inline]
    pub fn body_len(&self) -> usize {
        self.body.len() + self.trailing.len()
    }

    /// Encoded length including the 8-byte header.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        RecordHeader::SIZE + self.body_len()
    }

    /// Append the encoded record to `out`.
    ///
    /// # Panics
    ///
    /// Panics if a length, count or header field does not fit its wire field.
    pub fn serialize_into(&self, out: &mut Vec<u8>) {
        out.reserve(self.encoded_len());
        out.extend_from_slice(&self.header().encode());
        self.body.encode_into(out);
        out.extend_from_slice(&self.trailing);
    }

    /// Encode the record to a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.serialize_into(&mut out);
        out
    }

    /// Encode the record into a writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Raw payload of an opaque atom.
    #[inline]
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.body {
            RecordBody::Atom(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable payload of an opaque atom.
    #[inline]
    pub fn payload_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.body {
            RecordBody::Atom(data) => Some(data),
            _ => None,
        }
    }
}

macro_rules! typed_accessors {
    ($($variant:ident($ty:ty) => $get:ident, $get_mut:ident;)*) => {
        impl Record {
            $(
                #[inline]
                pub fn $get(&self) -> Option<&$ty> {
                    match &self.body {
                        RecordBody::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                #[inline]
                pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                    match &mut self.body {
                        RecordBody::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            )*
        }
    };
}

typed_accessors! {
    Options(OptionsRecord) => as_options, as_options_mut;
    BlipStoreEntry(BlipStoreEntry) => as_blip_store_entry, as_blip_store_entry_mut;
    Blip(BlipRecord) => as_blip, as_blip_mut;
    Shape(ShapeRecord) => as_shape, as_shape_mut;
    ShapeGroup(ShapeGroupRecord) => as_shape_group, as_shape_group_mut;
    ClientAnchor(ClientAnchorRecord) => as_client_anchor, as_client_anchor_mut;
    ChildAnchor(ChildAnchorRecord) => as_child_anchor, as_child_anchor_mut;
    Drawing(DrawingRecord) => as_drawing, as_drawing_mut;
    DrawingGroup(DrawingGroupRecord) => as_drawing_group, as_drawing_group_mut;
    SplitMenuColors(SplitMenuColorsRecord) => as_split_menu_colors, as_split_menu_colors_mut;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escher::parser::{decode, decode_stream, encode};
    use crate::escher::properties::{Property, PropertyValue};
    use crate::escher::shape::ShapeFlags;
    use proptest::prelude::*;

    fn assert_lengths_consistent(record: &Record) {
        let bytes = record.to_bytes();
        let (header, _) = RecordHeader::decode(&bytes).unwrap();
        assert_eq!(header.length as usize, bytes.len() - RecordHeader::SIZE);
        for child in record.children().unwrap_or_default() {
            assert_lengths_consistent(child);
        }
    }

    #[test]
    fn test_container_fixture_bytes() {
        let mut root = Record::container(record_type::SP_CONTAINER, 0);
        root.push_child(Record::atom(0xF222, 0, Vec::new())).unwrap();

        assert_eq!(
            encode(&root),
            [
                0x0F, 0x00, 0x04, 0xF0, 0x08, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x22, 0xF2, 0x00, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn test_header_tracks_mutation() {
        let mut root = Record::container(record_type::DG_CONTAINER, 0);
        assert_eq!(root.header().length, 0);

        root.push_child(Record::atom(record_type::CLIENT_DATA, 0, vec![1, 2, 3]))
            .unwrap();
        assert_eq!(root.header().length, 11);

        root.child_mut(record_type::CLIENT_DATA)
            .and_then(Record::payload_mut)
            .unwrap()
            .push(4);
        assert_eq!(root.header().length, 12);
        assert_lengths_consistent(&root);
    }

    #[test]
    fn test_options_instance_is_property_count() {
        let mut options = OptionsRecord::new();
        options.set_property(Property::simple(0x7F, 0x0001_0001));
        let mut record = Record::options(options);
        record.instance = 0x123;

        assert_eq!(record.header().instance, 1);
        assert_eq!(record.header().version, 3);

        record
            .as_options_mut()
            .unwrap()
            .set_property(Property::simple(0x181, 0x0800_0004));
        assert_eq!(record.header().instance, 2);
        assert_eq!(record.header().length, 12);
    }

    #[test]
    fn test_write_to() {
        let record = Record::shape(
            1,
            ShapeRecord::new(0x401, ShapeFlags::HAVE_ANCHOR | ShapeFlags::HAVE_SPT),
        );
        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        assert_eq!(out, record.to_bytes());
        assert_eq!(&out[..8], &[0x12, 0x00, 0x0A, 0xF0, 0x08, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_typed_accessors() {
        let mut record = Record::drawing(1, DrawingRecord::new(2, 0x402));
        assert!(record.as_options().is_none());
        assert!(record.payload().is_none());
        record.as_drawing_mut().unwrap().num_shapes = 3;
        assert_eq!(record.as_drawing().unwrap().num_shapes, 3);
    }

    fn leaf() -> impl Strategy<Value = Record> {
        prop_oneof![
            prop::collection::vec(any::<u8>(), 0..24)
                .prop_map(|data| Record::atom(record_type::CLIENT_DATA, 0, data)),
            (any::<u32>(), any::<u32>())
                .prop_map(|(n, last)| Record::drawing(1, DrawingRecord::new(n, last))),
            (any::<u32>(), any::<u32>(), 1u16..0x0FFF).prop_map(|(id, flags, spt)| {
                Record::shape(spt, ShapeRecord::new(id, ShapeFlags::from_bits_retain(flags)))
            }),
            prop::collection::vec((0u16..0x0140, any::<u32>()), 0..8).prop_map(|props| {
                let mut options = OptionsRecord::new();
                for (number, value) in props {
                    if value != u32::MAX {
                        options.set_property(Property::simple(number, value));
                    }
                }
                Record::options(options)
            }),
            prop::collection::vec(any::<u8>(), 0..12).prop_map(|blob| {
                let mut options = OptionsRecord::new();
                options.set_property(Property::new(
                    0x0381,
                    false,
                    PropertyValue::Complex(blob),
                ));
                Record::options(options)
            }),
        ]
    }

    fn tree() -> impl Strategy<Value = Record> {
        leaf().prop_recursive(4, 32, 6, |inner| {
            (
                prop_oneof![
                    Just(record_type::SP_CONTAINER),
                    Just(record_type::SPGR_CONTAINER),
                    Just(record_type::DG_CONTAINER),
                ],
                prop::collection::vec(inner, 0..6),
            )
                .prop_map(|(tag, children)| {
                    let mut container = Record::container(tag, 0);
                    for child in children {
                        let _ = container.push_child(child);
                    }
                    container
                })
        })
    }

    proptest! {
        #[test]
        fn prop_tree_round_trip(record in tree()) {
            let bytes = encode(&record);
            let decoded = decode(&bytes).unwrap();
            prop_assert_eq!(&decoded, &record);
            prop_assert_eq!(encode(&decoded), bytes);
            assert_lengths_consistent(&decoded);
        }

        #[test]
        fn prop_decoded_bytes_reencode_identically(
            tag in prop_oneof![
                Just(record_type::SP_CONTAINER),
                Just(record_type::OPT),
                Just(record_type::BSE),
                Just(record_type::BLIP_PNG),
                Just(record_type::BLIP_EMF),
                Just(record_type::DGG),
                Just(record_type::CLIENT_ANCHOR),
                Just(record_type::CHILD_ANCHOR),
                Just(0xF111u16),
            ],
            options in any::<u16>(),
            body in prop::collection::vec(any::<u8>(), 0..96),
        ) {
            let mut data = RecordHeader::from_options(options, tag, body.len() as u32)
                .encode()
                .to_vec();
            data.extend_from_slice(&body);

            if let Ok(record) = decode(&data) {
                prop_assert_eq!(encode(&record), data.clone());
                prop_assert_eq!(encode(&decode(&encode(&record)).unwrap()), data);
            }
        }

        #[test]
        fn prop_stream_round_trip(records in prop::collection::vec(tree(), 0..4)) {
            let mut bytes = Vec::new();
            for record in &records {
                record.serialize_into(&mut bytes);
            }
            let decoded = decode_stream(&bytes).unwrap();
            prop_assert_eq!(decoded, records);
        }
    }
}
