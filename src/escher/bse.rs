// BlipStoreEntry (BSE) record
//
// BSE records live in the Blip Store Container (BStoreContainer) of a drawing
// group. Each one describes a picture and may carry the picture itself as an
// embedded blip record. Shapes refer to entries by their 1-based position in
// the store.
//
// References:
// - [MS-ODRAW] 2.2.32: OfficeArtBStoreContainerFileBlock
// - [MS-ODRAW] 2.2.33: OfficeArtBSE

use super::atom::{AtomCodec, AtomContext};
use super::blip::BlipType;
use super::header::RecordHeader;
use super::record::Record;
use super::types::is_blip_type;
use crate::common::binary::{
    parse_utf16le_string, put_u16_le, put_u32_le, read_u16_le, read_u32_le,
};
use crate::common::error::{Error, Result};
use tracing::debug;

/// Size of the fixed part of a BSE body.
pub const BSE_FIXED_SIZE: usize = 36;

/// BlipStoreEntry - metadata and optional embedded picture
///
/// ```text
/// Offset | Size | Field
/// -------|------|------
/// 0      | 1    | btWin32 (BLIP type for Windows)
/// 1      | 1    | btMacOS (BLIP type for Mac)
/// 2      | 16   | rgbUid (Primary UID)
/// 18     | 2    | tag
/// 20     | 4    | size (BLIP data size)
/// 24     | 4    | cRef (reference count)
/// 28     | 4    | foDelay (offset to BLIP)
/// 32     | 1    | usage
/// 33     | 1    | cbName (name length)
/// 34     | 1    | unused2
/// 35     | 1    | unused3
/// 36     | N    | embedded blip record, name bytes, or anything else
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BlipStoreEntry {
    /// BLIP type indicator for Windows
    pub blip_type_win32: u8,
    /// BLIP type indicator for Mac
    pub blip_type_macos: u8,
    /// Primary UID (16 bytes)
    pub uid: [u8; 16],
    /// Tag value (usually 0xFF)
    pub tag: u16,
    /// Size of BLIP data in bytes, as stored
    pub size: u32,
    /// Reference count
    pub ref_count: u32,
    /// Offset to BLIP data in the delay stream
    pub offset: u32,
    /// Usage type (0=default, 1=texture, 2=pattern)
    pub usage: u8,
    /// Name length in bytes
    pub name_len: u8,
    pub unused2: u8,
    pub unused3: u8,
    /// Blip record stored right after the fixed part
    pub embedded_blip: Option<Box<Record>>,
    /// Bytes after the fixed part (and embedded blip) kept verbatim
    pub remaining: Vec<u8>,
}

impl BlipStoreEntry {
    /// Create an entry with zeroed counters and no embedded picture.
    pub fn new(blip_type: BlipType, uid: [u8; 16]) -> Self {
        let bt = blip_type.win32();
        Self {
            blip_type_win32: bt,
            blip_type_macos: bt,
            uid,
            tag: 0xFF,
            size: 0,
            ref_count: 0,
            offset: 0,
            usage: 0,
            name_len: 0,
            unused2: 0,
            unused3: 0,
            embedded_blip: None,
            remaining: Vec::new(),
        }
    }

    /// Blip type from the Windows type byte.
    pub fn blip_type(&self) -> Option<BlipType> {
        BlipType::from_win32(self.blip_type_win32)
    }

    /// Add one reference, saturating at `u32::MAX`.
    pub fn increment_ref_count(&mut self) {
        self.ref_count = self.ref_count.saturating_add(1);
    }

    /// Check if this BLIP is delay-loaded (offset != 0)
    pub fn is_delay_loaded(&self) -> bool {
        self.offset != 0
    }

    /// Entry name decoded from the UTF-16LE bytes after the fixed part.
    ///
    /// Only available when no blip is embedded, since the name then starts
    /// the remaining bytes.
    pub fn name(&self) -> Option<String> {
        if self.name_len == 0 || self.embedded_blip.is_some() {
            return None;
        }
        let bytes = self.remaining.get(..self.name_len as usize)?;
        Some(parse_utf16le_string(bytes))
    }

    /// Attach a blip record as the embedded picture, updating `size`.
    pub fn set_embedded_blip(&mut self, blip: Record) {
        self.size = blip.encoded_len() as u32;
        self.embedded_blip = Some(Box::new(blip));
    }

    /// Try to decode the blip record starting at `pos`.
    fn decode_embedded(body: &[u8], pos: usize, ctx: &AtomContext<'_>) -> Result<Option<Record>> {
        let rest = &body[pos..];
        let Ok((header, _)) = RecordHeader::decode(rest) else {
            return Ok(None);
        };
        if !is_blip_type(header.record_type) || header.record_size() > rest.len() {
            return Ok(None);
        }

        match ctx.decode_nested(&rest[..header.record_size()], pos) {
            Ok((record, _)) => Ok(Some(record)),
            Err(err @ Error::RecursionLimitExceeded { .. }) => Err(err),
            Err(err) => {
                debug!(
                    target: "officeart::escher",
                    offset = ctx.body_offset() + pos,
                    error = %err,
                    "embedded blip did not decode, keeping raw bytes"
                );
                Ok(None)
            },
        }
    }
}

impl AtomCodec for BlipStoreEntry {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        ctx.require(body, BSE_FIXED_SIZE)?;

        let mut uid = [0u8; 16];
        uid.copy_from_slice(&body[2..18]);
        let word = |at: usize| read_u32_le(body, at).unwrap_or_default();

        let embedded_blip = Self::decode_embedded(body, BSE_FIXED_SIZE, ctx)?;
        let pos = BSE_FIXED_SIZE + embedded_blip.as_ref().map_or(0, Record::encoded_len);

        Ok((
            Self {
                blip_type_win32: body[0],
                blip_type_macos: body[1],
                uid,
                tag: read_u16_le(body, 18).unwrap_or_default(),
                size: word(20),
                ref_count: word(24),
                offset: word(28),
                usage: body[32],
                name_len: body[33],
                unused2: body[34],
                unused3: body[35],
                embedded_blip: embedded_blip.map(Box::new),
                remaining: body[pos..].to_vec(),
            },
            body.len(),
        ))
    }

    fn body_len(&self) -> usize {
        BSE_FIXED_SIZE
            + self.embedded_blip.as_ref().map_or(0, |b| b.encoded_len())
            + self.remaining.len()
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        out.push(self.blip_type_win32);
        out.push(self.blip_type_macos);
        out.extend_from_slice(&self.uid);
        put_u16_le(out, self.tag);
        put_u32_le(out, self.size);
        put_u32_le(out, self.ref_count);
        put_u32_le(out, self.offset);
        out.extend_from_slice(&[self.usage, self.name_len, self.unused2, self.unused3]);
        if let Some(blip) = &self.embedded_blip {
            blip.serialize_into(out);
        }
        out.extend_from_slice(&self.remaining);
    }
}

/// Read-only view of a BStoreContainer.
///
/// Entries are addressed by their 1-based position among the container's
/// children, which is how blip properties refer to them.
#[derive(Debug, Clone, Copy)]
pub struct BlipStore<'a> {
    children: &'a [Record],
}

impl<'a> BlipStore<'a> {
    /// View a container's children as a blip store.
    ///
    /// Returns `None` for atoms.
    pub fn new(container: &'a Record) -> Option<Self> {
        container.children().map(|children| Self { children })
    }

    /// Number of child slots, decoded entries or not.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Entry at a 1-based index.
    pub fn entry(&self, index: usize) -> Option<&'a BlipStoreEntry> {
        let child = self.children.get(index.checked_sub(1)?)?;
        child.as_blip_store_entry()
    }

    /// Iterate over `(index, entry)` pairs, skipping children that are not entries.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a BlipStoreEntry)> + 'a {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_blip_store_entry().map(|e| (i + 1, e)))
    }

    /// Find an entry by its primary UID.
    pub fn find_by_uid(&self, uid: &[u8; 16]) -> Option<(usize, &'a BlipStoreEntry)> {
        self.iter().find(|(_, e)| &e.uid == uid)
    }

    /// Find an entry by its delay-stream offset.
    pub fn find_by_offset(&self, offset: u32) -> Option<(usize, &'a BlipStoreEntry)> {
        self.iter().find(|(_, e)| e.offset == offset)
    }
}

impl Record {
    /// View this record as a blip store.
    pub fn blip_store(&self) -> Option<BlipStore<'_>> {
        BlipStore::new(self)
    }

    /// Mutable entry at a 1-based index of a blip store container.
    pub fn blip_store_entry_mut(&mut self, index: usize) -> Option<&mut BlipStoreEntry> {
        let child = self.children_mut()?.get_mut(index.checked_sub(1)?)?;
        child.as_blip_store_entry_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escher::blip::{BitmapBlip, BlipRecord};
    use crate::escher::parser::{Decoder, decode, encode};
    use crate::escher::types::record_type;

    const FIXTURE: [u8; 44] = [
        0x01, 0x00, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, //
        0x05, 0x05, //
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, //
        0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x00, //
        0x01, 0x00, //
        0x00, 0x00, 0x00, 0x00, //
        0x02, 0x00, 0x00, 0x00, //
        0x03, 0x00, 0x00, 0x00, //
        0x04, 0x05, 0x06, 0x07,
    ];

    #[test]
    fn test_fixture_decodes_as_standalone_atom() {
        let (header, entry, consumed) = Decoder::default()
            .decode_atom::<BlipStoreEntry>(&FIXTURE)
            .unwrap();

        assert_eq!(consumed, 44);
        assert_eq!(header.record_type, 0x0000);
        assert_eq!(header.version, 1);
        assert_eq!(entry.blip_type_win32, 5);
        assert_eq!(entry.blip_type_macos, 5);
        assert_eq!(entry.uid[0], 0x01);
        assert_eq!(entry.uid[15], 0x00);
        assert_eq!(entry.tag, 1);
        assert_eq!(entry.size, 0);
        assert_eq!(entry.ref_count, 2);
        assert_eq!(entry.offset, 3);
        assert_eq!(entry.usage, 4);
        assert_eq!(entry.name_len, 5);
        assert_eq!(entry.unused2, 6);
        assert_eq!(entry.unused3, 7);
        assert!(entry.embedded_blip.is_none());
        assert!(entry.remaining.is_empty());
        assert_eq!(entry.blip_type(), Some(BlipType::Jpeg));

        let mut out = Vec::new();
        entry.encode_body(&mut out);
        assert_eq!(out, &FIXTURE[8..]);
    }

    #[test]
    fn test_short_entry_is_truncated_atom() {
        let mut data = RecordHeader::new(2, 6, record_type::BSE, 20).encode().to_vec();
        data.extend_from_slice(&[0; 20]);
        assert!(matches!(
            decode(&data).unwrap_err(),
            Error::TruncatedAtom {
                expected: 36,
                available: 20,
                ..
            }
        ));
    }

    fn png_blip() -> Record {
        let png = BitmapBlip {
            uid: [0x42; 16],
            secondary_uid: None,
            marker: 0xFF,
            picture: b"\x89PNG".to_vec(),
        };
        Record::blip(record_type::BLIP_PNG, 0x6E0, BlipRecord::Bitmap(png))
    }

    #[test]
    fn test_embedded_blip() {
        let mut entry = BlipStoreEntry::new(BlipType::Png, [0x42; 16]);
        entry.set_embedded_blip(png_blip());
        entry.increment_ref_count();
        let record = Record::blip_store_entry(entry);
        let bytes = encode(&record);

        let decoded = decode(&bytes).unwrap();
        let entry = decoded.as_blip_store_entry().unwrap();
        assert_eq!(entry.size, 8 + 16 + 1 + 4);
        assert_eq!(entry.ref_count, 1);
        assert!(!entry.is_delay_loaded());
        let blip = entry.embedded_blip.as_deref().unwrap();
        assert_eq!(blip.as_blip().unwrap().picture(), b"\x89PNG");
        assert!(entry.remaining.is_empty());
        assert_eq!(decoded, record);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_bad_embedded_blip_kept_raw() {
        // A PNG header whose body is too short for the UID
        let mut entry = BlipStoreEntry::new(BlipType::Png, [0; 16]);
        let mut garbage = RecordHeader::new(0, 0x6E0, record_type::BLIP_PNG, 4)
            .encode()
            .to_vec();
        garbage.extend_from_slice(&[1, 2, 3, 4]);
        entry.remaining = garbage.clone();
        let bytes = encode(&Record::blip_store_entry(entry));

        let decoded = decode(&bytes).unwrap();
        let entry = decoded.as_blip_store_entry().unwrap();
        assert!(entry.embedded_blip.is_none());
        assert_eq!(entry.remaining, garbage);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_embedded_blip_counts_against_depth() {
        let mut entry = BlipStoreEntry::new(BlipType::Png, [0x42; 16]);
        entry.set_embedded_blip(png_blip());
        let bytes = encode(&Record::blip_store_entry(entry));

        let decoder = Decoder::new(crate::escher::config::DecodeConfig::new().with_max_depth(1));
        assert!(matches!(
            decoder.decode(&bytes).unwrap_err(),
            Error::RecursionLimitExceeded { limit: 1, .. }
        ));
    }

    #[test]
    fn test_name() {
        let mut entry = BlipStoreEntry::new(BlipType::Jpeg, [0; 16]);
        entry.name_len = 6;
        entry.remaining = vec![b'p', 0, b'i', 0, 0, 0];
        assert_eq!(entry.name().as_deref(), Some("pi"));

        entry.remaining = vec![0x00, 0xD8, b'x', 0];
        entry.name_len = 4;
        assert_eq!(entry.name().as_deref(), Some("\u{FFFD}x"));
    }

    #[test]
    fn test_blip_store_view() {
        let mut store = Record::container(record_type::BSTORE_CONTAINER, 2);
        let mut first = BlipStoreEntry::new(BlipType::Png, [1; 16]);
        first.offset = 0x100;
        store.push_child(Record::blip_store_entry(first)).unwrap();
        store
            .push_child(Record::blip_store_entry(BlipStoreEntry::new(
                BlipType::Emf,
                [2; 16],
            )))
            .unwrap();

        let view = store.blip_store().unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.entry(0).is_none());
        assert_eq!(view.entry(2).unwrap().blip_type(), Some(BlipType::Emf));
        assert_eq!(view.find_by_uid(&[2; 16]).map(|(i, _)| i), Some(2));
        assert_eq!(view.find_by_offset(0x100).map(|(i, _)| i), Some(1));
        assert!(view.find_by_uid(&[3; 16]).is_none());

        store.blip_store_entry_mut(1).unwrap().increment_ref_count();
        let indexes: Vec<(usize, u32)> = store
            .blip_store()
            .unwrap()
            .iter()
            .map(|(i, e)| (i, e.ref_count))
            .collect();
        assert_eq!(indexes, [(1, 1), (2, 0)]);

        assert!(Record::atom(0xF011, 0, Vec::new()).blip_store().is_none());
    }

    #[test]
    fn test_ref_count_saturates() {
        let mut entry = BlipStoreEntry::new(BlipType::Dib, [0; 16]);
        entry.ref_count = u32::MAX;
        entry.increment_ref_count();
        assert_eq!(entry.ref_count, u32::MAX);
    }
}
