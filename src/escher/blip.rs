// BLIP (Binary Large Image or Picture) atoms
//
// Bitmap blips (JPEG, PNG, DIB, TIFF) carry their picture bytes as is;
// metafile blips (EMF, WMF, PICT) add size metadata and are usually
// deflate-compressed.
//
// A record instance one above the type's base value (an odd instance) means a
// second 16-byte UID follows the first.

use super::atom::{AtomCodec, AtomContext};
use super::types::record_type;
use crate::common::binary::{put_i32_le, put_u32_le, read_i32_le, read_u32_le};
use crate::common::error::Result;
use std::borrow::Cow;
use std::io::Read;

const UID_SIZE: usize = 16;
const METAFILE_HEADER_SIZE: usize = 34;

/// Type of BLIP record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BlipType {
    /// Enhanced Metafile (EMF)
    Emf = record_type::BLIP_EMF,
    /// Windows Metafile (WMF)
    Wmf = record_type::BLIP_WMF,
    /// Macintosh PICT
    Pict = record_type::BLIP_PICT,
    Jpeg = record_type::BLIP_JPEG,
    Png = record_type::BLIP_PNG,
    /// Device Independent Bitmap (DIB)
    Dib = record_type::BLIP_DIB,
    Tiff = record_type::BLIP_TIFF,
    /// JPEG in the CMYK color space
    JpegCmyk = record_type::BLIP_JPEG_CMYK,
}

impl BlipType {
    /// Parse BlipType from record type ID
    pub fn from_record_type(record_type: u16) -> Option<Self> {
        match record_type {
            record_type::BLIP_EMF => Some(Self::Emf),
            record_type::BLIP_WMF => Some(Self::Wmf),
            record_type::BLIP_PICT => Some(Self::Pict),
            record_type::BLIP_JPEG => Some(Self::Jpeg),
            record_type::BLIP_PNG => Some(Self::Png),
            record_type::BLIP_DIB => Some(Self::Dib),
            record_type::BLIP_TIFF => Some(Self::Tiff),
            record_type::BLIP_JPEG_CMYK => Some(Self::JpegCmyk),
            _ => None,
        }
    }

    /// Map the Windows blip type byte of a store entry.
    pub fn from_win32(win32_type: u8) -> Option<Self> {
        match win32_type {
            0x02 => Some(Self::Emf),
            0x03 => Some(Self::Wmf),
            0x04 => Some(Self::Pict),
            0x05 => Some(Self::Jpeg),
            0x06 => Some(Self::Png),
            0x07 => Some(Self::Dib),
            0x11 => Some(Self::Tiff),
            0x12 => Some(Self::JpegCmyk),
            _ => None,
        }
    }

    /// Windows blip type byte used by store entries.
    pub const fn win32(&self) -> u8 {
        match self {
            Self::Emf => 0x02,
            Self::Wmf => 0x03,
            Self::Pict => 0x04,
            Self::Jpeg => 0x05,
            Self::Png => 0x06,
            Self::Dib => 0x07,
            Self::Tiff => 0x11,
            Self::JpegCmyk => 0x12,
        }
    }

    #[inline]
    pub const fn record_type(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a metafile format (EMF, WMF, PICT)
    pub const fn is_metafile(&self) -> bool {
        matches!(self, Self::Emf | Self::Wmf | Self::Pict)
    }

    /// Get the file extension for this BLIP type
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Emf => "emf",
            Self::Wmf => "wmf",
            Self::Pict => "pict",
            Self::Jpeg | Self::JpegCmyk => "jpg",
            Self::Png => "png",
            Self::Dib => "dib",
            Self::Tiff => "tiff",
        }
    }
}

#[inline]
fn has_secondary_uid(instance: u16) -> bool {
    instance & 1 == 1
}

fn read_uid(body: &[u8], pos: usize) -> [u8; UID_SIZE] {
    let mut uid = [0u8; UID_SIZE];
    uid.copy_from_slice(&body[pos..pos + UID_SIZE]);
    uid
}

/// Bitmap blip body (JPEG, PNG, DIB, TIFF)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapBlip {
    /// Primary UID (MD4 hash of the picture)
    pub uid: [u8; 16],
    pub secondary_uid: Option<[u8; 16]>,
    /// Marker byte (0xFF for external files)
    pub marker: u8,
    pub picture: Vec<u8>,
}

impl AtomCodec for BitmapBlip {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let secondary = has_secondary_uid(ctx.header().instance);
        let prefix = UID_SIZE * (1 + secondary as usize) + 1;
        ctx.require(body, prefix)?;

        let uid = read_uid(body, 0);
        let secondary_uid = secondary.then(|| read_uid(body, UID_SIZE));

        Ok((
            Self {
                uid,
                secondary_uid,
                marker: body[prefix - 1],
                picture: body[prefix..].to_vec(),
            },
            body.len(),
        ))
    }

    fn body_len(&self) -> usize {
        UID_SIZE * (1 + self.secondary_uid.is_some() as usize) + 1 + self.picture.len()
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.uid);
        if let Some(uid) = &self.secondary_uid {
            out.extend_from_slice(uid);
        }
        out.push(self.marker);
        out.extend_from_slice(&self.picture);
    }
}

/// Metafile blip body (EMF, WMF, PICT)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafileBlip {
    pub uid: [u8; 16],
    pub secondary_uid: Option<[u8; 16]>,
    /// Uncompressed size in bytes
    pub uncompressed_size: u32,
    /// Clipping bounds (left, top, right, bottom)
    pub bounds: (i32, i32, i32, i32),
    /// Size in EMU (width, height)
    pub size_emu: (i32, i32),
    /// Stored picture size as written; not recomputed on encode
    pub saved_size: u32,
    /// Compression flag (0 = deflate, 0xFE = no compression)
    pub compression: u8,
    /// Filter byte (usually 0xFE)
    pub filter: u8,
    pub picture: Vec<u8>,
}

impl MetafileBlip {
    /// Compression byte value for deflate.
    pub const COMPRESSION_DEFLATE: u8 = 0x00;
    /// Compression byte value for uncompressed data.
    pub const COMPRESSION_NONE: u8 = 0xFE;

    #[inline]
    pub const fn is_compressed(&self) -> bool {
        self.compression == Self::COMPRESSION_DEFLATE
    }

    /// Replace the picture bytes and update the stored size.
    pub fn set_picture(&mut self, picture: Vec<u8>) {
        self.saved_size = picture.len() as u32;
        self.picture = picture;
    }

    /// The picture with compression removed.
    ///
    /// Data starting with a zlib header is inflated as zlib, anything else as
    /// raw deflate.
    pub fn decompressed(&self) -> Result<Cow<'_, [u8]>> {
        if !self.is_compressed() {
            return Ok(Cow::Borrowed(&self.picture));
        }

        // The stored size comes from the input; cap the reservation by the
        // bytes actually present
        let hint = (self.uncompressed_size as usize).min(self.picture.len().saturating_mul(8));
        let mut out = Vec::with_capacity(hint);
        if self.picture.first() == Some(&0x78) {
            flate2::read::ZlibDecoder::new(&self.picture[..]).read_to_end(&mut out)?;
        } else {
            flate2::read::DeflateDecoder::new(&self.picture[..]).read_to_end(&mut out)?;
        }
        Ok(Cow::Owned(out))
    }
}

impl AtomCodec for MetafileBlip {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let secondary = has_secondary_uid(ctx.header().instance);
        let uids = UID_SIZE * (1 + secondary as usize);
        ctx.require(body, uids + METAFILE_HEADER_SIZE)?;

        let uid = read_uid(body, 0);
        let secondary_uid = secondary.then(|| read_uid(body, UID_SIZE));

        let field = |at: usize| read_u32_le(body, uids + at).unwrap_or_default();
        let signed = |at: usize| read_i32_le(body, uids + at).unwrap_or_default();
        let saved_size = field(28);

        let start = uids + METAFILE_HEADER_SIZE;
        let picture_len = (saved_size as usize).min(body.len() - start);

        Ok((
            Self {
                uid,
                secondary_uid,
                uncompressed_size: field(0),
                bounds: (signed(4), signed(8), signed(12), signed(16)),
                size_emu: (signed(20), signed(24)),
                saved_size,
                compression: body[uids + 32],
                filter: body[uids + 33],
                picture: body[start..start + picture_len].to_vec(),
            },
            start + picture_len,
        ))
    }

    fn body_len(&self) -> usize {
        UID_SIZE * (1 + self.secondary_uid.is_some() as usize)
            + METAFILE_HEADER_SIZE
            + self.picture.len()
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.uid);
        if let Some(uid) = &self.secondary_uid {
            out.extend_from_slice(uid);
        }
        put_u32_le(out, self.uncompressed_size);
        let (left, top, right, bottom) = self.bounds;
        for v in [left, top, right, bottom, self.size_emu.0, self.size_emu.1] {
            put_i32_le(out, v);
        }
        put_u32_le(out, self.saved_size);
        out.push(self.compression);
        out.push(self.filter);
        out.extend_from_slice(&self.picture);
    }
}

/// A decoded blip atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlipRecord {
    Bitmap(BitmapBlip),
    Metafile(MetafileBlip),
}

impl BlipRecord {
    pub fn uid(&self) -> &[u8; 16] {
        match self {
            Self::Bitmap(b) => &b.uid,
            Self::Metafile(m) => &m.uid,
        }
    }

    /// Stored picture bytes (possibly compressed for metafiles).
    pub fn picture(&self) -> &[u8] {
        match self {
            Self::Bitmap(b) => &b.picture,
            Self::Metafile(m) => &m.picture,
        }
    }

    pub(crate) fn body_len(&self) -> usize {
        match self {
            Self::Bitmap(b) => b.body_len(),
            Self::Metafile(m) => m.body_len(),
        }
    }

    pub(crate) fn encode_body(&self, out: &mut Vec<u8>) {
        match self {
            Self::Bitmap(b) => b.encode_body(out),
            Self::Metafile(m) => m.encode_body(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::escher::header::RecordHeader;
    use crate::escher::parser::{decode, encode};
    use std::io::Write;

    fn blip_bytes(record_type: u16, instance: u16, body: &[u8]) -> Vec<u8> {
        let mut data = RecordHeader::new(0, instance, record_type, body.len() as u32)
            .encode()
            .to_vec();
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_png_blip() {
        let mut body = vec![0xAB; 16];
        body.push(0xFF);
        body.extend_from_slice(b"\x89PNG\r\n");
        let data = blip_bytes(record_type::BLIP_PNG, 0x6E0, &body);

        let record = decode(&data).unwrap();
        let Some(BlipRecord::Bitmap(png)) = record.as_blip() else {
            panic!("expected a bitmap blip");
        };
        assert_eq!(png.uid, [0xAB; 16]);
        assert!(png.secondary_uid.is_none());
        assert_eq!(png.marker, 0xFF);
        assert_eq!(png.picture, b"\x89PNG\r\n");
        assert_eq!(encode(&record), data);
    }

    #[test]
    fn test_secondary_uid_on_odd_instance() {
        let mut body = vec![0x01; 16];
        body.extend_from_slice(&[0x02; 16]);
        body.push(0xFF);
        body.push(0xD8);
        let data = blip_bytes(record_type::BLIP_JPEG, 0x46B, &body);

        let record = decode(&data).unwrap();
        let Some(BlipRecord::Bitmap(jpeg)) = record.as_blip() else {
            panic!("expected a bitmap blip");
        };
        assert_eq!(jpeg.secondary_uid, Some([0x02; 16]));
        assert_eq!(jpeg.picture, [0xD8]);
        assert_eq!(encode(&record), data);
    }

    #[test]
    fn test_short_bitmap_is_truncated_atom() {
        let data = blip_bytes(record_type::BLIP_DIB, 0x7A8, &[0; 10]);
        assert!(matches!(
            decode(&data).unwrap_err(),
            Error::TruncatedAtom {
                expected: 17,
                available: 10,
                ..
            }
        ));
    }

    fn wmf_body(picture: &[u8], saved_size: u32, compression: u8, extra: &[u8]) -> Vec<u8> {
        let mut body = vec![0x11; 16];
        put_u32_le(&mut body, 64); // uncompressed size
        for v in [0, 0, 1000, 500, 914_400, 457_200] {
            put_i32_le(&mut body, v);
        }
        put_u32_le(&mut body, saved_size);
        body.push(compression);
        body.push(0xFE);
        body.extend_from_slice(picture);
        body.extend_from_slice(extra);
        body
    }

    #[test]
    fn test_metafile_blip_with_padding() {
        let body = wmf_body(&[1, 2, 3], 3, MetafileBlip::COMPRESSION_NONE, &[0xEE, 0xEE]);
        let data = blip_bytes(record_type::BLIP_WMF, 0x216, &body);

        let record = decode(&data).unwrap();
        let Some(BlipRecord::Metafile(wmf)) = record.as_blip() else {
            panic!("expected a metafile blip");
        };
        assert_eq!(wmf.bounds, (0, 0, 1000, 500));
        assert_eq!(wmf.size_emu, (914_400, 457_200));
        assert_eq!(wmf.picture, [1, 2, 3]);
        assert_eq!(record.trailing, [0xEE, 0xEE]);
        assert_eq!(wmf.decompressed().unwrap().as_ref(), &[1, 2, 3]);
        assert_eq!(encode(&record), data);
    }

    #[test]
    fn test_metafile_saved_size_past_end() {
        let body = wmf_body(&[1, 2], 100, MetafileBlip::COMPRESSION_NONE, &[]);
        let data = blip_bytes(record_type::BLIP_EMF, 0x3D4, &body);

        let record = decode(&data).unwrap();
        let Some(BlipRecord::Metafile(emf)) = record.as_blip() else {
            panic!("expected a metafile blip");
        };
        assert_eq!(emf.saved_size, 100);
        assert_eq!(emf.picture, [1, 2]);
        assert_eq!(encode(&record), data);
    }

    #[test]
    fn test_decompress() {
        let original = b"metafile records metafile records metafile records".to_vec();
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&original).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut blip = MetafileBlip {
            uid: [0; 16],
            secondary_uid: None,
            uncompressed_size: original.len() as u32,
            bounds: (0, 0, 0, 0),
            size_emu: (0, 0),
            saved_size: 0,
            compression: MetafileBlip::COMPRESSION_DEFLATE,
            filter: 0xFE,
            picture: Vec::new(),
        };
        blip.set_picture(compressed.clone());

        assert_eq!(blip.saved_size as usize, compressed.len());
        assert_eq!(blip.decompressed().unwrap().as_ref(), original.as_slice());

        blip.picture = vec![0x78, 0x00, 0x01];
        assert!(matches!(blip.decompressed(), Err(Error::Io(_))));
    }

    #[test]
    fn test_decompress_ignores_oversized_hint() {
        let blip = MetafileBlip {
            uid: [0; 16],
            secondary_uid: None,
            uncompressed_size: u32::MAX,
            bounds: (0, 0, 0, 0),
            size_emu: (0, 0),
            saved_size: 2,
            compression: MetafileBlip::COMPRESSION_DEFLATE,
            filter: 0xFE,
            // Empty final stored block in raw deflate
            picture: vec![0x03, 0x00],
        };

        match blip.decompressed().unwrap() {
            Cow::Owned(out) => {
                assert!(out.is_empty());
                assert!(out.capacity() < 1 << 20);
            },
            Cow::Borrowed(_) => panic!("compressed picture should be inflated"),
        }
    }

    #[test]
    fn test_blip_types() {
        assert_eq!(BlipType::from_record_type(0xF01E), Some(BlipType::Png));
        assert_eq!(BlipType::from_win32(0x02), Some(BlipType::Emf));
        assert_eq!(BlipType::Png.record_type(), record_type::BLIP_PNG);
        assert!(BlipType::Wmf.is_metafile());
        assert_eq!(BlipType::JpegCmyk.extension(), "jpg");
        assert_eq!(BlipType::from_win32(0x00), None);
    }
}
