// WMF record stream
//
// Decodes the framing of a whole metafile: optional placeable header, the
// META_HEADER, then records up to and including EOF. Records are not played
// back; parameters stay raw bytes.

use super::header::{MetaHeader, PlaceableHeader};
use super::record::WmfRecord;
use crate::common::binary::wire_len;
use crate::common::error::{Error, Result};
use tracing::debug;

/// A decoded metafile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WmfStream {
    /// Optional placeable header
    pub placeable: Option<PlaceableHeader>,
    /// Standard WMF header
    pub header: MetaHeader,
    /// All records, EOF included when present
    pub records: Vec<WmfRecord>,
    /// Bytes after the EOF record
    pub trailing: Vec<u8>,
}

impl WmfStream {
    /// Decode a complete metafile.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut offset = 0;

        // Check for placeable header
        let placeable = if PlaceableHeader::is_placeable(data) {
            let header = PlaceableHeader::decode(data)?;
            if !header.is_checksum_valid() {
                debug!(
                    target: "officeart::wmf",
                    stored = header.checksum,
                    computed = header.compute_checksum(),
                    "placeable header checksum mismatch"
                );
            }
            offset = PlaceableHeader::SIZE;
            Some(header)
        } else {
            None
        };

        let header = MetaHeader::decode(&data[offset..]).map_err(|_| Error::TruncatedWmfHeader {
            expected: offset + MetaHeader::SIZE,
            available: data.len(),
        })?;
        offset += MetaHeader::SIZE;

        let mut records = Vec::new();
        while data.len() - offset >= WmfRecord::HEADER_SIZE {
            let (record, consumed) = WmfRecord::decode(data, offset)?;
            let is_eof = record.is_eof();
            records.push(record);
            offset += consumed;

            if is_eof {
                break;
            }
        }

        let trailing = data[offset..].to_vec();
        if !trailing.is_empty() {
            debug!(
                target: "officeart::wmf",
                offset,
                trailing = trailing.len(),
                "preserving bytes after the last record"
            );
        }

        Ok(Self {
            placeable,
            header,
            records,
            trailing,
        })
    }

    /// Encode back to bytes. Header fields are written as stored.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        if let Some(placeable) = &self.placeable {
            placeable.encode_into(&mut out);
        }
        self.header.encode_into(&mut out);
        for record in &self.records {
            record.encode_into(&mut out);
        }
        out.extend_from_slice(&self.trailing);
        out
    }

    pub fn encoded_len(&self) -> usize {
        self.placeable.map_or(0, |_| PlaceableHeader::SIZE)
            + MetaHeader::SIZE
            + self.records.iter().map(WmfRecord::encoded_len).sum::<usize>()
            + self.trailing.len()
    }

    /// Recompute the size fields and the placeable checksum after editing.
    ///
    /// The file size counts the META_HEADER and records, not the placeable
    /// header or trailing bytes.
    pub fn refresh_header(&mut self) {
        let record_bytes: usize = self.records.iter().map(WmfRecord::encoded_len).sum();
        self.header.size_words = wire_len((MetaHeader::SIZE + record_bytes) / 2);
        self.header.max_record = self
            .records
            .iter()
            .map(WmfRecord::size_words)
            .max()
            .unwrap_or(0);
        if let Some(placeable) = &mut self.placeable {
            placeable.checksum = placeable.compute_checksum();
        }
    }

    /// Records before EOF.
    pub fn drawing_records(&self) -> impl Iterator<Item = &WmfRecord> {
        self.records.iter().take_while(|r| !r.is_eof())
    }

    pub fn has_eof(&self) -> bool {
        self.records.last().is_some_and(WmfRecord::is_eof)
    }

    /// Width from the placeable bounds.
    pub fn width(&self) -> Option<i32> {
        self.placeable.map(|p| p.width())
    }

    /// Height from the placeable bounds.
    pub fn height(&self) -> Option<i32> {
        self.placeable.map(|p| p.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wmf::record::function;
    use proptest::prelude::*;

    fn sample() -> WmfStream {
        let mut stream = WmfStream {
            placeable: Some(PlaceableHeader::new(0, 0, 1000, 800, 1440)),
            header: MetaHeader::new(),
            records: vec![
                WmfRecord::new(function::SET_BK_MODE, vec![0x01, 0x00]),
                WmfRecord::new(function::RECTANGLE, vec![0x20, 0x03, 0xE8, 0x03, 0, 0, 0, 0]),
                WmfRecord::eof(),
            ],
            trailing: Vec::new(),
        };
        stream.refresh_header();
        stream
    }

    #[test]
    fn test_round_trip() {
        let stream = sample();
        assert_eq!(stream.header.size_words, 9 + 4 + 7 + 3);
        assert_eq!(stream.header.max_record, 7);

        let bytes = stream.encode();
        assert_eq!(bytes.len(), stream.encoded_len());
        assert_eq!(bytes.len(), 22 + 18 + 8 + 14 + 6);

        let decoded = WmfStream::decode(&bytes).unwrap();
        assert_eq!(decoded, stream);
        assert!(decoded.has_eof());
        assert_eq!(decoded.drawing_records().count(), 2);
        assert_eq!(decoded.width(), Some(1000));
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn test_without_placeable() {
        let mut stream = sample();
        stream.placeable = None;
        let bytes = stream.encode();
        assert_eq!(&bytes[..2], &[0x01, 0x00]);

        let decoded = WmfStream::decode(&bytes).unwrap();
        assert!(decoded.placeable.is_none());
        assert_eq!(decoded.height(), None);
        assert_eq!(decoded.records.len(), 3);
    }

    #[test]
    fn test_bytes_after_eof_kept() {
        let mut bytes = sample().encode();
        bytes.extend_from_slice(&[0x00, 0x00, 0xAB]);

        let decoded = WmfStream::decode(&bytes).unwrap();
        assert_eq!(decoded.trailing, [0x00, 0x00, 0xAB]);
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn test_missing_eof() {
        let mut stream = sample();
        stream.records.pop();
        let bytes = stream.encode();

        let decoded = WmfStream::decode(&bytes).unwrap();
        assert!(!decoded.has_eof());
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn test_record_past_end() {
        let mut bytes = sample().encode();
        let first_record = 22 + 18;
        bytes[first_record] = 0x40;

        assert!(matches!(
            WmfStream::decode(&bytes),
            Err(Error::InvalidWmfRecordSize {
                offset: 40,
                size_words: 0x40
            })
        ));
    }

    #[test]
    fn test_truncated_header() {
        let mut bytes = Vec::new();
        PlaceableHeader::new(0, 0, 10, 10, 96).encode_into(&mut bytes);
        bytes.extend_from_slice(&[0x01, 0x00, 0x09, 0x00]);

        assert!(matches!(
            WmfStream::decode(&bytes),
            Err(Error::TruncatedWmfHeader {
                expected: 40,
                available: 26
            })
        ));
    }

    proptest! {
        #[test]
        fn prop_stream_round_trip(
            records in prop::collection::vec(
                (1u16..0x0FFF, prop::collection::vec(any::<u8>(), 0..16)),
                0..12,
            ),
            placeable in any::<bool>(),
        ) {
            let mut stream = WmfStream {
                placeable: placeable.then(|| PlaceableHeader::new(0, 0, 100, 100, 1440)),
                ..Default::default()
            };
            for (function, mut params) in records {
                if params.len() % 2 == 1 {
                    params.pop();
                }
                stream.records.push(WmfRecord::new(function, params));
            }
            stream.records.push(WmfRecord::eof());
            stream.refresh_header();

            let bytes = stream.encode();
            let decoded = WmfStream::decode(&bytes).unwrap();
            prop_assert_eq!(&decoded, &stream);
            prop_assert_eq!(decoded.encode(), bytes);
        }
    }
}
