//! Recursive-descent decoder for Escher record trees.
//!
//! # Architecture
//!
//! - Header first: every record starts with the 8-byte [`RecordHeader`]
//! - Registry dispatch: the type tag picks container, typed atom or opaque atom
//! - Strict framing: a container's children must fill its body exactly
//! - Owned output: the returned tree does not borrow from the input

use super::atom::{AtomCodec, AtomContext};
use super::blip::{BitmapBlip, BlipRecord, MetafileBlip};
use super::config::DecodeConfig;
use super::container::{Classification, classify_ambiguous, decode_children};
use super::header::RecordHeader;
use super::record::{Record, RecordBody};
use super::registry::{self, ContainerClass, RecordKind};
use crate::common::error::{Error, Result};
use tracing::debug;

/// Escher decoder carrying its configuration.
///
/// A decoder holds no mutable state, so one instance can decode any number of
/// independent buffers, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    /// Create a decoder with the given configuration.
    #[inline]
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode exactly one record spanning all of `data`.
    ///
    /// Fails with `TrailingBytes` if anything follows the record, so that a
    /// successful decode always re-encodes to `data`.
    pub fn decode(&self, data: &[u8]) -> Result<Record> {
        let (record, consumed) = self.decode_prefix(data)?;
        if consumed != data.len() {
            return Err(Error::TrailingBytes {
                offset: consumed,
                remaining: data.len() - consumed,
            });
        }
        Ok(record)
    }

    /// Decode the record at the start of `data`.
    ///
    /// # Returns
    ///
    /// `(record, bytes_consumed)` tuple
    pub fn decode_prefix(&self, data: &[u8]) -> Result<(Record, usize)> {
        self.decode_record(data, 0, 1)
    }

    /// Decode a flat sequence of top-level records filling all of `data`.
    pub fn decode_stream(&self, data: &[u8]) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            let (record, consumed) = self.decode_record(&data[offset..], offset, 1)?;
            offset += consumed;
            records.push(record);
        }

        Ok(records)
    }

    /// Decode a standalone atom of type `T`, ignoring its type tag.
    ///
    /// Bytes the atom does not use are dropped from the value but still
    /// counted in the returned length.
    ///
    /// # Returns
    ///
    /// `(header, atom, bytes_consumed)` tuple
    pub fn decode_atom<T: AtomCodec>(&self, data: &[u8]) -> Result<(RecordHeader, T, usize)> {
        let (header, body) = self.frame(data, 0)?;
        let ctx = AtomContext::new(header, 0, 1, self);
        let (atom, _) = T::decode_body(body, &ctx)?;
        Ok((header, atom, header.record_size()))
    }

    /// Split a record into its header and declared body.
    fn frame<'d>(&self, data: &'d [u8], origin: usize) -> Result<(RecordHeader, &'d [u8])> {
        let (header, rest) = RecordHeader::decode_at(data, origin)?;
        let declared = header.length as usize;

        if declared > rest.len() {
            return Err(Error::TruncatedBody {
                offset: origin,
                record_type: header.record_type,
                declared: header.length,
                available: rest.len(),
            });
        }

        Ok((header, &rest[..declared]))
    }

    /// Decode one record at absolute offset `origin` and nesting `depth`.
    pub(crate) fn decode_record(
        &self,
        data: &[u8],
        origin: usize,
        depth: usize,
    ) -> Result<(Record, usize)> {
        if depth > self.config.max_depth {
            return Err(Error::RecursionLimitExceeded {
                offset: origin,
                limit: self.config.max_depth,
            });
        }

        let (header, body) = self.frame(data, origin)?;
        let body_origin = origin + RecordHeader::SIZE;
        let kind = registry::dispatch(header.record_type);

        let (body, trailing) = match kind.container_class() {
            ContainerClass::Always => (
                RecordBody::Container(decode_children(self, body, origin, &header, depth + 1)?),
                Vec::new(),
            ),
            ContainerClass::Ambiguous => {
                match classify_ambiguous(self, body, origin, &header, depth + 1)? {
                    Classification::Container(children) => {
                        (RecordBody::Container(children), Vec::new())
                    },
                    Classification::Atom => (RecordBody::Atom(body.to_vec()), Vec::new()),
                }
            },
            ContainerClass::Never => {
                let ctx = AtomContext::new(header, origin, depth, self);
                decode_typed_atom(kind, body, &ctx)?
            },
        };

        let record = Record {
            version: header.version,
            instance: header.instance,
            record_type: header.record_type,
            body,
            trailing,
        };

        debug_assert_eq!(body_origin + record.body_len(), origin + header.record_size());
        Ok((record, header.record_size()))
    }
}

/// Decode a registered typed atom, keeping unused bytes as trailing data.
fn decode_typed_atom(
    kind: RecordKind,
    body: &[u8],
    ctx: &AtomContext<'_>,
) -> Result<(RecordBody, Vec<u8>)> {
    let (value, used) = match kind {
        RecordKind::Options => typed(body, ctx, RecordBody::Options)?,
        RecordKind::BlipStoreEntry => typed(body, ctx, RecordBody::BlipStoreEntry)?,
        RecordKind::BitmapBlip => typed(body, ctx, |b: BitmapBlip| {
            RecordBody::Blip(BlipRecord::Bitmap(b))
        })?,
        RecordKind::MetafileBlip => typed(body, ctx, |b: MetafileBlip| {
            RecordBody::Blip(BlipRecord::Metafile(b))
        })?,
        RecordKind::Shape => typed(body, ctx, RecordBody::Shape)?,
        RecordKind::ShapeGroup => typed(body, ctx, RecordBody::ShapeGroup)?,
        RecordKind::ClientAnchor => typed(body, ctx, RecordBody::ClientAnchor)?,
        RecordKind::ChildAnchor => typed(body, ctx, RecordBody::ChildAnchor)?,
        RecordKind::Drawing => typed(body, ctx, RecordBody::Drawing)?,
        RecordKind::DrawingGroup => typed(body, ctx, RecordBody::DrawingGroup)?,
        RecordKind::SplitMenuColors => typed(body, ctx, RecordBody::SplitMenuColors)?,
        RecordKind::Container | RecordKind::OpaqueAtom | RecordKind::Unknown => {
            (RecordBody::Atom(body.to_vec()), body.len())
        },
    };

    let trailing = body[used..].to_vec();
    if !trailing.is_empty() {
        debug!(
            target: "officeart::escher",
            record_type = format_args!("{:#06X}", ctx.header().record_type),
            offset = ctx.record_offset(),
            trailing = trailing.len(),
            "preserving unused atom bytes"
        );
    }

    Ok((value, trailing))
}

#[inline]
fn typed<T: AtomCodec>(
    body: &[u8],
    ctx: &AtomContext<'_>,
    wrap: impl FnOnce(T) -> RecordBody,
) -> Result<(RecordBody, usize)> {
    let (value, used) = T::decode_body(body, ctx)?;
    debug_assert!(used <= body.len());
    Ok((wrap(value), used))
}

/// Decode exactly one record spanning all of `data` with the default configuration.
///
/// # Examples
///
/// ```
/// let data = [
///     0x0F, 0x00, 0x04, 0xF0, 0x08, 0x00, 0x00, 0x00, // SpContainer, 8 body bytes
///     0x00, 0x00, 0x22, 0xF2, 0x00, 0x00, 0x00, 0x00, // one empty child
/// ];
/// let record = officeart::decode(&data)?;
/// assert_eq!(record.children().map(|c| c.len()), Some(1));
/// assert_eq!(officeart::encode(&record), data);
/// # Ok::<(), officeart::Error>(())
/// ```
pub fn decode(data: &[u8]) -> Result<Record> {
    Decoder::default().decode(data)
}

/// Decode the record at the start of `data` with the default configuration.
pub fn decode_prefix(data: &[u8]) -> Result<(Record, usize)> {
    Decoder::default().decode_prefix(data)
}

/// Decode a sequence of top-level records with the default configuration.
pub fn decode_stream(data: &[u8]) -> Result<Vec<Record>> {
    Decoder::default().decode_stream(data)
}

/// Encode a record tree to bytes.
pub fn encode(record: &Record) -> Vec<u8> {
    record.to_bytes()
}
