//! Container records: child decoding, ambiguous-tag classification and
//! tree traversal.
//!
//! A container body is nothing but child records laid end to end. Children
//! must fill the body exactly; a child that runs past the end, or a tail too
//! short to hold a header, makes the container malformed.

use super::header::RecordHeader;
use super::parser::Decoder;
use super::record::{Record, RecordBody};
use super::types::is_escher_type;
use crate::common::error::{Error, Result};
use tracing::debug;

/// Decode the children of a container body.
///
/// `origin` is the absolute offset of the container's own header and `depth`
/// the nesting level of the children.
pub(crate) fn decode_children(
    decoder: &Decoder,
    body: &[u8],
    origin: usize,
    header: &RecordHeader,
    depth: usize,
) -> Result<Vec<Record>> {
    let body_origin = origin + RecordHeader::SIZE;
    let mut children = Vec::new();
    let mut pos = 0;

    while pos < body.len() {
        let rest = &body[pos..];
        let malformed = |consumed: usize| Error::MalformedContainer {
            offset: origin,
            record_type: header.record_type,
            declared: header.length,
            consumed,
        };

        let (child_header, _) =
            RecordHeader::decode_at(rest, body_origin + pos).map_err(|_| malformed(pos))?;
        let child_size = child_header.record_size();
        if child_size > rest.len() {
            return Err(malformed(pos + child_size));
        }

        let (child, consumed) =
            decoder.decode_record(&rest[..child_size], body_origin + pos, depth)?;
        pos += consumed;
        children.push(child);
    }

    Ok(children)
}

/// Outcome of classifying a record whose tag does not settle atom vs container.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The body decoded cleanly as child records
    Container(Vec<Record>),
    /// The body is opaque atom data
    Atom,
}

/// Decide whether an unrecognised record is a container.
///
/// - An empty body is an empty container.
/// - Otherwise the body must open with a plausible Escher header (type tag at
///   0xF000 or above, length within the body) and then decode, in full, as a
///   sequence of child records that consumes every byte.
/// - Anything else is atom data.
///
/// Only `RecursionLimitExceeded` escapes; every other failure of the trial
/// decode just means "atom".
pub fn classify_ambiguous(
    decoder: &Decoder,
    body: &[u8],
    origin: usize,
    header: &RecordHeader,
    depth: usize,
) -> Result<Classification> {
    if body.is_empty() {
        return Ok(Classification::Container(Vec::new()));
    }

    if !opens_with_child_header(body) {
        return Ok(Classification::Atom);
    }

    match decode_children(decoder, body, origin, header, depth) {
        Ok(children) => {
            debug!(
                target: "officeart::escher",
                record_type = format_args!("{:#06X}", header.record_type),
                offset = origin,
                children = children.len(),
                "unregistered record classified as container"
            );
            Ok(Classification::Container(children))
        },
        Err(err @ Error::RecursionLimitExceeded { .. }) => Err(err),
        Err(err) => {
            debug!(
                target: "officeart::escher",
                record_type = format_args!("{:#06X}", header.record_type),
                offset = origin,
                reason = %err,
                "unregistered record kept as atom"
            );
            Ok(Classification::Atom)
        },
    }
}

fn opens_with_child_header(body: &[u8]) -> bool {
    match RecordHeader::decode(body) {
        Ok((header, rest)) => {
            is_escher_type(header.record_type) && header.length as usize <= rest.len()
        },
        Err(_) => false,
    }
}

impl Record {
    /// Check if this record holds child records.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self.body, RecordBody::Container(_))
    }

    /// Child records, if this is a container.
    #[inline]
    pub fn children(&self) -> Option<&[Record]> {
        match &self.body {
            RecordBody::Container(children) => Some(children),
            _ => None,
        }
    }

    /// Mutable child list, if this is a container.
    #[inline]
    pub fn children_mut(&mut self) -> Option<&mut Vec<Record>> {
        match &mut self.body {
            RecordBody::Container(children) => Some(children),
            _ => None,
        }
    }

    /// Find the first direct child of a specific type.
    pub fn child(&self, record_type: u16) -> Option<&Record> {
        self.children()?
            .iter()
            .find(|c| c.record_type == record_type)
    }

    /// Find the first direct child of a specific type, mutably.
    pub fn child_mut(&mut self, record_type: u16) -> Option<&mut Record> {
        self.children_mut()?
            .iter_mut()
            .find(|c| c.record_type == record_type)
    }

    /// Find all direct children of a specific type.
    pub fn find_children(&self, record_type: u16) -> Vec<&Record> {
        self.children()
            .unwrap_or_default()
            .iter()
            .filter(|c| c.record_type == record_type)
            .collect()
    }

    /// Recursively find all descendants of a specific type (depth-first,
    /// document order).
    pub fn find_all(&self, record_type: u16) -> Vec<&Record> {
        let mut results = Vec::new();
        self.find_all_impl(record_type, &mut results);
        results
    }

    fn find_all_impl<'a>(&'a self, record_type: u16, results: &mut Vec<&'a Record>) {
        for child in self.children().unwrap_or_default() {
            if child.record_type == record_type {
                results.push(child);
            }
            child.find_all_impl(record_type, results);
        }
    }

    /// Append a child record.
    ///
    /// Hands the child back if this record is not a container.
    pub fn push_child(&mut self, child: Record) -> std::result::Result<(), Record> {
        match self.children_mut() {
            Some(children) => {
                children.push(child);
                Ok(())
            },
            None => Err(child),
        }
    }

    /// Insert a child record at `index`.
    ///
    /// Hands the child back if this record is not a container or the index
    /// is past the end.
    pub fn insert_child(&mut self, index: usize, child: Record) -> std::result::Result<(), Record> {
        match self.children_mut() {
            Some(children) if index <= children.len() => {
                children.insert(index, child);
                Ok(())
            },
            _ => Err(child),
        }
    }

    /// Detach and return the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<Record> {
        let children = self.children_mut()?;
        (index < children.len()).then(|| children.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escher::parser::decode;
    use crate::escher::types::record_type;

    fn classify(body: &[u8]) -> Classification {
        let header = RecordHeader::new(0, 0, 0xF111, body.len() as u32);
        classify_ambiguous(&Decoder::default(), body, 0, &header, 2).unwrap()
    }

    #[test]
    fn test_empty_unknown_body_is_empty_container() {
        let data = [0x0F, 0x02, 0x11, 0xF1, 0x00, 0x00, 0x00, 0x00];
        let record = decode(&data).unwrap();

        assert!(record.is_container());
        assert_eq!(record.children().unwrap().len(), 0);
        assert_eq!(record.instance, 0x020);
        assert_eq!(record.to_bytes(), data);
    }

    #[test]
    fn test_zero_body_unknown_is_atom() {
        let data = [
            0x00, 0x02, 0x11, 0xF1, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let record = decode(&data).unwrap();

        assert!(!record.is_container());
        assert_eq!(record.payload(), Some(&[0u8; 4][..]));
        assert_eq!(record.to_bytes(), data);
    }

    #[test]
    fn test_unknown_wrapping_one_child_is_container() {
        let data = [
            0x0F, 0x02, 0x11, 0xF1, 0x08, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x22, 0xF2, 0x00, 0x00, 0x00, 0x00,
        ];
        let record = decode(&data).unwrap();

        let children = record.children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].record_type, 0xF222);
        assert_eq!(record.to_bytes(), data);
    }

    #[test]
    fn test_classification_rules() {
        assert_eq!(classify(&[]), Classification::Container(Vec::new()));
        assert_eq!(classify(&[0, 0, 0, 0]), Classification::Atom);
        // Header-like prefix whose tag is outside the Escher range
        assert_eq!(
            classify(&[0, 0, 0xA0, 0x0F, 0, 0, 0, 0]),
            Classification::Atom
        );
        // Valid child followed by a stray byte
        assert_eq!(
            classify(&[0, 0, 0x22, 0xF2, 0, 0, 0, 0, 0x01]),
            Classification::Atom
        );
        // Valid child whose typed decode fails (Sp needs 8 bytes)
        assert_eq!(
            classify(&[0x02, 0, 0x0A, 0xF0, 0x02, 0, 0, 0, 0x01, 0x02]),
            Classification::Atom
        );
        match classify(&[0, 0, 0x22, 0xF2, 0, 0, 0, 0, 0, 0, 0x33, 0xF3, 0, 0, 0, 0]) {
            Classification::Container(children) => assert_eq!(children.len(), 2),
            other => panic!("expected container, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_container() {
        // SpContainer declares 10 bytes but holds an 8-byte child plus 2 stray bytes
        let data = [
            0x0F, 0x00, 0x04, 0xF0, 0x0A, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x11, 0xF0, 0x00, 0x00, 0x00, 0x00, //
            0x01, 0x02,
        ];
        assert!(matches!(
            decode(&data).unwrap_err(),
            Error::MalformedContainer {
                offset: 0,
                record_type: record_type::SP_CONTAINER,
                declared: 10,
                ..
            }
        ));

        // Child declares more than the container holds
        let data = [
            0x0F, 0x00, 0x04, 0xF0, 0x0A, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x11, 0xF0, 0x04, 0x00, 0x00, 0x00, //
            0x01, 0x02,
        ];
        assert!(matches!(
            decode(&data).unwrap_err(),
            Error::MalformedContainer {
                consumed: 12,
                ..
            }
        ));
    }

    #[test]
    fn test_tree_helpers() {
        let mut root = Record::container(record_type::DG_CONTAINER, 0);
        let mut group = Record::container(record_type::SPGR_CONTAINER, 0);
        group
            .push_child(Record::container(record_type::SP_CONTAINER, 0))
            .unwrap();
        root.push_child(group).unwrap();
        root.push_child(Record::container(record_type::SP_CONTAINER, 0))
            .unwrap();

        assert_eq!(root.find_all(record_type::SP_CONTAINER).len(), 2);
        assert_eq!(root.find_children(record_type::SP_CONTAINER).len(), 1);
        assert!(root.child(record_type::SPGR_CONTAINER).is_some());

        let mut atom = Record::atom(record_type::CLIENT_DATA, 0, vec![1]);
        assert!(atom.push_child(Record::atom(0xF222, 0, Vec::new())).is_err());
        assert!(atom.remove_child(0).is_none());

        let removed = root.remove_child(0).unwrap();
        assert_eq!(removed.record_type, record_type::SPGR_CONTAINER);
        assert_eq!(root.children().unwrap().len(), 1);
        assert!(root.insert_child(5, removed.clone()).is_err());
        root.insert_child(0, removed).unwrap();
        assert_eq!(root.children().unwrap()[0].record_type, record_type::SPGR_CONTAINER);
    }
}
