//! Error types for the OfficeArt codec.
//!
//! Every decode failure carries the absolute byte offset of the record (or
//! property) that could not be decoded, so callers can report where a drawing
//! stream went wrong. Decoding never returns a partially built tree.
use thiserror::Error;

/// Main error type for decode operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from writing to a sink or inflating a compressed picture
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer than 8 bytes were left where a record header was expected
    #[error("truncated record header at offset {offset}: only {available} bytes available")]
    TruncatedHeader { offset: usize, available: usize },

    /// The header declares a body longer than the remaining input
    #[error(
        "record 0x{record_type:04X} at offset {offset} declares {declared} body bytes but only {available} remain"
    )]
    TruncatedBody {
        offset: usize,
        record_type: u16,
        declared: u32,
        available: usize,
    },

    /// Container children do not add up to the container's declared length
    #[error(
        "container 0x{record_type:04X} at offset {offset}: children overrun the declared length {declared} (stopped at {consumed})"
    )]
    MalformedContainer {
        offset: usize,
        record_type: u16,
        declared: u32,
        consumed: usize,
    },

    /// A property header could not be read
    #[error("property {index} of {declared_count} at offset {offset} is truncated")]
    TruncatedProperty {
        offset: usize,
        index: usize,
        declared_count: usize,
    },

    /// A complex property payload extends past the end of its record
    #[error(
        "complex payload of property 0x{number:04X} at offset {offset} needs {declared} bytes but only {available} remain"
    )]
    TruncatedComplexPayload {
        offset: usize,
        number: u16,
        declared: usize,
        available: usize,
    },

    /// Record nesting is deeper than the configured limit
    #[error("record nesting at offset {offset} exceeds the limit of {limit}")]
    RecursionLimitExceeded { offset: usize, limit: usize },

    /// A fixed-layout atom is shorter than its layout
    #[error(
        "atom 0x{record_type:04X} at offset {offset} needs {expected} bytes but its body has {available}"
    )]
    TruncatedAtom {
        offset: usize,
        record_type: u16,
        expected: usize,
        available: usize,
    },

    /// Bytes follow the single record handed to a strict decode
    #[error("{remaining} unexpected bytes after the record ending at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    /// The metafile is too short for its headers
    #[error("truncated WMF header: need {expected} bytes, got {available}")]
    TruncatedWmfHeader { expected: usize, available: usize },

    /// A metafile record has an impossible size field
    #[error("invalid WMF record size of {size_words} words at offset {offset}")]
    InvalidWmfRecordSize { offset: usize, size_words: u32 },
}

impl Error {
    /// Absolute byte offset associated with the error, when there is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Io(_) | Error::TruncatedWmfHeader { .. } => None,
            Error::TruncatedHeader { offset, .. }
            | Error::TruncatedBody { offset, .. }
            | Error::MalformedContainer { offset, .. }
            | Error::TruncatedProperty { offset, .. }
            | Error::TruncatedComplexPayload { offset, .. }
            | Error::RecursionLimitExceeded { offset, .. }
            | Error::TruncatedAtom { offset, .. }
            | Error::TrailingBytes { offset, .. }
            | Error::InvalidWmfRecordSize { offset, .. } => Some(*offset),
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_reported() {
        let err = Error::TruncatedHeader {
            offset: 40,
            available: 3,
        };
        assert_eq!(err.offset(), Some(40));
        assert!(err.to_string().contains("offset 40"));

        let err = Error::TruncatedWmfHeader {
            expected: 18,
            available: 2,
        };
        assert_eq!(err.offset(), None);
    }
}
