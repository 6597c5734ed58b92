//! Officeart - lossless codec for Office Drawing records
//!
//! This library decodes the Escher (Office Drawing, DDF) compound-record
//! format used for shapes and pictures inside legacy Office documents, and
//! the closely related Windows Metafile record stream.
//!
//! # Features
//!
//! - **Lossless round trip**: an unmodified decoded tree encodes to the exact input bytes
//! - **Schema-agnostic**: unknown record types are kept, and classified as container or atom
//! - **Typed atoms**: property tables, blip store entries, blips, shapes, anchors
//! - **Owned trees**: decoded records never borrow the input buffer
//! - **WMF framing**: placeable header, META_HEADER and raw records
//!
//! # Example - Decoding and editing a record tree
//!
//! ```
//! use officeart::escher::{OptionsRecord, Property, property_id};
//! use officeart::{Record, decode, encode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut options = OptionsRecord::new();
//! options.set_property(Property::simple(property_id::FILL_COLOR, 0x0000_00FF));
//! let bytes = encode(&Record::options(options));
//!
//! let mut record = decode(&bytes)?;
//! if let Some(options) = record.as_options_mut() {
//!     options.set_property(Property::simple(property_id::LINE_COLOR, 0x0000_FF00));
//! }
//! assert_eq!(record.header().instance, 2);
//! assert_eq!(encode(&record).len(), 8 + 12);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Decoding a drawing stream
//!
//! ```
//! use officeart::{DecodeConfig, Decoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = [
//!     0x0F, 0x00, 0x02, 0xF0, 0x00, 0x00, 0x00, 0x00, // empty DgContainer
//!     0x00, 0x00, 0x11, 0xF0, 0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB, // ClientData
//! ];
//! let decoder = Decoder::new(DecodeConfig::new().with_max_depth(16));
//! let records = decoder.decode_stream(&stream)?;
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].payload(), Some(&[0xAA, 0xBB][..]));
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod escher;
pub mod wmf;

pub use common::error::{Error, Result};
pub use escher::{
    DecodeConfig, Decoder, Record, RecordBody, RecordHeader, decode, decode_prefix,
    decode_stream, encode,
};
