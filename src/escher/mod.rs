//! Escher (Office Drawing / DDF) record codec.
//!
//! Escher records form a tree. Every record starts with an 8-byte header;
//! containers hold child records and atoms hold data. The codec decodes
//! any byte stream of records into an owned [`Record`] tree, lets callers
//! edit it, and encodes it back. An unmodified tree always encodes to the
//! bytes it was decoded from.
//!
//! # Architecture
//!
//! - [`header`]: the 8-byte record header
//! - [`registry`]: static type tag to record kind dispatch
//! - [`parser`]: recursive-descent decoder and the encode entry points
//! - [`container`]: child framing and the container heuristic for unknown tags
//! - [`properties`]: the Opt property table and its array payloads
//! - [`bse`], [`blip`], [`shape`], [`anchor`], [`drawing`]: typed atoms
//!
//! # Example
//!
//! ```
//! use officeart::escher::{Record, ShapeFlags, ShapeRecord, record_type};
//!
//! let mut sp = Record::container(record_type::SP_CONTAINER, 0);
//! sp.push_child(Record::shape(1, ShapeRecord::new(0x401, ShapeFlags::HAVE_SPT)))
//!     .unwrap();
//!
//! let bytes = officeart::encode(&sp);
//! let decoded = officeart::decode(&bytes)?;
//! let shape = decoded.child(record_type::SP).and_then(Record::as_shape);
//! assert_eq!(shape.map(|s| s.shape_id), Some(0x401));
//! # Ok::<(), officeart::Error>(())
//! ```

pub mod anchor;
pub mod atom;
pub mod blip;
pub mod bse;
pub mod config;
pub mod container;
pub mod drawing;
pub mod header;
pub mod parser;
pub mod properties;
pub mod record;
pub mod registry;
pub mod shape;
pub mod types;

pub use anchor::{ChildAnchorRecord, ClientAnchorRecord};
pub use atom::{AtomCodec, AtomContext};
pub use blip::{BitmapBlip, BlipRecord, BlipType, MetafileBlip};
pub use bse::{BlipStore, BlipStoreEntry};
pub use config::DecodeConfig;
pub use drawing::{DrawingGroupRecord, DrawingRecord, IdCluster, SplitMenuColorsRecord};
pub use header::RecordHeader;
pub use parser::{Decoder, decode, decode_prefix, decode_stream, encode};
pub use properties::{ArrayProperty, OptionsRecord, Property, PropertyValue, property_id};
pub use record::{Record, RecordBody};
pub use registry::{ContainerClass, RecordKind, dispatch, record_name};
pub use shape::{ShapeFlags, ShapeGroupRecord, ShapeRecord};
pub use types::record_type;
