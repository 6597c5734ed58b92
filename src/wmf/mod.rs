//! Windows Metafile (WMF) record stream.
//!
//! Lossless framing only: headers and records are decoded so that a caller
//! can inspect or edit them and write the metafile back byte for byte.
//! Drawing the records is left to a renderer.
//!
//! # Example
//!
//! ```
//! use officeart::wmf::{MetaHeader, WmfRecord, WmfStream};
//!
//! let mut stream = WmfStream {
//!     header: MetaHeader::new(),
//!     records: vec![WmfRecord::eof()],
//!     ..Default::default()
//! };
//! stream.refresh_header();
//!
//! let bytes = stream.encode();
//! assert_eq!(WmfStream::decode(&bytes)?, stream);
//! # Ok::<(), officeart::Error>(())
//! ```

pub mod header;
pub mod record;
pub mod stream;

pub use header::{MetaHeader, PlaceableHeader};
pub use record::{WmfRecord, function};
pub use stream::WmfStream;
