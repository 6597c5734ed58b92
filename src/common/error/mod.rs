//! Unified error type for the codec.
//!
//! Decode errors are structural and abort the whole decode; there is no
//! lenient mode.

pub mod types;

pub use types::{Error, Result};
