//! Plumbing shared by the Escher and WMF codecs.

pub mod binary;
pub mod error;

pub use error::{Error, Result};
