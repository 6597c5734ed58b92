//! Shape properties (the Opt record family).
//!
//! Properties control shape appearance: position, size, colors, rotation,
//! and so on. The codec does not interpret values; it only needs to know
//! which numbers carry array payloads so that those can be decoded
//! structurally.

pub mod array;
pub mod codec;
pub mod ids;
pub mod opt;
pub mod property;

pub use array::{ArrayHeader, ArrayProperty, Element};
pub use codec::{decode_properties, encode_properties};
pub use ids::{is_array_property, property_id, property_name};
pub use opt::OptionsRecord;
pub use property::{
    IS_BLIP_ID, IS_COMPLEX, PROPERTY_NUMBER_MASK, Property, PropertyValue, REMOVE_PROPERTY,
};
