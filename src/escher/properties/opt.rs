//! The property table record (Opt, SecondaryOpt, TertiaryOpt).
//!
//! Properties are kept in a `Vec` in encode order. `set_property` keeps the
//! table sorted by number; `add_property` appends as is, which is how tables
//! with repeated or unsorted entries are reproduced exactly.

use super::codec::{decode_properties, encode_properties, encoded_properties_len};
use super::property::{Property, PropertyValue, REMOVE_PROPERTY};
use crate::common::error::Result;
use crate::escher::atom::{AtomCodec, AtomContext};

/// Ordered property table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionsRecord {
    properties: Vec<Property>,
}

impl OptionsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from properties, taken in the given order.
    pub fn from_properties(properties: Vec<Property>) -> Self {
        Self { properties }
    }

    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Number of properties; this is the record's instance on the wire.
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// First property with the given number.
    pub fn find_property(&self, number: u16) -> Option<&Property> {
        self.properties.iter().find(|p| p.number == number)
    }

    pub fn find_property_mut(&mut self, number: u16) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.number == number)
    }

    /// Replace every property with the same number, then re-sort by number.
    ///
    /// A simple value of `0xFFFF_FFFF` (-1) removes the property instead.
    pub fn set_property(&mut self, property: Property) {
        if property.value == PropertyValue::Simple(REMOVE_PROPERTY) {
            self.remove_property(property.number);
            return;
        }

        self.properties.retain(|p| p.number != property.number);
        self.properties.push(property);
        self.sort_properties();
    }

    /// [`set_property`](Self::set_property) from loose parts.
    pub fn set(&mut self, number: u16, value: impl Into<PropertyValue>, is_blip_id: bool) {
        self.set_property(Property::new(number, is_blip_id, value));
    }

    /// Append a property without reordering or deduplicating.
    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Remove every property with the given number; returns the first one.
    pub fn remove_property(&mut self, number: u16) -> Option<Property> {
        let index = self.properties.iter().position(|p| p.number == number)?;
        let removed = self.properties.remove(index);
        self.properties.retain(|p| p.number != number);
        Some(removed)
    }

    /// Stable sort by property number.
    pub fn sort_properties(&mut self) {
        self.properties.sort_by_key(|p| p.number);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }
}

impl AtomCodec for OptionsRecord {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let count = ctx.header().instance as usize;
        let (properties, used) = decode_properties(body, count, ctx.body_offset())?;
        Ok((Self { properties }, used))
    }

    fn body_len(&self) -> usize {
        encoded_properties_len(&self.properties)
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        encode_properties(&self.properties, out);
    }
}
