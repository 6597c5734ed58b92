//! Shape property value types.
//!
//! Properties can be simple (stored in 4 bytes) or complex (variable-length
//! data stored after all property headers). Array properties are a special
//! type of complex property with structured element data.

use super::array::ArrayProperty;
use super::ids::property_name;

/// Property number (lower 14 bits of the property id).
pub const PROPERTY_NUMBER_MASK: u16 = 0x3FFF;
/// Bit 14: the value is a blip id.
pub const IS_BLIP_ID: u16 = 0x4000;
/// Bit 15: the value is the length of an out-of-line payload.
pub const IS_COMPLEX: u16 = 0x8000;

/// Simple value that removes a property when passed to `set_property`.
pub const REMOVE_PROPERTY: u32 = 0xFFFF_FFFF;

/// Escher shape property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Inline 32-bit value
    Simple(u32),
    /// Out-of-line binary data
    Complex(Vec<u8>),
    /// Out-of-line array of elements
    Array(ArrayProperty),
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Simple(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Simple(value as u32)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Simple(value as u32)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(data: Vec<u8>) -> Self {
        Self::Complex(data)
    }
}

impl From<ArrayProperty> for PropertyValue {
    fn from(array: ArrayProperty) -> Self {
        Self::Array(array)
    }
}

/// One entry of a property table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property number (14 bits)
    pub number: u16,
    /// Whether the value refers to a blip in the store
    pub is_blip_id: bool,
    pub value: PropertyValue,
}

impl Property {
    /// Create a property.
    ///
    /// # Panics
    ///
    /// Panics if `number` does not fit 14 bits.
    pub fn new(number: u16, is_blip_id: bool, value: impl Into<PropertyValue>) -> Self {
        assert!(
            number <= PROPERTY_NUMBER_MASK,
            "property number {:#X} does not fit 14 bits",
            number
        );
        Self {
            number,
            is_blip_id,
            value: value.into(),
        }
    }

    /// Create a simple property.
    pub fn simple(number: u16, value: u32) -> Self {
        Self::new(number, false, PropertyValue::Simple(value))
    }

    /// Create a simple property holding a blip index.
    pub fn blip(number: u16, blip_index: u32) -> Self {
        Self::new(number, true, PropertyValue::Simple(blip_index))
    }

    /// Create a complex property.
    pub fn complex(number: u16, data: Vec<u8>) -> Self {
        Self::new(number, false, PropertyValue::Complex(data))
    }

    /// Create an array property.
    pub fn array(number: u16, array: ArrayProperty) -> Self {
        Self::new(number, false, PropertyValue::Array(array))
    }

    /// Decode a property id into `(number, is_blip_id, is_complex)`.
    #[inline]
    pub const fn split_id(id: u16) -> (u16, bool, bool) {
        (
            id & PROPERTY_NUMBER_MASK,
            id & IS_BLIP_ID != 0,
            id & IS_COMPLEX != 0,
        )
    }

    /// The 16-bit id written to the property header.
    #[inline]
    pub fn id(&self) -> u16 {
        let mut id = self.number & PROPERTY_NUMBER_MASK;
        if self.is_blip_id {
            id |= IS_BLIP_ID;
        }
        if self.is_complex() {
            id |= IS_COMPLEX;
        }
        id
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        !matches!(self.value, PropertyValue::Simple(_))
    }

    /// Size of the out-of-line payload (0 for simple properties).
    pub fn payload_len(&self) -> usize {
        match &self.value {
            PropertyValue::Simple(_) => 0,
            PropertyValue::Complex(data) => data.len(),
            PropertyValue::Array(array) => array.payload_len(),
        }
    }

    /// Metadata name of the property, if known.
    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        property_name(self.number)
    }

    /// The inline value, if this is a simple property.
    #[inline]
    pub fn as_u32(&self) -> Option<u32> {
        match self.value {
            PropertyValue::Simple(v) => Some(v),
            _ => None,
        }
    }

    /// The inline value read as a signed integer.
    #[inline]
    pub fn as_i32(&self) -> Option<i32> {
        self.as_u32().map(|v| v as i32)
    }

    /// Interprets non-zero values as true, zero as false.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_u32().map(|v| v != 0)
    }

    /// The inline value read as a color.
    ///
    /// Colors are stored with red in the low byte; the high byte carries
    /// scheme/system flags and is not part of the result.
    #[inline]
    pub fn as_rgb(&self) -> Option<(u8, u8, u8)> {
        self.as_u32()
            .map(|v| (v as u8, (v >> 8) as u8, (v >> 16) as u8))
    }

    /// Out-of-line bytes of a complex property.
    #[inline]
    pub fn as_complex(&self) -> Option<&[u8]> {
        match &self.value {
            PropertyValue::Complex(data) => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&ArrayProperty> {
        match &self.value {
            PropertyValue::Array(array) => Some(array),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut ArrayProperty> {
        match &mut self.value {
            PropertyValue::Array(array) => Some(array),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_flags() {
        assert_eq!(Property::simple(0x181, 0).id(), 0x0181);
        assert_eq!(Property::blip(0x104, 1).id(), 0x4104);
        assert_eq!(Property::complex(0x380, vec![0; 4]).id(), 0x8380);
        assert_eq!(Property::split_id(0xC186), (0x186, true, true));
    }

    #[test]
    fn test_semantic_views() {
        let color = Property::simple(0x181, 0x0810_2030);
        assert_eq!(color.as_rgb(), Some((0x30, 0x20, 0x10)));
        assert_eq!(color.name(), Some("fill.fillcolor"));

        let offset = Property::new(0x205, false, -12700i32);
        assert_eq!(offset.as_i32(), Some(-12700));
        assert_eq!(Property::new(0x1BB, false, true).as_bool(), Some(true));

        let blob = Property::complex(0x380, vec![b'A', 0]);
        assert_eq!(blob.as_u32(), None);
        assert_eq!(blob.as_complex(), Some(&[b'A', 0][..]));
        assert_eq!(blob.payload_len(), 2);
    }

    #[test]
    #[should_panic(expected = "does not fit 14 bits")]
    fn test_oversized_number_panics() {
        Property::simple(0x4000, 0);
    }
}
