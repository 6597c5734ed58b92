//! Static record-type registry.
//!
//! Maps a type tag to the kind of record the decoder builds for it. The table
//! is a compile-time perfect hash map, so lookups need no initialisation and
//! can run from any number of threads at once. Unregistered tags are a normal
//! outcome and map to [`RecordKind::Unknown`].

use super::types::is_blip_type;
use phf::phf_map;

/// The kind of record a type tag decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Always a container of child records
    Container,
    /// Property table (Opt and its secondary/tertiary variants)
    Options,
    /// BLIP store entry
    BlipStoreEntry,
    /// JPEG/PNG/DIB/TIFF blip
    BitmapBlip,
    /// EMF/WMF/PICT blip
    MetafileBlip,
    /// Shape atom (Sp)
    Shape,
    /// Shape group coordinates (Spgr)
    ShapeGroup,
    /// Client anchor
    ClientAnchor,
    /// Child anchor
    ChildAnchor,
    /// Drawing atom (Dg)
    Drawing,
    /// Drawing group atom (Dgg)
    DrawingGroup,
    /// Split menu colors
    SplitMenuColors,
    /// Known atom whose body is kept as raw bytes
    OpaqueAtom,
    /// Not registered; classified by inspecting the body
    Unknown,
}

/// How the decoder decides whether a record holds children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerClass {
    Always,
    Never,
    Ambiguous,
}

impl RecordKind {
    pub const fn container_class(self) -> ContainerClass {
        match self {
            Self::Container => ContainerClass::Always,
            Self::Unknown => ContainerClass::Ambiguous,
            _ => ContainerClass::Never,
        }
    }
}

/// Perfect hash map of record type tags to record kinds.
static RECORD_KINDS: phf::Map<u16, RecordKind> = phf_map! {
    0xF000u16 => RecordKind::Container,
    0xF001u16 => RecordKind::Container,
    0xF002u16 => RecordKind::Container,
    0xF003u16 => RecordKind::Container,
    0xF004u16 => RecordKind::Container,
    0xF005u16 => RecordKind::Container,
    0xF006u16 => RecordKind::DrawingGroup,
    0xF007u16 => RecordKind::BlipStoreEntry,
    0xF008u16 => RecordKind::Drawing,
    0xF009u16 => RecordKind::ShapeGroup,
    0xF00Au16 => RecordKind::Shape,
    0xF00Bu16 => RecordKind::Options,
    0xF00Du16 => RecordKind::OpaqueAtom,
    0xF00Fu16 => RecordKind::ChildAnchor,
    0xF010u16 => RecordKind::ClientAnchor,
    0xF011u16 => RecordKind::OpaqueAtom,
    0xF01Au16 => RecordKind::MetafileBlip,
    0xF01Bu16 => RecordKind::MetafileBlip,
    0xF01Cu16 => RecordKind::MetafileBlip,
    0xF01Du16 => RecordKind::BitmapBlip,
    0xF01Eu16 => RecordKind::BitmapBlip,
    0xF01Fu16 => RecordKind::BitmapBlip,
    0xF029u16 => RecordKind::BitmapBlip,
    0xF02Au16 => RecordKind::BitmapBlip,
    0xF11Eu16 => RecordKind::SplitMenuColors,
    0xF121u16 => RecordKind::Options,
    0xF122u16 => RecordKind::Options,
};

/// Record names used in diagnostics.
static RECORD_NAMES: phf::Map<u16, &'static str> = phf_map! {
    0xF000u16 => "DggContainer",
    0xF001u16 => "BStoreContainer",
    0xF002u16 => "DgContainer",
    0xF003u16 => "SpgrContainer",
    0xF004u16 => "SpContainer",
    0xF005u16 => "SolverContainer",
    0xF006u16 => "Dgg",
    0xF007u16 => "BSE",
    0xF008u16 => "Dg",
    0xF009u16 => "Spgr",
    0xF00Au16 => "Sp",
    0xF00Bu16 => "Opt",
    0xF00Du16 => "ClientTextbox",
    0xF00Fu16 => "ChildAnchor",
    0xF010u16 => "ClientAnchor",
    0xF011u16 => "ClientData",
    0xF012u16 => "ConnectorRule",
    0xF014u16 => "ArcRule",
    0xF017u16 => "CalloutRule",
    0xF01Au16 => "BlipEmf",
    0xF01Bu16 => "BlipWmf",
    0xF01Cu16 => "BlipPict",
    0xF01Du16 => "BlipJpeg",
    0xF01Eu16 => "BlipPng",
    0xF01Fu16 => "BlipDib",
    0xF029u16 => "BlipTiff",
    0xF02Au16 => "BlipJpegCmyk",
    0xF11Au16 => "ColorMRU",
    0xF11Eu16 => "SplitMenuColors",
    0xF121u16 => "SecondaryOpt",
    0xF122u16 => "TertiaryOpt",
};

/// Look up the record kind for a type tag.
///
/// Blip tags without a dedicated decoder are kept as opaque atoms; everything
/// else that is not registered is [`RecordKind::Unknown`].
pub fn dispatch(tag: u16) -> RecordKind {
    match RECORD_KINDS.get(&tag) {
        Some(kind) => *kind,
        None if is_blip_type(tag) => RecordKind::OpaqueAtom,
        None => RecordKind::Unknown,
    }
}

/// Human-readable name of a record type, if known.
pub fn record_name(tag: u16) -> Option<&'static str> {
    RECORD_NAMES.get(&tag).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escher::types::record_type;

    #[test]
    fn test_containers_are_registered() {
        for tag in 0xF000u16..=0xF005 {
            assert_eq!(dispatch(tag), RecordKind::Container);
            assert_eq!(dispatch(tag).container_class(), ContainerClass::Always);
        }
    }

    #[test]
    fn test_atoms_are_never_containers() {
        for tag in [
            record_type::OPT,
            record_type::SP,
            record_type::CLIENT_ANCHOR,
            record_type::CHILD_ANCHOR,
            record_type::CLIENT_DATA,
            record_type::CLIENT_TEXTBOX,
            record_type::BSE,
            record_type::BLIP_PNG,
            record_type::SPLIT_MENU_COLORS,
            record_type::DG,
            record_type::DGG,
        ] {
            assert_eq!(dispatch(tag).container_class(), ContainerClass::Never);
        }
    }

    #[test]
    fn test_unknown_tags_are_ambiguous() {
        assert_eq!(dispatch(0xF111), RecordKind::Unknown);
        assert_eq!(dispatch(0x0FA0), RecordKind::Unknown);
        assert_eq!(dispatch(0xF0FF), RecordKind::OpaqueAtom);
        assert_eq!(dispatch(0xF111).container_class(), ContainerClass::Ambiguous);
    }

    #[test]
    fn test_lookups() {
        assert_eq!(record_name(0xF00B), Some("Opt"));
        assert_eq!(record_name(0xF222), None);
        assert_eq!(
            dispatch(record_type::SPGR_CONTAINER).container_class(),
            ContainerClass::Always
        );
        assert_eq!(dispatch(record_type::TERTIARY_OPT), RecordKind::Options);
        assert_eq!(dispatch(record_type::SECONDARY_OPT), RecordKind::Options);
    }
}
