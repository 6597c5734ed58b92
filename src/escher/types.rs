//! Escher record type tags.
//!
//! Based on the Microsoft Office Drawing specification ([MS-ODRAW] 2.1).

/// Escher record types
pub mod record_type {
    /// Drawing group container
    pub const DGG_CONTAINER: u16 = 0xF000;
    /// BLIP store container
    pub const BSTORE_CONTAINER: u16 = 0xF001;
    /// Drawing container
    pub const DG_CONTAINER: u16 = 0xF002;
    /// Shape group container
    pub const SPGR_CONTAINER: u16 = 0xF003;
    /// Shape container
    pub const SP_CONTAINER: u16 = 0xF004;
    /// Solver container
    pub const SOLVER_CONTAINER: u16 = 0xF005;
    /// Drawing group record
    pub const DGG: u16 = 0xF006;
    /// BLIP store entry
    pub const BSE: u16 = 0xF007;
    /// Drawing record
    pub const DG: u16 = 0xF008;
    /// Shape group coordinates
    pub const SPGR: u16 = 0xF009;
    /// Shape record
    pub const SP: u16 = 0xF00A;
    /// Property table
    pub const OPT: u16 = 0xF00B;
    /// Client textbox
    pub const CLIENT_TEXTBOX: u16 = 0xF00D;
    /// Child anchor
    pub const CHILD_ANCHOR: u16 = 0xF00F;
    /// Client anchor
    pub const CLIENT_ANCHOR: u16 = 0xF010;
    /// Client data
    pub const CLIENT_DATA: u16 = 0xF011;
    /// Connector rule
    pub const CONNECTOR_RULE: u16 = 0xF012;
    /// First tag of the BLIP range
    pub const BLIP_FIRST: u16 = 0xF018;
    /// EMF blip
    pub const BLIP_EMF: u16 = 0xF01A;
    /// WMF blip
    pub const BLIP_WMF: u16 = 0xF01B;
    /// PICT blip
    pub const BLIP_PICT: u16 = 0xF01C;
    /// JPEG blip
    pub const BLIP_JPEG: u16 = 0xF01D;
    /// PNG blip
    pub const BLIP_PNG: u16 = 0xF01E;
    /// DIB blip
    pub const BLIP_DIB: u16 = 0xF01F;
    /// TIFF blip
    pub const BLIP_TIFF: u16 = 0xF029;
    /// CMYK JPEG blip
    pub const BLIP_JPEG_CMYK: u16 = 0xF02A;
    /// Last tag of the BLIP range
    pub const BLIP_LAST: u16 = 0xF117;
    /// Color MRU
    pub const COLOR_MRU: u16 = 0xF11A;
    /// Split menu colors
    pub const SPLIT_MENU_COLORS: u16 = 0xF11E;
    /// Secondary property table
    pub const SECONDARY_OPT: u16 = 0xF121;
    /// Tertiary property table
    pub const TERTIARY_OPT: u16 = 0xF122;
}

/// Check if a tag falls in the BLIP record range.
#[inline]
pub const fn is_blip_type(record_type: u16) -> bool {
    record_type >= record_type::BLIP_FIRST && record_type <= record_type::BLIP_LAST
}

/// Check if a tag is one of the Escher tags (all live at 0xF000 and above).
#[inline]
pub const fn is_escher_type(record_type: u16) -> bool {
    record_type >= record_type::DGG_CONTAINER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blip_range() {
        assert!(is_blip_type(record_type::BLIP_PNG));
        assert!(is_blip_type(record_type::BLIP_LAST));
        assert!(!is_blip_type(record_type::SPLIT_MENU_COLORS));
        assert!(!is_blip_type(record_type::BSE));
        assert!(is_escher_type(0xF222));
        assert!(!is_escher_type(0x0FA0));
    }
}
