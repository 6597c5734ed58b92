//! Property numbers and their metadata.
//!
//! Numbers are grouped in blocks of 64 by property set (transform, protection,
//! text, geotext, blip, geometry, fill, line, shadow, perspective, 3D, shape,
//! callout, group shape). Within a block, the last 16 numbers hold the boolean
//! bit-field properties.

use phf::{phf_map, phf_set};

/// Commonly used property numbers.
pub mod property_id {
    // Transform
    pub const ROTATION: u16 = 0x0004;

    // Protection
    pub const LOCK_ROTATION: u16 = 0x0077;
    pub const LOCK_ASPECT_RATIO: u16 = 0x0078;
    pub const LOCK_AGAINST_GROUPING: u16 = 0x007F;

    // Text
    pub const TEXT_ID: u16 = 0x0080;
    pub const TEXT_LEFT: u16 = 0x0081;
    pub const TEXT_TOP: u16 = 0x0082;
    pub const TEXT_RIGHT: u16 = 0x0083;
    pub const TEXT_BOTTOM: u16 = 0x0084;
    pub const WRAP_TEXT: u16 = 0x0085;
    pub const ANCHOR_TEXT: u16 = 0x0087;
    pub const SIZE_TEXT_TO_FIT_SHAPE: u16 = 0x00BF;

    // Blip
    pub const BLIP_TO_DISPLAY: u16 = 0x0104;
    pub const BLIP_FILE_NAME: u16 = 0x0105;
    pub const PICTURE_ID: u16 = 0x010B;

    // Geometry
    pub const GEOMETRY_LEFT: u16 = 0x0140;
    pub const GEOMETRY_TOP: u16 = 0x0141;
    pub const GEOMETRY_RIGHT: u16 = 0x0142;
    pub const GEOMETRY_BOTTOM: u16 = 0x0143;
    pub const SHAPE_PATH: u16 = 0x0144;
    pub const VERTICES: u16 = 0x0145;
    pub const SEGMENT_INFO: u16 = 0x0146;
    pub const ADJUST_VALUE: u16 = 0x0147;
    pub const CONNECTION_SITES: u16 = 0x0151;
    pub const CONNECTION_SITES_DIR: u16 = 0x0152;
    pub const ADJUST_HANDLES: u16 = 0x0155;
    pub const GUIDES: u16 = 0x0156;
    pub const INSCRIBE: u16 = 0x0157;

    // Fill
    pub const FILL_TYPE: u16 = 0x0180;
    pub const FILL_COLOR: u16 = 0x0181;
    pub const FILL_OPACITY: u16 = 0x0182;
    pub const FILL_BACK_COLOR: u16 = 0x0183;
    pub const FILL_BLIP: u16 = 0x0186;
    pub const FILL_ANGLE: u16 = 0x018B;
    pub const FILL_FOCUS: u16 = 0x018C;
    pub const FILL_SHADE_COLORS: u16 = 0x0197;
    pub const FILL_STYLE_BOOL: u16 = 0x01BF;

    // Line
    pub const LINE_COLOR: u16 = 0x01C0;
    pub const LINE_WIDTH: u16 = 0x01CB;
    pub const LINE_STYLE: u16 = 0x01CD;
    pub const LINE_DASHING: u16 = 0x01CE;
    pub const LINE_DASH_STYLE: u16 = 0x01CF;
    pub const LINE_STYLE_BOOL: u16 = 0x01FF;

    // Shadow
    pub const SHADOW_TYPE: u16 = 0x0200;
    pub const SHADOW_COLOR: u16 = 0x0201;
    pub const SHADOW_OFFSET_X: u16 = 0x0205;
    pub const SHADOW_OFFSET_Y: u16 = 0x0206;

    // Shape
    pub const CONNECTOR_STYLE: u16 = 0x0303;
    pub const BLACK_AND_WHITE_MODE: u16 = 0x0304;
    pub const SHAPE_BOOL: u16 = 0x033F;

    // Group shape
    pub const SHAPE_NAME: u16 = 0x0380;
    pub const DESCRIPTION: u16 = 0x0381;
    pub const HYPERLINK: u16 = 0x0382;
    pub const WRAP_POLYGON_VERTICES: u16 = 0x0383;
    pub const GROUP_SHAPE_BOOL: u16 = 0x03BF;
}

/// Property numbers whose complex payload is an array.
static ARRAY_PROPERTIES: phf::Set<u16> = phf_set! {
    0x0145u16,
    0x0146u16,
    0x0151u16,
    0x0152u16,
    0x0155u16,
    0x0156u16,
    0x0157u16,
    0x0197u16,
    0x01CFu16,
    0x0383u16,
};

/// Dotted metadata names, used in diagnostics.
static PROPERTY_NAMES: phf::Map<u16, &'static str> = phf_map! {
    0x0004u16 => "transform.rotation",
    0x0077u16 => "protection.lockrotation",
    0x0078u16 => "protection.lockaspectratio",
    0x0079u16 => "protection.lockposition",
    0x007Au16 => "protection.lockagainstselect",
    0x007Bu16 => "protection.lockcropping",
    0x007Cu16 => "protection.lockvertices",
    0x007Du16 => "protection.locktext",
    0x007Eu16 => "protection.lockadjusthandles",
    0x007Fu16 => "protection.lockagainstgrouping",
    0x0080u16 => "text.textid",
    0x0081u16 => "text.textleft",
    0x0082u16 => "text.texttop",
    0x0083u16 => "text.textright",
    0x0084u16 => "text.textbottom",
    0x0085u16 => "text.wraptext",
    0x0086u16 => "text.scaletext",
    0x0087u16 => "text.anchortext",
    0x0088u16 => "text.textflow",
    0x0089u16 => "text.fontrotation",
    0x008Au16 => "text.idofnextshape",
    0x008Bu16 => "text.bidir",
    0x00BBu16 => "text.singleclickselects",
    0x00BCu16 => "text.usehostmargins",
    0x00BDu16 => "text.rotatetextwithshape",
    0x00BEu16 => "text.sizeshapetofittext",
    0x00BFu16 => "text.sizetexttofitshape",
    0x00C0u16 => "geotext.unicode",
    0x00C1u16 => "geotext.rtftext",
    0x00C2u16 => "geotext.alignmentoncurve",
    0x00C3u16 => "geotext.defaultpointsize",
    0x00C4u16 => "geotext.textspacing",
    0x00C5u16 => "geotext.fontfamilyname",
    0x00F0u16 => "geotext.reverseroworder",
    0x00F1u16 => "geotext.hastexteffect",
    0x00F2u16 => "geotext.rotatecharacters",
    0x00F3u16 => "geotext.kerncharacters",
    0x00F4u16 => "geotext.tightortrack",
    0x00F5u16 => "geotext.stretchtofitshape",
    0x00F6u16 => "geotext.charboundingbox",
    0x00F7u16 => "geotext.scaletextonpath",
    0x00F8u16 => "geotext.stretchcharheight",
    0x00F9u16 => "geotext.nomeasurealongpath",
    0x00FAu16 => "geotext.boldfont",
    0x00FBu16 => "geotext.italicfont",
    0x00FCu16 => "geotext.underlinefont",
    0x00FDu16 => "geotext.shadowfont",
    0x00FEu16 => "geotext.smallcapsfont",
    0x00FFu16 => "geotext.strikethroughfont",
    0x0100u16 => "blip.cropfromtop",
    0x0101u16 => "blip.cropfrombottom",
    0x0102u16 => "blip.cropfromleft",
    0x0103u16 => "blip.cropfromright",
    0x0104u16 => "blip.bliptodisplay",
    0x0105u16 => "blip.blipfilename",
    0x0106u16 => "blip.blipflags",
    0x0107u16 => "blip.transparentcolor",
    0x0108u16 => "blip.contrastsetting",
    0x0109u16 => "blip.brightnesssetting",
    0x010Au16 => "blip.gamma",
    0x010Bu16 => "blip.pictureid",
    0x010Cu16 => "blip.doublemod",
    0x010Du16 => "blip.picturefillmod",
    0x010Eu16 => "blip.pictureline",
    0x010Fu16 => "blip.printblip",
    0x0110u16 => "blip.printblipfilename",
    0x0111u16 => "blip.printflags",
    0x013Cu16 => "blip.nohittestpicture",
    0x013Du16 => "blip.picturegray",
    0x013Eu16 => "blip.picturebilevel",
    0x013Fu16 => "blip.pictureactive",
    0x0140u16 => "geometry.left",
    0x0141u16 => "geometry.top",
    0x0142u16 => "geometry.right",
    0x0143u16 => "geometry.bottom",
    0x0144u16 => "geometry.shapepath",
    0x0145u16 => "geometry.vertices",
    0x0146u16 => "geometry.segmentinfo",
    0x0147u16 => "geometry.adjustvalue",
    0x0148u16 => "geometry.adjust2value",
    0x0149u16 => "geometry.adjust3value",
    0x014Au16 => "geometry.adjust4value",
    0x014Bu16 => "geometry.adjust5value",
    0x014Cu16 => "geometry.adjust6value",
    0x014Du16 => "geometry.adjust7value",
    0x014Eu16 => "geometry.adjust8value",
    0x014Fu16 => "geometry.adjust9value",
    0x0150u16 => "geometry.adjust10value",
    0x0151u16 => "geometry.connectionsites",
    0x0152u16 => "geometry.connectionsitesdir",
    0x0155u16 => "geometry.adjusthandles",
    0x0156u16 => "geometry.guides",
    0x0157u16 => "geometry.inscribe",
    0x017Au16 => "geometry.shadowOK",
    0x017Bu16 => "geometry.3dok",
    0x017Cu16 => "geometry.lineok",
    0x017Du16 => "geometry.geotextok",
    0x017Eu16 => "geometry.fillshadeshapeok",
    0x017Fu16 => "geometry.fillok",
    0x0180u16 => "fill.filltype",
    0x0181u16 => "fill.fillcolor",
    0x0182u16 => "fill.fillopacity",
    0x0183u16 => "fill.fillbackcolor",
    0x0184u16 => "fill.backopacity",
    0x0185u16 => "fill.crmod",
    0x0186u16 => "fill.patterntexture",
    0x0187u16 => "fill.blipfilename",
    0x0188u16 => "fill.blipflags",
    0x0189u16 => "fill.width",
    0x018Au16 => "fill.height",
    0x018Bu16 => "fill.angle",
    0x018Cu16 => "fill.focus",
    0x018Du16 => "fill.toleft",
    0x018Eu16 => "fill.totop",
    0x018Fu16 => "fill.toright",
    0x0190u16 => "fill.tobottom",
    0x0191u16 => "fill.rectleft",
    0x0192u16 => "fill.recttop",
    0x0193u16 => "fill.rectright",
    0x0194u16 => "fill.rectbottom",
    0x0195u16 => "fill.dztype",
    0x0196u16 => "fill.shadepreset",
    0x0197u16 => "fill.shadecolors",
    0x0198u16 => "fill.originx",
    0x0199u16 => "fill.originy",
    0x019Au16 => "fill.shapeoriginx",
    0x019Bu16 => "fill.shapeoriginy",
    0x019Cu16 => "fill.shadetype",
    0x01BBu16 => "fill.filled",
    0x01BCu16 => "fill.hittestfill",
    0x01BDu16 => "fill.shape",
    0x01BEu16 => "fill.userect",
    0x01BFu16 => "fill.nofillhittest",
    0x01C0u16 => "linestyle.color",
    0x01C1u16 => "linestyle.opacity",
    0x01C2u16 => "linestyle.backcolor",
    0x01C3u16 => "linestyle.crmod",
    0x01C4u16 => "linestyle.linetype",
    0x01C5u16 => "linestyle.fillblip",
    0x01C6u16 => "linestyle.fillblipname",
    0x01C7u16 => "linestyle.fillblipflags",
    0x01C8u16 => "linestyle.fillwidth",
    0x01C9u16 => "linestyle.fillheight",
    0x01CAu16 => "linestyle.filldztype",
    0x01CBu16 => "linestyle.linewidth",
    0x01CCu16 => "linestyle.linemiterlimit",
    0x01CDu16 => "linestyle.linestyle",
    0x01CEu16 => "linestyle.linedashing",
    0x01CFu16 => "linestyle.linedashstyle",
    0x01D0u16 => "linestyle.linestartarrowhead",
    0x01D1u16 => "linestyle.lineendarrowhead",
    0x01D2u16 => "linestyle.linestartarrowwidth",
    0x01D3u16 => "linestyle.lineestartarrowlength",
    0x01D4u16 => "linestyle.lineendarrowwidth",
    0x01D5u16 => "linestyle.lineendarrowlength",
    0x01D6u16 => "linestyle.linejoinstyle",
    0x01D7u16 => "linestyle.lineendcapstyle",
    0x01FBu16 => "linestyle.arrowheadsok",
    0x01FCu16 => "linestyle.anyline",
    0x01FDu16 => "linestyle.hitlinetest",
    0x01FEu16 => "linestyle.linefillshape",
    0x01FFu16 => "linestyle.nolinedrawdash",
    0x0200u16 => "shadowstyle.type",
    0x0201u16 => "shadowstyle.color",
    0x0202u16 => "shadowstyle.highlight",
    0x0203u16 => "shadowstyle.crmod",
    0x0204u16 => "shadowstyle.opacity",
    0x0205u16 => "shadowstyle.offsetx",
    0x0206u16 => "shadowstyle.offsety",
    0x0207u16 => "shadowstyle.secondoffsetx",
    0x0208u16 => "shadowstyle.secondoffsety",
    0x0209u16 => "shadowstyle.scalextox",
    0x020Au16 => "shadowstyle.scaleytox",
    0x020Bu16 => "shadowstyle.scalextoy",
    0x020Cu16 => "shadowstyle.scaleytoy",
    0x020Du16 => "shadowstyle.perspectivex",
    0x020Eu16 => "shadowstyle.perspectivey",
    0x020Fu16 => "shadowstyle.weight",
    0x0210u16 => "shadowstyle.originx",
    0x0211u16 => "shadowstyle.originy",
    0x023Eu16 => "shadowstyle.shadow",
    0x023Fu16 => "shadowstyle.shadowobsured",
    0x0240u16 => "perspective.type",
    0x0241u16 => "perspective.offsetx",
    0x0242u16 => "perspective.offsety",
    0x0243u16 => "perspective.scalextox",
    0x0244u16 => "perspective.scaleytox",
    0x0245u16 => "perspective.scalextoy",
    0x0246u16 => "perspective.scaleytoy",
    0x0247u16 => "perspective.perspectivex",
    0x0248u16 => "perspective.perspectivey",
    0x0249u16 => "perspective.weight",
    0x024Au16 => "perspective.originx",
    0x024Bu16 => "perspective.originy",
    0x027Fu16 => "perspective.perspectiveon",
    0x0280u16 => "3d.specularamount",
    0x0288u16 => "3d.crmod",
    0x0295u16 => "3d.diffuseamount",
    0x0296u16 => "3d.shininess",
    0x0297u16 => "3d.edgethickness",
    0x0298u16 => "3d.extrudeforward",
    0x0299u16 => "3d.extrudebackward",
    0x029Au16 => "3d.extrudeplane",
    0x029Bu16 => "3d.extrusioncolor",
    0x02BCu16 => "3d.3deffect",
    0x02BDu16 => "3d.metallic",
    0x02BEu16 => "3d.useextrusioncolor",
    0x02BFu16 => "3d.lightface",
    0x02C0u16 => "3dstyle.yrotationangle",
    0x02C1u16 => "3dstyle.xrotationangle",
    0x02C2u16 => "3dstyle.rotationaxisx",
    0x02C3u16 => "3dstyle.rotationaxisy",
    0x02C4u16 => "3dstyle.rotationaxisz",
    0x02C5u16 => "3dstyle.rotationangle",
    0x02C6u16 => "3dstyle.rotationcenterx",
    0x02C7u16 => "3dstyle.rotationcentery",
    0x02C8u16 => "3dstyle.rotationcenterz",
    0x02C9u16 => "3dstyle.rendermode",
    0x02CAu16 => "3dstyle.tolerance",
    0x02CBu16 => "3dstyle.xviewpoint",
    0x02CCu16 => "3dstyle.yviewpoint",
    0x02CDu16 => "3dstyle.zviewpoint",
    0x02CEu16 => "3dstyle.originx",
    0x02CFu16 => "3dstyle.originy",
    0x02D0u16 => "3dstyle.skewangle",
    0x02D1u16 => "3dstyle.skewamount",
    0x02D2u16 => "3dstyle.ambientintensity",
    0x02D3u16 => "3dstyle.keyx",
    0x02D4u16 => "3dstyle.keyy",
    0x02D5u16 => "3dstyle.keyz",
    0x02D6u16 => "3dstyle.keyintensity",
    0x02D7u16 => "3dstyle.fillx",
    0x02D8u16 => "3dstyle.filly",
    0x02D9u16 => "3dstyle.fillz",
    0x02DAu16 => "3dstyle.fillintensity",
    0x02FBu16 => "3dstyle.constrainrotation",
    0x02FCu16 => "3dstyle.rotationcenterauto",
    0x02FDu16 => "3dstyle.parallel",
    0x02FEu16 => "3dstyle.keyharsh",
    0x02FFu16 => "3dstyle.fillharsh",
    0x0301u16 => "shape.master",
    0x0303u16 => "shape.connectorstyle",
    0x0304u16 => "shape.blackandwhitesettings",
    0x0305u16 => "shape.wmodepurebw",
    0x0306u16 => "shape.wmodebw",
    0x033Au16 => "shape.oleicon",
    0x033Bu16 => "shape.preferrelativeresize",
    0x033Cu16 => "shape.lockshapetype",
    0x033Eu16 => "shape.deleteattachedobject",
    0x033Fu16 => "shape.backgroundshape",
    0x0340u16 => "callout.callouttype",
    0x0341u16 => "callout.xycalloutgap",
    0x0342u16 => "callout.calloutangle",
    0x0343u16 => "callout.calloutdroptype",
    0x0344u16 => "callout.calloutdropspecified",
    0x0345u16 => "callout.calloutlengthspecified",
    0x0379u16 => "callout.iscallout",
    0x037Au16 => "callout.calloutaccentbar",
    0x037Bu16 => "callout.callouttextborder",
    0x037Cu16 => "callout.calloutminusx",
    0x037Du16 => "callout.calloutminusy",
    0x037Eu16 => "callout.dropauto",
    0x037Fu16 => "callout.lengthspecified",
    0x0380u16 => "groupshape.shapename",
    0x0381u16 => "groupshape.description",
    0x0382u16 => "groupshape.hyperlink",
    0x0383u16 => "groupshape.wrappolygonvertices",
    0x0384u16 => "groupshape.wrapdistleft",
    0x0385u16 => "groupshape.wrapdisttop",
    0x0386u16 => "groupshape.wrapdistright",
    0x0387u16 => "groupshape.wrapdistbottom",
    0x0388u16 => "groupshape.regroupid",
    0x03B9u16 => "groupshape.editedwrap",
    0x03BAu16 => "groupshape.behinddocument",
    0x03BBu16 => "groupshape.ondblclicknotify",
    0x03BCu16 => "groupshape.isbutton",
    0x03BDu16 => "groupshape.1dadjustment",
    0x03BEu16 => "groupshape.hidden",
    0x03BFu16 => "groupshape.print",
};

/// Check if a property number carries an array payload when complex.
#[inline]
pub fn is_array_property(number: u16) -> bool {
    ARRAY_PROPERTIES.contains(&number)
}

/// Metadata name of a property number, e.g. `fill.fillcolor`.
#[inline]
pub fn property_name(number: u16) -> Option<&'static str> {
    PROPERTY_NAMES.get(&number).copied()
}
