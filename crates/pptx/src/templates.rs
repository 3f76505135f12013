//! Fixed package parts for a minimal PresentationML document.
//!
//! One slide master, one blank layout and one theme are enough for every
//! slide produced by the converter, since slides carry no placeholders.

/// XML declaration used at the top of every part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Namespace declarations shared by PresentationML parts.
pub const PML_NAMESPACES: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

/// Relationship type URIs.
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
    pub const VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
    pub const TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";
}

/// Content types for part overrides.
pub mod content_type {
    pub const PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
    pub const VIEW_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
    pub const TABLE_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
}

/// Empty shape tree header used by masters, layouts and slides.
pub const GROUP_SHAPE_PROPERTIES: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Default run properties for the first text level, resolved from the theme.
const LEVEL1_TEXT_STYLE: &str = concat!(
    r#"<a:lvl1pPr marL="0" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1">"#,
    r#"<a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
    r#"<a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr>"#,
    r#"</a:lvl1pPr>"#
);

/// `p:defaultTextStyle` for presentation.xml.
pub fn default_text_style() -> String {
    format!("<p:defaultTextStyle>{}</p:defaultTextStyle>", LEVEL1_TEXT_STYLE)
}

/// The single slide master.
pub fn slide_master_xml() -> String {
    format!(
        concat!(
            "{decl}<p:sldMaster {ns}>",
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{group}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
            r#"hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "<p:txStyles>",
            "<p:titleStyle>{lvl1}</p:titleStyle>",
            "<p:bodyStyle>{lvl1}</p:bodyStyle>",
            "<p:otherStyle>{lvl1}</p:otherStyle>",
            "</p:txStyles>",
            "</p:sldMaster>"
        ),
        decl = XML_DECLARATION,
        ns = PML_NAMESPACES,
        group = GROUP_SHAPE_PROPERTIES,
        lvl1 = LEVEL1_TEXT_STYLE,
    )
}

/// Relationships of the slide master: its layout and the theme.
pub fn slide_master_rels_xml() -> String {
    relationships_xml(&[
        ("rId1", rel_type::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
        ("rId2", rel_type::THEME, "../theme/theme1.xml"),
    ])
}

/// The blank slide layout every slide is built on.
pub fn blank_layout_xml() -> String {
    format!(
        concat!(
            r#"{decl}<p:sldLayout {ns} type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{group}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sldLayout>"
        ),
        decl = XML_DECLARATION,
        ns = PML_NAMESPACES,
        group = GROUP_SHAPE_PROPERTIES,
    )
}

/// Relationships of the blank layout: back to the master.
pub fn blank_layout_rels_xml() -> String {
    relationships_xml(&[(
        "rId1",
        rel_type::SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml",
    )])
}

/// Relationships of a slide: its layout.
pub fn slide_rels_xml() -> String {
    relationships_xml(&[(
        "rId1",
        rel_type::SLIDE_LAYOUT,
        "../slideLayouts/slideLayout1.xml",
    )])
}

/// Package-level relationships.
pub fn root_rels_xml() -> String {
    relationships_xml(&[
        ("rId1", rel_type::OFFICE_DOCUMENT, "ppt/presentation.xml"),
        ("rId2", rel_type::CORE_PROPERTIES, "docProps/core.xml"),
        ("rId3", rel_type::EXTENDED_PROPERTIES, "docProps/app.xml"),
    ])
}

/// A relationships part from `(id, type, target)` triples.
pub fn relationships_xml(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, rel_type, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Presentation properties part.
pub fn pres_props_xml() -> String {
    format!("{}<p:presentationPr {}/>", XML_DECLARATION, PML_NAMESPACES)
}

/// View properties part.
pub fn view_props_xml() -> String {
    format!(
        concat!(
            "{}<p:viewPr {}>",
            r#"<p:gridSpacing cx="76200" cy="76200"/>"#,
            "</p:viewPr>"
        ),
        XML_DECLARATION, PML_NAMESPACES
    )
}

/// Table styles part with the default style id and no custom styles.
pub fn table_styles_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#
        ),
        XML_DECLARATION
    )
}

/// Office-like theme: color scheme, font scheme and a plain format scheme.
pub fn theme_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#,
    );
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Office">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    for (name, hex) in [
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ] {
        xml.push_str(&format!(
            r#"<a:{name}><a:srgbClr val="{hex}"/></a:{name}>"#,
            name = name,
            hex = hex
        ));
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Office">"#);
    for (tag, face) in [("majorFont", "Calibri Light"), ("minorFont", "Calibri")] {
        xml.push_str(&format!(
            r#"<a:{tag}><a:latin typeface="{face}"/><a:ea typeface=""/><a:cs typeface=""/></a:{tag}>"#,
            tag = tag,
            face = face
        ));
    }
    xml.push_str("</a:fontScheme>");

    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    xml.push_str(r#"<a:fmtScheme name="Office">"#);
    xml.push_str("<a:fillStyleLst>");
    for _ in 0..3 {
        xml.push_str(solid);
    }
    xml.push_str("</a:fillStyleLst>");
    xml.push_str("<a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        xml.push_str(&format!(
            r#"<a:ln w="{}" cap="flat" cmpd="sng" algn="ctr">{}<a:prstDash val="solid"/></a:ln>"#,
            width, solid
        ));
    }
    xml.push_str("</a:lnStyleLst>");
    xml.push_str("<a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst>");
    xml.push_str("<a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(solid);
    }
    xml.push_str("</a:bgFillStyleLst>");
    xml.push_str("</a:fmtScheme>");

    xml.push_str("</a:themeElements>");
    xml.push_str("<a:objectDefaults/><a:extraClrSchemeLst/>");
    xml.push_str("</a:theme>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    /// Parse the whole document, failing on any syntax or nesting error.
    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        reader.check_end_names(true);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML: {}\n{}", e, xml),
            }
        }
    }

    #[test]
    fn test_static_parts_are_well_formed() {
        for xml in [
            slide_master_xml(),
            slide_master_rels_xml(),
            blank_layout_xml(),
            blank_layout_rels_xml(),
            slide_rels_xml(),
            root_rels_xml(),
            pres_props_xml(),
            view_props_xml(),
            table_styles_xml(),
            theme_xml(),
        ] {
            assert_well_formed(&xml);
        }
    }

    #[test]
    fn test_master_references_layout() {
        let xml = slide_master_xml();
        assert!(xml.contains(r#"<p:sldLayoutId id="2147483649" r:id="rId1"/>"#));
        assert!(slide_master_rels_xml().contains("slideLayout1.xml"));
    }

    #[test]
    fn test_layout_is_blank() {
        assert!(blank_layout_xml().contains(r#"type="blank""#));
    }

    #[test]
    fn test_table_styles_default_id() {
        assert!(table_styles_xml().contains(r#"def="{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}""#));
    }

    #[test]
    fn test_theme_has_all_scheme_colors() {
        let xml = theme_xml();
        for name in [
            "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5",
            "accent6", "hlink", "folHlink",
        ] {
            assert!(xml.contains(&format!("<a:{}>", name)), "missing {}", name);
        }
    }
}
