//! Fixed package parts: document properties, relationships, content types and the workbook.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::xml::escape_xml;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const XML_DECL_PLAIN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";
const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

pub const APP_XML_PATH: &str = "docProps/app.xml";
pub const CORE_XML_PATH: &str = "docProps/core.xml";
pub const ROOT_RELS_PATH: &str = "_rels/.rels";
pub const WORKBOOK_XML_PATH: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";
pub const STYLES_XML_PATH: &str = "xl/styles.xml";
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Archive path of a worksheet part.
pub fn worksheet_path(xml_name: &str) -> String {
    format!("xl/worksheets/{xml_name}")
}

pub fn app_xml() -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#);
    xml.push('\n');
    xml.push_str("<TotalTime>0</TotalTime>\n");
    xml.push_str("</Properties>");
    xml
}

pub fn core_xml(author: &str, created: DateTime<Utc>) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    let _ = writeln!(
        xml,
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
        created.format("%Y-%m-%dT%H:%M:%S.00Z")
    );
    let _ = writeln!(xml, "<dc:creator>{}</dc:creator>", escape_xml(author));
    xml.push_str("<cp:revision>0</cp:revision>\n");
    xml.push_str("</cp:coreProperties>");
    xml
}

pub fn root_rels_xml() -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL_PLAIN);
    xml.push('\n');
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    xml.push('\n');
    push_relationship(&mut xml, 1, REL_OFFICE_DOCUMENT, WORKBOOK_XML_PATH);
    push_relationship(&mut xml, 2, REL_CORE_PROPERTIES, CORE_XML_PATH);
    push_relationship(&mut xml, 3, REL_EXTENDED_PROPERTIES, APP_XML_PATH);
    xml.push_str("</Relationships>");
    xml
}

/// `xl/workbook.xml` listing `sheet_names` (already sanitized) in tab order.
///
/// Sheet `i` gets `sheetId = i + 1` and relationship `rId{i + 2}`; `rId1` is the style sheet.
pub fn workbook_xml(sheet_names: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    xml.push('\n');
    xml.push_str(r#"<fileVersion appName="Calc"/><workbookPr backupFile="false" showObjects="all" date1904="false"/><workbookProtection/>"#);
    xml.push('\n');
    xml.push_str(r#"<bookViews><workbookView activeTab="0" firstSheet="0" showHorizontalScroll="true" showSheetTabs="true" showVerticalScroll="true" tabRatio="212" windowHeight="8192" windowWidth="16384" xWindow="0" yWindow="0"/></bookViews>"#);
    xml.push('\n');
    xml.push_str("<sheets>\n");
    for (i, name) in sheet_names.iter().enumerate() {
        let _ = writeln!(
            xml,
            r#"<sheet name="{}" sheetId="{}" state="visible" r:id="rId{}"/>"#,
            escape_xml(name),
            i + 1,
            i + 2
        );
    }
    xml.push_str("</sheets>\n");
    xml.push_str(r#"<calcPr iterateCount="100" refMode="A1" iterate="false" iterateDelta="0.001"/>"#);
    xml.push('\n');
    xml.push_str("</workbook>\n");
    xml
}

pub fn workbook_rels_xml(xml_names: &[&str]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL_PLAIN);
    xml.push('\n');
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    xml.push('\n');
    push_relationship(&mut xml, 1, REL_STYLES, "styles.xml");
    for (i, xml_name) in xml_names.iter().enumerate() {
        push_relationship(
            &mut xml,
            i + 2,
            REL_WORKSHEET,
            &format!("worksheets/{xml_name}"),
        );
    }
    xml.push_str("</Relationships>");
    xml
}

pub fn content_types_xml(xml_names: &[&str]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL_PLAIN);
    xml.push('\n');
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push('\n');
    for (part, content_type) in [
        (ROOT_RELS_PATH, CT_RELATIONSHIPS),
        (APP_XML_PATH, CT_EXTENDED_PROPERTIES),
        (CORE_XML_PATH, CT_CORE_PROPERTIES),
        (WORKBOOK_RELS_PATH, CT_RELATIONSHIPS),
        (WORKBOOK_XML_PATH, CT_WORKBOOK),
        (STYLES_XML_PATH, CT_STYLES),
    ] {
        push_override(&mut xml, part, content_type);
    }
    for xml_name in xml_names {
        push_override(&mut xml, &worksheet_path(xml_name), CT_WORKSHEET);
    }
    xml.push_str("</Types>\n");
    xml
}

fn push_relationship(xml: &mut String, id: usize, rel_type: &str, target: &str) {
    let _ = writeln!(
        xml,
        r#"<Relationship Id="rId{id}" Type="{rel_type}" Target="{}"/>"#,
        escape_xml(target)
    );
}

fn push_override(xml: &mut String, part: &str, content_type: &str) {
    let _ = writeln!(
        xml,
        r#"<Override PartName="/{}" ContentType="{content_type}"/>"#,
        escape_xml(part)
    );
}
