//! Style registry: deduplicates `(number format, style)` pairs while rows are written and
//! resolves them into the compact font/fill/border/xf tables of `xl/styles.xml`.
//!
//! Index layout of the rendered part:
//! - number formats: `GENERAL` is fixed at id 76, interned formats start at id 80
//! - fonts: two fixed defaults, then interned fonts
//! - fills: `none` and `gray125`, then interned fills
//! - borders: one empty border, then interned borders
//! - cellXfs: one fixed default xf, then one xf per interned style; cells reference
//!   [`xf_index`] of their style index

use std::collections::HashMap;
use std::hash::Hash;

use crate::style::{standardize_color, BorderSpec, CellStyle, EdgeSpec};
use crate::xml::escape_xml;

const NUM_FMT_GENERAL_ID: usize = 76;
const NUM_FMT_BASE_ID: usize = 80;
const FONT_BASE: usize = 2;
const FILL_BASE: usize = 2;
const BORDER_BASE: usize = 1;
const XF_BASE: usize = 1;

const DEFAULT_BORDER_COLOR: &str = "FFBFBFBF";
const DEFAULT_FONT_NAME: &str = "Arial";
const DEFAULT_FONT_FAMILY: u8 = 2;
const DEFAULT_FONT_SIZE_100PT: u32 = 1000;

/// `cellXfs` index for a style index returned by [`StyleRegistry::intern_style`].
pub fn xf_index(style_idx: usize) -> usize {
    style_idx + XF_BASE
}

/// Append-only table where equal values always map to the index of their first insertion.
#[derive(Clone, Debug)]
pub struct InternTable<T> {
    items: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> Default for InternTable<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> InternTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or reuse) a value, returning its index and whether it was newly added.
    pub fn intern_full(&mut self, item: T) -> (usize, bool) {
        if let Some(idx) = self.index.get(&item) {
            return (*idx, false);
        }
        let idx = self.items.len();
        self.items.push(item.clone());
        self.index.insert(item, idx);
        (idx, true)
    }

    pub fn intern(&mut self, item: T) -> usize {
        self.intern_full(item).0
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

/// Border line styles accepted in style descriptors; anything else falls back to `thin`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum BorderLine {
    None,
    #[default]
    Thin,
    Medium,
    Dashed,
    Hair,
    Thick,
    Double,
}

impl BorderLine {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => BorderLine::None,
            "thin" => BorderLine::Thin,
            "medium" => BorderLine::Medium,
            "dashed" => BorderLine::Dashed,
            "hair" => BorderLine::Hair,
            "thick" => BorderLine::Thick,
            "double" => BorderLine::Double,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BorderLine::None => "none",
            BorderLine::Thin => "thin",
            BorderLine::Medium => "medium",
            BorderLine::Dashed => "dashed",
            BorderLine::Hair => "hair",
            BorderLine::Thick => "thick",
            BorderLine::Double => "double",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    pub style: BorderLine,
    /// ARGB color code.
    pub color: String,
}

/// Resolved border; edges that were never requested stay `None` and are not emitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Border {
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
}

impl Border {
    fn edges(&self) -> [(&'static str, Option<&BorderEdge>); 4] {
        [
            ("left", self.left.as_ref()),
            ("right", self.right.as_ref()),
            ("top", self.top.as_ref()),
            ("bottom", self.bottom.as_ref()),
        ]
    }
}

/// Resolved solid fill.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fill {
    pub foreground: Option<String>,
    pub background: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    pub name: String,
    pub family: u8,
    /// Font size in 1/100 points (e.g. 1000 = 10pt).
    pub size_100pt: u32,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    pub color: Option<String>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: DEFAULT_FONT_NAME.to_string(),
            family: DEFAULT_FONT_FAMILY,
            size_100pt: DEFAULT_FONT_SIZE_100PT,
            bold: false,
            italic: false,
            strike: false,
            underline: false,
            color: None,
        }
    }
}

/// Alignment block. Emitted (and applied) only when at least one field was requested.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alignment {
    pub horizontal: Option<&'static str>,
    pub vertical: Option<&'static str>,
    pub wrap_text: Option<bool>,
}

/// Per-style record produced by [`StyleRegistry::resolve`].
///
/// Font/fill/border indices point into the interned lists of [`ResolvedStyles`]; `None` means
/// the fixed default slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub num_fmt_idx: usize,
    pub font: Option<usize>,
    pub fill: Option<usize>,
    pub border: Option<usize>,
    pub alignment: Option<Alignment>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedStyles {
    pub fonts: Vec<Font>,
    pub fills: Vec<Fill>,
    pub borders: Vec<Border>,
    pub styles: Vec<ResolvedStyle>,
}

/// Deduplicating registry of number formats and style descriptors for one workbook.
#[derive(Clone, Debug, Default)]
pub struct StyleRegistry {
    number_formats: InternTable<String>,
    descriptors: InternTable<(usize, String)>,
    // Parallel to `descriptors`: the first style seen for each key.
    styles: Vec<CellStyle>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_number_format(&mut self, code: &str) -> usize {
        self.number_formats.intern(code.to_string())
    }

    /// Intern a `(number format, style)` pair. Equal pairs share an index; a missing style is
    /// the same as an empty one.
    pub fn intern_style(&mut self, number_format: &str, style: Option<&CellStyle>) -> usize {
        let num_fmt_idx = self.intern_number_format(number_format);
        let style = style.cloned().unwrap_or_default();
        let (idx, inserted) = self
            .descriptors
            .intern_full((num_fmt_idx, style.canonical_key()));
        if inserted {
            self.styles.push(style);
        }
        idx
    }

    pub fn number_formats(&self) -> &[String] {
        self.number_formats.as_slice()
    }

    pub fn style_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Resolve every interned descriptor, in order, into deduplicated fonts/fills/borders.
    pub fn resolve(&self) -> ResolvedStyles {
        let mut fonts = InternTable::new();
        let mut fills = InternTable::new();
        let mut borders = InternTable::new();

        let styles = self
            .descriptors
            .as_slice()
            .iter()
            .zip(&self.styles)
            .map(|((num_fmt_idx, _), style)| ResolvedStyle {
                num_fmt_idx: *num_fmt_idx,
                border: resolve_border(style).map(|b| borders.intern(b)),
                fill: resolve_fill(style).map(|f| fills.intern(f)),
                font: resolve_font(style).map(|f| fonts.intern(f)),
                alignment: resolve_alignment(style),
            })
            .collect();

        log::debug!(
            "resolved {} styles into {} fonts, {} fills, {} borders",
            self.descriptors.len(),
            fonts.len(),
            fills.len(),
            borders.len()
        );

        ResolvedStyles {
            fonts: fonts.items,
            fills: fills.items,
            borders: borders.items,
            styles,
        }
    }

    /// Render `xl/styles.xml`.
    pub fn to_xml(&self) -> String {
        render_styles_xml(self.number_formats(), &self.resolve())
    }
}

fn resolve_edge(edge: &EdgeSpec) -> BorderEdge {
    let (style, color) = match edge {
        EdgeSpec::Style(style) => (Some(style.as_str()), None),
        EdgeSpec::Line { style, color } => (style.as_deref(), color.as_deref()),
    };
    BorderEdge {
        style: style
            .and_then(|s| BorderLine::from_name(s.trim()))
            .unwrap_or_default(),
        color: color
            .and_then(standardize_color)
            .unwrap_or_else(|| DEFAULT_BORDER_COLOR.to_string()),
    }
}

fn resolve_border(style: &CellStyle) -> Option<Border> {
    let border = match style.border.as_ref()? {
        BorderSpec::Style(line) => {
            let edge = Some(resolve_edge(&EdgeSpec::Style(line.clone())));
            Border {
                left: edge.clone(),
                right: edge.clone(),
                top: edge.clone(),
                bottom: edge,
            }
        }
        BorderSpec::Edges(edges) => {
            // A bare style/color applies to every edge not listed on its own.
            let shorthand = (edges.style.is_some() || edges.color.is_some()).then(|| {
                EdgeSpec::Line {
                    style: edges.style.clone(),
                    color: edges.color.clone(),
                }
            });
            let side = |edge: &Option<EdgeSpec>| {
                edge.as_ref()
                    .or(shorthand.as_ref())
                    .map(resolve_edge)
            };
            Border {
                left: side(&edges.left),
                right: side(&edges.right),
                top: side(&edges.top),
                bottom: side(&edges.bottom),
            }
        }
    };
    (border != Border::default()).then_some(border)
}

fn resolve_fill(style: &CellStyle) -> Option<Fill> {
    let mut fill = Fill {
        foreground: style.foreground.as_deref().and_then(standardize_color),
        background: style.background.as_deref().and_then(standardize_color),
    };
    // Solid fills paint with the foreground color.
    if fill.background.is_some() {
        fill.foreground = fill.background.clone();
    }
    (fill != Fill::default()).then_some(fill)
}

fn resolve_alignment(style: &CellStyle) -> Option<Alignment> {
    const HORIZONTAL: [&str; 5] = ["general", "left", "right", "justify", "center"];
    const VERTICAL: [&str; 3] = ["bottom", "center", "distributed"];

    let pick = |value: &Option<String>, allowed: &[&'static str]| {
        let value = value.as_deref()?.trim().to_lowercase();
        allowed.iter().copied().find(|a| *a == value)
    };
    let alignment = Alignment {
        horizontal: pick(&style.halign, &HORIZONTAL),
        vertical: pick(&style.valign, &VERTICAL),
        wrap_text: style.wrap_text,
    };
    (alignment != Alignment::default()).then_some(alignment)
}

fn resolve_font(style: &CellStyle) -> Option<Font> {
    let mut font = Font::default();
    if let Some(size) = style.font_size {
        if size.is_finite() && size > 0.0 {
            font.size_100pt = (size * 100.0).round() as u32;
        }
    }
    if let Some(family) = style.font_family.as_deref() {
        font.family = match family {
            "Times New Roman" => 1,
            "Courier New" => 3,
            "Comic Sans MS" => 4,
            _ => DEFAULT_FONT_FAMILY,
        };
        font.name = family.to_string();
    }
    if let Some(font_style) = style.font_style.as_deref() {
        let font_style = font_style.trim().to_lowercase();
        font.bold = font_style.contains("bold");
        font.italic = font_style.contains("italic");
        font.strike = font_style.contains("strike");
        font.underline = font_style.contains("underline");
    }
    font.color = style.font_color.as_deref().and_then(standardize_color);
    (font != Font::default()).then_some(font)
}

fn render_styles_xml(number_formats: &[String], resolved: &ResolvedStyles) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(
        r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    xml.push('\n');

    xml.push_str(&format!(r#"<numFmts count="{}">"#, number_formats.len() + 1));
    xml.push('\n');
    xml.push_str(&format!(
        r#"<numFmt numFmtId="{NUM_FMT_GENERAL_ID}" formatCode="GENERAL"/>"#
    ));
    xml.push('\n');
    for (i, code) in number_formats.iter().enumerate() {
        xml.push_str(&format!(
            r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
            NUM_FMT_BASE_ID + i,
            escape_xml(code)
        ));
        xml.push('\n');
    }
    xml.push_str("</numFmts>\n");

    xml.push_str(&format!(
        r#"<fonts count="{}">"#,
        resolved.fonts.len() + FONT_BASE
    ));
    xml.push('\n');
    xml.push_str(r#"<font><name val="Arial"/><charset val="1"/><family val="2"/><sz val="10"/></font>"#);
    xml.push('\n');
    xml.push_str(r#"<font><name val="Arial"/><family val="0"/><sz val="10"/></font>"#);
    xml.push('\n');
    for font in &resolved.fonts {
        xml.push_str("<font>");
        xml.push_str(&format!(
            r#"<name val="{}"/><charset val="1"/><family val="{}"/>"#,
            escape_xml(&font.name),
            font.family
        ));
        xml.push_str(&format!(
            r#"<sz val="{}"/>"#,
            f64::from(font.size_100pt) / 100.0
        ));
        if let Some(color) = &font.color {
            xml.push_str(&format!(r#"<color rgb="{}"/>"#, escape_xml(color)));
        }
        if font.bold {
            xml.push_str(r#"<b val="true"/>"#);
        }
        if font.italic {
            xml.push_str(r#"<i val="true"/>"#);
        }
        if font.underline {
            xml.push_str(r#"<u val="single"/>"#);
        }
        if font.strike {
            xml.push_str(r#"<strike val="true"/>"#);
        }
        xml.push_str("</font>\n");
    }
    xml.push_str("</fonts>\n");

    xml.push_str(&format!(
        r#"<fills count="{}">"#,
        resolved.fills.len() + FILL_BASE
    ));
    xml.push('\n');
    xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#);
    xml.push('\n');
    xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#);
    xml.push('\n');
    for fill in &resolved.fills {
        xml.push_str(r#"<fill><patternFill patternType="solid">"#);
        push_color_element(&mut xml, "fgColor", fill.foreground.as_deref());
        push_color_element(&mut xml, "bgColor", fill.background.as_deref());
        xml.push_str("</patternFill></fill>\n");
    }
    xml.push_str("</fills>\n");

    xml.push_str(&format!(
        r#"<borders count="{}">"#,
        resolved.borders.len() + BORDER_BASE
    ));
    xml.push('\n');
    xml.push_str(r#"<border diagonalDown="false" diagonalUp="false"><left/><right/><top/><bottom/><diagonal/></border>"#);
    xml.push('\n');
    for border in &resolved.borders {
        xml.push_str(r#"<border diagonalDown="false" diagonalUp="false">"#);
        for (side, edge) in border.edges() {
            let Some(edge) = edge else { continue };
            xml.push_str(&format!(
                r#"<{side} style="{}"><color rgb="{}"/></{side}>"#,
                edge.style.as_str(),
                escape_xml(&edge.color)
            ));
        }
        xml.push_str("<diagonal/></border>\n");
    }
    xml.push_str("</borders>\n");

    xml.push_str(r#"<cellStyleXfs count="1">"#);
    xml.push('\n');
    xml.push_str(r#"<xf applyAlignment="true" applyBorder="true" applyFont="true" applyProtection="true" borderId="0" fillId="0" fontId="0" numFmtId="0">"#);
    xml.push_str(r#"<alignment horizontal="general" indent="0" shrinkToFit="false" textRotation="0" vertical="bottom" wrapText="false"/>"#);
    xml.push_str(r#"<protection hidden="false" locked="true"/>"#);
    xml.push_str("</xf>\n</cellStyleXfs>\n");

    xml.push_str(&format!(
        r#"<cellXfs count="{}">"#,
        resolved.styles.len() + XF_BASE
    ));
    xml.push('\n');
    xml.push_str(r#"<xf applyAlignment="false" applyBorder="false" applyFont="false" applyProtection="false" borderId="0" fillId="0" fontId="0" numFmtId="0" xfId="0"/>"#);
    xml.push('\n');
    for style in &resolved.styles {
        let alignment = style.alignment.clone().unwrap_or_default();
        xml.push_str(&format!(
            r#"<xf applyAlignment="{}" applyBorder="{}" applyFill="{}" applyFont="true" applyProtection="false" borderId="{}" fillId="{}" fontId="{}" numFmtId="{}" xfId="0">"#,
            style.alignment.is_some(),
            style.border.is_some(),
            style.fill.is_some(),
            style.border.map_or(0, |b| b + BORDER_BASE),
            style.fill.map_or(0, |f| f + FILL_BASE),
            style.font.map_or(0, |f| f + FONT_BASE),
            NUM_FMT_BASE_ID + style.num_fmt_idx,
        ));
        xml.push_str(&format!(
            r#"<alignment horizontal="{}" vertical="{}" textRotation="0" wrapText="{}" indent="0" shrinkToFit="false"/>"#,
            alignment.horizontal.unwrap_or("general"),
            alignment.vertical.unwrap_or("bottom"),
            alignment.wrap_text.unwrap_or(false),
        ));
        xml.push_str(r#"<protection locked="true" hidden="false"/>"#);
        xml.push_str("</xf>\n");
    }
    xml.push_str("</cellXfs>\n");
    xml.push_str("</styleSheet>\n");
    xml
}

fn push_color_element(xml: &mut String, tag: &str, color: Option<&str>) {
    match color {
        Some(color) => xml.push_str(&format!(r#"<{tag} rgb="{}"/>"#, escape_xml(color))),
        None => xml.push_str(&format!("<{tag}/>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BorderEdges;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn bold() -> CellStyle {
        CellStyle {
            font_style: Some("bold".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn interning_is_idempotent() {
        let mut registry = StyleRegistry::new();
        let a = registry.intern_style("GENERAL", Some(&bold()));
        let b = registry.intern_style("GENERAL", Some(&bold()));
        let c = registry.intern_style("NUMBER", Some(&bold()));
        let d = registry.intern_style("GENERAL", None);
        let e = registry.intern_style("GENERAL", Some(&CellStyle::default()));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(d, e);
        assert_eq!(registry.style_count(), 3);
        assert_eq!(registry.number_formats(), ["GENERAL", "NUMBER"]);
    }

    #[test]
    fn default_styles_reference_default_slots() {
        let mut registry = StyleRegistry::new();
        registry.intern_style("GENERAL", None);
        let resolved = registry.resolve();
        assert_eq!(resolved.styles, vec![ResolvedStyle::default()]);
        assert!(resolved.fonts.is_empty());
        assert!(resolved.fills.is_empty());
        assert!(resolved.borders.is_empty());
    }

    #[test]
    fn fonts_are_shared_across_styles() {
        let mut registry = StyleRegistry::new();
        registry.intern_style("GENERAL", Some(&bold()));
        registry.intern_style("NUMBER", Some(&bold()));
        registry.intern_style(
            "NUMBER",
            Some(&CellStyle {
                font_style: Some("Italic Underline".to_string()),
                font_size: Some(12.5),
                ..Default::default()
            }),
        );
        let resolved = registry.resolve();

        assert_eq!(resolved.fonts.len(), 2);
        assert_eq!(resolved.styles[0].font, Some(0));
        assert_eq!(resolved.styles[1].font, Some(0));
        assert_eq!(resolved.styles[2].font, Some(1));
        let font = &resolved.fonts[1];
        assert!(font.italic && font.underline && !font.bold);
        assert_eq!(font.size_100pt, 1250);
    }

    #[test]
    fn named_font_families_map_to_family_codes() {
        let font_for = |family: &str| {
            resolve_font(&CellStyle {
                font_family: Some(family.to_string()),
                ..Default::default()
            })
        };
        assert_eq!(font_for("Times New Roman").map(|f| f.family), Some(1));
        assert_eq!(font_for("Courier New").map(|f| f.family), Some(3));
        assert_eq!(font_for("Comic Sans MS").map(|f| f.family), Some(4));
        let other = font_for("Calibri").expect("non-default font");
        assert_eq!((other.name.as_str(), other.family), ("Calibri", 2));
        assert_eq!(font_for("Arial"), None);
    }

    #[test]
    fn border_shorthand_fills_unlisted_edges() {
        let style = CellStyle {
            border: Some(BorderSpec::Edges(BorderEdges {
                style: Some("double".to_string()),
                color: Some("red".to_string()),
                left: Some(EdgeSpec::Style("thick".to_string())),
                ..Default::default()
            })),
            ..Default::default()
        };
        let border = resolve_border(&style).expect("border");
        let double_red = BorderEdge {
            style: BorderLine::Double,
            color: "FFFF0000".to_string(),
        };
        assert_eq!(
            border.left,
            Some(BorderEdge {
                style: BorderLine::Thick,
                color: DEFAULT_BORDER_COLOR.to_string(),
            })
        );
        assert_eq!(border.right, Some(double_red.clone()));
        assert_eq!(border.top, Some(double_red.clone()));
        assert_eq!(border.bottom, Some(double_red));
    }

    #[test]
    fn border_edges_default_style_and_color() {
        let style = CellStyle {
            border: Some(BorderSpec::Edges(BorderEdges {
                top: Some(EdgeSpec::Line {
                    style: Some("squiggly".to_string()),
                    color: Some("00ff00".to_string()),
                }),
                ..Default::default()
            })),
            ..Default::default()
        };
        let border = resolve_border(&style).expect("border");
        assert_eq!(
            border.top,
            Some(BorderEdge {
                style: BorderLine::Thin,
                color: "FF00FF00".to_string(),
            })
        );
        assert_eq!(border.left, None);
        assert_eq!(border.bottom, None);
    }

    #[test]
    fn string_border_applies_to_all_edges() {
        let style = CellStyle {
            border: Some(BorderSpec::Style("medium".to_string())),
            ..Default::default()
        };
        let border = resolve_border(&style).expect("border");
        for (_, edge) in border.edges() {
            assert_eq!(edge.map(|e| e.style), Some(BorderLine::Medium));
        }
    }

    #[test]
    fn background_overrides_foreground() {
        let fill = resolve_fill(&CellStyle {
            foreground: Some("white".to_string()),
            background: Some("gray".to_string()),
            ..Default::default()
        });
        assert_eq!(
            fill,
            Some(Fill {
                foreground: Some("FFCCCCCC".to_string()),
                background: Some("FFCCCCCC".to_string()),
            })
        );
        assert_eq!(resolve_fill(&CellStyle::default()), None);
    }

    #[test]
    fn alignment_is_emitted_only_when_requested() {
        assert_eq!(resolve_alignment(&CellStyle::default()), None);
        let alignment = resolve_alignment(&CellStyle {
            halign: Some("CENTER".to_string()),
            valign: Some("middle".to_string()),
            wrap_text: Some(false),
            ..Default::default()
        })
        .expect("alignment");
        assert_eq!(alignment.horizontal, Some("center"));
        assert_eq!(alignment.vertical, None);
        assert_eq!(alignment.wrap_text, Some(false));
    }

    #[test]
    fn styles_xml_applies_index_offsets() -> Result<(), Box<dyn std::error::Error>> {
        let mut registry = StyleRegistry::new();
        registry.intern_style("GENERAL", None);
        registry.intern_style(
            "NUMBER",
            Some(&CellStyle {
                font_style: Some("bold".to_string()),
                background: Some("red".to_string()),
                border: Some(BorderSpec::Style("thin".to_string())),
                halign: Some("right".to_string()),
                ..Default::default()
            }),
        );
        let xml = registry.to_xml();
        let doc = roxmltree::Document::parse(&xml)?;
        let root = doc.root_element();

        let child = |name: &str| {
            root.children()
                .find(|n| n.has_tag_name(name))
                .ok_or_else(|| format!("{name} missing"))
        };
        assert_eq!(child("numFmts")?.attribute("count"), Some("3"));
        assert_eq!(child("fonts")?.attribute("count"), Some("3"));
        assert_eq!(child("fills")?.attribute("count"), Some("3"));
        assert_eq!(child("borders")?.attribute("count"), Some("2"));

        let xfs: Vec<_> = child("cellXfs")?
            .children()
            .filter(|n| n.has_tag_name("xf"))
            .collect();
        assert_eq!(xfs.len(), 3);
        assert_eq!(xfs[1].attribute("numFmtId"), Some("80"));
        assert_eq!(xfs[1].attribute("fontId"), Some("0"));
        assert_eq!(xfs[1].attribute("applyAlignment"), Some("false"));
        assert_eq!(xfs[2].attribute("numFmtId"), Some("81"));
        assert_eq!(xfs[2].attribute("fontId"), Some("2"));
        assert_eq!(xfs[2].attribute("fillId"), Some("2"));
        assert_eq!(xfs[2].attribute("borderId"), Some("1"));
        assert_eq!(xfs[2].attribute("applyAlignment"), Some("true"));
        let alignment = xfs[2]
            .children()
            .find(|n| n.has_tag_name("alignment"))
            .ok_or("alignment missing")?;
        assert_eq!(alignment.attribute("horizontal"), Some("right"));
        Ok(())
    }

    #[test]
    fn xf_indices_skip_the_default_slot() {
        assert_eq!(xf_index(0), 1);
        assert_eq!(xf_index(41), 42);
    }

    proptest! {
        #[test]
        fn interning_returns_first_index(keys in proptest::collection::vec(0u8..8, 1..40)) {
            let mut table = InternTable::new();
            let mut first_seen: HashMap<u8, usize> = HashMap::new();
            for key in keys {
                let idx = table.intern(key);
                let expected = *first_seen.entry(key).or_insert(idx);
                prop_assert_eq!(idx, expected);
                prop_assert_eq!(table.get(idx), Some(&key));
            }
            prop_assert_eq!(table.len(), first_seen.len());
        }
    }
}
