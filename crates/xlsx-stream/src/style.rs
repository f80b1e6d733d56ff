//! Caller-facing cell style descriptors.
//!
//! A [`CellStyle`] is the unresolved form of a style: every field is optional and values are
//! free text (`"thin"`, `"red"`, `"bold italic"`). The registry in [`crate::styles`] turns
//! descriptors into deduplicated font/fill/border records when the workbook is written.
//!
//! The JSON shape accepted by [`CellStyle::from_json`] uses the historical key names
//! (`frontgroud`, `backgroud`, `font-size`, ...); unknown keys are ignored.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Style attributes for one cell (or a whole row/header when shared).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderSpec>,
    /// Fill foreground color.
    #[serde(
        default,
        rename = "frontgroud",
        alias = "foreground",
        skip_serializing_if = "Option::is_none"
    )]
    pub foreground: Option<String>,
    /// Fill background color. Solid fills paint with the foreground color, so setting this
    /// also replaces the foreground.
    #[serde(
        default,
        rename = "backgroud",
        alias = "background",
        skip_serializing_if = "Option::is_none"
    )]
    pub background: Option<String>,
    /// One of `general`, `left`, `right`, `justify`, `center`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halign: Option<String>,
    /// One of `bottom`, `center`, `distributed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
    #[serde(default, rename = "font-size", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, rename = "font-family", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Free text; `bold`, `italic`, `strike` and `underline` are recognized anywhere in it.
    #[serde(default, rename = "font-style", skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, rename = "font-color", skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

/// Border request: either one line style for all four edges or a per-edge map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BorderSpec {
    Style(String),
    Edges(BorderEdges),
}

/// Per-edge border request.
///
/// A bare `style`/`color` at this level is shorthand for every edge that is not listed
/// explicitly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderEdges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<EdgeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<EdgeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<EdgeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<EdgeSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeSpec {
    Style(String),
    Line {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

/// Styles applied to the cells of one row or header: shared, or one entry per column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSpec {
    PerColumn(Vec<CellStyle>),
    All(CellStyle),
}

impl StyleSpec {
    /// Style for column `col`; a missing per-column entry is an empty style.
    pub fn for_column(&self, col: usize) -> CellStyle {
        match self {
            StyleSpec::All(style) => style.clone(),
            StyleSpec::PerColumn(styles) => styles.get(col).cloned().unwrap_or_default(),
        }
    }
}

impl From<CellStyle> for StyleSpec {
    fn from(style: CellStyle) -> Self {
        StyleSpec::All(style)
    }
}

impl From<Vec<CellStyle>> for StyleSpec {
    fn from(styles: Vec<CellStyle>) -> Self {
        StyleSpec::PerColumn(styles)
    }
}

impl CellStyle {
    /// Parse the JSON style shape (`{"font-style": "bold", "border": "thin", ...}`).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        *self == CellStyle::default()
    }

    /// Content key used for deduplication.
    ///
    /// Styles that resolve identically share a key: colors are standardized, keyword fields
    /// are trimmed and lowercased, and serialization uses a fixed field order.
    pub fn canonical_key(&self) -> String {
        let canonical = self.canonicalized();
        serde_json::to_string(&canonical).unwrap_or_default()
    }

    fn canonicalized(&self) -> CellStyle {
        CellStyle {
            border: self.border.as_ref().map(BorderSpec::canonicalized),
            foreground: self.foreground.as_deref().map(canonical_color),
            background: self.background.as_deref().map(canonical_color),
            halign: self.halign.as_deref().map(canonical_keyword),
            valign: self.valign.as_deref().map(canonical_keyword),
            wrap_text: self.wrap_text,
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            font_style: self.font_style.as_deref().map(canonical_keyword),
            font_color: self.font_color.as_deref().map(canonical_color),
        }
    }
}

impl BorderSpec {
    fn canonicalized(&self) -> BorderSpec {
        match self {
            BorderSpec::Style(style) => BorderSpec::Style(style.trim().to_string()),
            BorderSpec::Edges(edges) => BorderSpec::Edges(BorderEdges {
                style: edges.style.as_deref().map(|s| s.trim().to_string()),
                color: edges.color.as_deref().map(canonical_color),
                left: edges.left.as_ref().map(EdgeSpec::canonicalized),
                right: edges.right.as_ref().map(EdgeSpec::canonicalized),
                top: edges.top.as_ref().map(EdgeSpec::canonicalized),
                bottom: edges.bottom.as_ref().map(EdgeSpec::canonicalized),
            }),
        }
    }
}

impl EdgeSpec {
    fn canonicalized(&self) -> EdgeSpec {
        match self {
            EdgeSpec::Style(style) => EdgeSpec::Style(style.trim().to_string()),
            EdgeSpec::Line { style, color } => EdgeSpec::Line {
                style: style.as_deref().map(|s| s.trim().to_string()),
                color: color.as_deref().map(canonical_color),
            },
        }
    }
}

fn canonical_keyword(value: &str) -> String {
    value.trim().to_lowercase()
}

fn canonical_color(value: &str) -> String {
    standardize_color(value).unwrap_or_default()
}

/// Normalize a color to an 8-digit ARGB code.
///
/// `white`, `black`, `gray` and `red` map to fixed values; anything else is taken as a literal
/// code, uppercased and cut to 8 characters. Six-digit codes gain a fully opaque `FF` alpha.
/// Returns `None` for blank input.
pub fn standardize_color(value: &str) -> Option<String> {
    let upper: String = value.trim().to_uppercase().chars().take(8).collect();
    let color = match upper.to_lowercase().as_str() {
        "white" => "FFFFFF".to_string(),
        "black" => "000000".to_string(),
        "gray" => "CCCCCC".to_string(),
        "red" => "FF0000".to_string(),
        _ => upper,
    };
    match color.chars().count() {
        0 => None,
        6 => Some(format!("FF{color}")),
        _ => Some(color),
    }
}
