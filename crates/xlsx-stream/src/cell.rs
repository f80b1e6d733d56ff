//! Cell values and their `<c>` element encoding.

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::address::cell_ref;
use crate::date::{excel_serial, excel_serial_from_date, excel_serial_from_datetime};
use crate::number_format::NumberFormatKind;
use crate::styles::xf_index;
use crate::xml::escape_xml;

/// A single value handed to [`crate::Workbook::write_sheet_row`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    /// Text. A leading `=` makes it a formula.
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Textual form used when a typed value lands in a column that expects text.
    fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn serial(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Integer(i) => *i as f64,
            CellValue::Date(d) => excel_serial_from_date(*d),
            CellValue::DateTime(dt) => excel_serial_from_datetime(*dt),
            other => excel_serial(&other.to_text()),
        }
    }

    /// Serial for a date-typed column. NaN and infinities are not dates and map to `0`.
    fn date_serial(&self) -> f64 {
        let serial = self.serial();
        if serial.is_finite() {
            serial
        } else {
            0.0
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(i64::from(value))
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Integer(i64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

/// Whether an untyped string should be stored as a number.
///
/// `"0"`, digit runs without a leading zero, and signed decimals without a leading zero count
/// as numeric. `"007"` stays text so the zeros survive.
pub fn looks_numeric(value: &str) -> bool {
    static NUMERIC_RE: OnceLock<Regex> = OnceLock::new();
    let re = NUMERIC_RE
        .get_or_init(|| Regex::new(r"^-?[1-9][0-9]*(\.[0-9]+)?$").expect("valid regex"));

    value == "0"
        || (!value.starts_with('0')
            && !value.is_empty()
            && value.bytes().all(|b| b.is_ascii_digit()))
        || re.is_match(value)
}

/// Append the `<c>` element for one cell to `out`.
///
/// `style_idx` is the registry style index; the emitted `s` attribute is its `cellXfs` slot.
pub fn write_cell(
    out: &mut String,
    row: u32,
    col: u32,
    value: &CellValue,
    kind: NumberFormatKind,
    style_idx: usize,
) {
    let r = cell_ref(row, col);
    let s = xf_index(style_idx);

    if value.is_empty() {
        let _ = write!(out, r#"<c r="{r}" s="{s}"/>"#);
        return;
    }

    if let CellValue::String(text) = value {
        if text.starts_with('=') {
            let _ = write!(
                out,
                r#"<c r="{r}" s="{s}" t="s"><f>{}</f></c>"#,
                escape_xml(text)
            );
            return;
        }
    }

    match kind {
        NumberFormatKind::Date => {
            let _ = write!(
                out,
                r#"<c r="{r}" s="{s}" t="n"><v>{}</v></c>"#,
                value.date_serial().trunc() as i64
            );
        }
        NumberFormatKind::DateTime => {
            let _ = write!(
                out,
                r#"<c r="{r}" s="{s}" t="n"><v>{}</v></c>"#,
                value.date_serial()
            );
        }
        NumberFormatKind::Numeric => write_typed(out, &r, s, value, true),
        NumberFormatKind::String => write_inline_string(out, &r, s, &value.to_text()),
        NumberFormatKind::Auto => {
            let numeric = match value {
                CellValue::String(text) => looks_numeric(text),
                _ => true,
            };
            write_typed(out, &r, s, value, numeric);
        }
    }
}

/// Encode one cell into a fresh string.
pub fn encode_cell(
    row: u32,
    col: u32,
    value: &CellValue,
    kind: NumberFormatKind,
    style_idx: usize,
) -> String {
    let mut out = String::new();
    write_cell(&mut out, row, col, value, kind, style_idx);
    out
}

fn write_typed(out: &mut String, r: &str, s: usize, value: &CellValue, numeric: bool) {
    match value {
        CellValue::Boolean(b) => {
            let _ = write!(out, r#"<c r="{r}" s="{s}" t="b"><v>{}</v></c>"#, u8::from(*b));
        }
        CellValue::Number(n) if !n.is_finite() => write_inline_string(out, r, s, &n.to_string()),
        CellValue::Date(_) | CellValue::DateTime(_) => {
            let _ = write!(out, r#"<c r="{r}" s="{s}" t="n"><v>{}</v></c>"#, value.serial());
        }
        _ if numeric => {
            let _ = write!(
                out,
                r#"<c r="{r}" s="{s}" t="n"><v>{}</v></c>"#,
                escape_xml(&value.to_text())
            );
        }
        _ => write_inline_string(out, r, s, &value.to_text()),
    }
}

fn write_inline_string(out: &mut String, r: &str, s: usize, text: &str) {
    let _ = write!(
        out,
        r#"<c r="{r}" s="{s}" t="inlineStr"><is><t>{}</t></is></c>"#,
        escape_xml(text)
    );
}
