//! One worksheet being streamed to its backing file.
//!
//! A sheet is opened on first use, appended to row by row and finalized exactly once. The
//! `<dimension>` element near the top of the part cannot be known until the last row, so
//! [`Sheet::open`] reserves room for the largest possible range and [`Sheet::finalize`]
//! overwrites that region in place, padding with spaces so the file length never changes.

use std::fmt::Write as _;
use std::path::Path;

use tempfile::TempPath;

use crate::address::{cell_ref, range_ref, MAX_COLS, MAX_ROWS};
use crate::buffered::BufferedPatchWriter;
use crate::cell::{write_cell, CellValue};
use crate::error::Result;
use crate::number_format::{resolve_header_type, NumberFormatKind, GENERAL};
use crate::style::StyleSpec;
use crate::styles::StyleRegistry;

const SHEET_PROLOGUE: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
);

/// Column count covered by the trailing default-width `<col>` element.
const COLS_SPAN: usize = 1024;
const DEFAULT_ROW_HEIGHT: f64 = 12.1;

/// Options for [`crate::Workbook::write_sheet_header`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderOptions {
    /// Establish column types without emitting the title row.
    pub suppress_row: bool,
    /// Width applied to every declared column.
    pub width: Option<f64>,
    /// Per-column widths; takes precedence over `width` when non-empty.
    pub column_widths: Vec<f64>,
    /// Style of the title cells.
    pub style: Option<StyleSpec>,
}

impl HeaderOptions {
    pub fn suppress_row(mut self, suppress_row: bool) -> Self {
        self.suppress_row = suppress_row;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_column_widths(mut self, widths: Vec<f64>) -> Self {
        self.column_widths = widths;
        self
    }

    pub fn with_style(mut self, style: impl Into<StyleSpec>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Width for each of `columns` columns, falling back to `default_width` for missing or
    /// non-positive values.
    pub(crate) fn resolved_widths(&self, columns: usize, default_width: f64) -> Vec<f64> {
        (0..columns)
            .map(|i| {
                let width = if self.column_widths.is_empty() {
                    self.width
                } else {
                    self.column_widths.get(i).copied()
                };
                width
                    .filter(|w| w.is_finite() && *w > 0.0)
                    .unwrap_or(default_width)
            })
            .collect()
    }
}

/// Options for a single row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowOptions {
    /// Custom row height in points.
    pub height: Option<f64>,
    pub hidden: bool,
    pub collapsed: bool,
    /// Overrides the column default styles for this row.
    pub style: Option<StyleSpec>,
}

impl RowOptions {
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn with_style(mut self, style: impl Into<StyleSpec>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// Typing of one column, fixed by the header (or `GENERAL` when a row widens the sheet).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub number_format: String,
    pub kind: NumberFormatKind,
    /// Registry style index used by cells without a row-level style.
    pub default_style: usize,
}

impl Column {
    fn new(registry: &mut StyleRegistry, header_type: &str) -> Self {
        let (number_format, kind) = resolve_header_type(header_type);
        let default_style = registry.intern_style(&number_format, None);
        Self {
            number_format,
            kind,
            default_style,
        }
    }
}

/// Layout fixed when a sheet is opened.
#[derive(Clone, Debug)]
pub(crate) struct SheetLayout<'a> {
    pub tab_selected: bool,
    pub column_widths: &'a [f64],
    pub default_column_width: f64,
    pub buffer_size: usize,
    pub check_utf8: bool,
}

#[derive(Debug)]
pub struct Sheet {
    name: String,
    xml_name: String,
    writer: BufferedPatchWriter,
    temp_path: TempPath,
    row_count: u32,
    columns: Vec<Column>,
    merge_cells: Vec<String>,
    dimension_start: u64,
    dimension_end: u64,
    finalized: bool,
}

impl Sheet {
    /// Create the backing file in `dir` and write everything up to `<sheetData>`.
    pub(crate) fn open(
        name: &str,
        xml_name: String,
        dir: &Path,
        layout: &SheetLayout<'_>,
    ) -> Result<Self> {
        let (file, temp_path) = tempfile::Builder::new()
            .prefix("xlsx_writer_")
            .suffix(".xml")
            .tempfile_in(dir)?
            .into_parts();
        let mut writer = BufferedPatchWriter::new(file)
            .with_threshold(layout.buffer_size)
            .with_utf8_check(layout.check_utf8);

        writer.write(SHEET_PROLOGUE)?;
        let dimension_start = writer.tell()?;
        writer.write(placeholder_dimension())?;
        writer.write("\n")?;
        let dimension_end = writer.tell()?;

        let mut head = String::new();
        let _ = write!(
            head,
            r#"<sheetViews><sheetView tabSelected="{}" workbookViewId="0"><selection activeCell="A1" sqref="A1"/></sheetView></sheetViews>"#,
            layout.tab_selected
        );
        head.push('\n');
        head.push_str("<cols>");
        for (i, width) in layout.column_widths.iter().enumerate() {
            let _ = write!(
                head,
                r#"<col collapsed="false" hidden="false" max="{n}" min="{n}" style="0" width="{width}"/>"#,
                n = i + 1
            );
        }
        let _ = write!(
            head,
            r#"<col collapsed="false" hidden="false" max="{COLS_SPAN}" min="{}" style="0" width="{}"/>"#,
            layout.column_widths.len() + 1,
            layout.default_column_width
        );
        head.push_str("</cols>\n<sheetData>");
        writer.write(head)?;

        log::debug!("opened worksheet {name:?} as {xml_name}");

        Ok(Self {
            name: name.to_string(),
            xml_name,
            writer,
            temp_path,
            row_count: 0,
            columns: Vec::new(),
            merge_cells: Vec::new(),
            dimension_start,
            dimension_end,
            finalized: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Part file name inside `xl/worksheets/` (e.g. `sheet1.xml`).
    pub fn xml_name(&self) -> &str {
        &self.xml_name
    }

    /// Backing file. Complete only after [`finalize`](Self::finalize).
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn merge_cells(&self) -> &[String] {
        &self.merge_cells
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Fix column typing from `(title, type)` pairs and emit the title row unless suppressed.
    pub(crate) fn write_header(
        &mut self,
        registry: &mut StyleRegistry,
        header: &[(&str, &str)],
        options: &HeaderOptions,
    ) -> Result<()> {
        if header.len() > MAX_COLS as usize {
            log::warn!(
                "worksheet {:?} header has {} columns; keeping the first {MAX_COLS}",
                self.name,
                header.len()
            );
        }
        let header = &header[..header.len().min(MAX_COLS as usize)];
        self.columns = header
            .iter()
            .map(|(_, header_type)| Column::new(registry, header_type))
            .collect();

        if options.suppress_row {
            return Ok(());
        }

        let mut row = String::new();
        push_row_start(&mut row, self.row_count + 1, &RowOptions::default());
        for (c, (title, _)) in header.iter().enumerate() {
            let style_idx = match &options.style {
                Some(spec) => registry.intern_style(GENERAL, Some(&spec.for_column(c))),
                None => self.columns[c].default_style,
            };
            write_cell(
                &mut row,
                self.row_count,
                c as u32,
                &CellValue::String((*title).to_string()),
                NumberFormatKind::String,
                style_idx,
            );
        }
        row.push_str("</row>\n");
        self.writer.write(row)?;
        self.row_count += 1;
        Ok(())
    }

    /// Append one `<row>`, widening the column list with `GENERAL` columns when needed.
    pub(crate) fn write_row(
        &mut self,
        registry: &mut StyleRegistry,
        values: &[CellValue],
        options: &RowOptions,
    ) -> Result<()> {
        if self.finalized {
            log::warn!(
                "ignoring row written to finalized worksheet {:?}",
                self.name
            );
            return Ok(());
        }
        if self.row_count >= MAX_ROWS {
            log::warn!(
                "worksheet {:?} is full ({MAX_ROWS} rows); row dropped",
                self.name
            );
            return Ok(());
        }

        if values.len() > MAX_COLS as usize {
            log::warn!(
                "worksheet {:?} row {} has {} cells; keeping the first {MAX_COLS}",
                self.name,
                self.row_count + 1,
                values.len()
            );
        }
        let values = &values[..values.len().min(MAX_COLS as usize)];
        while self.columns.len() < values.len() {
            self.columns.push(Column::new(registry, GENERAL));
        }

        let mut row = String::new();
        push_row_start(&mut row, self.row_count + 1, options);
        for (c, value) in values.iter().enumerate() {
            let column = &self.columns[c];
            let style_idx = match &options.style {
                Some(spec) => {
                    registry.intern_style(&column.number_format, Some(&spec.for_column(c)))
                }
                None => column.default_style,
            };
            write_cell(
                &mut row,
                self.row_count,
                c as u32,
                value,
                column.kind,
                style_idx,
            );
        }
        row.push_str("</row>\n");
        self.writer.write(row)?;
        self.row_count += 1;
        Ok(())
    }

    pub(crate) fn mark_merged(
        &mut self,
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) {
        if self.finalized {
            log::warn!(
                "ignoring merge range on finalized worksheet {:?}",
                self.name
            );
            return;
        }
        self.merge_cells.push(format!(
            "{}:{}",
            cell_ref(start_row, start_col),
            cell_ref(end_row, end_col)
        ));
    }

    /// Close the sheet: emit trailing elements, patch the dimension and release the file.
    pub(crate) fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }

        let mut tail = String::from("</sheetData>");
        if !self.merge_cells.is_empty() {
            tail.push_str("<mergeCells>");
            for range in &self.merge_cells {
                let _ = write!(tail, r#"<mergeCell ref="{range}"/>"#);
            }
            tail.push_str("</mergeCells>");
        }
        tail.push_str("</worksheet>");
        self.writer.write(tail)?;

        let dimension = self.dimension_patch();
        self.writer.seek(self.dimension_start)?;
        self.writer.write(dimension)?;
        self.writer.close()?;
        self.finalized = true;

        log::debug!(
            "finalized worksheet {:?}: {} rows, {} columns",
            self.name,
            self.row_count,
            self.columns.len()
        );
        Ok(())
    }

    /// The used-range `<dimension>` element padded to the reserved width.
    fn dimension_patch(&self) -> String {
        let reserved = usize::try_from(self.dimension_end - self.dimension_start).unwrap_or(0);
        let last_row = self.row_count.saturating_sub(1);
        let last_col = u32::try_from(self.columns.len())
            .unwrap_or(u32::MAX)
            .saturating_sub(1);
        let mut tag = format!(
            r#"<dimension ref="{}"/>"#,
            range_ref(0, 0, last_row, last_col)
        );
        if tag.len() > reserved {
            log::warn!(
                "used range of worksheet {:?} exceeds the reserved dimension; keeping the placeholder",
                self.name
            );
            tag = placeholder_dimension();
        }
        let padding = reserved.saturating_sub(tag.len());
        tag.extend(std::iter::repeat(' ').take(padding));
        tag
    }
}

/// Widest `<dimension>` a sheet can need: one past the last addressable cell.
fn placeholder_dimension() -> String {
    format!(r#"<dimension ref="A1:{}"/>"#, cell_ref(MAX_ROWS, MAX_COLS))
}

fn push_row_start(out: &mut String, r: u32, options: &RowOptions) {
    let _ = write!(
        out,
        r#"<row collapsed="{}" customFormat="false" customHeight="{}" hidden="{}" ht="{}" outlineLevel="0" r="{r}">"#,
        options.collapsed,
        options.height.is_some(),
        options.hidden,
        options.height.unwrap_or(DEFAULT_ROW_HEIGHT),
    );
}
