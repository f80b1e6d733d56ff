use std::collections::HashMap;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::archive::{PackageArchive, ZipPackageArchive};
use crate::buffered::DEFAULT_BUFFER_SIZE;
use crate::cell::CellValue;
use crate::error::{Result, XlsxStreamError};
use crate::parts;
use crate::sanitize::unique_sheet_names;
use crate::sheet::{HeaderOptions, RowOptions, Sheet, SheetLayout};
use crate::styles::StyleRegistry;

const DEFAULT_AUTHOR: &str = "Doc Author";
const DEFAULT_COLUMN_WIDTH: f64 = 12.0;
const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Workbook-wide settings.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkbookOptions {
    /// `dc:creator` of the document properties.
    pub author: String,
    /// Directory for worksheet scratch files; the system temp dir when `None`.
    pub temp_dir: Option<PathBuf>,
    /// Bytes buffered per worksheet before flushing to its scratch file.
    pub buffer_size: usize,
    /// Validate worksheet output as UTF-8 while streaming.
    pub check_utf8: bool,
    pub default_column_width: f64,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            temp_dir: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            check_utf8: false,
            default_column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

impl WorkbookOptions {
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_utf8_check(mut self, check_utf8: bool) -> Self {
        self.check_utf8 = check_utf8;
        self
    }

    pub fn with_default_column_width(mut self, width: f64) -> Self {
        self.default_column_width = width;
        self
    }
}

/// Streaming workbook writer.
///
/// Rows go straight to per-sheet scratch files, so memory use does not grow with the number
/// of rows. Sheets are created on first use and may be written in any interleaving; each one
/// is finalized when the workbook is written (or explicitly through
/// [`write_sheet`](Self::write_sheet)). Scratch files are removed when the workbook is dropped.
///
/// Calls naming an empty sheet, or a sheet that is already finalized, are logged and ignored.
#[derive(Debug)]
pub struct Workbook {
    // Sheets hold open scratch files and must drop before `scratch`.
    sheets: Vec<Sheet>,
    sheet_index: HashMap<String, usize>,
    styles: StyleRegistry,
    current_sheet: Option<String>,
    options: WorkbookOptions,
    scratch: TempDir,
}

impl Workbook {
    pub fn new() -> Result<Self> {
        Self::with_options(WorkbookOptions::default())
    }

    pub fn with_options(options: WorkbookOptions) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("xlsx-stream-");
        let scratch = match &options.temp_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        Ok(Self {
            sheets: Vec::new(),
            sheet_index: HashMap::new(),
            styles: StyleRegistry::new(),
            current_sheet: None,
            options,
            scratch,
        })
    }

    pub fn options(&self) -> &WorkbookOptions {
        &self.options
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.options.author = author.into();
    }

    pub fn author(&self) -> &str {
        &self.options.author
    }

    /// Directory holding the worksheet scratch files.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index.get(name).map(|&idx| &self.sheets[idx])
    }

    /// Sheet names in tab order, as passed by the caller.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Create `name` with a typed header.
    ///
    /// `header` pairs a column title with its type (`"string"`, `"integer"`, `"date"`,
    /// `"price"`, ... or a raw format code). The titles become row 1 unless
    /// [`HeaderOptions::suppress_row`] is set. Ignored when the name or header is empty, or
    /// when the sheet already exists.
    pub fn write_sheet_header(
        &mut self,
        name: &str,
        header: &[(&str, &str)],
        options: &HeaderOptions,
    ) -> Result<()> {
        if name.is_empty() || header.is_empty() {
            log::warn!("ignoring sheet header with empty sheet name or no columns");
            return Ok(());
        }
        if self.sheet_index.contains_key(name) {
            log::warn!("ignoring header for existing worksheet {name:?}");
            return Ok(());
        }

        let widths =
            options.resolved_widths(header.len(), self.options.default_column_width);
        let idx = self.open_sheet(name, &widths)?;
        self.sheets[idx].write_header(&mut self.styles, header, options)?;
        self.current_sheet = Some(name.to_string());
        Ok(())
    }

    /// Append a row to `name`, creating the sheet on first use.
    pub fn write_sheet_row(&mut self, name: &str, row: &[CellValue]) -> Result<()> {
        self.write_sheet_row_with_options(name, row, &RowOptions::default())
    }

    pub fn write_sheet_row_with_options(
        &mut self,
        name: &str,
        row: &[CellValue],
        options: &RowOptions,
    ) -> Result<()> {
        if name.is_empty() {
            log::warn!("ignoring row written to a sheet with an empty name");
            return Ok(());
        }
        let idx = self.sheet_or_open(name)?;
        self.sheets[idx].write_row(&mut self.styles, row, options)?;
        self.current_sheet = Some(name.to_string());
        Ok(())
    }

    /// Merge the inclusive 0-indexed range into one cell when the sheet is written.
    ///
    /// Only existing sheets take merge ranges; an unknown name is ignored.
    pub fn mark_merged_cell(
        &mut self,
        name: &str,
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) -> Result<()> {
        if name.is_empty() {
            log::warn!("ignoring merge range for a sheet with an empty name");
            return Ok(());
        }
        let Some(&idx) = self.sheet_index.get(name) else {
            log::warn!("ignoring merge range for unknown worksheet {name:?}");
            return Ok(());
        };
        self.sheets[idx].mark_merged(start_row, start_col, end_row, end_col);
        Ok(())
    }

    /// Write a whole sheet in one call and finalize it.
    ///
    /// An empty `name` means `Sheet1`; empty `rows` produce a single empty row. A non-empty
    /// `header` is written first, as with [`write_sheet_header`](Self::write_sheet_header).
    pub fn write_sheet(
        &mut self,
        rows: &[Vec<CellValue>],
        name: &str,
        header: &[(&str, &str)],
    ) -> Result<()> {
        let name = if name.is_empty() { DEFAULT_SHEET_NAME } else { name };
        if !header.is_empty() {
            self.write_sheet_header(name, header, &HeaderOptions::default())?;
        }
        if rows.is_empty() {
            self.write_sheet_row(name, &[CellValue::Empty])?;
        }
        for row in rows {
            self.write_sheet_row(name, row)?;
        }
        self.finalize_sheet(name)
    }

    /// Rows written to `name` so far, or to the most recently written sheet when `None`.
    /// Unknown sheets count zero rows.
    pub fn count_sheet_rows(&self, name: Option<&str>) -> u32 {
        name.filter(|n| !n.is_empty())
            .or(self.current_sheet.as_deref())
            .and_then(|n| self.sheet(n))
            .map_or(0, Sheet::row_count)
    }

    /// Close `name`; later rows and merge ranges for it are ignored.
    pub fn finalize_sheet(&mut self, name: &str) -> Result<()> {
        match self.sheet_index.get(name) {
            Some(&idx) => self.sheets[idx].finalize(),
            None => {
                log::warn!("cannot finalize unknown worksheet {name:?}");
                Ok(())
            }
        }
    }

    /// Write the package to `path`, replacing any existing file atomically.
    ///
    /// Fails without touching `path` when no sheet exists or the destination is not writable.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let result = self.check_has_sheets().and_then(|()| {
            crate::fs::ensure_writable(path)?;
            crate::fs::atomic_write(path, |file| self.write_package(file))
        });
        if let Err(err) = &result {
            log::error!("failed to write workbook to {}: {err}", path.display());
        }
        result
    }

    /// Write the package into memory.
    pub fn write_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to_writer(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to an arbitrary stream (e.g. stdout).
    pub fn write_to_writer(&mut self, mut output: impl Write) -> Result<()> {
        let result = self.check_has_sheets().and_then(|()| {
            let bytes = {
                let mut cursor = Cursor::new(Vec::new());
                self.write_package(&mut cursor)?;
                cursor.into_inner()
            };
            output.write_all(&bytes)?;
            output.flush()?;
            Ok(())
        });
        if let Err(err) = &result {
            log::error!("failed to write workbook: {err}");
        }
        result
    }

    /// Finalize every sheet and add all parts to `archive`.
    pub fn write_parts(&mut self, archive: &mut impl PackageArchive) -> Result<()> {
        self.check_has_sheets()?;
        for sheet in &mut self.sheets {
            sheet.finalize()?;
        }

        let xml_names: Vec<&str> = self.sheets.iter().map(Sheet::xml_name).collect();
        let sheet_names = unique_sheet_names(self.sheets.iter().map(Sheet::name));

        archive.add_bytes(parts::APP_XML_PATH, parts::app_xml().as_bytes())?;
        archive.add_bytes(
            parts::CORE_XML_PATH,
            parts::core_xml(&self.options.author, chrono::Utc::now()).as_bytes(),
        )?;
        archive.add_bytes(parts::ROOT_RELS_PATH, parts::root_rels_xml().as_bytes())?;
        for sheet in &self.sheets {
            archive.add_file(&parts::worksheet_path(sheet.xml_name()), sheet.path())?;
        }
        archive.add_bytes(
            parts::WORKBOOK_XML_PATH,
            parts::workbook_xml(&sheet_names).as_bytes(),
        )?;
        archive.add_bytes(parts::STYLES_XML_PATH, self.styles.to_xml().as_bytes())?;
        archive.add_bytes(
            parts::CONTENT_TYPES_PATH,
            parts::content_types_xml(&xml_names).as_bytes(),
        )?;
        archive.add_bytes(
            parts::WORKBOOK_RELS_PATH,
            parts::workbook_rels_xml(&xml_names).as_bytes(),
        )?;

        log::debug!(
            "wrote workbook with {} sheets and {} styles",
            self.sheets.len(),
            self.styles.style_count()
        );
        Ok(())
    }

    fn write_package<W: Write + Seek>(&mut self, output: W) -> Result<()> {
        let mut archive = ZipPackageArchive::new(output);
        self.write_parts(&mut archive)?;
        archive.finish()?;
        Ok(())
    }

    fn check_has_sheets(&self) -> Result<()> {
        if self.sheets.is_empty() {
            return Err(XlsxStreamError::NoSheets);
        }
        Ok(())
    }

    fn sheet_or_open(&mut self, name: &str) -> Result<usize> {
        match self.sheet_index.get(name) {
            Some(&idx) => Ok(idx),
            None => self.open_sheet(name, &[]),
        }
    }

    fn open_sheet(&mut self, name: &str, column_widths: &[f64]) -> Result<usize> {
        let idx = self.sheets.len();
        let layout = SheetLayout {
            tab_selected: idx == 0,
            column_widths,
            default_column_width: self.options.default_column_width,
            buffer_size: self.options.buffer_size,
            check_utf8: self.options.check_utf8,
        };
        let sheet = Sheet::open(
            name,
            format!("sheet{}.xml", idx + 1),
            self.scratch.path(),
            &layout,
        )?;
        self.sheets.push(sheet);
        self.sheet_index.insert(name.to_string(), idx);
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheets_are_created_on_first_use() {
        let mut workbook = Workbook::new().expect("workbook");
        workbook
            .write_sheet_row("B", &["x".into()])
            .expect("row");
        workbook
            .write_sheet_row("A", &["y".into()])
            .expect("row");
        workbook
            .write_sheet_row("B", &["z".into()])
            .expect("row");

        assert_eq!(workbook.sheet_names(), vec!["B", "A"]);
        assert_eq!(workbook.count_sheet_rows(Some("B")), 2);
        assert_eq!(workbook.count_sheet_rows(None), 2);
        assert_eq!(workbook.count_sheet_rows(Some("A")), 1);
        assert_eq!(workbook.count_sheet_rows(Some("missing")), 0);
        assert_eq!(workbook.sheet("A").map(Sheet::xml_name), Some("sheet2.xml"));
    }

    #[test]
    fn empty_sheet_names_are_ignored() {
        let mut workbook = Workbook::new().expect("workbook");
        workbook.write_sheet_row("", &["x".into()]).expect("row");
        workbook
            .write_sheet_header("", &[("a", "string")], &HeaderOptions::default())
            .expect("header");
        workbook.mark_merged_cell("", 0, 0, 1, 1).expect("merge");
        assert!(workbook.sheet_names().is_empty());
        assert_eq!(workbook.count_sheet_rows(None), 0);
    }

    #[test]
    fn header_for_existing_sheet_is_ignored() {
        let mut workbook = Workbook::new().expect("workbook");
        workbook.write_sheet_row("S", &["x".into()]).expect("row");
        workbook
            .write_sheet_header("S", &[("a", "string")], &HeaderOptions::default())
            .expect("header");
        assert_eq!(workbook.count_sheet_rows(Some("S")), 1);
        assert!(workbook.sheet("S").map_or(false, |s| s.columns()[0].kind
            == crate::NumberFormatKind::Auto));
    }

    #[test]
    fn merge_on_unknown_sheet_does_not_create_it() {
        let mut workbook = Workbook::new().expect("workbook");
        workbook.mark_merged_cell("Later", 0, 0, 1, 1).expect("merge");
        assert!(workbook.sheet_names().is_empty());

        workbook
            .write_sheet_header("Later", &[("a", "integer")], &HeaderOptions::default())
            .expect("header");
        let sheet = workbook.sheet("Later").expect("sheet from header");
        assert_eq!(sheet.columns().len(), 1);
        assert_eq!(sheet.columns()[0].kind, crate::NumberFormatKind::Numeric);
        assert!(sheet.merge_cells().is_empty());
    }

    #[test]
    fn write_sheet_defaults_name_and_rows() {
        let mut workbook = Workbook::new().expect("workbook");
        workbook.write_sheet(&[], "", &[]).expect("write sheet");
        let sheet = workbook.sheet("Sheet1").expect("default sheet");
        assert_eq!(sheet.row_count(), 1);
        assert!(sheet.is_finalized());
    }

    #[test]
    fn scratch_files_live_in_the_configured_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut workbook =
            Workbook::with_options(WorkbookOptions::default().with_temp_dir(dir.path()))
                .expect("workbook");
        workbook.write_sheet_row("S", &["x".into()]).expect("row");
        let scratch = workbook.scratch_dir().to_path_buf();
        assert!(scratch.starts_with(dir.path()));
        assert!(workbook
            .sheet("S")
            .map_or(false, |s| s.path().starts_with(&scratch)));

        drop(workbook);
        assert!(!scratch.exists());
    }

    #[test]
    fn no_sheets_is_an_error() {
        let mut workbook = Workbook::new().expect("workbook");
        assert!(matches!(
            workbook.write_to_vec(),
            Err(XlsxStreamError::NoSheets)
        ));
    }
}
