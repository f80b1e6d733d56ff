//! Row-at-a-time XLSX writer.
//!
//! Rows are encoded as soon as they are written and appended to per-sheet scratch files, so
//! memory use stays flat no matter how many rows a sheet has. The pieces:
//!
//! - [`Workbook`]: the public entry point. Creates sheets on first use, interns styles and
//!   assembles the final package.
//! - [`Sheet`]: one worksheet's state (`open -> finalized`), including the in-place
//!   `<dimension>` patch applied when the sheet is closed.
//! - [`BufferedPatchWriter`]: buffered appends plus a single same-length overwrite.
//! - [`StyleRegistry`]: deduplicates `(number format, style)` pairs and renders `styles.xml`.
//! - [`number_format`], [`date`], [`cell`]: pure helpers for column typing, serial dates and
//!   `<c>` element encoding.
//!
//! ```no_run
//! use xlsx_stream::{CellValue, HeaderOptions, Workbook};
//!
//! # fn main() -> xlsx_stream::Result<()> {
//! let mut workbook = Workbook::new()?;
//! workbook.write_sheet_header(
//!     "Sales",
//!     &[("Name", "string"), ("Qty", "integer"), ("Day", "date")],
//!     &HeaderOptions::default(),
//! )?;
//! workbook.write_sheet_row(
//!     "Sales",
//!     &[CellValue::from("Alice"), CellValue::Integer(5), CellValue::from("2024-01-15")],
//! )?;
//! workbook.write_to_file("sales.xlsx")?;
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod archive;
pub mod buffered;
pub mod cell;
pub mod date;
mod error;
pub mod fs;
pub mod number_format;
pub mod parts;
pub mod sanitize;
pub mod sheet;
pub mod style;
pub mod styles;
mod workbook;
pub mod xml;

pub use address::{cell_ref, column_name, range_ref};
pub use archive::{PackageArchive, ZipPackageArchive};
pub use buffered::BufferedPatchWriter;
pub use cell::CellValue;
pub use date::excel_serial;
pub use error::{Result, XlsxStreamError};
pub use number_format::{classify_number_format, standardize_number_format, NumberFormatKind};
pub use sheet::{Column, HeaderOptions, RowOptions, Sheet};
pub use style::{BorderEdges, BorderSpec, CellStyle, EdgeSpec, StyleSpec};
pub use styles::{ResolvedStyles, StyleRegistry};
pub use workbook::{Workbook, WorkbookOptions};
