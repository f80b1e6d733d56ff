//! A1-style cell addressing.
//!
//! Rows and columns are **0-indexed** throughout the crate:
//! - `row = 0` is spreadsheet row `1`
//! - `col = 0` is spreadsheet column `A`

/// Largest row count a worksheet may hold.
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column count a worksheet may hold.
pub const MAX_COLS: u32 = 16_384;

/// Convert a 0-indexed column number to its letters (`0 -> A`, `26 -> AA`).
pub fn column_name(col: u32) -> String {
    // Bijective base-26: there is no zero digit, so shift to 1-based first.
    let mut n = u64::from(col) + 1;
    let mut out = Vec::<u8>::with_capacity(3);
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Convert a 0-indexed `(row, col)` pair to A1 notation (e.g. `A1`, `AA42`).
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", column_name(col), u64::from(row) + 1)
}

/// Render an inclusive range such as `A1:C3`.
pub fn range_ref(first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> String {
    format!(
        "{}:{}",
        cell_ref(first_row, first_col),
        cell_ref(last_row, last_col)
    )
}
