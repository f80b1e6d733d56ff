//! Filtering of user-supplied sheet names and file names.

use std::collections::HashSet;

/// Longest sheet name spreadsheet applications accept.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Make `name` a legal sheet tab name.
///
/// `\ / ? * : [ ]` become spaces, the result is cut to 31 characters and trimmed of whitespace
/// and single quotes. A name left empty becomes `Sheet{position}`.
pub fn sanitize_sheet_name(name: &str, position: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | '?' | '*' | ':' | '[' | ']' => ' ',
            other => other,
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let trimmed = replaced.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        format!("Sheet{position}")
    } else {
        trimmed.to_string()
    }
}

/// Sanitize every name in tab order and suffix repeats with ` (2)`, ` (3)`, ...
///
/// Tab names compare case-insensitively, and a suffixed name still fits in 31 characters.
pub fn unique_sheet_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = sanitize_sheet_name(name, i + 1);
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.to_lowercase()) {
                let suffix = format!(" ({n})");
                let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
                let stem: String = base.chars().take(keep).collect();
                candidate = format!("{}{suffix}", stem.trim_end());
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Strip characters that are invalid in file names on common platforms.
///
/// The writer never derives file names itself; this is for callers that build an output
/// path from user input.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| {
            !c.is_ascii_control()
                && !matches!(c, '<' | '>' | '?' | '"' | ':' | '|' | '\\' | '/' | '*' | '&')
        })
        .collect()
}
