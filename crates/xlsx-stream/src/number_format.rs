//! Column "header types": friendly aliases, format-code escaping and semantic classification.

use std::sync::OnceLock;

use regex::Regex;

/// Format code used for columns without a declared type.
pub const GENERAL: &str = "GENERAL";

/// How cell values in a column are interpreted when rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum NumberFormatKind {
    /// Decide per value between number and text.
    #[default]
    Auto,
    String,
    Numeric,
    /// Whole-day serial numbers.
    Date,
    /// Serial numbers with a time-of-day fraction.
    DateTime,
}

/// Map a friendly alias (`string`, `integer`, `date`, `dollar`, ...) to its format code and
/// escape literal characters the format syntax would otherwise interpret.
///
/// Unknown input is taken as a raw format code. Spaces, hyphens and parentheses outside
/// `[...]` and `"..."` runs are backslash-escaped unless they follow a `_` padding marker.
pub fn standardize_number_format(format: &str) -> String {
    let code = match format {
        "string" => "STRING",
        "integer" | "number" => "NUMBER",
        "date" => "YYYY-MM-DD",
        "datetime" => "YYYY-MM-DD HH:MM:SS",
        "price" => "#,##0.00",
        "dollar" | "money" => "[$$-1009]#,##0.00;[RED]-[$$-1009]#,##0.00",
        "euro" => "#,##0.00 [$€-407];[RED]-#,##0.00 [$€-407]",
        other => other,
    };

    let mut escaped = String::with_capacity(code.len() + 8);
    let mut ignore_until: Option<char> = None;
    let mut prev: Option<char> = None;
    for c in code.chars() {
        match ignore_until {
            None if c == '[' => ignore_until = Some(']'),
            None if c == '"' => ignore_until = Some('"'),
            Some(end) if end == c => ignore_until = None,
            _ => {}
        }
        if ignore_until.is_none() && matches!(c, ' ' | '-' | '(' | ')') && prev != Some('_') {
            escaped.push('\\');
        }
        escaped.push(c);
        prev = Some(c);
    }
    escaped
}

/// Ordered classification rules, evaluated top to bottom.
///
/// Time patterns come before date patterns (a bare `M` is a month only when it is not part of
/// `H:MM` or `MM:SS`), and date patterns come before numeric markers.
pub const CLASSIFICATION_RULES: &[(&str, NumberFormatKind)] = &[
    (r"^GENERAL$", NumberFormatKind::Auto),
    (r"^STRING$", NumberFormatKind::String),
    (r"^NUMBER$", NumberFormatKind::Numeric),
    (r"H{1,2}:M{1,2}", NumberFormatKind::DateTime),
    (r"M{1,2}:S{1,2}", NumberFormatKind::DateTime),
    (r"Y{2,4}", NumberFormatKind::Date),
    (r"D{1,2}", NumberFormatKind::Date),
    (r"M{1,2}", NumberFormatKind::Date),
    (r"\$", NumberFormatKind::Numeric),
    (r"%", NumberFormatKind::Numeric),
    (r"0", NumberFormatKind::Numeric),
];

/// Classify a standardized format code into the kind that governs cell rendering.
pub fn classify_number_format(code: &str) -> NumberFormatKind {
    static COLOR_RE: OnceLock<Regex> = OnceLock::new();
    static RULES: OnceLock<Vec<(Regex, NumberFormatKind)>> = OnceLock::new();

    let color_re = COLOR_RE.get_or_init(|| {
        Regex::new(r"(?i)\[(Black|Blue|Cyan|Green|Magenta|Red|White|Yellow)\]")
            .expect("valid regex")
    });
    let rules = RULES.get_or_init(|| {
        CLASSIFICATION_RULES
            .iter()
            .map(|(pattern, kind)| (Regex::new(pattern).expect("valid regex"), *kind))
            .collect()
    });

    let code = color_re.replace_all(code, "");
    rules
        .iter()
        .find(|(re, _)| re.is_match(&code))
        .map_or(NumberFormatKind::Auto, |(_, kind)| *kind)
}

/// Standardize a header type and classify it in one step.
pub fn resolve_header_type(header_type: &str) -> (String, NumberFormatKind) {
    let code = standardize_number_format(header_type);
    let kind = classify_number_format(&code);
    (code, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aliases_resolve_to_format_codes() {
        assert_eq!(standardize_number_format("string"), "STRING");
        assert_eq!(standardize_number_format("integer"), "NUMBER");
        assert_eq!(standardize_number_format("number"), "NUMBER");
        assert_eq!(standardize_number_format("date"), r"YYYY\-MM\-DD");
        assert_eq!(
            standardize_number_format("datetime"),
            r"YYYY\-MM\-DD\ HH:MM:SS"
        );
        assert_eq!(standardize_number_format("price"), "#,##0.00");
        assert_eq!(
            standardize_number_format("money"),
            standardize_number_format("dollar")
        );
        assert_eq!(
            standardize_number_format("dollar"),
            r"[$$-1009]#,##0.00;[RED]\-[$$-1009]#,##0.00"
        );
        assert_eq!(
            standardize_number_format("euro"),
            r"#,##0.00\ [$€-407];[RED]\-#,##0.00\ [$€-407]"
        );
    }

    #[test]
    fn unknown_codes_pass_through_with_escaping() {
        assert_eq!(standardize_number_format("0.00"), "0.00");
        assert_eq!(standardize_number_format("(0)"), r"\(0\)");
        assert_eq!(standardize_number_format(r#""a b" 0"#), r#""a b"\ 0"#);
        assert_eq!(standardize_number_format("_(0_)"), r"_(0_)");
    }

    #[test]
    fn classifies_exact_keywords() {
        assert_eq!(classify_number_format("GENERAL"), NumberFormatKind::Auto);
        assert_eq!(classify_number_format("STRING"), NumberFormatKind::String);
        assert_eq!(classify_number_format("NUMBER"), NumberFormatKind::Numeric);
    }

    #[test]
    fn classifies_time_patterns_before_dates() {
        assert_eq!(classify_number_format("HH:MM"), NumberFormatKind::DateTime);
        assert_eq!(classify_number_format("MM:SS"), NumberFormatKind::DateTime);
        assert_eq!(
            classify_number_format(r"YYYY\-MM\-DD\ HH:MM:SS"),
            NumberFormatKind::DateTime
        );
    }

    #[test]
    fn classifies_date_patterns() {
        assert_eq!(classify_number_format("YY"), NumberFormatKind::Date);
        assert_eq!(classify_number_format(r"YYYY\-MM\-DD"), NumberFormatKind::Date);
        assert_eq!(classify_number_format("D"), NumberFormatKind::Date);
        assert_eq!(classify_number_format("MMM"), NumberFormatKind::Date);
    }

    #[test]
    fn classifies_numeric_markers() {
        assert_eq!(classify_number_format("#,##0.00"), NumberFormatKind::Numeric);
        assert_eq!(classify_number_format("0%"), NumberFormatKind::Numeric);
        assert_eq!(
            classify_number_format(&standardize_number_format("dollar")),
            NumberFormatKind::Numeric
        );
        assert_eq!(classify_number_format("#"), NumberFormatKind::Auto);
    }

    #[test]
    fn color_directives_are_ignored() {
        assert_eq!(classify_number_format("[Red]GENERAL"), NumberFormatKind::Auto);
        assert_eq!(classify_number_format("[BLUE]D"), NumberFormatKind::Date);
    }

    #[test]
    fn header_types_resolve_in_one_step() {
        assert_eq!(
            resolve_header_type("integer"),
            ("NUMBER".to_string(), NumberFormatKind::Numeric)
        );
        assert_eq!(
            resolve_header_type("GENERAL"),
            ("GENERAL".to_string(), NumberFormatKind::Auto)
        );
    }
}
