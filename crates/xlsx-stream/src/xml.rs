use std::borrow::Cow;

/// Escape a value for use in XML text or attribute content.
///
/// The five predefined entities are escaped, and C0 control characters that
/// are not allowed in XML 1.0 (everything below `0x20` except tab, LF and CR,
/// plus DEL) are replaced by a space.
pub fn escape_xml(value: &str) -> Cow<'_, str> {
    let escaped = quick_xml::escape::escape(value);
    if !escaped.chars().any(is_forbidden_control) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .chars()
            .map(|c| if is_forbidden_control(c) { ' ' } else { c })
            .collect(),
    )
}

fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}
