/// Characters XML 1.0 does not allow anywhere in a document
fn is_forbidden_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Escapes character data
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            c if is_forbidden_char(c) => {}
            c => result.push(c),
        }
    }

    result
}

/// Escapes a double-quoted attribute value
pub fn escape_attribute(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
