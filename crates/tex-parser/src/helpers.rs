//! Canonicalization helpers used when producing display text for a parsed
//! region (spec.md §4.2).

/// Trims leading/trailing ASCII and Unicode whitespace from `text`.
pub fn trim(text: &str) -> &str {
    text.trim()
}

/// Removes `%`-comments from `text`, returning a canonical form suitable for
/// display. A `%` escaped as `\%` is a literal percent sign, not a comment
/// start. The terminating newline of a comment is preserved.
pub fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'%') => {
                out.push_str("\\%");
                i += 2;
            }
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            _ => {
                let ch = text[i..].chars().next().unwrap_or(' ');
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    out
}

/// True if `pos` lies inside horizontal whitespace on the same line — the
/// byte immediately before `pos` is a space or tab.
pub fn blank(text: &str, pos: usize) -> bool {
    let bytes = text.as_bytes();
    if pos == 0 || pos > bytes.len() {
        return false;
    }
    matches!(bytes[pos - 1], b' ' | b'\t')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        assert_eq!(trim("  hi  "), "hi");
    }

    #[test]
    fn strips_comments_keeping_newline() {
        let text = "before % a comment\nafter";
        assert_eq!(strip_comments(text), "before \nafter");
    }

    #[test]
    fn escaped_percent_is_not_a_comment() {
        let text = r"100\% done % note";
        assert_eq!(strip_comments(text), r"100\% done ");
    }

    #[test]
    fn blank_detects_preceding_space() {
        assert!(blank("a  b", 2));
        assert!(!blank("a  b", 0));
        assert!(!blank("ab", 1));
    }
}
