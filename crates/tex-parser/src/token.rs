//! `next_thing` — scan forward to the next syntactically significant token.

/// Kind of a syntactically significant token, per spec.md §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A control sequence (`\foo`, `\,`, ...). `detail` holds the name
    /// without the leading backslash.
    Cs,
    /// A math shift, `$` or `$$`. `detail` holds the literal shift text.
    MathShift,
    /// A paragraph break (a blank line).
    Par,
    /// An opening brace, `{`.
    Open,
    /// A closing brace, `}`.
    Close,
}

/// A token returned by [`next_thing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Byte offset where the token begins.
    pub pos1: usize,
    /// The token's kind.
    pub kind: TokenKind,
    /// Control-sequence name (without `\`) or math-shift text; empty for
    /// brace tokens and paragraph breaks.
    pub detail: String,
    /// Byte offset scanning should resume from if no callback consumes the
    /// token.
    pub pos2: usize,
}

/// Scans forward from `pos`, skipping ordinary text and `%` comments, to the
/// next token. Returns `None` once end-of-text is reached without finding
/// one.
pub fn next_thing(text: &str, pos: usize) -> Option<Token> {
    let bytes = text.as_bytes();
    let mut i = pos.min(bytes.len());
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'\\' => {
                let pos1 = i;
                i += 1;
                if i >= bytes.len() {
                    return Some(Token { pos1, kind: TokenKind::Cs, detail: String::new(), pos2: i });
                }
                if bytes[i].is_ascii_alphabetic() {
                    let name_start = i;
                    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                        i += 1;
                    }
                    return Some(Token {
                        pos1,
                        kind: TokenKind::Cs,
                        detail: text[name_start..i].to_string(),
                        pos2: i,
                    });
                }
                // Control symbol: a single codepoint following the backslash.
                let ch = text[i..].chars().next().unwrap_or(' ');
                let ch_len = ch.len_utf8();
                let detail = ch.to_string();
                i += ch_len;
                return Some(Token { pos1, kind: TokenKind::Cs, detail, pos2: i });
            }
            b'$' => {
                let pos1 = i;
                if bytes.get(i + 1) == Some(&b'$') {
                    return Some(Token {
                        pos1,
                        kind: TokenKind::MathShift,
                        detail: "$$".to_string(),
                        pos2: i + 2,
                    });
                }
                return Some(Token {
                    pos1,
                    kind: TokenKind::MathShift,
                    detail: "$".to_string(),
                    pos2: i + 1,
                });
            }
            b'{' => return Some(Token { pos1: i, kind: TokenKind::Open, detail: String::new(), pos2: i + 1 }),
            b'}' => return Some(Token { pos1: i, kind: TokenKind::Close, detail: String::new(), pos2: i + 1 }),
            b'\n' => {
                if let Some(pos2) = blank_line_gap(text, i) {
                    return Some(Token { pos1: i, kind: TokenKind::Par, detail: String::new(), pos2 });
                }
                i += 1;
            }
            _ => i = next_special(bytes, i),
        }
    }
    None
}

/// Vectorized jump to the next byte `next_thing` cares about, from `from`
/// (which itself isn't one of them). `memchr` has no 6-needle variant, so
/// this runs two 3-needle scans and takes the closer hit.
fn next_special(bytes: &[u8], from: usize) -> usize {
    let rest = &bytes[from..];
    let a = memchr::memchr3(b'\\', b'$', b'{', rest);
    let b = memchr::memchr3(b'}', b'%', b'\n', rest);
    match (a, b) {
        (Some(a), Some(b)) => from + a.min(b),
        (Some(a), None) => from + a,
        (None, Some(b)) => from + b,
        (None, None) => bytes.len(),
    }
}

/// If `first_nl` is the start of a paragraph break (a newline followed by
/// only whitespace and/or comment lines and then another newline), returns
/// the byte offset right after that second newline. Otherwise `None`.
fn blank_line_gap(text: &str, first_nl: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = first_nl + 1;
    loop {
        let before = i;
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\r') {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'%' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        }
        if i < bytes.len() && bytes[i] == b'\n' {
            return Some(i + 1);
        }
        if i >= bytes.len() || i == before {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_control_word() {
        let t = next_thing(r"\section{Intro}", 0).unwrap();
        assert_eq!(t.kind, TokenKind::Cs);
        assert_eq!(t.detail, "section");
        assert_eq!(t.pos1, 0);
        assert_eq!(t.pos2, 8);
    }

    #[test]
    fn finds_control_symbol() {
        let t = next_thing(r"\,x", 0).unwrap();
        assert_eq!(t.kind, TokenKind::Cs);
        assert_eq!(t.detail, ",");
    }

    #[test]
    fn finds_math_shift_double() {
        let t = next_thing("$$x=1$$", 0).unwrap();
        assert_eq!(t.kind, TokenKind::MathShift);
        assert_eq!(t.detail, "$$");
        assert_eq!(t.pos2, 2);
    }

    #[test]
    fn finds_single_math_shift() {
        let t = next_thing("a $x$ b", 0).unwrap();
        assert_eq!(t.pos1, 2);
        assert_eq!(t.detail, "$");
    }

    #[test]
    fn skips_comments() {
        let text = "% comment\n\\foo";
        let t = next_thing(text, 0).unwrap();
        assert_eq!(t.kind, TokenKind::Cs);
        assert_eq!(t.detail, "foo");
    }

    #[test]
    fn detects_paragraph_break() {
        let text = "one\n\ntwo";
        let t = next_thing(text, 0).unwrap();
        assert_eq!(t.kind, TokenKind::Par);
        assert_eq!(t.pos1, 3);
        assert_eq!(t.pos2, 5);
    }

    #[test]
    fn single_newline_is_not_a_paragraph_break() {
        let text = "one\ntwo";
        let t = next_thing(text, 0);
        assert!(t.is_none(), "a lone newline followed by text is not a token");
    }

    #[test]
    fn returns_none_at_end_of_text() {
        assert!(next_thing("plain text, no tokens", 0).is_none());
    }

    #[test]
    fn handles_braces() {
        let t = next_thing("{a}", 0).unwrap();
        assert_eq!(t.kind, TokenKind::Open);
        let t2 = next_thing("{a}", 2).unwrap();
        assert_eq!(t2.kind, TokenKind::Close);
    }
}
