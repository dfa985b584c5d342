//! Signature-driven argument-list parsing (spec.md §3 Signature, §4.2
//! `parse_args`).

use tex_position::Range;

/// The shape of one formal argument in a command/environment [`Signature`](
/// crate — see `tex-dictionary::Signature` for the metadata-bearing wrapper
/// around this structural kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A mandatory brace group, `{...}`.
    Mandatory,
    /// An optional bracket group, `[...]`, which may be absent.
    Optional,
    /// An optional `*` flag.
    Star,
    /// An optional bracket group parsed as a comma-separated key=value list
    /// (see [`crate::parse_keys`]).
    KeyValue,
    /// A literal-delimited argument: the first non-whitespace byte is taken
    /// as the delimiter and the argument runs to its next occurrence
    /// (`\verb|...|`-style), with no escaping inside.
    Literal,
}

/// The result of [`parse_args`]: one [`Range`] per signature entry, plus the
/// span of the whole argument list for convenience (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgList {
    /// One range per entry of the signature that was parsed, in order.
    /// Absent optionals have `len == 0`.
    pub args: Vec<Range>,
    /// Byte offset of the first argument attempt.
    pub pos: usize,
    /// Span from `pos` to the end of the last consumed argument.
    pub len: usize,
}

impl ArgList {
    /// A list with no arguments (signature is empty).
    pub fn empty_at(pos: usize) -> Self {
        Self { args: Vec::new(), pos, len: 0 }
    }
}

/// Parses an argument list starting just after a control-sequence name,
/// driven by `signature`. Returns one [`Range`] per signature entry,
/// malformed/missing input degrading to absent ranges rather than failing
/// (spec.md §4.2).
pub fn parse_args(text: &str, pos: usize, signature: &[ArgKind]) -> ArgList {
    if signature.is_empty() {
        return ArgList::empty_at(pos);
    }
    let start_pos = pos;
    let mut cur = pos;
    let mut last_end = pos;
    let mut args = Vec::with_capacity(signature.len());

    for kind in signature {
        let before = cur;
        let at = skip_layout(text, cur);
        match kind {
            ArgKind::Star => {
                if text.as_bytes().get(at) == Some(&b'*') {
                    args.push(Range::new(at, 1));
                    cur = at + 1;
                    last_end = cur;
                } else {
                    args.push(Range::absent(before));
                    cur = before;
                }
            }
            ArgKind::Optional | ArgKind::KeyValue => {
                if text.as_bytes().get(at) == Some(&b'[') {
                    let content_start = at + 1;
                    let (cs, ce, terminated) = match_balanced(text, content_start, b'[', b']');
                    args.push(Range::new(cs, ce - cs));
                    cur = if terminated { ce + 1 } else { ce };
                    last_end = ce;
                } else {
                    args.push(Range::absent(before));
                    cur = before;
                }
            }
            ArgKind::Mandatory => {
                if text.as_bytes().get(at) == Some(&b'{') {
                    let content_start = at + 1;
                    let (cs, ce, terminated) = match_balanced(text, content_start, b'{', b'}');
                    args.push(Range::new(cs, ce - cs));
                    cur = if terminated { ce + 1 } else { ce };
                    last_end = ce;
                } else {
                    args.push(Range::absent(before));
                    cur = before;
                }
            }
            ArgKind::Literal => {
                if at < text.len() {
                    let delim = text.as_bytes()[at];
                    let content_start = at + 1;
                    if let Some(rel) = text.as_bytes()[content_start..].iter().position(|&b| b == delim) {
                        let ce = content_start + rel;
                        args.push(Range::new(content_start, ce - content_start));
                        cur = ce + 1;
                        last_end = ce;
                    } else {
                        args.push(Range::new(content_start, text.len() - content_start));
                        cur = text.len();
                        last_end = cur;
                    }
                } else {
                    args.push(Range::absent(before));
                    cur = before;
                }
            }
        }
    }

    ArgList { args, pos: start_pos, len: last_end.saturating_sub(start_pos) }
}

/// Skips whitespace and `%`-comments, stopping at the next significant byte.
pub(crate) fn skip_layout(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = pos.min(bytes.len());
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'%' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        break;
    }
    i
}

/// Finds the end of a balanced group opened by `open` at `content_start`
/// (the first byte of the group's content, i.e. just after the opening
/// delimiter). When `open` is not `{`, brace nesting inside the group is
/// still tracked so a `{`/`}` pair can't prematurely close it (e.g. a
/// bracketed key=value argument whose value contains `{a,b}`). A backslash
/// escapes the next character, so `\{`/`\}`/`\]` never affect depth.
///
/// Returns `(content_start, content_end, terminated)`. When the group is
/// unterminated, `content_end == text.len()` and `terminated` is `false`
/// (spec.md §4.2: "unterminated groups are closed at end-of-file").
pub(crate) fn match_balanced(text: &str, content_start: usize, open: u8, close: u8) -> (usize, usize, bool) {
    let bytes = text.as_bytes();
    let mut i = content_start;
    let mut depth = 1usize;
    let mut brace_depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1;
                if i < bytes.len() {
                    let ch_len = text[i..].chars().next().map_or(1, |c| c.len_utf8());
                    i += ch_len;
                }
            }
            b'{' if open != b'{' => {
                brace_depth += 1;
                i += 1;
            }
            b'}' if open != b'{' && brace_depth > 0 => {
                brace_depth -= 1;
                i += 1;
            }
            c if c == open && brace_depth == 0 => {
                depth += 1;
                i += 1;
            }
            c if c == close && brace_depth == 0 => {
                depth -= 1;
                if depth == 0 {
                    return (content_start, i, true);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    (content_start, bytes.len(), false)
}
