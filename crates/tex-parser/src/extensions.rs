//! Extension-callback registry for `ActionKind::Extra` actions (spec.md
//! §4.4): a handful of dictionary-defined commands/environments don't fit
//! the flat `ArgKind` signature shape and instead need a bespoke parser
//! registered by name, e.g. a tikz path's alternating unbraced coordinate
//! groups and bracketed option groups.

use crate::signature::{match_balanced, skip_layout};
use crate::ArgList;
use tex_position::Range;

/// A bespoke argument parser registered under an extension name. Takes the
/// same `(text, pos)` shape as [`crate::parse_args`] and must degrade
/// gracefully on malformed input like every other parser in this crate.
pub type ExtensionParser = fn(&str, usize) -> ArgList;

/// Looks up the parser registered for `name`. Callers fall back to ordinary
/// signature-based `parse_args` when this returns `None`.
pub fn lookup_extension(name: &str) -> Option<ExtensionParser> {
    match name {
        "tikzpath" => Some(parse_tikz_path as ExtensionParser),
        _ => None,
    }
}

/// `tikzpath`-style argument shape: any number of `(...)` coordinate groups
/// and `[...]` option groups, in any order, until neither is found. Each
/// group becomes one entry of the returned [`ArgList`].
fn parse_tikz_path(text: &str, pos: usize) -> ArgList {
    let start = pos;
    let mut cur = pos;
    let mut args = Vec::new();
    loop {
        let at = skip_layout(text, cur);
        let next = match text.as_bytes().get(at) {
            Some(b'(') => match_balanced(text, at + 1, b'(', b')'),
            Some(b'[') => match_balanced(text, at + 1, b'[', b']'),
            _ => break,
        };
        let (content_start, content_end, terminated) = next;
        args.push(Range::new(content_start, content_end - content_start));
        cur = if terminated { content_end + 1 } else { content_end };
        if cur >= text.len() {
            break;
        }
    }
    ArgList { args, pos: start, len: cur.saturating_sub(start) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_name_has_no_parser() {
        assert!(lookup_extension("not-a-thing").is_none());
    }

    #[test]
    fn tikzpath_alternates_coordinate_and_option_groups() {
        let text = "(0,0) -- (1,1) [thick,->]";
        let parser = lookup_extension("tikzpath").unwrap();
        let args = parser(text, 0);
        assert_eq!(args.args.len(), 3);
        assert_eq!(args.args[0].slice(text), "0,0");
        assert_eq!(args.args[1].slice(text), "1,1");
        assert_eq!(args.args[2].slice(text), "thick,->");
    }

    #[test]
    fn tikzpath_stops_at_first_non_group_byte() {
        let text = "(0,0) done";
        let parser = lookup_extension("tikzpath").unwrap();
        let args = parser(text, 0);
        assert_eq!(args.args.len(), 1);
        assert_eq!(args.len, "(0,0)".len());
    }
}
