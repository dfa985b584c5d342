//! Key=value list parsing (spec.md §4.2 `parse_keys`).

use tex_position::Range;

/// One `key` or `key=value` entry from a parsed key=value list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    /// Range of the key text.
    pub key: Range,
    /// Range of the value text, if this entry had an `=value` part.
    pub value: Option<Range>,
}

/// Parses a comma-separated `key` or `key=value` list within
/// `[pos, pos + len)`. Whitespace around keys, `=`, and values is
/// insignificant; nested braces in values are honoured so a comma or `=`
/// inside `{...}` does not split the entry (spec.md §4.2).
pub fn parse_keys(text: &str, pos: usize, len: usize) -> Vec<KeyValuePair> {
    let bytes = text.as_bytes();
    let end = (pos + len).min(bytes.len());
    let mut pairs = Vec::new();
    if pos >= end {
        return pairs;
    }

    let mut seg_start = pos;
    let mut i = pos;
    let mut depth = 0usize;
    while i <= end {
        let at_end = i == end;
        let is_sep = !at_end && depth == 0 && bytes[i] == b',';
        if at_end || is_sep {
            push_segment(text, seg_start, i, &mut pairs);
            seg_start = i + 1;
        } else {
            match bytes[i] {
                b'{' => depth += 1,
                b'}' if depth > 0 => depth -= 1,
                _ => {}
            }
        }
        i += 1;
    }
    pairs
}

fn push_segment(text: &str, start: usize, stop: usize, pairs: &mut Vec<KeyValuePair>) {
    let Some((ts, te)) = trim_range(text, start, stop) else {
        return;
    };
    match find_top_level_eq(text, ts, te) {
        Some(eq) => {
            let key = trim_range(text, ts, eq).unwrap_or((ts, ts));
            let value = trim_range(text, eq + 1, te);
            pairs.push(KeyValuePair {
                key: Range::new(key.0, key.1 - key.0),
                value: value.map(|(vs, ve)| Range::new(vs, ve - vs)),
            });
        }
        None => pairs.push(KeyValuePair { key: Range::new(ts, te - ts), value: None }),
    }
}

fn find_top_level_eq(text: &str, start: usize, stop: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i < stop {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth > 0 => depth -= 1,
            b'=' if depth == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn trim_range(text: &str, start: usize, stop: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut s = start;
    let mut e = stop;
    while s < e && bytes[s].is_ascii_whitespace() {
        s += 1;
    }
    while e > s && bytes[e - 1].is_ascii_whitespace() {
        e -= 1;
    }
    if s >= e {
        None
    } else {
        Some((s, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_keys() {
        let text = "width=1cm, height = 2cm,draft";
        let pairs = parse_keys(text, 0, text.len());
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].key.slice(text), "width");
        assert_eq!(pairs[0].value.unwrap().slice(text), "1cm");
        assert_eq!(pairs[1].key.slice(text), "height");
        assert_eq!(pairs[1].value.unwrap().slice(text), "2cm");
        assert_eq!(pairs[2].key.slice(text), "draft");
        assert!(pairs[2].value.is_none());
    }

    #[test]
    fn nested_braces_in_value_protect_commas() {
        let text = "a={x,y},b=z";
        let pairs = parse_keys(text, 0, text.len());
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].value.unwrap().slice(text), "{x,y}");
    }

    #[test]
    fn trailing_comma_is_ignored() {
        let text = "a=1,";
        let pairs = parse_keys(text, 0, text.len());
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn empty_region_yields_no_pairs() {
        assert!(parse_keys("", 0, 0).is_empty());
    }
}
