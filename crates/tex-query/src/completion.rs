//! `complete` — spec.md §4.6, §6.

use std::collections::BTreeSet;
use tex_dictionary::{ActionKind, ArgumentSpec};
use tex_manuscript::{Frame, FrameKind, Manuscript};
use tex_parser::ArgKind;

/// One completion candidate (spec.md §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The text to insert.
    pub text: String,
    /// The text the client filters against as the user keeps typing.
    pub filter_text: String,
    /// A short one-line summary shown alongside the candidate.
    pub summary: String,
    /// A category label (`"command"`, `"key"`, `"value"`, `"label"`, ...).
    pub detail: String,
    /// A templated, snippet-insertion form, if applicable.
    pub snippet: Option<String>,
}

/// The reply shape spec.md §6 `completion` builds its `item[]` from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The prefix already typed, derived from the nearest word boundary.
    pub prefix: String,
    /// Byte offset where `prefix` starts (the textEdit's replacement start).
    pub pos: usize,
    /// Ranked candidates: stable, alphabetical within kind, exact match
    /// first when present (spec.md §4.6).
    pub candidates: Vec<Candidate>,
}

/// Produces completion candidates for the caret at `pos`, or `None` if the
/// caret isn't inside a position completion applies to.
pub fn complete(doc: &Manuscript, pos: usize) -> Option<Completion> {
    let src = doc.src();
    let prefix_start = word_boundary_before(&src, pos);
    let prefix = src[prefix_start..pos].to_string();

    let frame = doc.local_scan(pos);
    let mut candidates = candidates_for_frame(doc, &frame, &prefix)?;
    candidates.sort_by(|a, b| {
        let a_exact = a.text == prefix;
        let b_exact = b.text == prefix;
        b_exact.cmp(&a_exact).then_with(|| a.text.cmp(&b.text))
    });
    Some(Completion { prefix, pos: prefix_start, candidates })
}

fn word_boundary_before(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = pos.min(bytes.len());
    while i > 0 {
        let b = bytes[i - 1];
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':' {
            i -= 1;
        } else {
            break;
        }
    }
    i
}

fn candidates_for_frame(doc: &Manuscript, frame: &Frame, prefix: &str) -> Option<Vec<Candidate>> {
    match &frame.kind {
        FrameKind::Root => None,
        FrameKind::Command { .. } => Some(command_candidates(doc, prefix)),
        FrameKind::Environment { .. } => None,
        FrameKind::KeyInList { .. } => {
            let parent = frame.parent.as_deref()?;
            let FrameKind::Argument { spec: Some(spec), .. } = &parent.kind else { return None };
            let keys = spec.key_schema.as_ref()?;
            Some(
                keys.iter()
                    .filter(|k| k.name.starts_with(prefix))
                    .map(|k| Candidate {
                        text: k.name.clone(),
                        filter_text: k.name.clone(),
                        summary: k.doc.clone(),
                        detail: "key".to_string(),
                        snippet: None,
                    })
                    .collect(),
            )
        }
        FrameKind::ValueInKey { spec: Some(spec), .. } => Some(
            spec.values
                .iter()
                .filter(|v| v.starts_with(prefix))
                .map(|v| Candidate {
                    text: v.clone(),
                    filter_text: v.clone(),
                    summary: String::new(),
                    detail: "value".to_string(),
                    snippet: None,
                })
                .collect(),
        ),
        FrameKind::ValueInKey { spec: None, .. } => None,
        FrameKind::Argument { spec: Some(spec), .. } => domain_candidates(doc, frame.parent.as_deref()?, spec, prefix),
        FrameKind::Argument { spec: None, .. } => None,
    }
}

fn command_candidates(doc: &Manuscript, prefix: &str) -> Vec<Candidate> {
    let mut seen = BTreeSet::new();
    let mut node = Some(doc.clone());
    let mut out = Vec::new();
    while let Some(m) = node {
        for (name, cmd) in m.local_command_names_with_docs() {
            if name.starts_with(prefix) && seen.insert(name.clone()) {
                out.push(Candidate {
                    text: name.clone(),
                    filter_text: name,
                    summary: cmd,
                    detail: "command".to_string(),
                    snippet: None,
                });
            }
        }
        node = m.parent_handle();
    }
    out
}

fn domain_candidates(doc: &Manuscript, parent: &Frame, spec: &ArgumentSpec, prefix: &str) -> Option<Vec<Candidate>> {
    let FrameKind::Command { descriptor: Some(d), .. } = &parent.kind else {
        return None;
    };
    match &d.action {
        ActionKind::Ref => Some(label_candidates(doc, prefix)),
        ActionKind::Cite => Some(bibitem_candidates(doc, prefix)),
        ActionKind::Input => Some(filename_candidates(doc, prefix)),
        _ if spec.kind == ArgKind::KeyValue => None,
        _ => None,
    }
}

fn label_candidates(doc: &Manuscript, prefix: &str) -> Vec<Candidate> {
    let mut names = Vec::new();
    collect_recursive(&doc.root(), &mut names, |m| m.labels().into_iter().map(|e| e.name).collect());
    to_candidates(names, prefix, "label")
}

fn bibitem_candidates(doc: &Manuscript, prefix: &str) -> Vec<Candidate> {
    let mut names = Vec::new();
    collect_recursive(&doc.root(), &mut names, |m| m.bibitems().into_iter().map(|e| e.name).collect());
    to_candidates(names, prefix, "bibitem")
}

/// Enumerates filenames on the configured search path matching `prefix`
/// (spec.md §4.6: "input → matching filenames on a configured search
/// path"). A search path directory that doesn't exist or can't be read is
/// skipped rather than failing the whole completion.
fn filename_candidates(doc: &Manuscript, prefix: &str) -> Vec<Candidate> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for dir in &doc.config().search_paths {
        let Ok(entries) = std::fs::read_dir(dir) else { continue };
        for entry in entries.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else { continue };
            if name.starts_with(prefix) && seen.insert(name.clone()) {
                out.push(Candidate {
                    text: name.clone(),
                    filter_text: name,
                    summary: String::new(),
                    detail: "input".to_string(),
                    snippet: None,
                });
            }
        }
    }
    out
}

fn collect_recursive(node: &Manuscript, out: &mut Vec<String>, extract: fn(&Manuscript) -> Vec<String>) {
    out.extend(extract(node));
    for child in node.children().values() {
        collect_recursive(child, out, extract);
    }
}

fn to_candidates(names: Vec<String>, prefix: &str, detail: &str) -> Vec<Candidate> {
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .filter(|n| n.starts_with(prefix) && seen.insert(n.clone()))
        .map(|n| Candidate {
            text: n.clone(),
            filter_text: n,
            summary: String::new(),
            detail: detail.to_string(),
            snippet: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tex_dictionary::ModuleDictionary;
    use tex_manuscript::{FileCache, ManuscriptConfig};

    fn harness() -> (tempfile::TempDir, FileCache, ModuleDictionary, Arc<ManuscriptConfig>) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("latex.json"),
            r#"{
                "name": "latex",
                "commands": {
                    "label": {"action": {"kind": "label"},
                        "args": [{"kind": "mandatory", "name": "name", "doc": "label name"}], "doc": "define a label"},
                    "ref": {"action": {"kind": "ref"},
                        "args": [{"kind": "mandatory", "name": "reference", "doc": "referenced label"}], "doc": "reference a label"}
                }
            }"#,
        )
        .unwrap();
        let cache = FileCache::new();
        let dictionary = ModuleDictionary::new(dir.path().to_path_buf());
        let config = Arc::new(ManuscriptConfig::default());
        (dir, cache, dictionary, config)
    }

    #[test]
    fn s2_empty_prefix_after_ref_brace_offers_known_label() {
        let (_dir, cache, dictionary, config) = harness();
        let filename = "/t/a.tex";
        cache.put(filename, "\\label{x}\\ref{}\n".to_string());
        let doc = Manuscript::open(filename, "latex", cache, dictionary, config).unwrap();

        let pos = "\\label{x}\\ref{".len();
        let completion = complete(&doc, pos).unwrap();
        assert_eq!(completion.prefix, "");
        assert_eq!(completion.pos, pos);
        assert!(completion.candidates.iter().any(|c| c.text == "x"));
    }

    #[test]
    fn input_completion_lists_filenames_on_the_search_path() {
        let (dir, cache, dictionary, _config) = harness();
        fs::write(
            dir.path().join("latex-input.json"),
            r#"{"name": "latex-input", "dependencies": ["latex"], "commands": {
                "input": {"action": {"kind": "input"}, "filename_template": "%s.tex",
                    "args": [{"kind": "mandatory", "name": "file", "doc": "file to include"}], "doc": "include a file"}
            }}"#,
        )
        .unwrap();
        let include_dir = dir.path().join("chapters");
        fs::create_dir(&include_dir).unwrap();
        fs::write(include_dir.join("intro.tex"), "").unwrap();
        fs::write(include_dir.join("index.tex"), "").unwrap();

        let config = Arc::new(ManuscriptConfig { max_include_depth: 15, search_paths: vec![include_dir] });
        let filename = "/t/a.tex";
        cache.put(filename, "\\input{int}\n".to_string());
        let doc = Manuscript::open(filename, "latex-input", cache, dictionary, config).unwrap();

        let pos = "\\input{int".len();
        let completion = complete(&doc, pos).unwrap();
        assert!(completion.candidates.iter().any(|c| c.text == "intro.tex"));
        assert!(!completion.candidates.iter().any(|c| c.text == "index.tex"));
    }
}
