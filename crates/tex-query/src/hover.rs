//! `hover` — spec.md §4.6, §6.

use tex_dictionary::ActionKind;
use tex_manuscript::{Frame, FrameKind, Manuscript};

/// Renders hover text for the construct at `pos`, or `None` if `pos` is not
/// inside a recognized construct (the shell returns a neutral null per
/// spec.md §7).
///
/// Per S3 (spec.md §8): hovering on a `\ref`/`\cite` argument shows the
/// referenced name itself (the literal argument text) rather than the
/// command's own documentation, since that's what the user is pointing at.
pub fn hover(doc: &Manuscript, pos: usize) -> Option<String> {
    let src = doc.src();
    let frame = doc.local_scan(pos);
    render(&src, &frame)
}

fn render(src: &str, frame: &Frame) -> Option<String> {
    match &frame.kind {
        FrameKind::Command { name, descriptor: Some(d) } => Some(format!("\\{name}\n\n{}", d.doc)),
        FrameKind::Command { name, descriptor: None } => Some(format!("\\{name}")),
        FrameKind::Environment { name, descriptor: Some(d) } => Some(format!("{name} (environment)\n\n{}", d.doc)),
        FrameKind::Environment { name, descriptor: None } => Some(format!("{name} (environment)")),
        FrameKind::Argument { spec: Some(spec), .. } => {
            if is_reference_argument(frame) {
                Some(src[frame.pos..frame.end()].to_string())
            } else {
                Some(format!("{}: {}", spec.name, spec.doc))
            }
        }
        FrameKind::Argument { spec: None, .. } => Some(src[frame.pos..frame.end()].to_string()),
        FrameKind::KeyInList { key } => Some(key.clone()),
        FrameKind::ValueInKey { key, spec: Some(s) } => Some(format!("{key} = ...\n\n{}", s.doc)),
        FrameKind::ValueInKey { key, spec: None } => Some(key.clone()),
        FrameKind::Root => None,
    }
}

fn is_reference_argument(frame: &Frame) -> bool {
    matches!(
        frame.parent.as_deref().map(|p| &p.kind),
        Some(FrameKind::Command { descriptor: Some(d), .. }) if matches!(d.action, ActionKind::Ref | ActionKind::Cite)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tex_dictionary::ModuleDictionary;
    use tex_manuscript::{FileCache, ManuscriptConfig};

    fn open(text: &str) -> Manuscript {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("latex.json"),
            r#"{
                "name": "latex",
                "commands": {
                    "section": {"action": {"kind": "heading", "level": 1},
                        "args": [{"kind": "mandatory", "name": "title", "doc": "section title"}], "doc": "start a section"},
                    "label": {"action": {"kind": "label"},
                        "args": [{"kind": "mandatory", "name": "name", "doc": "label name"}], "doc": "define a label"},
                    "ref": {"action": {"kind": "ref"},
                        "args": [{"kind": "mandatory", "name": "reference", "doc": "referenced label"}], "doc": "reference a label"}
                }
            }"#,
        )
        .unwrap();
        let cache = FileCache::new();
        cache.put("/t/a.tex", text.to_string());
        let dictionary = ModuleDictionary::new(dir.path().to_path_buf());
        Manuscript::open("/t/a.tex", "latex", cache, dictionary, Arc::new(ManuscriptConfig::default())).unwrap()
    }

    #[test]
    fn hover_on_command_shows_its_doc() {
        let doc = open("\\section{Intro}\n");
        let pos = "\\sec".len();
        assert_eq!(hover(&doc, pos).unwrap(), "\\section\n\nstart a section");
    }

    #[test]
    fn hover_on_ref_argument_shows_the_referenced_text() {
        let doc = open("\\label{y}\n\\ref{y}\n");
        let pos = "\\label{y}\n\\ref{".len();
        assert_eq!(hover(&doc, pos).unwrap(), "y");
    }
}
