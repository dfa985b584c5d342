//! End-to-end scenarios against `Core` (spec.md §8).

use std::fs;
use tex_lsp::{Change, Core, EditRange, InsertTextFormat, Position};

fn core_with_latex_module() -> (tempfile::TempDir, Core) {
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
                    "args": [{"kind": "mandatory", "name": "reference", "doc": "referenced label"}], "doc": "reference a label"},
                "input": {"action": {"kind": "input"}, "filename_template": "%s.tex",
                    "args": [{"kind": "mandatory", "name": "file", "doc": "file to include"}], "doc": "include a file"},
                "begin": {"action": {"kind": "begin"},
                    "args": [{"kind": "mandatory", "name": "environment", "doc": "environment name"}], "doc": "open an environment"},
                "end": {"action": {"kind": "end"},
                    "args": [{"kind": "mandatory", "name": "environment", "doc": "environment name"}], "doc": "close an environment"}
            }
        }"#,
    )
    .unwrap();
    let core = Core::new(dir.path().to_path_buf());
    (dir, core)
}

#[test]
fn s1_section_label_ref_signature_help() {
    let (_dir, core) = core_with_latex_module();
    core.did_open("/t/a.tex", "\\section{Intro}\\label{x}\\ref{x}\n".to_string(), "latex", 1).unwrap();

    let pos = "\\section{Intro}\\label{x}\\ref{".len();
    let (line, character) = (0, pos);
    let help = core.signature_help("/t/a.tex", line, character).unwrap();
    assert_eq!(help.active_signature, 0);
    assert_eq!(help.active_parameter, Some(0));
    assert_eq!(help.signatures[0].parameters[0].label, "{reference}");
}

#[test]
fn s2_completion_after_ref_brace_offers_known_label_with_empty_range() {
    let (_dir, core) = core_with_latex_module();
    core.did_open("/t/a.tex", "\\label{x}\\ref{}\n".to_string(), "latex", 1).unwrap();

    let pos = "\\label{x}\\ref{".len();
    let items = core.completion("/t/a.tex", 0, pos).unwrap();
    let item = items.iter().find(|i| i.label == "x").expect("label x offered");
    assert_eq!(item.filter_text, "x");
    assert_eq!(item.insert_text_format, InsertTextFormat::Plain);
    assert_eq!(item.text_edit.range.start, item.text_edit.range.end);
}

#[test]
fn s3_input_child_label_visible_for_completion_and_hover() {
    let (dir, core) = core_with_latex_module();
    let root = dir.path().join("root.tex").to_string_lossy().into_owned();
    let child = dir.path().join("child.tex").to_string_lossy().into_owned();
    fs::write(&child, "\\label{y}\n").unwrap();
    core.did_open(&root, "\\input{child}\n\\ref{y}\n".to_string(), "latex", 1).unwrap();

    // Line 1 is "\ref{y}"; the caret right after the opening brace is at
    // character 5.
    let items = core.completion(&root, 1, "\\ref{".len()).unwrap();
    assert!(items.iter().any(|i| i.label == "y"));

    // Hovering on the referenced name itself (not the label's own
    // definition) shows the literal referenced text (spec.md S3).
    let hover = core.hover(&root, 1, "\\ref{".len()).unwrap();
    assert_eq!(hover.contents, "y");
}

#[test]
fn s4_incremental_edit_updates_outline_after_refresh() {
    let (_dir, core) = core_with_latex_module();
    core.did_open("/t/a.tex", "\\section{Intro}\\label{x}\\ref{x}\n".to_string(), "latex", 1).unwrap();

    let start = "\\section{".len();
    let end = start + "Intro".len();
    core.did_change(
        "/t/a.tex",
        vec![Change::Incremental {
            range: EditRange { start: Position { line: 0, character: start }, end: Position { line: 0, character: end } },
            range_length: 5,
            text: "Overview".to_string(),
        }],
        2,
    )
    .unwrap();

    let title_pos = "\\section{Over".len();
    let help = core.hover("/t/a.tex", 0, title_pos).unwrap();
    assert!(help.contents.contains("start a section"));
}

#[test]
fn s5_missing_end_degrades_without_panicking() {
    let (dir, core) = core_with_latex_module();
    fs::write(
        dir.path().join("latex2.json"),
        r#"{"name": "latex2", "dependencies": ["latex"], "environments": {
            "itemize": {"action": {"kind": "extra", "name": "list"}, "doc": "a bulleted list"}
        }}"#,
    )
    .unwrap();
    core.did_open("/t/a.tex", "\\begin{itemize}\\item a".to_string(), "latex2", 1).unwrap();

    // `itemize`'s own action names an extension ("list") this crate never
    // registers, so its delegated dispatch falls back to an empty argument
    // list instead of panicking, and the environment's own hover text still
    // renders for the unclosed `\begin{itemize}`.
    let env_pos = "\\begin{item".len();
    let hover = core.hover("/t/a.tex", 0, env_pos).unwrap();
    assert_eq!(hover.contents, "itemize (environment)\n\na bulleted list");

    // `\item` has no command descriptor in this module; it degrades to a
    // bare, doc-less hover rather than `None`.
    let item_pos = "\\begin{itemize}\\it".len();
    let hover = core.hover("/t/a.tex", 0, item_pos).unwrap();
    assert_eq!(hover.contents, "\\item");

    // The source has no `\end` at all; querying past the unclosed
    // environment must not panic.
    let end_pos = "\\begin{itemize}\\item a".len();
    let _ = core.hover("/t/a.tex", 0, end_pos);
}

#[test]
fn s6_mismatched_range_length_is_rejected_and_leaves_source_unchanged() {
    let (_dir, core) = core_with_latex_module();
    core.did_open("/t/a.tex", "\\section{Intro}\n".to_string(), "latex", 1).unwrap();

    let start = "\\section{".len();
    let end = start + "Intro".len();
    let err = core
        .did_change(
            "/t/a.tex",
            vec![Change::Incremental {
                range: EditRange { start: Position { line: 0, character: start }, end: Position { line: 0, character: end } },
                range_length: 4,
                text: "X".to_string(),
            }],
            2,
        )
        .unwrap_err();
    assert!(matches!(err, tex_lsp::CoreError::RangeMismatch { expected: 4, found: 5, .. }));

    let title_pos = "\\section{Intr".len();
    let hover = core.hover("/t/a.tex", 0, title_pos).unwrap();
    assert!(hover.contents.contains("start a section"));
}

#[test]
fn did_close_forgets_file_and_invalidates_manuscript() {
    let (_dir, core) = core_with_latex_module();
    core.did_open("/t/a.tex", "\\section{Intro}\n".to_string(), "latex", 1).unwrap();
    assert!(core.hover("/t/a.tex", 0, "\\sec".len()).is_some());

    core.did_close("/t/a.tex");
    assert!(core.hover("/t/a.tex", 0, "\\sec".len()).is_none());
}
