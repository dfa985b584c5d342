//! `signature_help` — spec.md §4.6, §6.

use crate::label::{format_arg, format_signature};
use tex_dictionary::ArgumentSpec;
use tex_manuscript::{FrameKind, Manuscript};

/// One parameter of a [`SignatureInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// The parameter's rendered label, e.g. `{title}`.
    pub label: String,
    /// Free-form documentation for this parameter.
    pub documentation: Option<String>,
}

/// One candidate signature for the command/environment under the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    /// The full rendered signature label, e.g. `\section{title}`.
    pub label: String,
    /// The command/environment's documentation.
    pub documentation: Option<String>,
    /// One entry per formal argument.
    pub parameters: Vec<ParameterInfo>,
}

/// The reply shape spec.md §6 `signature_help` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHelp {
    /// Candidate signatures (always exactly one here: this system has no
    /// overload resolution, unlike a function-call signature helper).
    pub signatures: Vec<SignatureInfo>,
    /// Always `0`: there is exactly one signature candidate.
    pub active_signature: usize,
    /// 0-based index of the argument the caret is inside, if any.
    pub active_parameter: Option<usize>,
}

/// Produces signature help for the command/environment invocation at `pos`,
/// or `None` if the caret is not inside one with a known signature.
pub fn signature_help(doc: &Manuscript, pos: usize) -> Option<SignatureHelp> {
    let frame = doc.local_scan(pos);
    let mut active_parameter = None;
    let mut cur = Some(frame);
    loop {
        let f = cur?;
        match &f.kind {
            FrameKind::Argument { index, .. } if active_parameter.is_none() => {
                active_parameter = Some(*index);
            }
            FrameKind::Command { name, descriptor: Some(d) } => {
                return Some(build(name, d.args.as_deref(), Some(&d.doc), active_parameter));
            }
            FrameKind::Environment { name, descriptor: Some(d) } => {
                return Some(build(name, d.args.as_deref(), Some(&d.doc), active_parameter));
            }
            FrameKind::Root => return None,
            _ => {}
        }
        cur = f.parent.clone();
    }
}

fn build(
    name: &str,
    sig: Option<&[ArgumentSpec]>,
    doc: Option<&str>,
    active_parameter: Option<usize>,
) -> SignatureHelp {
    let sig = sig.unwrap_or(&[]);
    let parameters =
        sig.iter().map(|spec| ParameterInfo { label: format_arg(spec), documentation: Some(spec.doc.clone()) }).collect();
    let signature = SignatureInfo { label: format_signature(name, sig), documentation: doc.map(String::from), parameters };
    SignatureHelp { signatures: vec![signature], active_signature: 0, active_parameter }
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
    fn s1_ref_signature_help_has_active_parameter_zero() {
        let doc = open("\\section{Intro}\\label{x}\\ref{x}\n");
        let pos = "\\section{Intro}\\label{x}\\ref{".len();
        let help = signature_help(&doc, pos).unwrap();
        assert_eq!(help.active_signature, 0);
        assert_eq!(help.active_parameter, Some(0));
        assert_eq!(help.signatures[0].parameters[0].label, "{reference}");
    }
}
