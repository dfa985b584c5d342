//! Renders signature metadata into display labels for hover/signature help.

use tex_dictionary::ArgumentSpec;
use tex_parser::ArgKind;

/// Renders one argument's bracketing in the style its `kind` implies, e.g.
/// `{title}`, `[width]`, `*`.
pub(crate) fn format_arg(spec: &ArgumentSpec) -> String {
    match spec.kind {
        ArgKind::Mandatory => format!("{{{}}}", spec.name),
        ArgKind::Optional => format!("[{}]", spec.name),
        ArgKind::KeyValue => format!("[{}]", spec.name),
        ArgKind::Star => "*".to_string(),
        ArgKind::Literal => format!("|{}|", spec.name),
    }
}

/// Renders a full command/environment signature label, e.g.
/// `\section{title}` or `\includegraphics[options]{file}`.
pub(crate) fn format_signature(name: &str, sig: &[ArgumentSpec]) -> String {
    let mut label = format!("\\{name}");
    for spec in sig {
        label.push_str(&format_arg(spec));
    }
    label
}
