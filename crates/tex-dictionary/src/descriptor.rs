//! Descriptor types (spec.md §3 Command/Environment descriptor, Module).

use serde::Deserialize;
use std::collections::HashMap;
use tex_parser::ArgKind;

/// What a command or environment does when the scan engine encounters it
/// (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// `\input`-class command: pulls in another source file.
    Input,
    /// `\begin`: opens an environment.
    Begin,
    /// `\end`: closes an environment.
    End,
    /// A sectioning command (`\section`, `\subsection`, ...) at the given
    /// outline nesting level.
    Heading {
        /// Outline nesting level; deeper sections have a larger level.
        level: u8,
    },
    /// `\label`-class command: defines a cross-reference target.
    Label,
    /// `\ref`-class command: references a label.
    Ref,
    /// `\cite`-class command: references a bibliography entry.
    Cite,
    /// `\bibitem`-class command: defines a bibliography entry.
    Bibitem,
    /// Enters math mode.
    Math,
    /// Leaves math mode.
    EndMath,
    /// A dictionary-defined extra action (e.g. `tikzpath`) requiring a
    /// bespoke callback registered by name.
    Extra(String),
}

/// One formal argument of a [`Signature`], carrying both the structural
/// [`ArgKind`] the parser needs and the display metadata the query layer
/// needs (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    /// Structural shape consumed by `tex_parser::parse_args`.
    pub kind: ArgKind,
    /// Display name shown in signature help / hover.
    pub name: String,
    /// Free-form documentation.
    pub doc: String,
    /// Nested key schema, present when `kind` is
    /// [`ArgKind::KeyValue`](tex_parser::ArgKind::KeyValue).
    pub key_schema: Option<Vec<KeyDescriptor>>,
}

/// Describes one recognized key of a key=value argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    /// The key's name.
    pub name: String,
    /// Free-form documentation.
    pub doc: String,
    /// Enumerated legal values, if the key takes one of a fixed set
    /// (used by completion inside the value position, spec.md §4.6).
    pub values: Vec<String>,
}

/// An ordered list of formal arguments — spec.md §3 "Signature".
pub type Signature = Vec<ArgumentSpec>;

/// A command descriptor, looked up by name in a Manuscript's scoped command
/// table (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// The command name, without the leading backslash.
    pub name: String,
    /// What this command does during scanning.
    pub action: ActionKind,
    /// The command's argument signature, if it takes arguments.
    pub args: Option<Signature>,
    /// Free-form documentation shown by hover/signature help.
    pub doc: String,
    /// For `input`-class commands: the filename template (e.g. `%s.tex`)
    /// the mandatory filename slot is resolved against.
    pub filename_template: Option<String>,
}

/// An environment descriptor, looked up by name in a Manuscript's scoped
/// environment table (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDescriptor {
    /// The environment name.
    pub name: String,
    /// An environment-specific action, delegated to when `\begin`/`\end`
    /// processing encounters this environment (spec.md §4.4).
    pub action: Option<ActionKind>,
    /// The environment's `\begin` argument signature, if any.
    pub args: Option<Signature>,
    /// Free-form documentation.
    pub doc: String,
}

/// A named bundle of commands, environments, and module dependencies
/// (spec.md §3, §4.3).
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// The module's name.
    pub name: String,
    /// Commands this module defines.
    pub commands: HashMap<String, CommandDescriptor>,
    /// Environments this module defines.
    pub environments: HashMap<String, EnvironmentDescriptor>,
    /// Other modules that must be loaded (and merged) before this module's
    /// commands/environments take effect.
    pub dependencies: Vec<String>,
}

// --- On-disk schema -------------------------------------------------------
//
// The module description files themselves are an external collaborator
// (spec.md §1); these `*Json` types are the schema this crate reads them
// with, converted into the descriptor types above immediately on load so
// the rest of the core never sees the wire format.

#[derive(Debug, Deserialize)]
pub(crate) struct ModuleJson {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub commands: HashMap<String, CommandJson>,
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentJson>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommandJson {
    pub action: ActionJson,
    #[serde(default)]
    pub args: Option<Vec<ArgumentJson>>,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub filename_template: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvironmentJson {
    #[serde(default)]
    pub action: Option<ActionJson>,
    #[serde(default)]
    pub args: Option<Vec<ArgumentJson>>,
    #[serde(default)]
    pub doc: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArgumentJson {
    pub kind: ArgKindJson,
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub key_schema: Option<Vec<KeyJson>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyJson {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ArgKindJson {
    Mandatory,
    Optional,
    Star,
    KeyValue,
    Literal,
}

impl From<ArgKindJson> for ArgKind {
    fn from(value: ArgKindJson) -> Self {
        match value {
            ArgKindJson::Mandatory => ArgKind::Mandatory,
            ArgKindJson::Optional => ArgKind::Optional,
            ArgKindJson::Star => ArgKind::Star,
            ArgKindJson::KeyValue => ArgKind::KeyValue,
            ArgKindJson::Literal => ArgKind::Literal,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ActionJson {
    Input,
    Begin,
    End,
    Heading { level: u8 },
    Label,
    Ref,
    Cite,
    Bibitem,
    Math,
    EndMath,
    Extra { name: String },
}

impl From<ActionJson> for ActionKind {
    fn from(value: ActionJson) -> Self {
        match value {
            ActionJson::Input => ActionKind::Input,
            ActionJson::Begin => ActionKind::Begin,
            ActionJson::End => ActionKind::End,
            ActionJson::Heading { level } => ActionKind::Heading { level },
            ActionJson::Label => ActionKind::Label,
            ActionJson::Ref => ActionKind::Ref,
            ActionJson::Cite => ActionKind::Cite,
            ActionJson::Bibitem => ActionKind::Bibitem,
            ActionJson::Math => ActionKind::Math,
            ActionJson::EndMath => ActionKind::EndMath,
            ActionJson::Extra { name } => ActionKind::Extra(name),
        }
    }
}

impl From<ArgumentJson> for ArgumentSpec {
    fn from(value: ArgumentJson) -> Self {
        Self {
            kind: value.kind.into(),
            name: value.name,
            doc: value.doc,
            key_schema: value.key_schema.map(|ks| ks.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<KeyJson> for KeyDescriptor {
    fn from(value: KeyJson) -> Self {
        Self { name: value.name, doc: value.doc, values: value.values }
    }
}

impl From<CommandJson> for CommandDescriptor {
    fn from(value: CommandJson) -> Self {
        Self {
            name: String::new(), // filled in by the loader from the map key
            action: value.action.into(),
            args: value.args.map(|args| args.into_iter().map(Into::into).collect()),
            doc: value.doc,
            filename_template: value.filename_template,
        }
    }
}

impl From<EnvironmentJson> for EnvironmentDescriptor {
    fn from(value: EnvironmentJson) -> Self {
        Self {
            name: String::new(),
            action: value.action.map(Into::into),
            args: value.args.map(|args| args.into_iter().map(Into::into).collect()),
            doc: value.doc,
        }
    }
}

impl From<ModuleJson> for Module {
    fn from(value: ModuleJson) -> Self {
        let commands = value
            .commands
            .into_iter()
            .map(|(name, cmd)| {
                let mut cmd: CommandDescriptor = cmd.into();
                cmd.name = name.clone();
                (name, cmd)
            })
            .collect();
        let environments = value
            .environments
            .into_iter()
            .map(|(name, env)| {
                let mut env: EnvironmentDescriptor = env.into();
                env.name = name.clone();
                (name, env)
            })
            .collect();
        Self { name: value.name, commands, environments, dependencies: value.dependencies }
    }
}
