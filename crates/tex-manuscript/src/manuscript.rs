//! The Manuscript include-graph node: scopes, extracted indices, global and
//! local scan (spec.md §4.4, §4.5).

use crate::config::ManuscriptConfig;
use crate::error::CoreError;
use crate::file_cache::FileCache;
use crate::frame::{Frame, FrameKind};
use crate::index::{build_outline, IndexEntry, OutlineNode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock, Weak};
use tex_dictionary::{ActionKind, ArgumentSpec, CommandDescriptor, EnvironmentDescriptor, Module, ModuleDictionary};
use tex_parser::{parse_args, parse_keys, next_thing, ArgKind, TokenKind};
use tex_position::Range;
use tracing::{debug, debug_span, warn};

struct Inner {
    filename: String,
    src: String,
    format: String,
    depth: usize,
    parent: Option<Weak<RwLock<Inner>>>,
    cache: FileCache,
    dictionary: ModuleDictionary,
    config: Arc<ManuscriptConfig>,
    local_commands: HashMap<String, Arc<CommandDescriptor>>,
    local_environments: HashMap<String, Arc<EnvironmentDescriptor>>,
    local_modules: HashMap<String, Arc<Module>>,
    labels: Vec<IndexEntry>,
    bibitems: Vec<IndexEntry>,
    outline: Vec<OutlineNode>,
    input_index: Vec<IndexEntry>,
    label_index: Vec<IndexEntry>,
    section_index: Vec<IndexEntry>,
    children: HashMap<String, Manuscript>,
}

/// A per-file node of the include graph (spec.md §3 "Manuscript node").
/// Cheaply `Clone`-able; a clone shares the same underlying state.
#[derive(Clone)]
pub struct Manuscript(Arc<RwLock<Inner>>);

impl Manuscript {
    /// Opens a root Manuscript for `filename` at the given format (e.g.
    /// `"latex"`), adopting that format's module and running the initial
    /// `global_scan`.
    pub fn open(
        filename: impl Into<String>,
        format: impl Into<String>,
        cache: FileCache,
        dictionary: ModuleDictionary,
        config: Arc<ManuscriptConfig>,
    ) -> Result<Manuscript, CoreError> {
        Self::new_node(filename.into(), format.into(), 1, None, cache, dictionary, config)
    }

    fn new_node(
        filename: String,
        format: String,
        depth: usize,
        parent: Option<Weak<RwLock<Inner>>>,
        cache: FileCache,
        dictionary: ModuleDictionary,
        config: Arc<ManuscriptConfig>,
    ) -> Result<Manuscript, CoreError> {
        let src = cache.get(&filename).map(|s| s.to_string()).unwrap_or_default();
        let inner = Inner {
            filename,
            src,
            format,
            depth,
            parent,
            cache,
            dictionary,
            config,
            local_commands: HashMap::new(),
            local_environments: HashMap::new(),
            local_modules: HashMap::new(),
            labels: Vec::new(),
            bibitems: Vec::new(),
            outline: Vec::new(),
            input_index: Vec::new(),
            label_index: Vec::new(),
            section_index: Vec::new(),
            children: HashMap::new(),
        };
        let manuscript = Manuscript(Arc::new(RwLock::new(inner)));
        let format_name = manuscript.0.read().unwrap().format.clone();
        manuscript.adopt_module(&format_name)?;
        manuscript.global_scan();
        Ok(manuscript)
    }

    /// Loads `name` from the data dictionary and merges its commands and
    /// environments into this node's local scope.
    pub fn adopt_module(&self, name: &str) -> Result<(), CoreError> {
        let dictionary = self.0.read().unwrap().dictionary.clone();
        let module = dictionary.load_module(name).map_err(|err| {
            warn!(module = name, error = %err, "module load failed");
            CoreError::DictionaryLoad { module: name.to_string(), reason: err.to_string() }
        })?;
        let mut inner = self.0.write().unwrap();
        for (cmd_name, cmd) in &module.commands {
            inner.local_commands.insert(cmd_name.clone(), Arc::new(cmd.clone()));
        }
        for (env_name, env) in &module.environments {
            inner.local_environments.insert(env_name.clone(), Arc::new(env.clone()));
        }
        inner.local_modules.insert(name.to_string(), module);
        Ok(())
    }

    /// This node's absolute filename.
    pub fn filename(&self) -> String {
        self.0.read().unwrap().filename.clone()
    }

    /// Depth in the include graph; the root is depth 1.
    pub fn depth(&self) -> usize {
        self.0.read().unwrap().depth
    }

    /// A snapshot of the current source text.
    pub fn src(&self) -> String {
        self.0.read().unwrap().src.clone()
    }

    /// This node's construction-time configuration (spec.md §4.9), e.g. the
    /// search paths `input`-class completion enumerates against.
    pub fn config(&self) -> Arc<ManuscriptConfig> {
        Arc::clone(&self.0.read().unwrap().config)
    }

    /// Looks up a command by name, falling back through the parent chain.
    pub fn command(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        let inner = self.0.read().unwrap();
        if let Some(found) = inner.local_commands.get(name) {
            return Some(Arc::clone(found));
        }
        let parent = inner.parent.clone();
        drop(inner);
        parent.and_then(|p| p.upgrade()).and_then(|p| Manuscript(p).command(name))
    }

    /// Looks up an environment by name, falling back through the parent
    /// chain.
    pub fn environment(&self, name: &str) -> Option<Arc<EnvironmentDescriptor>> {
        let inner = self.0.read().unwrap();
        if let Some(found) = inner.local_environments.get(name) {
            return Some(Arc::clone(found));
        }
        let parent = inner.parent.clone();
        drop(inner);
        parent.and_then(|p| p.upgrade()).and_then(|p| Manuscript(p).environment(name))
    }

    /// Looks up a loaded module by name, falling back through the parent
    /// chain.
    pub fn module(&self, name: &str) -> Option<Arc<Module>> {
        let inner = self.0.read().unwrap();
        if let Some(found) = inner.local_modules.get(name) {
            return Some(Arc::clone(found));
        }
        let parent = inner.parent.clone();
        drop(inner);
        parent.and_then(|p| p.upgrade()).and_then(|p| Manuscript(p).module(name))
    }

    /// Extracted labels, in source order.
    pub fn labels(&self) -> Vec<IndexEntry> {
        self.0.read().unwrap().labels.clone()
    }

    /// Extracted bibitems, in source order.
    pub fn bibitems(&self) -> Vec<IndexEntry> {
        self.0.read().unwrap().bibitems.clone()
    }

    /// The outline tree, nested by heading level.
    pub fn outline(&self) -> Vec<OutlineNode> {
        self.0.read().unwrap().outline.clone()
    }

    /// Resolved `\input`-class references, in source order.
    pub fn input_index(&self) -> Vec<IndexEntry> {
        self.0.read().unwrap().input_index.clone()
    }

    /// Same entries as [`labels`](Self::labels), indexed for lookup by
    /// position rather than by name.
    pub fn label_index(&self) -> Vec<IndexEntry> {
        self.0.read().unwrap().label_index.clone()
    }

    /// Section headings, in source order, flat (unlike [`outline`](Self::outline)).
    pub fn section_index(&self) -> Vec<IndexEntry> {
        self.0.read().unwrap().section_index.clone()
    }

    /// Child Manuscript nodes keyed by resolved filename.
    pub fn children(&self) -> HashMap<String, Manuscript> {
        self.0.read().unwrap().children.clone()
    }

    /// Walks the parent chain up to the root ancestor (spec.md glossary
    /// "Root manuscript").
    pub fn root(&self) -> Manuscript {
        match self.parent_handle() {
            Some(parent) => parent.root(),
            None => self.clone(),
        }
    }

    /// This node's parent, or `None` if it is a root.
    pub fn parent_handle(&self) -> Option<Manuscript> {
        let parent = self.0.read().unwrap().parent.clone();
        parent.and_then(|p| p.upgrade()).map(Manuscript)
    }

    /// `(name, doc)` pairs for every command in this node's own local scope
    /// (not the parent chain) — used by completion to enumerate commands
    /// one scope at a time while walking outward.
    pub fn local_command_names_with_docs(&self) -> Vec<(String, String)> {
        self.0.read().unwrap().local_commands.iter().map(|(name, cmd)| (name.clone(), cmd.doc.clone())).collect()
    }

    /// Reconciles this Manuscript (and its subtree) with the cache
    /// (spec.md §4.5). Returns whether any node was rescanned.
    pub fn refresh(&self) -> bool {
        let (filename, current_src, cache) = {
            let inner = self.0.read().unwrap();
            (inner.filename.clone(), inner.src.clone(), inner.cache.clone())
        };
        let on_disk = cache.get(&filename).map(|s| s.to_string()).unwrap_or_default();
        if on_disk == current_src {
            debug!(filename = %filename, "refresh: unchanged, recursing");
            let children = self.children();
            return children.values().fold(false, |acc, child| child.refresh() || acc);
        }
        debug!(filename = %filename, "refresh: content changed, rescanning");
        self.0.write().unwrap().src = on_disk;
        self.global_scan();
        true
    }

    /// Rebuilds the extracted indices and children from the current `src`
    /// (spec.md §4.4).
    pub fn global_scan(&self) {
        let (filename, src, format, depth, cache, dictionary, config) = {
            let inner = self.0.read().unwrap();
            (
                inner.filename.clone(),
                inner.src.clone(),
                inner.format.clone(),
                inner.depth,
                inner.cache.clone(),
                inner.dictionary.clone(),
                Arc::clone(&inner.config),
            )
        };
        let span = debug_span!("global_scan", filename = %filename);
        let _enter = span.enter();

        let mut acc = ScanAccumulator::default();
        let mut env_stack: Vec<String> = Vec::new();

        let mut pos = 0usize;
        while let Some(token) = next_thing(&src, pos) {
            if token.kind != TokenKind::Cs {
                pos = token.pos2;
                continue;
            }
            let Some(cmd) = self.command(&token.detail) else {
                pos = token.pos2;
                continue;
            };
            let (args, resume) = parse_action_args(Some(&cmd.action), cmd.args.as_deref(), &src, token.pos2);
            acc.apply_action(&cmd.action, token.pos1, &args, cmd.args.as_deref(), cmd.filename_template.as_deref(), &filename, &format, &src);

            match &cmd.action {
                ActionKind::Begin => {
                    if let Some(env_range) = args.args.first() {
                        let env_name = env_range.slice(&src).to_string();
                        // spec.md §4.4: delegate to the environment's own
                        // action, if one is defined, in addition to tracking
                        // the environment stack below.
                        if let Some(descriptor) = self.environment(&env_name) {
                            if let Some(env_action) = descriptor.action.clone() {
                                let env_args_start = args.pos + args.len;
                                let (env_args, _) = parse_action_args(
                                    Some(&env_action),
                                    descriptor.args.as_deref(),
                                    &src,
                                    env_args_start,
                                );
                                acc.apply_action(
                                    &env_action,
                                    token.pos1,
                                    &env_args,
                                    descriptor.args.as_deref(),
                                    None,
                                    &filename,
                                    &format,
                                    &src,
                                );
                            }
                        }
                        env_stack.push(env_name);
                    }
                }
                ActionKind::End => {
                    env_stack.pop();
                }
                _ => {}
            }

            pos = resume.max(token.pos2);
            if pos <= token.pos1 {
                break;
            }
        }

        let ScanAccumulator { mut labels, mut bibitems, mut input_index, section_titles, pending_children } = acc;
        labels.sort_by_key(|e| e.pos);
        bibitems.sort_by_key(|e| e.pos);
        input_index.sort_by_key(|e| e.pos);
        let label_index = labels.clone();
        let section_index: Vec<IndexEntry> =
            section_titles.iter().map(|(pos, _, title)| IndexEntry { pos: *pos, name: title.clone() }).collect();
        let outline = build_outline(section_titles);

        let mut new_children = HashMap::new();
        for (path, format) in pending_children {
            if new_children.contains_key(&path) {
                continue;
            }
            if depth + 1 > config.max_include_depth {
                warn!(path = %path, depth = depth + 1, "include cycle guard tripped");
                continue;
            }
            match Self::new_node(
                path.clone(),
                format,
                depth + 1,
                Some(Arc::downgrade(&self.0)),
                cache.clone(),
                dictionary.clone(),
                Arc::clone(&config),
            ) {
                Ok(child) => {
                    new_children.insert(path, child);
                }
                Err(err) => warn!(path = %path, error = %err, "failed to open child manuscript"),
            }
        }

        if !new_children.is_empty() {
            let root_filename = self.root().filename();
            for path in new_children.keys() {
                cache.put_property(path, "root", root_filename.clone());
            }
        }

        debug!(bytes = src.len(), children = new_children.len(), "global_scan complete");

        let mut inner = self.0.write().unwrap();
        inner.labels = labels;
        inner.bibitems = bibitems;
        inner.outline = outline;
        inner.input_index = input_index;
        inner.label_index = label_index;
        inner.section_index = section_index;
        inner.children = new_children;
    }

    /// Returns the context stack at `pos` (spec.md §4.4, §8 property 5):
    /// the innermost frame, chained via `parent` out to the `Root` sentinel.
    pub fn local_scan(&self, pos: usize) -> Arc<Frame> {
        let src = self.0.read().unwrap().src.clone();
        let start = paragraph_start(&src, pos);
        self.local_scan_from(&src, start, pos)
    }

    fn local_scan_from(&self, text: &str, start: usize, pos: usize) -> Arc<Frame> {
        let root = Frame::root(start, text.len().saturating_sub(start));
        let mut best = Arc::clone(&root);
        let mut cur = start;

        while let Some(token) = next_thing(text, cur) {
            if token.pos1 > pos {
                break;
            }
            if token.kind != TokenKind::Cs {
                cur = token.pos2;
                continue;
            }

            if token.detail == "begin" {
                let name_args = parse_args(text, token.pos2, &[ArgKind::Mandatory]);
                let env_name = name_args.args[0].slice(text).to_string();
                let descriptor = self.environment(&env_name);
                let sig = descriptor.as_ref().and_then(|d| d.args.clone());
                let env_action = descriptor.as_ref().and_then(|d| d.action.clone());
                let args_start = name_args.pos + name_args.len;
                let (args, total_end) = parse_action_args(env_action.as_ref(), sig.as_deref(), text, args_start);
                let frame_len = total_end.saturating_sub(token.pos1);
                if Range::new(token.pos1, frame_len).contains_inclusive(pos) {
                    let env_frame = Arc::new(Frame {
                        pos: token.pos1,
                        len: frame_len,
                        kind: FrameKind::Environment { name: env_name, descriptor },
                        parent: Some(Arc::clone(&root)),
                    });
                    best = pick_innermost(env_frame, &args, sig.as_deref(), text, pos);
                }
                cur = total_end.max(token.pos2);
            } else if let Some(cmd) = self.command(&token.detail) {
                let sig = cmd.args.clone();
                let (args, total_end) = parse_action_args(Some(&cmd.action), sig.as_deref(), text, token.pos2);
                let frame_len = total_end.saturating_sub(token.pos1);
                if Range::new(token.pos1, frame_len).contains_inclusive(pos) {
                    let cmd_frame = Arc::new(Frame {
                        pos: token.pos1,
                        len: frame_len,
                        kind: FrameKind::Command { name: token.detail.clone(), descriptor: Some(Arc::clone(&cmd)) },
                        parent: Some(Arc::clone(&root)),
                    });
                    best = pick_innermost(cmd_frame, &args, sig.as_deref(), text, pos);
                }
                cur = total_end.max(token.pos2);
            } else {
                if Range::new(token.pos1, token.pos2 - token.pos1).contains_inclusive(pos) {
                    best = Arc::new(Frame {
                        pos: token.pos1,
                        len: token.pos2 - token.pos1,
                        kind: FrameKind::Command { name: token.detail.clone(), descriptor: None },
                        parent: Some(Arc::clone(&root)),
                    });
                }
                cur = token.pos2;
            }

            if cur <= token.pos1 {
                break;
            }
        }
        best
    }
}

fn arg_kinds(sig: Option<&[ArgumentSpec]>) -> Vec<ArgKind> {
    sig.map(|s| s.iter().map(|a| a.kind).collect()).unwrap_or_default()
}

/// Parses the argument list following `action`'s command/environment name,
/// using the dictionary-registered extension parser when `action` is
/// `Extra` and one is registered (spec.md §4.4), falling back to ordinary
/// signature-driven `parse_args` otherwise. Returns the parsed list and the
/// byte offset scanning should resume from.
fn parse_action_args(
    action: Option<&ActionKind>,
    sig: Option<&[ArgumentSpec]>,
    src: &str,
    pos: usize,
) -> (tex_parser::ArgList, usize) {
    if let Some(ActionKind::Extra(name)) = action {
        if let Some(parser) = tex_parser::lookup_extension(name) {
            let args = parser(src, pos);
            let resume = (args.pos + args.len).max(pos);
            return (args, resume);
        }
    }
    let kinds = arg_kinds(sig);
    let args = parse_args(src, pos, &kinds);
    let resume = if kinds.is_empty() { pos } else { args.pos + args.len };
    (args, resume)
}

/// Accumulates the indices `global_scan` extracts, recording both a
/// command's own action and (via environment delegation) an environment's
/// action through the same dispatch (spec.md §4.4).
#[derive(Default)]
struct ScanAccumulator {
    labels: Vec<IndexEntry>,
    bibitems: Vec<IndexEntry>,
    input_index: Vec<IndexEntry>,
    section_titles: Vec<(usize, u8, String)>,
    pending_children: Vec<(String, String)>,
}

impl ScanAccumulator {
    #[allow(clippy::too_many_arguments)]
    fn apply_action(
        &mut self,
        action: &ActionKind,
        pos1: usize,
        args: &tex_parser::ArgList,
        sig: Option<&[ArgumentSpec]>,
        template: Option<&str>,
        filename: &str,
        format: &str,
        src: &str,
    ) {
        match action {
            ActionKind::Input => {
                if let Some(name_range) = first_mandatory(args, sig) {
                    let raw_name = name_range.slice(src);
                    let resolved_name = apply_template(template, raw_name);
                    let child_path = resolve_child_path(filename, &resolved_name);
                    self.input_index.push(IndexEntry { pos: pos1, name: child_path.clone() });
                    self.pending_children.push((child_path, format.to_string()));
                }
            }
            ActionKind::Heading { level } => {
                if let Some(title_range) = first_mandatory(args, sig) {
                    self.section_titles.push((pos1, *level, title_range.slice(src).to_string()));
                }
            }
            ActionKind::Label => {
                if let Some(name_range) = first_mandatory(args, sig) {
                    self.labels.push(IndexEntry { pos: pos1, name: name_range.slice(src).to_string() });
                }
            }
            ActionKind::Bibitem => {
                if let Some(name_range) = first_mandatory(args, sig) {
                    self.bibitems.push(IndexEntry { pos: pos1, name: name_range.slice(src).to_string() });
                }
            }
            _ => {}
        }
    }
}

/// Finds the first `Mandatory`-kind argument's parsed range, used to pull
/// the filename/title/label-name out of a single-mandatory-argument command.
fn first_mandatory(args: &tex_parser::ArgList, sig: Option<&[ArgumentSpec]>) -> Option<Range> {
    let sig = sig?;
    for (idx, spec) in sig.iter().enumerate() {
        if spec.kind == ArgKind::Mandatory {
            let range = args.args.get(idx)?;
            if !range.is_absent() {
                return Some(*range);
            }
        }
    }
    None
}

fn apply_template(template: Option<&str>, name: &str) -> String {
    match template {
        Some(t) => t.replacen("%s", name, 1),
        None => name.to_string(),
    }
}

fn resolve_child_path(parent_filename: &str, raw_name: &str) -> String {
    let parent_dir = Path::new(parent_filename).parent().unwrap_or_else(|| Path::new(""));
    parent_dir.join(raw_name).to_string_lossy().into_owned()
}

/// Walks forward once over `text` (never re-scanning a byte twice), finding
/// the last paragraph-break end position at or before `limit`. A linear
/// replacement for the quadratic backward `find_par` pattern spec.md §9
/// flags.
fn paragraph_start(text: &str, limit: usize) -> usize {
    let bytes = text.as_bytes();
    let limit = limit.min(bytes.len());
    let mut last_break_end = 0usize;
    let mut i = 0usize;
    while i < limit {
        if bytes[i] == b'\n' {
            let mut j = i + 1;
            loop {
                while j < bytes.len() && matches!(bytes[j], b' ' | b'\t' | b'\r') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'%' {
                    while j < bytes.len() && bytes[j] != b'\n' {
                        j += 1;
                    }
                    continue;
                }
                break;
            }
            if j < bytes.len() && bytes[j] == b'\n' {
                let break_end = j + 1;
                if break_end <= limit {
                    last_break_end = break_end;
                }
                i = j;
            }
        }
        i += 1;
    }
    last_break_end
}

fn pick_innermost(
    cmd_frame: Arc<Frame>,
    args: &tex_parser::ArgList,
    sig: Option<&[ArgumentSpec]>,
    text: &str,
    pos: usize,
) -> Arc<Frame> {
    for (idx, range) in args.args.iter().enumerate() {
        if range.is_absent() || !range.contains_inclusive(pos) {
            continue;
        }
        let spec = sig.and_then(|s| s.get(idx)).cloned();
        let arg_frame = Arc::new(Frame {
            pos: range.pos,
            len: range.len,
            kind: FrameKind::Argument { index: idx, spec: spec.clone() },
            parent: Some(Arc::clone(&cmd_frame)),
        });

        if let Some(spec) = &spec {
            if spec.kind == ArgKind::KeyValue {
                let pairs = parse_keys(text, range.pos, range.len);
                for pair in &pairs {
                    if let Some(value_range) = pair.value {
                        if value_range.contains_inclusive(pos) {
                            let key_text = pair.key.slice(text).to_string();
                            let key_spec = spec
                                .key_schema
                                .as_ref()
                                .and_then(|ks| ks.iter().find(|k| k.name == key_text))
                                .cloned();
                            return Arc::new(Frame {
                                pos: value_range.pos,
                                len: value_range.len,
                                kind: FrameKind::ValueInKey { key: key_text, spec: key_spec },
                                parent: Some(Arc::clone(&arg_frame)),
                            });
                        }
                    }
                    if pair.key.contains_inclusive(pos) {
                        let key_text = pair.key.slice(text).to_string();
                        return Arc::new(Frame {
                            pos: pair.key.pos,
                            len: pair.key.len,
                            kind: FrameKind::KeyInList { key: key_text },
                            parent: Some(Arc::clone(&arg_frame)),
                        });
                    }
                }
            }
        }
        return arg_frame;
    }
    cmd_frame
}
