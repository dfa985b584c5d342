//! `Core` — the six external operations of spec.md §6, wired over
//! `FileCache` + `Manuscript` + `tex_query`.

use crate::types::{Change, CompletionItem, EditRange, HoverResult, InsertTextFormat, Position, TextEdit};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tex_dictionary::ModuleDictionary;
use tex_manuscript::{CoreError, FileCache, Manuscript, ManuscriptConfig};
use tracing::{debug, warn};

/// Owns the single `FileCache`, module dictionary, and root-Manuscript
/// memoization map for one editor session (spec.md §3 Lifecycle, §5, §9
/// "Memoization of `get_manuscript`"). Cheaply `Clone`-able.
#[derive(Clone)]
pub struct Core {
    cache: FileCache,
    dictionary: ModuleDictionary,
    config: Arc<ManuscriptConfig>,
    roots: Arc<RwLock<HashMap<(String, String), Manuscript>>>,
}

impl Core {
    /// Creates a core backed by `data_dir` for module lookups, using the
    /// default manuscript configuration (include depth 15).
    pub fn new(data_dir: PathBuf) -> Self {
        Self::with_config(data_dir, ManuscriptConfig::default())
    }

    /// As [`new`](Self::new), with an explicit manuscript configuration.
    pub fn with_config(data_dir: PathBuf, config: ManuscriptConfig) -> Self {
        Self {
            cache: FileCache::new(),
            dictionary: ModuleDictionary::new(data_dir),
            config: Arc::new(config),
            roots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The editor opened `filename` with `text` under `format` at `version`.
    /// Creates (or refreshes) the root Manuscript for `filename`.
    pub fn did_open(&self, filename: &str, text: String, format: &str, version: i64) -> Result<(), CoreError> {
        self.cache.put(filename, text);
        self.cache.put_property(filename, "format", format.to_string());
        self.cache.put_property(filename, "version", version.to_string());
        let manuscript = self.get_or_open_root(filename, format)?;
        manuscript.refresh();
        Ok(())
    }

    /// Applies a batch of changes to `filename`, then refreshes the owning
    /// Manuscript tree. Each [`Change::Incremental`] is checked against the
    /// current indexed byte length of its range (spec.md §6, §8 property 2,
    /// scenario S6); a mismatch rejects the whole change with
    /// [`CoreError::RangeMismatch`] and leaves the cache untouched by that
    /// entry.
    pub fn did_change(&self, filename: &str, changes: Vec<Change>, version: i64) -> Result<(), CoreError> {
        for change in changes {
            match change {
                Change::Full { text } => self.cache.put(filename, text),
                Change::Incremental { range, range_length, text } => {
                    let current = self
                        .cache
                        .get(filename)
                        .ok_or_else(|| CoreError::UnknownFile { filename: filename.to_string() })?;
                    let start = self.cache.get_position(filename, range.start.line + 1, range.start.character + 1)?;
                    let end = self.cache.get_position(filename, range.end.line + 1, range.end.character + 1)?;
                    let found = end.saturating_sub(start);
                    if found != range_length {
                        return Err(CoreError::RangeMismatch {
                            filename: filename.to_string(),
                            expected: range_length,
                            found,
                        });
                    }
                    let mut next = String::with_capacity(current.len() - found + text.len());
                    next.push_str(&current[..start]);
                    next.push_str(&text);
                    next.push_str(&current[end..]);
                    self.cache.put(filename, next);
                }
            }
        }
        self.cache.put_property(filename, "version", version.to_string());
        self.refresh_root_of(filename);
        Ok(())
    }

    /// The editor closed `filename`: forgets it and its root (spec.md §6),
    /// dropping the root's memoized Manuscript so the next query rebuilds it.
    pub fn did_close(&self, filename: &str) {
        let root_name = self.cache.get_rootname(filename).unwrap_or_else(|| filename.to_string());
        self.cache.forget(filename);
        if root_name != filename {
            self.cache.forget(&root_name);
        }
        self.roots.write().unwrap().retain(|(fname, _), _| fname != &root_name);
        debug!(filename, root = %root_name, "did_close");
    }

    /// Hover text for the construct under `(line, character)`, or `None`
    /// (spec.md §6, §7 "absent ⇒ neutral protocol-specific null").
    pub fn hover(&self, filename: &str, line: usize, character: usize) -> Option<HoverResult> {
        let (node, pos) = self.resolve(filename, line, character)?;
        let contents = tex_query::hover(&node, pos)?;
        Some(HoverResult { contents })
    }

    /// Signature help for the invocation under `(line, character)`, or
    /// `None`.
    pub fn signature_help(&self, filename: &str, line: usize, character: usize) -> Option<tex_query::SignatureHelp> {
        let (node, pos) = self.resolve(filename, line, character)?;
        tex_query::signature_help(&node, pos)
    }

    /// Completion candidates for the caret at `(line, character)`, shaped as
    /// wire-ready [`CompletionItem`]s with a textEdit covering the existing
    /// prefix (spec.md §6).
    pub fn completion(&self, filename: &str, line: usize, character: usize) -> Option<Vec<CompletionItem>> {
        let (node, pos) = self.resolve(filename, line, character)?;
        let completion = tex_query::complete(&node, pos)?;
        let start = self.to_position(filename, completion.pos)?;
        let end = self.to_position(filename, pos)?;
        let range = EditRange { start, end };
        Some(
            completion
                .candidates
                .into_iter()
                .map(|candidate| {
                    let (format, new_text) = match candidate.snippet {
                        Some(snippet) => (InsertTextFormat::Snippet, snippet),
                        None => (InsertTextFormat::Plain, candidate.text.clone()),
                    };
                    CompletionItem {
                        label: candidate.text,
                        filter_text: candidate.filter_text,
                        documentation: candidate.summary,
                        detail: candidate.detail,
                        insert_text_format: format,
                        text_edit: TextEdit { range, new_text },
                    }
                })
                .collect(),
        )
    }

    fn get_or_open_root(&self, filename: &str, format: &str) -> Result<Manuscript, CoreError> {
        let key = (filename.to_string(), format.to_string());
        if let Some(existing) = self.roots.read().unwrap().get(&key).cloned() {
            return Ok(existing);
        }
        let manuscript = Manuscript::open(filename, format, self.cache.clone(), self.dictionary.clone(), Arc::clone(&self.config))?;
        self.roots.write().unwrap().insert(key, manuscript.clone());
        Ok(manuscript)
    }

    fn refresh_root_of(&self, filename: &str) {
        let root_name = self.cache.get_rootname(filename).unwrap_or_else(|| filename.to_string());
        let roots = self.roots.read().unwrap();
        for ((fname, _format), manuscript) in roots.iter() {
            if fname == &root_name {
                manuscript.refresh();
            }
        }
    }

    /// Locates the owning Manuscript node (root or child) for `filename` and
    /// converts `(line, character)` to a byte offset, refreshing the tree
    /// first so the result reflects the latest edits.
    fn resolve(&self, filename: &str, line: usize, character: usize) -> Option<(Manuscript, usize)> {
        let root_name = self.cache.get_rootname(filename).unwrap_or_else(|| filename.to_string());
        let format = self.cache.get_property(&root_name, "format")?;
        let root = self.get_or_open_root(&root_name, &format).ok()?;
        root.refresh();
        let node = if filename == root_name {
            root
        } else {
            match find_node(&root, filename) {
                Some(node) => node,
                None => {
                    warn!(filename, root = %root_name, "no manuscript node found for file");
                    return None;
                }
            }
        };
        let pos = self.cache.get_position(filename, line + 1, character + 1).ok()?;
        Some((node, pos))
    }

    fn to_position(&self, filename: &str, offset: usize) -> Option<Position> {
        let (line, character) = self.cache.get_line_col(filename, offset).ok()?;
        Some(Position { line: line.saturating_sub(1), character: character.saturating_sub(1) })
    }
}

fn find_node(node: &Manuscript, filename: &str) -> Option<Manuscript> {
    if node.filename() == filename {
        return Some(node.clone());
    }
    for child in node.children().values() {
        if let Some(found) = find_node(child, filename) {
            return Some(found);
        }
    }
    None
}
