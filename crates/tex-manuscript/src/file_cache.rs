//! In-memory file store and position indexer (spec.md §4.1).

use crate::CoreError;
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, RwLock};
use tex_position::LineIndex;
use tracing::trace;

struct Entry {
    text: Arc<str>,
    line_index: LineIndex,
    properties: HashMap<String, String>,
}

impl Entry {
    fn new(text: String) -> Self {
        let line_index = LineIndex::new(&text);
        Self { text: Arc::from(text), line_index, properties: HashMap::new() }
    }
}

/// The authoritative source of file contents and position arithmetic
/// (spec.md §4.1). Cheaply `Clone`-able; clones share the same underlying
/// store, matching the teacher's `DocumentStore` pattern.
#[derive(Clone)]
pub struct FileCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl FileCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Returns the stored text for `filename`. If the file was never
    /// [`put`](Self::put), attempts a one-shot disk read and memoizes the
    /// result, so files the editor hasn't opened still participate in scans.
    pub fn get(&self, filename: &str) -> Option<Arc<str>> {
        if let Some(entry) = self.entries.read().unwrap().get(filename) {
            return Some(Arc::clone(&entry.text));
        }
        let text = fs::read_to_string(filename).ok()?;
        trace!(filename, "disk fallback load");
        let mut entries = self.entries.write().unwrap();
        let entry = entries.entry(filename.to_string()).or_insert_with(|| Entry::new(text));
        Some(Arc::clone(&entry.text))
    }

    /// Replaces `filename`'s contents, rebuilding its line index. Side-channel
    /// properties survive; any content-derived cache (the line index) does
    /// not.
    pub fn put(&self, filename: &str, text: String) {
        let mut entries = self.entries.write().unwrap();
        match entries.get_mut(filename) {
            Some(entry) => {
                entry.line_index = LineIndex::new(&text);
                entry.text = Arc::from(text);
            }
            None => {
                entries.insert(filename.to_string(), Entry::new(text));
            }
        }
    }

    /// Drops `filename` entirely, including its properties.
    pub fn forget(&self, filename: &str) {
        self.entries.write().unwrap().remove(filename);
    }

    /// Reads a side-channel property (format id, editor version, root
    /// filename, ...) for `filename`.
    pub fn get_property(&self, filename: &str, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(filename)?.properties.get(key).cloned()
    }

    /// Sets a side-channel property for `filename`. A no-op if the file has
    /// no entry yet.
    pub fn put_property(&self, filename: &str, key: &str, value: String) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(filename) {
            entry.properties.insert(key.to_string(), value);
        }
    }

    /// Returns the configured root filename for `filename`, or `None` if
    /// unset (the caller then treats the file as its own root).
    pub fn get_rootname(&self, filename: &str) -> Option<String> {
        self.get_property(filename, "root")
    }

    /// Converts a 1-based line + UTF-8 codepoint column to a 0-based byte
    /// offset. Columns past end-of-line clamp to the line's final byte.
    pub fn get_position(&self, filename: &str, line: usize, col: usize) -> Result<usize, CoreError> {
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(filename)
            .ok_or_else(|| CoreError::UnknownFile { filename: filename.to_string() })?;
        Ok(entry.line_index.get_position(&entry.text, line, col))
    }

    /// Converts a 0-based byte offset to a (1-based line, 1-based codepoint
    /// column) pair.
    pub fn get_line_col(&self, filename: &str, offset: usize) -> Result<(usize, usize), CoreError> {
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(filename)
            .ok_or_else(|| CoreError::UnknownFile { filename: filename.to_string() })?;
        Ok(entry.line_index.get_line_col(&entry.text, offset))
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let cache = FileCache::new();
        cache.put("/t/a.tex", "hello".to_string());
        assert_eq!(cache.get("/t/a.tex").as_deref(), Some("hello"));
    }

    #[test]
    fn get_unknown_file_is_none_without_disk_match() {
        let cache = FileCache::new();
        assert!(cache.get("/t/does-not-exist-xyz.tex").is_none());
    }

    #[test]
    fn forget_drops_entry_and_properties() {
        let cache = FileCache::new();
        cache.put("/t/a.tex", "hello".to_string());
        cache.put_property("/t/a.tex", "format", "latex".to_string());
        cache.forget("/t/a.tex");
        assert!(cache.get("/t/a.tex").is_none());
        assert!(cache.get_property("/t/a.tex", "format").is_none());
    }

    #[test]
    fn properties_survive_put() {
        let cache = FileCache::new();
        cache.put("/t/a.tex", "hello".to_string());
        cache.put_property("/t/a.tex", "root", "/t/root.tex".to_string());
        cache.put("/t/a.tex", "hello again".to_string());
        assert_eq!(cache.get_rootname("/t/a.tex"), Some("/t/root.tex".to_string()));
    }

    #[test]
    fn position_queries_round_trip() {
        let cache = FileCache::new();
        cache.put("/t/a.tex", "one\ntwo\n".to_string());
        let (line, col) = cache.get_line_col("/t/a.tex", 4).unwrap();
        assert_eq!(cache.get_position("/t/a.tex", line, col).unwrap(), 4);
    }

    #[test]
    fn position_query_for_unknown_file_errors() {
        let cache = FileCache::new();
        let err = cache.get_position("/t/missing.tex", 1, 1).unwrap_err();
        assert!(matches!(err, CoreError::UnknownFile { filename } if filename == "/t/missing.tex"));
    }
}
