//! In-memory view of the key→text catalog.
//!
//! Loaded once per run from the catalog directory and shared by the key
//! synthesizer and the rewriter. New assignments are staged per file and
//! only committed to disk after that file's bytes are safely written; a
//! failed rewrite discards the stage, keeping catalog and sources agreed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use swc_ecma_ast::{ImportSpecifier, ModuleDecl, ModuleItem};

use crate::catalog::module_text;
use crate::catalog::writer;
use crate::extract::script::{ScriptDialect, parse_module};
use crate::utils::unescape_newlines;

pub struct CatalogStore {
    dir: PathBuf,
    ext: String,
    /// Committed entries in catalog iteration order.
    entries: Vec<(String, String)>,
    /// Entries staged for the file currently being processed.
    pending: Vec<(String, String)>,
}

impl CatalogStore {
    /// Load the catalog beneath `dir` (the `<kiwiDir>/<srcLang>` directory).
    ///
    /// The aggregator file names the namespaces; each namespace file is
    /// flattened into dotted keys. A missing aggregator yields an empty
    /// store: the first write creates the layout.
    pub fn load(dir: &Path, ext: &str) -> Result<Self> {
        let mut store = Self {
            dir: dir.to_path_buf(),
            ext: ext.to_string(),
            entries: Vec::new(),
            pending: Vec::new(),
        };

        let index_path = dir.join(format!("index.{}", ext));
        if !index_path.exists() {
            return Ok(store);
        }

        let index_source = std::fs::read_to_string(&index_path)
            .with_context(|| format!("Failed to read {}", index_path.display()))?;
        for namespace in namespaces_of(&index_source, &index_path)? {
            let ns_path = dir.join(format!("{}.{}", namespace, ext));
            if !ns_path.exists() {
                continue;
            }
            let ns_source = std::fs::read_to_string(&ns_path)
                .with_context(|| format!("Failed to read {}", ns_path.display()))?;
            let tree = module_text::parse_default_export(&ns_source, &ns_path.to_string_lossy())?;
            let mut flat = Vec::new();
            module_text::flatten(&tree, &namespace, &mut flat);
            store.entries.extend(flat);
        }
        Ok(store)
    }

    /// The first key bound to `value`, searching committed entries before
    /// staged ones, in insertion order.
    pub fn lookup_by_value(&self, value: &str) -> Option<&str> {
        let value = unescape_newlines(value);
        self.entries
            .iter()
            .chain(self.pending.iter())
            .find(|(_, v)| *v == value)
            .map(|(k, _)| k.as_str())
    }

    pub fn lookup_by_key(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .chain(self.pending.iter())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup_by_key(key).is_some()
    }

    /// The current key set, committed entries first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .chain(self.pending.iter())
            .map(|(k, _)| k.as_str())
    }

    /// Stage a new assignment for the current file.
    pub fn stage(&mut self, key: &str, text: &str) {
        self.pending
            .push((key.to_string(), unescape_newlines(text)));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Write every staged entry to disk and fold it into the committed view.
    pub fn commit_pending(&mut self, validate_duplicate: bool) -> Result<usize> {
        let staged = std::mem::take(&mut self.pending);
        let count = staged.len();
        for (key, text) in &staged {
            writer::write_entry(&self.dir, &self.ext, key, text, validate_duplicate)?;
        }
        self.entries.extend(staged);
        Ok(count)
    }

    /// Drop staged entries after a failed rewrite.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }
}

/// Namespace names registered in the aggregator, in import order.
///
/// The aggregator is re-read from disk on every load on purpose; no cached
/// module view is consulted.
fn namespaces_of(index_source: &str, index_path: &Path) -> Result<Vec<String>> {
    let parsed = parse_module(
        index_source,
        &index_path.to_string_lossy(),
        ScriptDialect::Typed,
    )?;

    let mut namespaces = Vec::new();
    for item in &parsed.module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item {
            let has_default = import
                .specifiers
                .iter()
                .any(|s| matches!(s, ImportSpecifier::Default(_)));
            if !has_default {
                continue;
            }
            if let Some(src) = import.src.value.as_str() {
                let name = src.trim_start_matches("./").to_string();
                if !name.is_empty() {
                    namespaces.push(name);
                }
            }
        }
    }
    Ok(namespaces)
}
