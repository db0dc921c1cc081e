//! Key synthesis: one canonical lookup key per literal.
//!
//! Existing catalog values are reused; new keys combine a path-derived
//! suggestion (or an explicit prefix) with the translator's camel-cased
//! token, then walk the collision loop until they land on a key that is
//! free or already bound to the same text.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::CatalogStore;
use crate::utils::{camel_case, unescape_newlines};

/// Assignment for one literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAssignment {
    pub key: String,
    /// False when an existing catalog entry was reused.
    pub need_write: bool,
}

pub struct KeySynthesizer<'a> {
    store: &'a mut CatalogStore,
    base_segments: Vec<String>,
    /// Repeated literals in one file reuse their key without another
    /// translator consultation.
    memo: HashMap<String, String>,
}

impl<'a> KeySynthesizer<'a> {
    pub fn new(store: &'a mut CatalogStore, file_path: &Path, prefix: Option<&str>) -> Self {
        let base_segments = match prefix {
            Some(prefix) if !prefix.is_empty() => {
                prefix.split('.').map(str::to_string).collect()
            }
            _ => suggest_from_path(file_path),
        };
        Self {
            store,
            base_segments,
            memo: HashMap::new(),
        }
    }

    /// Assign a key to `text`, given the translator's token for it.
    /// Literals must be assigned in forward source order.
    pub fn assign(&mut self, text: &str, token: &str) -> KeyAssignment {
        if let Some(key) = self.memo.get(text) {
            return KeyAssignment {
                key: key.clone(),
                need_write: false,
            };
        }

        if let Some(existing) = self.store.lookup_by_value(text) {
            let key = existing.replace('-', "_");
            self.memo.insert(text.to_string(), key.clone());
            return KeyAssignment {
                key,
                need_write: false,
            };
        }

        let mut base = self.base_segments.join(".");
        base.push('.');
        base.push_str(&camel_case(token));
        let base = base.replace('-', "_");

        let cooked = unescape_newlines(text);
        let mut occur_time: usize = 1;
        loop {
            let candidate = candidate_key(&base, occur_time);
            match self.store.lookup_by_key(&candidate) {
                Some(value) if value == cooked => {
                    // Already bound to this very text; reuse without a write.
                    self.memo.insert(text.to_string(), candidate.clone());
                    return KeyAssignment {
                        key: candidate,
                        need_write: false,
                    };
                }
                Some(_) => occur_time += 1,
                None => {
                    self.store.stage(&candidate, text);
                    self.memo.insert(text.to_string(), candidate.clone());
                    return KeyAssignment {
                        key: candidate,
                        need_write: true,
                    };
                }
            }
        }
    }
}

fn candidate_key(base: &str, occur_time: usize) -> String {
    if occur_time == 1 {
        base.to_string()
    } else {
        format!("{}{}", base, occur_time)
    }
}

fn pages_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/pages/[^/]+/([^/]+)/([^/]+)\.[^/.]+$").unwrap())
}

/// Derive key segments from the file path.
///
/// Paths under `/pages/` keep their page and file segments; everything else
/// combines the enclosing directory with the file stem, collapsed to one
/// segment when they match.
fn suggest_from_path(file_path: &Path) -> Vec<String> {
    let normalized = file_path.to_string_lossy().replace('\\', "/");

    if normalized.contains("/pages/")
        && let Some(captures) = pages_regex().captures(&normalized)
    {
        return vec![
            captures[1].replace('-', "_"),
            captures[2].replace('-', "_"),
        ];
    }

    let file_base = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().replace('-', "_"))
        .unwrap_or_default();
    let dir_name = file_path
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().replace('-', "_"))
        .unwrap_or_default();

    if dir_name.is_empty() || dir_name == file_base {
        vec![file_base]
    } else {
        vec![dir_name, file_base]
    }
}
