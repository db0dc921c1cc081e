//! Chinese-literal discovery: one extractor per source dialect, a shared
//! span record, and the normalizer that feeds the rewriter.
//!
//! Dialects: typed script (`.ts`/`.tsx`), plain script (`.js`/`.jsx`),
//! standalone markup (`.html`) and single-file components (`.vue`, two
//! framework-version variants).

pub mod component;
pub mod markup;
pub mod script;
pub mod span;

use std::path::Path;

use anyhow::Result;

use crate::config::VueVersion;
pub use span::{SpanRecord, normalize};

/// Route a file's contents to the correct extractor by extension.
pub fn extract_file(path: &Path, source: &str, vue_version: VueVersion) -> Result<Vec<SpanRecord>> {
    let path_hint = path.to_string_lossy();
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => Ok(markup::extract_html(source)),
        Some("vue") => component::extract_component(source, &path_hint, vue_version),
        Some("js" | "jsx") => {
            script::extract_script(source, &path_hint, script::ScriptDialect::Es, 0)
        }
        _ => script::extract_script(source, &path_hint, script::ScriptDialect::Typed, 0),
    }
}
