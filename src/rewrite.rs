//! Surgical source rewriting.
//!
//! Each span is replaced by a reference expression wrapped for its syntactic
//! context, decided from the unchanged original bytes. Spans arrive sorted
//! by descending start, so every edit leaves the remaining offsets valid.
//! After substitution the lookup import is injected when absent.

use std::path::Path;

use anyhow::{Result, bail};

use crate::extract::component;
use crate::extract::markup::enclosing_interpolation;
use crate::extract::script::{ScriptDialect, has_lookup_import, parse_module, template_parts};
use crate::extract::span::SpanRecord;

/// The identifier under which the host runtime exposes the key lookup.
pub const LOOKUP: &str = "I18N";

/// One substitution: a normalized span plus its assigned key.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub span: SpanRecord,
    pub key: String,
}

pub struct RewriteOutcome {
    pub content: String,
    pub replaced: usize,
    pub import_injected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Script,
    Component,
    Markup,
}

fn file_kind(path: &Path) -> FileKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some("vue") => FileKind::Component,
        Some("html") => FileKind::Markup,
        _ => FileKind::Script,
    }
}

/// Apply substitutions (reverse-sorted) and inject the lookup import.
pub fn rewrite_file(
    source: &str,
    path: &Path,
    substitutions: &[Substitution],
    import_statement: &str,
) -> Result<RewriteOutcome> {
    let kind = file_kind(path);
    let mut content = source.to_string();

    for sub in substitutions {
        let replacement = replacement_for(source, kind, sub);
        content.replace_range(sub.span.start..sub.span.end, &replacement);
    }

    let mut import_injected = false;
    if !substitutions.is_empty() && kind != FileKind::Markup {
        let injected = inject_import(&content, path, kind, import_statement)?;
        import_injected = injected.is_some();
        if let Some(with_import) = injected {
            content = with_import;
        }
    }

    Ok(RewriteOutcome {
        content,
        replaced: substitutions.len(),
        import_injected,
    })
}

/// Build the replacement text for one span from the original bytes.
fn replacement_for(source: &str, kind: FileKind, sub: &Substitution) -> String {
    let reference = format!("{}.{}", LOOKUP, sub.key);
    let slice = &source[sub.span.start..sub.span.end];
    let is_markup = matches!(kind, FileKind::Component | FileKind::Markup);

    // Template literal: the span covers the backticks.
    if sub.span.is_string && slice.starts_with('`') {
        let (_, exprs) = template_parts(slice);
        if exprs.is_empty() {
            return reference;
        }
        let args: Vec<String> = exprs
            .iter()
            .enumerate()
            .map(|(i, expr)| format!("val{}: {}", i + 1, expr))
            .collect();
        return format!(
            "{}.template({}, {{ {} }})",
            LOOKUP,
            reference,
            args.join(", ")
        );
    }

    // Attribute-value assignment: the byte before the span is '='.
    let after_equals = sub.span.start > 0 && source.as_bytes()[sub.span.start - 1] == b'=';
    if after_equals {
        return if is_markup {
            format!("{{{{{}}}}}", reference)
        } else {
            format!("{{{}}}", reference)
        };
    }

    // Inside a {{ … }} region of a markup file the braces already provide
    // expression context.
    if is_markup && enclosing_interpolation(source, sub.span.start, sub.span.end).is_some() {
        return reference;
    }

    if sub.span.is_string {
        reference
    } else if is_markup {
        format!("{{{{{}}}}}", reference)
    } else {
        format!("{{{}}}", reference)
    }
}

/// Inject the lookup import when the file does not already carry one.
/// Returns `None` when the import is already present.
fn inject_import(
    content: &str,
    path: &Path,
    kind: FileKind,
    import_statement: &str,
) -> Result<Option<String>> {
    let path_hint = path.to_string_lossy();
    match kind {
        FileKind::Script => {
            let dialect = match path.extension().and_then(|e| e.to_str()) {
                Some("js" | "jsx") => ScriptDialect::Es,
                _ => ScriptDialect::Typed,
            };
            let parsed = parse_module(content, &path_hint, dialect)?;
            if has_lookup_import(&parsed.module, LOOKUP) {
                return Ok(None);
            }
            // Immediately before the first existing top-level statement.
            let insert_at = parsed
                .module
                .body
                .first()
                .map(|item| {
                    use swc_common::Spanned;
                    parsed.rel(item.span().lo)
                })
                .unwrap_or(0);
            let mut out = content.to_string();
            out.insert_str(insert_at, &format!("{}\n", import_statement));
            Ok(Some(out))
        }
        FileKind::Component => {
            for (start, end) in component::script_ranges(content) {
                let section = &content[start..end];
                let parsed = parse_module(section, &path_hint, ScriptDialect::Typed)?;
                if has_lookup_import(&parsed.module, LOOKUP) {
                    return Ok(None);
                }
            }
            // Immediately after the opening <script> tag. A template-only
            // component has nowhere to carry the import; the host wires the
            // lookup globally in that case.
            let Some(open) = content.find("<script") else {
                return Ok(None);
            };
            let Some(gt) = content[open..].find('>') else {
                bail!("Malformed <script> tag in {}", path_hint);
            };
            let insert_at = open + gt + 1;
            let mut out = content.to_string();
            out.insert_str(insert_at, &format!("\n{}", import_statement));
            Ok(Some(out))
        }
        FileKind::Markup => Ok(None),
    }
}
