//! Literal extractors for single-file components.
//!
//! A component file combines a template section, a script section and
//! (version 3) an optional setup-script section. Two strategies coexist,
//! selected by the configured framework version; the version-3 walk falls
//! back to the version-2 one when it cannot process the file.

use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;

use crate::config::VueVersion;
use crate::extract::markup::{self, Attribute, MarkupEvent};
use crate::extract::script::{self, ScriptDialect, template_parts};
use crate::extract::span::SpanRecord;
use crate::utils::contains_chinese;

/// Space entities and their same-width sentinels. Widths must match so the
/// sentinel substitution keeps every byte offset valid.
const SPACE_ENTITIES: &[(&str, &str)] = &[
    ("&ensp;", "\u{1}ensp\u{1}"),
    ("&emsp;", "\u{1}emsp\u{1}"),
    ("&nbsp;", "\u{1}nbsp\u{1}"),
];

/// One section of a component file, with the byte range of its inner content.
#[derive(Debug, Clone)]
struct Section {
    start: usize,
    end: usize,
    setup: bool,
}

#[derive(Debug, Default)]
struct ComponentLayout {
    template: Option<Section>,
    scripts: Vec<Section>,
}

/// Extract Chinese-literal spans from a component file.
pub fn extract_component(
    source: &str,
    path_hint: &str,
    version: VueVersion,
) -> Result<Vec<SpanRecord>> {
    match version {
        VueVersion::Vue2 => extract_v2(source, path_hint),
        VueVersion::Vue3 => extract_v3(source, path_hint).or_else(|_| extract_v2(source, path_hint)),
    }
}

fn layout(source: &str) -> ComponentLayout {
    let mut result = ComponentLayout::default();

    if let Some(open) = source.find("<template")
        && let Some(gt) = source[open..].find('>')
        && let Some(close) = source.rfind("</template>")
    {
        let start = open + gt + 1;
        if close > start {
            result.template = Some(Section {
                start,
                end: close,
                setup: false,
            });
        }
    }

    let mut pending: Option<(usize, bool)> = None;
    for event in markup::scan(source) {
        match event {
            MarkupEvent::OpenTag {
                name, attrs, end, ..
            } if name == "script" => {
                let setup = attrs.iter().any(|a| a.name == "setup");
                pending = Some((end, setup));
            }
            MarkupEvent::RawText { start, end } => {
                if let Some((open_end, setup)) = pending.take()
                    && start == open_end
                {
                    result.scripts.push(Section {
                        start,
                        end,
                        setup,
                    });
                }
            }
            _ => {}
        }
    }
    result
}

fn template_literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`[^`]*`").unwrap())
}

fn interpolation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap())
}

fn is_bound_attr(attr: &Attribute) -> bool {
    attr.name.starts_with(':') || attr.name.starts_with('@') || attr.name.starts_with("v-")
}

fn restore_entities(text: &str) -> String {
    let mut out = text.to_string();
    for (entity, sentinel) in SPACE_ENTITIES {
        out = out.replace(sentinel, entity);
    }
    out
}

/// Scan one bound expression: template-literal substrings first, token
/// recovery otherwise.
fn extract_bound_expression(expr: &str, base: usize, spans: &mut Vec<SpanRecord>) {
    let mut matched_literal = false;
    for m in template_literal_regex().find_iter(expr) {
        if !contains_chinese(m.as_str()) {
            continue;
        }
        matched_literal = true;
        if m.as_str().contains("${") {
            let (text, _) = template_parts(m.as_str());
            spans.push(SpanRecord::new(text, base + m.start(), base + m.end(), true));
        } else {
            let inner = &m.as_str()[1..m.as_str().len() - 1];
            spans.push(SpanRecord::new(inner, base + m.start(), base + m.end(), true));
        }
    }
    if !matched_literal {
        markup::extract_expression(expr, base, spans);
    }
}

/// Variant A: version-2 component files.
///
/// Space entities are swapped for same-width sentinels before the template
/// walk so they cannot confuse the Chinese-run matching, and restored in the
/// reported text fields afterwards.
fn extract_v2(source: &str, path_hint: &str) -> Result<Vec<SpanRecord>> {
    let sections = layout(source);
    let mut spans = Vec::new();

    if let Some(template) = &sections.template {
        let mut content = source[template.start..template.end].to_string();
        for (entity, sentinel) in SPACE_ENTITIES {
            content = content.replace(entity, sentinel);
        }
        walk_template_v2(&content, template.start, &mut spans);
    }

    // Setup sections are a version-3 construct; the version-2 walk only
    // consumes plain script sections.
    for section in sections.scripts.iter().filter(|s| !s.setup) {
        let content = &source[section.start..section.end];
        spans.extend(script::extract_script(
            content,
            path_hint,
            ScriptDialect::Typed,
            section.start,
        )?);
    }

    for span in &mut spans {
        span.text = restore_entities(&span.text);
    }
    Ok(spans)
}

fn walk_template_v2(template: &str, base: usize, spans: &mut Vec<SpanRecord>) {
    for event in markup::scan(template) {
        match event {
            MarkupEvent::Text { start, end } => {
                let slice = &template[start..end];
                if !contains_chinese(slice) {
                    continue;
                }
                if slice.contains("{{") {
                    for m in interpolation_regex().find_iter(slice) {
                        let inner = &m.as_str()[2..m.as_str().len() - 2];
                        extract_bound_expression(inner, base + start + m.start() + 2, spans);
                    }
                    let blanked = markup::blank_interpolations(slice);
                    for m in crate::utils::chinese_run_regex().find_iter(&blanked) {
                        spans.push(SpanRecord::new(
                            m.as_str(),
                            base + start + m.start(),
                            base + start + m.end(),
                            false,
                        ));
                    }
                } else {
                    let trimmed = slice.trim();
                    if !trimmed.is_empty() {
                        spans.push(SpanRecord::new(trimmed, base + start, base + end, false));
                    }
                }
            }
            MarkupEvent::OpenTag { attrs, .. } => {
                for attr in &attrs {
                    let value = attr.value(template);
                    if value.is_empty() || !contains_chinese(value) {
                        continue;
                    }
                    let value_base =
                        base + attr.value_start + usize::from(attr.quoted);
                    if is_bound_attr(attr) {
                        extract_bound_expression(value, value_base, spans);
                    } else {
                        spans.push(SpanRecord::new(
                            value,
                            base + attr.value_start,
                            base + attr.value_end,
                            attr.quoted,
                        ));
                    }
                }
            }
            MarkupEvent::RawText { .. }
            | MarkupEvent::Comment { .. }
            | MarkupEvent::CloseTag { .. } => {}
        }
    }
}

/// Variant B: version-3 component files, walked node-kind by node-kind.
fn extract_v3(source: &str, path_hint: &str) -> Result<Vec<SpanRecord>> {
    let sections = layout(source);
    let mut spans = Vec::new();

    if let Some(template) = &sections.template {
        let content = &source[template.start..template.end];
        walk_template_v3(content, template.start, &mut spans);
    }

    for section in &sections.scripts {
        let content = &source[section.start..section.end];
        spans.extend(script::extract_script(
            content,
            path_hint,
            ScriptDialect::Typed,
            section.start,
        )?);
    }
    Ok(spans)
}

fn walk_template_v3(template: &str, base: usize, spans: &mut Vec<SpanRecord>) {
    for event in markup::scan(template) {
        match event {
            MarkupEvent::Text { start, end } => {
                let slice = &template[start..end];
                if !contains_chinese(slice) {
                    continue;
                }
                let interpolations: Vec<_> = interpolation_regex().find_iter(slice).collect();
                if interpolations.is_empty() {
                    // Plain text node
                    let trimmed = slice.trim();
                    if !trimmed.is_empty() {
                        spans.push(SpanRecord::new(trimmed, base + start, base + end, false));
                    }
                    continue;
                }
                let blanked = markup::blank_interpolations(slice);
                let has_prose = contains_chinese(&blanked) || !blanked.trim().is_empty();
                if has_prose && contains_chinese(slice) {
                    // Compound expression: prose and interpolations mixed.
                    // Concatenate the children's source and emit once.
                    let trimmed = slice.trim();
                    spans.push(SpanRecord::new(trimmed, base + start, base + end, false));
                    continue;
                }
                for m in interpolations {
                    let inner = &m.as_str()[2..m.as_str().len() - 2];
                    let payload = inner.trim();
                    if !contains_chinese(payload) {
                        continue;
                    }
                    let lead = inner.len() - inner.trim_start().len();
                    let payload_start = base + start + m.start() + 2 + lead;
                    emit_interpolation_payload(payload, payload_start, spans);
                }
            }
            MarkupEvent::OpenTag { attrs, .. } => {
                for attr in &attrs {
                    let value = attr.value(template);
                    if value.is_empty() || !contains_chinese(value) {
                        continue;
                    }
                    if is_bound_attr(attr) {
                        let value_base =
                            base + attr.value_start + usize::from(attr.quoted);
                        extract_bound_expression(value, value_base, spans);
                    } else {
                        spans.push(SpanRecord::new(
                            value,
                            base + attr.value_start,
                            base + attr.value_end,
                            true,
                        ));
                    }
                }
            }
            MarkupEvent::RawText { .. }
            | MarkupEvent::Comment { .. }
            | MarkupEvent::CloseTag { .. } => {}
        }
    }
}

/// Interpolation payload handling for the version-3 walk: simple string and
/// template-literal payloads are string spans at the payload's offset;
/// anything else falls back to expression token recovery.
fn emit_interpolation_payload(payload: &str, start: usize, spans: &mut Vec<SpanRecord>) {
    let quoted = (payload.starts_with('\'') && payload.ends_with('\'') && payload.len() >= 2)
        || (payload.starts_with('"') && payload.ends_with('"') && payload.len() >= 2);
    if quoted {
        spans.push(SpanRecord::new(
            &payload[1..payload.len() - 1],
            start,
            start + payload.len(),
            true,
        ));
    } else if payload.starts_with('`') && payload.ends_with('`') && payload.len() >= 2 {
        let (text, _) = template_parts(payload);
        spans.push(SpanRecord::new(text, start, start + payload.len(), true));
    } else {
        markup::extract_expression(payload, start, spans);
    }
}

/// Byte ranges of the script sections' contents. The rewriter uses this to
/// decide where the lookup import lives in a component file.
pub fn script_ranges(source: &str) -> Vec<(usize, usize)> {
    layout(source)
        .scripts
        .iter()
        .map(|s| (s.start, s.end))
        .collect()
}
