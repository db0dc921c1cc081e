//! Span-preserving markup scanner and the HTML-dialect extractor.
//!
//! The scanner is deliberately small: it reports tags, attributes (with the
//! byte span of each value), text nodes and comments, all as half-open byte
//! intervals into the original buffer. Ecosystem HTML parsers normalize the
//! tree and drop source positions, which the rewriter cannot afford.

use std::sync::OnceLock;

use regex::Regex;

use crate::extract::span::SpanRecord;
use crate::utils::{chinese_run_regex, contains_chinese};

/// One attribute inside an opening tag. `value_start..value_end` covers the
/// value including its quotes when quoted; for a bare value it covers the
/// token itself. Attributes without `=` have an empty value span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value_start: usize,
    pub value_end: usize,
    pub quoted: bool,
}

impl Attribute {
    /// The value with quotes stripped.
    pub fn value<'a>(&self, source: &'a str) -> &'a str {
        let raw = &source[self.value_start..self.value_end];
        if self.quoted && raw.len() >= 2 {
            &raw[1..raw.len() - 1]
        } else {
            raw
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    OpenTag {
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
        start: usize,
        end: usize,
    },
    CloseTag {
        name: String,
        start: usize,
        end: usize,
    },
    Text {
        start: usize,
        end: usize,
    },
    /// Contents of `<script>`/`<style>` elements, reported verbatim.
    RawText {
        start: usize,
        end: usize,
    },
    Comment {
        start: usize,
        end: usize,
    },
}

/// Tokenize a markup buffer into events with byte spans.
pub fn scan(source: &str) -> Vec<MarkupEvent> {
    let bytes = source.as_bytes();
    let mut events = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if source[i..].starts_with("<!--") {
                let end = source[i..]
                    .find("-->")
                    .map(|p| i + p + 3)
                    .unwrap_or(bytes.len());
                events.push(MarkupEvent::Comment { start: i, end });
                i = end;
            } else if source[i..].starts_with("<!") {
                // Doctype or CDATA; skip to the closing angle bracket.
                let end = source[i..]
                    .find('>')
                    .map(|p| i + p + 1)
                    .unwrap_or(bytes.len());
                i = end;
            } else if source[i..].starts_with("</") {
                let end = source[i..]
                    .find('>')
                    .map(|p| i + p + 1)
                    .unwrap_or(bytes.len());
                let name_end = end.saturating_sub(1).max(i + 2).min(bytes.len());
                let name = source[i + 2..name_end].trim().to_lowercase();
                events.push(MarkupEvent::CloseTag {
                    name,
                    start: i,
                    end,
                });
                i = end;
            } else if bytes
                .get(i + 1)
                .is_some_and(|b| b.is_ascii_alphabetic())
            {
                let (event, end) = scan_open_tag(source, i);
                let raw_name = match &event {
                    MarkupEvent::OpenTag {
                        name, self_closing, ..
                    } if !self_closing && matches!(name.as_str(), "script" | "style") => {
                        Some(name.clone())
                    }
                    _ => None,
                };
                events.push(event);
                i = end;

                // Raw-text elements swallow everything to their close tag.
                // The search is byte-wise so offsets stay exact.
                if let Some(name) = raw_name {
                    let close = format!("</{}", name);
                    let raw_end = source[i..].find(&close).map(|p| i + p).unwrap_or(bytes.len());
                    if raw_end > i {
                        events.push(MarkupEvent::RawText {
                            start: i,
                            end: raw_end,
                        });
                    }
                    i = raw_end;
                }
            } else {
                // Stray '<' that opens nothing; treat as text.
                let next = source[i + 1..]
                    .find('<')
                    .map(|p| i + 1 + p)
                    .unwrap_or(bytes.len());
                events.push(MarkupEvent::Text { start: i, end: next });
                i = next;
            }
        } else {
            let next = source[i..].find('<').map(|p| i + p).unwrap_or(bytes.len());
            if next > i {
                events.push(MarkupEvent::Text { start: i, end: next });
            }
            i = next;
        }
    }
    events
}

fn scan_open_tag(source: &str, start: usize) -> (MarkupEvent, usize) {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    let name_start = i;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/'
    {
        i += 1;
    }
    let name = source[name_start..i].to_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => break,
            Some(b'>') => {
                i += 1;
                break;
            }
            Some(b'/') => {
                self_closing = true;
                i += 1;
            }
            Some(_) => {
                let attr_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                let attr_name = source[attr_start..i].to_string();
                if attr_name.is_empty() {
                    i += 1;
                    continue;
                }
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    let (value_start, value_end, quoted) = match bytes.get(i) {
                        Some(&q @ (b'"' | b'\'')) => {
                            let vstart = i;
                            i += 1;
                            while i < bytes.len() && bytes[i] != q {
                                i += 1;
                            }
                            i = (i + 1).min(bytes.len());
                            (vstart, i, true)
                        }
                        _ => {
                            let vstart = i;
                            while i < bytes.len()
                                && !bytes[i].is_ascii_whitespace()
                                && bytes[i] != b'>'
                            {
                                i += 1;
                            }
                            (vstart, i, false)
                        }
                    };
                    attrs.push(Attribute {
                        name: attr_name,
                        value_start,
                        value_end,
                        quoted,
                    });
                } else {
                    attrs.push(Attribute {
                        name: attr_name,
                        value_start: i,
                        value_end: i,
                        quoted: false,
                    });
                }
            }
        }
    }

    (
        MarkupEvent::OpenTag {
            name,
            attrs,
            self_closing,
            start,
            end: i,
        },
        i,
    )
}

fn interpolation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap())
}

fn quoted_string_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"'[^']*'|"[^"]*""#).unwrap())
}

/// Emit spans for every Chinese literal inside one interpolation source.
///
/// Quoted strings containing Chinese are reported with their quotes
/// (`is_string = true`); bare ideograph runs outside quotes are reported as
/// prose (`is_string = false`). `base` is the interpolation source's offset
/// into the original buffer.
pub fn extract_expression(expr: &str, base: usize, spans: &mut Vec<SpanRecord>) {
    let mut covered: Vec<(usize, usize)> = Vec::new();
    for m in quoted_string_regex().find_iter(expr) {
        let inner = &expr[m.start() + 1..m.end() - 1];
        covered.push((m.start(), m.end()));
        if contains_chinese(inner) {
            spans.push(SpanRecord::new(
                inner,
                base + m.start(),
                base + m.end(),
                true,
            ));
        }
    }
    for m in chinese_run_regex().find_iter(expr) {
        let inside_quotes = covered
            .iter()
            .any(|&(s, e)| s <= m.start() && m.end() <= e);
        if !inside_quotes {
            spans.push(SpanRecord::new(m.as_str(), base + m.start(), base + m.end(), false));
        }
    }
}

/// Extract Chinese-literal spans from a standalone markup file.
pub fn extract_html(source: &str) -> Vec<SpanRecord> {
    let mut spans = Vec::new();

    for event in scan(source) {
        match event {
            MarkupEvent::OpenTag { attrs, .. } => {
                for attr in &attrs {
                    let value = attr.value(source);
                    if value.is_empty() || !contains_chinese(value) {
                        continue;
                    }
                    if value.contains("{{") {
                        for m in interpolation_regex().find_iter(value) {
                            let inner_base = attr.value_start
                                + usize::from(attr.quoted)
                                + m.start()
                                + 2;
                            let inner = &m.as_str()[2..m.as_str().len() - 2];
                            extract_expression(inner, inner_base, &mut spans);
                        }
                    } else {
                        spans.push(SpanRecord::new(
                            value,
                            attr.value_start,
                            attr.value_end,
                            attr.quoted,
                        ));
                    }
                }
            }
            MarkupEvent::Text { start, end } => {
                let slice = &source[start..end];
                if !contains_chinese(slice) {
                    continue;
                }
                if slice.contains("{{") {
                    for m in interpolation_regex().find_iter(slice) {
                        let inner = &m.as_str()[2..m.as_str().len() - 2];
                        extract_expression(inner, start + m.start() + 2, &mut spans);
                    }
                    // Prose outside the braces still counts as markup text.
                    let blanked = blank_interpolations(slice);
                    for m in chinese_run_regex().find_iter(&blanked) {
                        spans.push(SpanRecord::new(
                            m.as_str(),
                            start + m.start(),
                            start + m.end(),
                            false,
                        ));
                    }
                } else {
                    let trimmed = slice.trim();
                    if !trimmed.is_empty() {
                        spans.push(SpanRecord::new(trimmed, start, end, false));
                    }
                }
            }
            // Comments never contribute; raw script/style bodies are outside
            // the markup dialect.
            MarkupEvent::RawText { .. }
            | MarkupEvent::Comment { .. }
            | MarkupEvent::CloseTag { .. } => {}
        }
    }
    spans
}

/// Replace `{{ … }}` regions with spaces of equal byte length.
pub fn blank_interpolations(slice: &str) -> String {
    let mut out = slice.to_string();
    let ranges: Vec<(usize, usize)> = interpolation_regex()
        .find_iter(slice)
        .map(|m| (m.start(), m.end()))
        .collect();
    for (start, end) in ranges {
        out.replace_range(start..end, &" ".repeat(end - start));
    }
    out
}

/// Locate the `{{ … }}` region enclosing `[start, end)`, if any.
///
/// Returns the byte range of the interior (between the braces).
pub fn enclosing_interpolation(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let open = source[..start].rfind("{{")?;
    // A '}}' between the braces and the span means the region closed early.
    if source[open + 2..start].contains("}}") {
        return None;
    }
    let close = source[end..].find("}}").map(|p| end + p)?;
    if source[end..close].contains("{{") {
        return None;
    }
    Some((open + 2, close))
}
