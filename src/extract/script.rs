//! Literal extractors for the script dialects, built on the swc parser.
//!
//! One visitor covers both the typed-script dialect (`.ts`/`.tsx`, markup
//! expressions enabled) and the plain script dialect (`.js`/`.jsx`, markup
//! expressions plus decorators). Component files reuse the typed extractor
//! for their script sections with a positional offset.

use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, SourceFile, SourceMap, sync::Lrc};
use swc_ecma_ast::{ImportDecl, ImportSpecifier, Module, ModuleDecl, ModuleItem, PropName, Str, Tpl};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::extract::span::SpanRecord;
use crate::utils::{blank_comments, contains_chinese};

/// Which script grammar to parse with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDialect {
    /// ECMAScript superset with markup expressions and decorators.
    Es,
    /// Typed script with markup expressions and type syntax.
    Typed,
}

impl ScriptDialect {
    fn syntax(self) -> Syntax {
        match self {
            ScriptDialect::Es => Syntax::Es(EsSyntax {
                jsx: true,
                decorators: true,
                ..Default::default()
            }),
            ScriptDialect::Typed => Syntax::Typescript(TsSyntax {
                tsx: true,
                ..Default::default()
            }),
        }
    }
}

pub struct ParsedModule {
    pub module: Module,
    pub file: Lrc<SourceFile>,
}

impl ParsedModule {
    /// Byte offset of `pos` relative to the start of the parsed buffer.
    pub fn rel(&self, pos: BytePos) -> usize {
        (pos.0 - self.file.start_pos.0) as usize
    }
}

/// Parse a source string into an AST.
pub fn parse_module(source: &str, path_hint: &str, dialect: ScriptDialect) -> Result<ParsedModule> {
    let source_map = SourceMap::default();
    let file = source_map.new_source_file(
        FileName::Real(path_hint.into()).into(),
        source.to_string(),
    );

    let mut parser = Parser::new(dialect.syntax(), StringInput::from(&*file), None);
    let module = parser
        .parse_module()
        .map_err(|e| anyhow!("Failed to parse {}: {:?}", path_hint, e))?;
    Ok(ParsedModule { module, file })
}

/// Extract Chinese-literal spans from a script buffer.
///
/// `offset` is added to every reported range; component files pass their
/// script-section start so ranges index the original file.
pub fn extract_script(
    source: &str,
    path_hint: &str,
    dialect: ScriptDialect,
    offset: usize,
) -> Result<Vec<SpanRecord>> {
    let parsed = parse_module(source, path_hint, dialect)?;
    let mut visitor = ChineseVisitor {
        source,
        base: parsed.file.start_pos.0,
        offset,
        spans: Vec::new(),
    };
    parsed.module.visit_with(&mut visitor);
    Ok(visitor.spans)
}

/// Check whether the module imports the lookup symbol as a default, named,
/// or namespace specifier. Parse-based on purpose: a textual occurrence in a
/// comment or string does not count.
pub fn has_lookup_import(module: &Module, lookup: &str) -> bool {
    module.body.iter().any(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl { specifiers, .. })) => {
            specifiers.iter().any(|spec| match spec {
                ImportSpecifier::Default(s) => s.local.sym == lookup,
                ImportSpecifier::Named(s) => s.local.sym == lookup,
                ImportSpecifier::Namespace(s) => s.local.sym == lookup,
            })
        }
        _ => false,
    })
}

/// Split a template literal (including backticks) into the catalog text with
/// `{valN}` placeholders and the interpolation expressions in source order.
///
/// `` `你有${n}条` `` becomes `("你有{val1}条", vec!["n"])`.
pub fn template_parts(literal: &str) -> (String, Vec<String>) {
    let interior = literal
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
        .unwrap_or(literal);

    let mut text = String::new();
    let mut exprs = Vec::new();
    let bytes = interior.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            let mut depth = 1;
            let mut j = i + 2;
            while j < bytes.len() && depth > 0 {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            exprs.push(interior[i + 2..j - 1].trim().to_string());
            text.push_str(&format!("{{val{}}}", exprs.len()));
            i = j;
        } else {
            // Advance one full UTF-8 code point
            let ch_len = interior[i..].chars().next().map_or(1, char::len_utf8);
            text.push_str(&interior[i..i + ch_len]);
            i += ch_len;
        }
    }
    (text, exprs)
}

struct ChineseVisitor<'a> {
    source: &'a str,
    base: u32,
    offset: usize,
    spans: Vec<SpanRecord>,
}

impl<'a> ChineseVisitor<'a> {
    fn rel(&self, pos: BytePos) -> usize {
        (pos.0 - self.base) as usize
    }

    fn slice(&self, lo: BytePos, hi: BytePos) -> &'a str {
        &self.source[self.rel(lo)..self.rel(hi)]
    }

    fn push(&mut self, text: String, lo: BytePos, hi: BytePos, is_string: bool) {
        self.spans.push(SpanRecord::new(
            text,
            self.offset + self.rel(lo),
            self.offset + self.rel(hi),
            is_string,
        ));
    }
}

impl<'a> Visit for ChineseVisitor<'a> {
    fn visit_str(&mut self, node: &Str) {
        let slice = self.slice(node.span.lo, node.span.hi);
        if !contains_chinese(slice) {
            return;
        }
        // Strip the delimiting quotes; the span keeps them.
        let text = slice[1..slice.len() - 1].to_string();
        self.push(text, node.span.lo, node.span.hi, true);
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        let slice = self.slice(node.span.lo, node.span.hi);
        if contains_chinese(slice) {
            let (text, _) = template_parts(slice);
            self.push(text, node.span.lo, node.span.hi, true);
            return;
        }
        // No Chinese anywhere in the literal; a nested literal inside an
        // interpolation may still qualify on its own.
        node.visit_children_with(self);
    }

    fn visit_jsx_text(&mut self, node: &swc_ecma_ast::JSXText) {
        let slice = self.slice(node.span.lo, node.span.hi);
        if !contains_chinese(&blank_comments(slice)) {
            return;
        }
        let trimmed = slice.trim();
        if trimmed.is_empty() {
            return;
        }
        self.push(trimmed.to_string(), node.span.lo, node.span.hi, false);
    }

    fn visit_prop_name(&mut self, node: &PropName) {
        // A reference expression cannot stand in key position.
        if !matches!(node, PropName::Str(_)) {
            node.visit_children_with(self);
        }
    }

    fn visit_import_decl(&mut self, _node: &ImportDecl) {}

    fn visit_ts_lit_type(&mut self, _node: &swc_ecma_ast::TsLitType) {}
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn extract_ts(source: &str) -> Vec<SpanRecord> {
        extract_script(source, "test.tsx", ScriptDialect::Typed, 0).unwrap()
    }

    #[test]
    fn test_plain_string_literal() {
        let src = r#"const msg = "提交";"#;
        let spans = extract_ts(src);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "提交");
        assert!(spans[0].is_string);
        assert_eq!(&src[spans[0].start..spans[0].end], "\"提交\"");
    }

    #[test]
    fn test_single_quoted_string() {
        let src = "const msg = '取消';";
        let spans = extract_ts(src);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "取消");
        assert_eq!(&src[spans[0].start..spans[0].end], "'取消'");
    }

    #[test]
    fn test_non_chinese_ignored() {
        let spans = extract_ts(r#"const msg = "submit";"#);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_template_literal_with_interpolation() {
        let src = "const m = `你有${n}条消息`;";
        let spans = extract_ts(src);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "你有{val1}条消息");
        assert!(spans[0].is_string);
        assert!(&src[spans[0].start..spans[0].end].starts_with('`'));
    }

    #[test]
    fn test_template_literal_without_interpolation() {
        let src = "const m = `确认删除`;";
        let spans = extract_ts(src);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "确认删除");
    }

    #[test]
    fn test_jsx_text_child_trimmed() {
        let src = "const el = <button>  确定  </button>;";
        let spans = extract_ts(src);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "确定");
        assert!(!spans[0].is_string);
        // The span still covers the surrounding whitespace
        assert_eq!(&src[spans[0].start..spans[0].end], "  确定  ");
    }

    #[test]
    fn test_jsx_attribute_string() {
        let src = r#"const el = <input placeholder="请输入用户名" />;"#;
        let spans = extract_ts(src);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "请输入用户名");
        assert!(spans[0].is_string);
        assert_eq!(src.as_bytes()[spans[0].start - 1], b'=');
    }

    #[test]
    fn test_chinese_in_comment_not_emitted() {
        let spans = extract_ts("// 这是注释\nconst x = 1;\n/* 块注释 */\n");
        assert!(spans.is_empty());
    }

    #[test]
    fn test_jsx_expression_string() {
        let src = "const el = <div>{flag ? '是' : '否'}</div>;";
        let mut spans = extract_ts(src);
        spans.sort_by_key(|s| s.start);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "是");
        assert_eq!(spans[1].text, "否");
        assert!(spans.iter().all(|s| s.is_string));
    }

    #[test]
    fn test_property_name_string_skipped() {
        let src = "const map = { '中文键': value, other: '中文值' };";
        let spans = extract_ts(src);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "中文值");
    }

    #[test]
    fn test_import_source_skipped() {
        let spans = extract_ts("import x from './中文路径';\n");
        assert!(spans.is_empty());
    }

    #[test]
    fn test_decorators_in_es_dialect() {
        let src = "@Component({ name: '页面' })\nclass Page {}\n";
        let spans = extract_script(src, "test.js", ScriptDialect::Es, 0).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "页面");
    }

    #[test]
    fn test_offset_applied() {
        let src = "const a = '标题';";
        let spans = extract_script(src, "section.ts", ScriptDialect::Typed, 100).unwrap();

        assert_eq!(spans[0].start, 100 + src.find('\'').unwrap());
    }

    #[test]
    fn test_template_parts() {
        let (text, exprs) = template_parts("`你有${n}条${unread.count}消息`");
        assert_eq!(text, "你有{val1}条{val2}消息");
        assert_eq!(exprs, vec!["n", "unread.count"]);

        let (text, exprs) = template_parts("`没有插值`");
        assert_eq!(text, "没有插值");
        assert!(exprs.is_empty());
    }

    #[test]
    fn test_template_parts_nested_braces() {
        let (text, exprs) = template_parts("`共${list.filter(x => { return x; }).length}项`");
        assert_eq!(text, "共{val1}项");
        assert_eq!(exprs.len(), 1);
        assert!(exprs[0].contains("filter"));
    }

    #[test]
    fn test_has_lookup_import() {
        let cases = [
            ("import I18N from 'utils/I18N';", true),
            ("import { I18N } from 'utils/I18N';", true),
            ("import * as I18N from 'utils/I18N';", true),
            ("import other from 'other';", false),
            ("const I18N = {};", false),
            ("// import I18N from 'x';", false),
        ];
        for (src, expected) in cases {
            let parsed = parse_module(src, "t.ts", ScriptDialect::Typed).unwrap();
            assert_eq!(
                has_lookup_import(&parsed.module, "I18N"),
                expected,
                "case: {}",
                src
            );
        }
    }
}
