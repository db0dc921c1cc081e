//! Parsing and rendering of catalog files.
//!
//! Catalog files are ES modules whose default export is an object tree with
//! string leaves. They are parsed with the same swc parser the extractors
//! use, and rendered with single quotes, trailing commas and two-space
//! indentation.

use anyhow::{Result, anyhow};
use serde_json::{Map, Value};
use swc_ecma_ast::{
    Callee, Expr, ExprOrSpread, Lit, MemberProp, ModuleDecl, ModuleItem, ObjectLit, Prop, PropName,
    PropOrSpread,
};

use crate::extract::script::{ScriptDialect, parse_module};

/// Parse a catalog module's default export into an object tree.
///
/// Both the plain `export default { … }` form and the aggregator's
/// `export default Object.assign({}, { … })` form are accepted; object
/// arguments of the call are merged left to right.
pub fn parse_default_export(source: &str, path_hint: &str) -> Result<Map<String, Value>> {
    let parsed = parse_module(source, path_hint, ScriptDialect::Typed)?;

    for item in &parsed.module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) = item {
            return expr_to_tree(&export.expr)
                .ok_or_else(|| anyhow!("Default export of {} is not an object tree", path_hint));
        }
    }
    Err(anyhow!("No default export found in {}", path_hint))
}

fn expr_to_tree(expr: &Expr) -> Option<Map<String, Value>> {
    match expr {
        Expr::Object(obj) => Some(object_to_tree(obj)),
        Expr::Call(call) => {
            // Object.assign({}, a, b, …)
            let is_assign = matches!(
                &call.callee,
                Callee::Expr(callee) if matches!(
                    callee.as_ref(),
                    Expr::Member(member)
                        if matches!(member.obj.as_ref(), Expr::Ident(obj) if obj.sym == "Object")
                            && matches!(&member.prop, MemberProp::Ident(prop) if prop.sym == "assign")
                )
            );
            if !is_assign {
                return None;
            }
            let mut merged = Map::new();
            for ExprOrSpread { expr, .. } in &call.args {
                if let Some(tree) = expr_to_tree(expr) {
                    merged.extend(tree);
                }
            }
            Some(merged)
        }
        Expr::TsAs(inner) => expr_to_tree(&inner.expr),
        Expr::Paren(inner) => expr_to_tree(&inner.expr),
        _ => None,
    }
}

fn object_to_tree(obj: &ObjectLit) -> Map<String, Value> {
    let mut tree = Map::new();
    for prop in &obj.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        if let Prop::KeyValue(kv) = prop.as_ref() {
            let key = match &kv.key {
                PropName::Ident(ident) => ident.sym.to_string(),
                PropName::Str(s) => match s.value.as_str() {
                    Some(v) => v.to_string(),
                    None => continue,
                },
                _ => continue,
            };
            let value = match kv.value.as_ref() {
                Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|v| Value::String(v.to_string())),
                Expr::Object(nested) => Some(Value::Object(object_to_tree(nested))),
                _ => None,
            };
            if let Some(value) = value {
                tree.insert(key, value);
            }
        }
    }
    tree
}

/// Render an object tree as `export default { … };`.
pub fn render_module(tree: &Map<String, Value>) -> String {
    let mut out = String::from("export default {\n");
    render_object(tree, 1, &mut out);
    out.push_str("};\n");
    out
}

fn render_object(tree: &Map<String, Value>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (key, value) in tree {
        match value {
            Value::String(s) => {
                out.push_str(&format!(
                    "{}{}: '{}',\n",
                    indent,
                    render_key(key),
                    escape_value(s)
                ));
            }
            Value::Object(nested) => {
                out.push_str(&format!("{}{}: {{\n", indent, render_key(key)));
                render_object(nested, depth + 1, out);
                out.push_str(&format!("{}}},\n", indent));
            }
            _ => {}
        }
    }
}

fn render_key(key: &str) -> String {
    let valid_ident = !key.is_empty()
        && key
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid_ident {
        key.to_string()
    } else {
        format!("'{}'", escape_value(key))
    }
}

fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Flatten a tree into dotted key/value pairs, preserving member order.
pub fn flatten(tree: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::String(s) => out.push((path, s.clone())),
            Value::Object(nested) => flatten(nested, &path, out),
            _ => {}
        }
    }
}

/// Get the string leaf at a dotted path.
pub fn get_path<'a>(tree: &'a Map<String, Value>, path: &[&str]) -> Option<&'a str> {
    let (first, rest) = path.split_first()?;
    match tree.get(*first)? {
        Value::String(s) if rest.is_empty() => Some(s),
        Value::Object(nested) if !rest.is_empty() => get_path(nested, rest),
        _ => None,
    }
}

/// Set the string leaf at a dotted path, creating intermediate objects.
pub fn insert_path(tree: &mut Map<String, Value>, path: &[&str], value: String) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        tree.insert(first.to_string(), Value::String(value));
        return;
    }
    let entry = tree
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(nested) = entry {
        insert_path(nested, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_plain_export() {
        let src = "export default {\n  login: {\n    submit: '提交',\n  },\n  cancel: '取消',\n};\n";
        let tree = parse_default_export(src, "common.ts").unwrap();

        assert_eq!(get_path(&tree, &["login", "submit"]), Some("提交"));
        assert_eq!(get_path(&tree, &["cancel"]), Some("取消"));
    }

    #[test]
    fn test_parse_object_assign_export() {
        let src = "export default Object.assign({}, {\n  a: '甲',\n}, {\n  b: '乙',\n});\n";
        let tree = parse_default_export(src, "index.ts").unwrap();

        assert_eq!(get_path(&tree, &["a"]), Some("甲"));
        assert_eq!(get_path(&tree, &["b"]), Some("乙"));
    }

    #[test]
    fn test_parse_escaped_newline() {
        let src = "export default {\n  multi: '第一行\\n第二行',\n};\n";
        let tree = parse_default_export(src, "common.ts").unwrap();

        assert_eq!(get_path(&tree, &["multi"]), Some("第一行\n第二行"));
    }

    #[test]
    fn test_parse_no_default_export() {
        assert!(parse_default_export("const a = 1;", "x.ts").is_err());
    }

    #[test]
    fn test_render_round_trip() {
        let mut tree = Map::new();
        insert_path(&mut tree, &["login", "submit"], "提交".to_string());
        insert_path(&mut tree, &["cancel"], "取消".to_string());

        let rendered = render_module(&tree);
        assert_eq!(
            rendered,
            "export default {\n  login: {\n    submit: '提交',\n  },\n  cancel: '取消',\n};\n"
        );

        let reparsed = parse_default_export(&rendered, "common.ts").unwrap();
        assert_eq!(Value::Object(reparsed), Value::Object(tree));
    }

    #[test]
    fn test_render_escapes() {
        let mut tree = Map::new();
        insert_path(&mut tree, &["quote"], "它的'引号'".to_string());
        insert_path(&mut tree, &["newline"], "上\n下".to_string());

        let rendered = render_module(&tree);
        assert!(rendered.contains("\\'引号\\'"));
        assert!(rendered.contains("上\\n下"));

        let reparsed = parse_default_export(&rendered, "c.ts").unwrap();
        assert_eq!(get_path(&reparsed, &["newline"]), Some("上\n下"));
    }

    #[test]
    fn test_render_non_ident_key_quoted() {
        let mut tree = Map::new();
        insert_path(&mut tree, &["has-dash"], "值".to_string());
        let rendered = render_module(&tree);
        assert!(rendered.contains("'has-dash': '值',"));
    }

    #[test]
    fn test_flatten_order() {
        let tree = json!({
            "b": { "x": "一", "y": "二" },
            "a": "三"
        });
        let Value::Object(tree) = tree else { unreachable!() };
        let mut out = Vec::new();
        flatten(&tree, "", &mut out);

        assert_eq!(
            out,
            vec![
                ("b.x".to_string(), "一".to_string()),
                ("b.y".to_string(), "二".to_string()),
                ("a".to_string(), "三".to_string()),
            ]
        );
    }

    #[test]
    fn test_insert_path_replaces_leaf_with_object() {
        let mut tree = Map::new();
        insert_path(&mut tree, &["a"], "叶".to_string());
        insert_path(&mut tree, &["a", "b"], "新".to_string());
        assert_eq!(get_path(&tree, &["a", "b"]), Some("新"));
    }
}
