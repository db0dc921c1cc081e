//! Catalog persistence: per-namespace files and the aggregator.
//!
//! Each write lands one key→text pair. Namespace files and the aggregator
//! are created on demand; registering a namespace edits the aggregator
//! textually so hand-maintained formatting survives.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Map;

use crate::catalog::module_text;
use crate::utils::unescape_newlines;

fn namespace_path(dir: &Path, ext: &str, namespace: &str) -> PathBuf {
    dir.join(format!("{}.{}", namespace, ext))
}

/// Persist one key→text pair into the catalog directory.
///
/// The key's first segment is the namespace; the rest is the path inside
/// that namespace's file. With `validate_duplicate`, a different value
/// already bound at the path is a hard error for the caller to report.
pub fn write_entry(
    dir: &Path,
    ext: &str,
    key: &str,
    text: &str,
    validate_duplicate: bool,
) -> Result<()> {
    // Callers may hand over the full reference path; the lookup-symbol
    // segment is not part of the catalog key.
    let key = key.strip_prefix("I18N.").unwrap_or(key);
    let segments: Vec<&str> = key.split('.').collect();
    let [namespace, rest @ ..] = segments.as_slice() else {
        bail!("Empty catalog key");
    };
    if rest.is_empty() {
        bail!("Catalog key \"{}\" has no path beneath its namespace", key);
    }

    let text = unescape_newlines(text);
    let target = namespace_path(dir, ext, namespace);

    if target.exists() {
        let source = fs::read_to_string(&target)
            .with_context(|| format!("Failed to read {}", target.display()))?;
        let mut tree = module_text::parse_default_export(&source, &target.to_string_lossy())?;
        if validate_duplicate
            && let Some(existing) = module_text::get_path(&tree, rest)
            && existing != text
        {
            bail!(
                "Duplicate key \"{}\": already bound to \"{}\"",
                key,
                existing
            );
        }
        module_text::insert_path(&mut tree, rest, text);
        fs::write(&target, module_text::render_module(&tree))
            .with_context(|| format!("Failed to write {}", target.display()))?;
    } else {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        let mut tree = Map::new();
        module_text::insert_path(&mut tree, rest, text);
        fs::write(&target, module_text::render_module(&tree))
            .with_context(|| format!("Failed to write {}", target.display()))?;
        register_namespace(dir, ext, namespace)?;
    }
    Ok(())
}

/// Add a namespace to the aggregator file, creating the aggregator when it
/// does not exist yet.
fn register_namespace(dir: &Path, ext: &str, namespace: &str) -> Result<()> {
    let index_path = dir.join(format!("index.{}", ext));

    if !index_path.exists() {
        let content = format!(
            "import {ns} from './{ns}';\n\nexport default Object.assign({{}}, {{\n  {ns},\n}});\n",
            ns = namespace
        );
        fs::write(&index_path, content)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;
        return Ok(());
    }

    let mut content = fs::read_to_string(&index_path)
        .with_context(|| format!("Failed to read {}", index_path.display()))?;
    if content.contains(&format!("from './{}'", namespace)) {
        return Ok(());
    }

    // One import line after the first existing import.
    let import_line = format!("import {ns} from './{ns}';\n", ns = namespace);
    match content.find("import ") {
        Some(first_import) => {
            let insert_at = content[first_import..]
                .find('\n')
                .map(|p| first_import + p + 1)
                .unwrap_or(content.len());
            content.insert_str(insert_at, &import_line);
        }
        None => content.insert_str(0, &import_line),
    }

    // One member before the closing brace of the default export. The last
    // '}' in the file closes that object in both the Object.assign and the
    // plain-object forms.
    match content.rfind('}') {
        Some(brace) => {
            let line_start = content[..brace].rfind('\n').map(|p| p + 1).unwrap_or(0);
            content.insert_str(line_start, &format!("  {},\n", namespace));
        }
        None => bail!(
            "Aggregator {} has no default export object",
            index_path.display()
        ),
    }

    fs::write(&index_path, content)
        .with_context(|| format!("Failed to write {}", index_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_create_namespace_and_aggregator() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("zh-CN");

        write_entry(&catalog, "ts", "common.tiJiao", "提交", false).unwrap();

        let ns = fs::read_to_string(catalog.join("common.ts")).unwrap();
        assert_eq!(ns, "export default {\n  tiJiao: '提交',\n};\n");

        let index = fs::read_to_string(catalog.join("index.ts")).unwrap();
        assert_eq!(
            index,
            "import common from './common';\n\nexport default Object.assign({}, {\n  common,\n});\n"
        );
    }

    #[test]
    fn test_update_existing_namespace() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("zh-CN");

        write_entry(&catalog, "ts", "common.tiJiao", "提交", false).unwrap();
        write_entry(&catalog, "ts", "common.login.queDing", "确定", false).unwrap();

        let ns = fs::read_to_string(catalog.join("common.ts")).unwrap();
        assert!(ns.contains("tiJiao: '提交',"));
        assert!(ns.contains("login: {"));
        assert!(ns.contains("queDing: '确定',"));

        // Only one namespace registration.
        let index = fs::read_to_string(catalog.join("index.ts")).unwrap();
        assert_eq!(index.matches("import common").count(), 1);
    }

    #[test]
    fn test_register_second_namespace() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("zh-CN");

        write_entry(&catalog, "ts", "common.a", "甲", false).unwrap();
        write_entry(&catalog, "ts", "pages.b", "乙", false).unwrap();

        let index = fs::read_to_string(catalog.join("index.ts")).unwrap();
        assert!(index.contains("import common from './common';"));
        assert!(index.contains("import pages from './pages';"));
        assert!(index.contains("  common,\n"));
        assert!(index.contains("  pages,\n"));

        // Still parseable as the aggregator shape the store expects.
        let tree = module_text::parse_default_export(&index, "index.ts");
        assert!(tree.is_ok());
    }

    #[test]
    fn test_register_into_plain_object_form() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("zh-CN");
        fs::create_dir_all(&catalog).unwrap();
        fs::write(
            catalog.join("index.ts"),
            "import common from './common';\n\nexport default {\n  common,\n};\n",
        )
        .unwrap();
        fs::write(
            catalog.join("common.ts"),
            "export default {\n  a: '甲',\n};\n",
        )
        .unwrap();

        write_entry(&catalog, "ts", "pages.b", "乙", false).unwrap();

        let index = fs::read_to_string(catalog.join("index.ts")).unwrap();
        assert!(index.contains("import pages from './pages';"));
        assert!(index.contains("  pages,\n};"));
    }

    #[test]
    fn test_duplicate_key_validation() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("zh-CN");

        write_entry(&catalog, "ts", "common.queRen", "确认删除", false).unwrap();

        let result = write_entry(&catalog, "ts", "common.queRen", "确认", true);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Duplicate key"));

        // Same value is not a duplicate.
        write_entry(&catalog, "ts", "common.queRen", "确认删除", true).unwrap();
    }

    #[test]
    fn test_key_without_path_rejected() {
        let dir = tempdir().unwrap();
        let result = write_entry(dir.path(), "ts", "common", "文", false);
        assert!(result.is_err());
    }

    #[test]
    fn test_newline_deescaped() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("zh-CN");

        write_entry(&catalog, "ts", "common.duoHang", "上\\n下", false).unwrap();

        let ns = fs::read_to_string(catalog.join("common.ts")).unwrap();
        // Stored cooked, rendered back as an escape.
        assert!(ns.contains("duoHang: '上\\n下',"));
        let tree = module_text::parse_default_export(&ns, "common.ts").unwrap();
        assert_eq!(module_text::get_path(&tree, &["duoHang"]), Some("上\n下"));
    }
}
