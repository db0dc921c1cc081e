//! End-to-end extraction scenarios against a temp project, driven through
//! the library pipeline with the local pinyin provider.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use kiwi::config::Config;
use kiwi::pipeline::{ExtractOptions, RunSummary, run_extract_with};
use kiwi::translate::PinyinTranslator;

struct Project {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Project {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.root.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.root.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn extract(&self, prefix: Option<&str>) -> Result<RunSummary> {
        let config = Config::default();
        let options = ExtractOptions {
            target: self.root.join("src").display().to_string(),
            prefix: prefix.map(str::to_string),
            include_html: false,
            verbose: false,
        };
        run_extract_with(&config, self.root(), &options, &PinyinTranslator)
    }
}

#[test]
fn plain_script_bare_string() -> Result<()> {
    let project = Project::new()?;
    project.write_file("src/app/page.ts", "const msg = \"提交\";\n")?;

    let summary = project.extract(Some("common"))?;

    assert_eq!(summary.files_rewritten, 1);
    let rewritten = project.read_file("src/app/page.ts")?;
    assert!(rewritten.contains("const msg = I18N.common.tiJiao;"));
    assert!(rewritten.contains("import I18N from 'utils/I18N';"));

    let catalog = project.read_file(".kiwi/zh-CN/common.ts")?;
    assert!(catalog.contains("tiJiao: '提交',"));
    Ok(())
}

#[test]
fn markup_text_in_component_file() -> Result<()> {
    let project = Project::new()?;
    project.write_file(
        "src/pages/index.vue",
        "<template>\n  <button>确定</button>\n</template>\n<script>\nexport default {};\n</script>\n",
    )?;

    project.extract(Some("common"))?;

    let rewritten = project.read_file("src/pages/index.vue")?;
    assert!(rewritten.contains("<button>{{I18N.common.queDing}}</button>"));
    // Exactly one import of the lookup symbol
    assert_eq!(rewritten.matches("import I18N").count(), 1);
    assert!(rewritten.contains("<script>\nimport I18N from 'utils/I18N';"));
    Ok(())
}

#[test]
fn template_with_interpolation() -> Result<()> {
    let project = Project::new()?;
    project.write_file(
        "src/app/inbox.ts",
        "const n = 3;\nconst m = `你有${n}条消息`;\n",
    )?;

    project.extract(Some("common"))?;

    let rewritten = project.read_file("src/app/inbox.ts")?;
    assert!(rewritten.contains("I18N.template(I18N.common.niYouTiaoXiaoXi, { val1: n })"));

    let catalog = project.read_file(".kiwi/zh-CN/common.ts")?;
    assert!(catalog.contains("'你有{val1}条消息'"));
    Ok(())
}

#[test]
fn repeated_literal_across_two_files_shares_one_key() -> Result<()> {
    let project = Project::new()?;
    project.write_file("src/app/first.ts", "const a = '取消';\n")?;
    project.write_file("src/app/second.ts", "const b = '取消';\n")?;

    let summary = project.extract(Some("common"))?;

    assert_eq!(summary.files_rewritten, 2);
    // The second occurrence reuses the key: one catalog write total.
    assert_eq!(summary.entries_written, 1);

    let first = project.read_file("src/app/first.ts")?;
    let second = project.read_file("src/app/second.ts")?;
    assert!(first.contains("I18N.common.quXiao"));
    assert!(second.contains("I18N.common.quXiao"));

    let catalog = project.read_file(".kiwi/zh-CN/common.ts")?;
    assert_eq!(catalog.matches("取消").count(), 1);
    Ok(())
}

#[test]
fn colliding_token_gets_numeric_suffix() -> Result<()> {
    let project = Project::new()?;
    // The catalog already binds the token to a different text.
    project.write_file(
        ".kiwi/zh-CN/index.ts",
        "import pages from './pages';\n\nexport default Object.assign({}, {\n  pages,\n});\n",
    )?;
    project.write_file(
        ".kiwi/zh-CN/pages.ts",
        "export default {\n  user: {\n    queRen: '确认删除',\n  },\n};\n",
    )?;
    project.write_file("src/app/dialog.ts", "const ok = '确认';\n")?;

    project.extract(Some("pages.user"))?;

    let rewritten = project.read_file("src/app/dialog.ts")?;
    assert!(rewritten.contains("I18N.pages.user.queRen2"));

    let catalog = project.read_file(".kiwi/zh-CN/pages.ts")?;
    assert!(catalog.contains("queRen: '确认删除',"));
    assert!(catalog.contains("queRen2: '确认',"));
    Ok(())
}

#[test]
fn attribute_with_chinese_in_component_file() -> Result<()> {
    let project = Project::new()?;
    project.write_file(
        "src/form/input.vue",
        "<template>\n  <input placeholder=\"请输入用户名\" />\n</template>\n<script>\nexport default {};\n</script>\n",
    )?;

    project.extract(Some("form"))?;

    let rewritten = project.read_file("src/form/input.vue")?;
    assert!(rewritten.contains("placeholder={{I18N.form.qingShuRuYongHu}}"));

    let catalog = project.read_file(".kiwi/zh-CN/form.ts")?;
    assert!(catalog.contains("qingShuRuYongHu: '请输入用户名',"));
    Ok(())
}

#[test]
fn path_derived_keys_without_prefix() -> Result<()> {
    let project = Project::new()?;
    project.write_file("src/components/login-form.tsx", "const l = '登录';\n")?;

    project.extract(None)?;

    let rewritten = project.read_file("src/components/login-form.tsx")?;
    assert!(rewritten.contains("I18N.components.login_form.dengLu"));

    let catalog = project.read_file(".kiwi/zh-CN/components.ts")?;
    assert!(catalog.contains("dengLu: '登录',"));
    Ok(())
}

#[test]
fn second_run_produces_no_changes() -> Result<()> {
    let project = Project::new()?;
    project.write_file(
        "src/pages/index.vue",
        "<template>\n  <button>确定</button>\n  <span>{{ ok ? '是' : '否' }}</span>\n</template>\n<script>\nexport default {};\n</script>\n",
    )?;
    project.write_file("src/app/page.ts", "const msg = `确认删除`;\n")?;

    project.extract(Some("common"))?;
    let vue_after_first = project.read_file("src/pages/index.vue")?;
    let ts_after_first = project.read_file("src/app/page.ts")?;
    let catalog_after_first = project.read_file(".kiwi/zh-CN/common.ts")?;
    let index_after_first = project.read_file(".kiwi/zh-CN/index.ts")?;

    let summary = project.extract(Some("common"))?;

    assert_eq!(summary.files_rewritten, 0);
    assert_eq!(summary.entries_written, 0);
    assert_eq!(summary.files_failed, 0);
    assert_eq!(project.read_file("src/pages/index.vue")?, vue_after_first);
    assert_eq!(project.read_file("src/app/page.ts")?, ts_after_first);
    assert_eq!(
        project.read_file(".kiwi/zh-CN/common.ts")?,
        catalog_after_first
    );
    assert_eq!(
        project.read_file(".kiwi/zh-CN/index.ts")?,
        index_after_first
    );
    Ok(())
}

#[test]
fn catalog_directory_not_scanned() -> Result<()> {
    let project = Project::new()?;
    // A catalog seeded with Chinese values must not be treated as a source.
    project.write_file(
        ".kiwi/zh-CN/index.ts",
        "import common from './common';\n\nexport default Object.assign({}, {\n  common,\n});\n",
    )?;
    project.write_file(
        ".kiwi/zh-CN/common.ts",
        "export default {\n  tiJiao: '提交',\n};\n",
    )?;
    project.write_file("src/app/page.ts", "const msg = '提交';\n")?;

    let summary = project.extract(Some("common"))?;

    // The existing entry is reused; the catalog gains nothing new.
    assert_eq!(summary.entries_written, 0);
    let rewritten = project.read_file("src/app/page.ts")?;
    assert!(rewritten.contains("I18N.common.tiJiao"));
    Ok(())
}

#[test]
fn mixed_dialects_in_one_run() -> Result<()> {
    let project = Project::new()?;
    project.write_file("src/a/page.tsx", "const el = <p>你好</p>;\n")?;
    project.write_file("src/b/legacy.js", "const t = '世界';\n")?;
    project.write_file(
        "src/c/widget.vue",
        "<template><p>欢迎</p></template>\n<script>\nexport default {};\n</script>\n",
    )?;

    let summary = project.extract(Some("common"))?;

    assert_eq!(summary.files_rewritten, 3);
    assert!(project.read_file("src/a/page.tsx")?.contains("<p>{I18N.common.niHao}</p>"));
    assert!(project.read_file("src/b/legacy.js")?.contains("I18N.common.shiJie"));
    assert!(
        project
            .read_file("src/c/widget.vue")?
            .contains("<p>{{I18N.common.huanYing}}</p>")
    );
    Ok(())
}
