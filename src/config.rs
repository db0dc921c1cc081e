use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "kiwi-config.json";

/// Translation provider used to turn Chinese fragments into key tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TranslateApi {
    Pinyin,
    Google,
    Baidu,
}

impl Default for TranslateApi {
    fn default() -> Self {
        TranslateApi::Pinyin
    }
}

/// Component-file framework version; selects the template extractor variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VueVersion {
    Vue2,
    Vue3,
}

impl Default for VueVersion {
    fn default() -> Self {
        VueVersion::Vue2
    }
}

/// Credentials for the Baidu translation API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaiduApiKey {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_key: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Catalog directory, absolute or cwd-relative.
    #[serde(default = "default_kiwi_dir")]
    pub kiwi_dir: String,
    /// Source locale; subdirectory under `kiwiDir`.
    #[serde(default = "default_src_lang")]
    pub src_lang: String,
    /// Catalog file extension (`ts` or `js`).
    #[serde(default = "default_file_type")]
    pub file_type: String,
    /// Globbed directory names skipped during the walk.
    #[serde(default)]
    pub ignore_dir: Vec<String>,
    /// Globbed file names skipped during the walk.
    #[serde(default)]
    pub ignore_file: Vec<String>,
    #[serde(default)]
    pub default_translate_key_api: TranslateApi,
    /// Import statement injected into rewritten files.
    #[serde(default = "default_import_i18n")]
    pub import_i18n: String,
    #[serde(default)]
    pub vue_version: VueVersion,
    #[serde(default)]
    pub baidu_api_key: BaiduApiKey,
}

fn default_kiwi_dir() -> String {
    "./.kiwi".to_string()
}

fn default_src_lang() -> String {
    "zh-CN".to_string()
}

fn default_file_type() -> String {
    "ts".to_string()
}

fn default_import_i18n() -> String {
    "import I18N from 'utils/I18N';".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kiwi_dir: default_kiwi_dir(),
            src_lang: default_src_lang(),
            file_type: default_file_type(),
            ignore_dir: Vec::new(),
            ignore_file: Vec::new(),
            default_translate_key_api: TranslateApi::default(),
            import_i18n: default_import_i18n(),
            vue_version: VueVersion::default(),
            baidu_api_key: BaiduApiKey::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern in `ignoreDir`/`ignoreFile` is
    /// invalid, or if the catalog file extension is not a script extension.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignore_dir {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignoreDir': \"{}\"", pattern))?;
        }
        for pattern in &self.ignore_file {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignoreFile': \"{}\"", pattern))?;
        }
        if !matches!(self.file_type.as_str(), "ts" | "js") {
            bail!(
                "Unsupported catalog file type \"{}\" (expected \"ts\" or \"js\")",
                self.file_type
            );
        }
        Ok(())
    }

    /// Absolute path of the source-locale catalog directory
    /// (`<kiwiDir>/<srcLang>`).
    pub fn catalog_dir(&self, cwd: &Path) -> PathBuf {
        let kiwi_dir = Path::new(&self.kiwi_dir);
        let base = if kiwi_dir.is_absolute() {
            kiwi_dir.to_path_buf()
        } else {
            cwd.join(kiwi_dir)
        };
        base.join(&self.src_lang)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
