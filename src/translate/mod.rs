//! Key-translation capability.
//!
//! The pipeline is provider-agnostic: it prepares one fragment per literal,
//! asks the configured provider for a batch of English candidate tokens, and
//! expects exactly one token per fragment. Anything else aborts that file's
//! rewrite only.

mod baidu;
mod google;
mod pinyin;

use anyhow::Result;

use crate::config::{Config, TranslateApi};
use crate::utils::is_chinese_char;

pub use baidu::BaiduTranslator;
pub use google::GoogleTranslator;
pub use pinyin::PinyinTranslator;

/// Batch translation of literal fragments into key-token candidates.
pub trait KeyTranslator {
    /// Returns one candidate token per input fragment, in order.
    fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>>;
}

/// Fragment fed to the provider for one literal: Chinese characters and
/// letters only, truncated to the first five characters, with a sentinel for
/// literals that keep nothing. Interpolation placeholders (`{valN}`) belong
/// to the catalog form, not the literal, and are dropped first.
pub fn prepare_fragment(text: &str) -> String {
    static PLACEHOLDER: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let placeholder = PLACEHOLDER.get_or_init(|| regex::Regex::new(r"\{val\d+\}").unwrap());
    let text = placeholder.replace_all(text, "");

    let kept: String = text
        .chars()
        .filter(|c| is_chinese_char(*c) || c.is_ascii_alphabetic())
        .take(5)
        .collect();
    if kept.is_empty() {
        "中文符号".to_string()
    } else {
        kept
    }
}

/// Build the provider selected in configuration.
pub fn make_translator(config: &Config) -> Box<dyn KeyTranslator> {
    match config.default_translate_key_api {
        TranslateApi::Pinyin => Box::new(PinyinTranslator),
        TranslateApi::Google => Box::new(GoogleTranslator::new()),
        TranslateApi::Baidu => Box::new(BaiduTranslator::new(config.baidu_api_key.clone())),
    }
}
