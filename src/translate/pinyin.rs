//! Default provider: local pinyin romanization, no network.

use anyhow::{Result, bail};
use pinyin::ToPinyin;

use super::KeyTranslator;

/// Joins the batch with `$` (a character the fragment filter can never
/// produce), romanizes, and splits back.
pub struct PinyinTranslator;

const BATCH_DELIMITER: char = '$';

impl KeyTranslator for PinyinTranslator {
    fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }
        let joined = fragments.join(&BATCH_DELIMITER.to_string());
        let converted = romanize(&joined);
        let tokens: Vec<String> = converted
            .split(BATCH_DELIMITER)
            .map(|t| t.trim().to_string())
            .collect();
        if tokens.len() != fragments.len() {
            bail!(
                "Pinyin batch produced {} tokens for {} fragments",
                tokens.len(),
                fragments.len()
            );
        }
        Ok(tokens)
    }
}

fn romanize(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        match c.to_pinyin() {
            Some(py) => {
                out.push(' ');
                out.push_str(py.plain());
                out.push(' ');
            }
            None => out.push(c),
        }
    }
    out
}
