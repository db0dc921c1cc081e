//! Google provider: one request per file, fragments joined with newlines.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::KeyTranslator;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTranslator for GoogleTranslator {
    fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }
        let joined = fragments.join("\n");
        let response: Value = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", "zh-CN"),
                ("tl", "en"),
                ("dt", "t"),
                ("q", joined.as_str()),
            ])
            .send()
            .context("Google translate request failed")?
            .json()
            .context("Google translate returned malformed JSON")?;

        // The payload is a nested array; element 0 lists the translated
        // segments, each of which starts with the translated text.
        let mut translated = String::new();
        let Some(segments) = response.get(0).and_then(Value::as_array) else {
            bail!("Google translate returned an unexpected payload");
        };
        for segment in segments {
            if let Some(part) = segment.get(0).and_then(Value::as_str) {
                translated.push_str(part);
            }
        }

        let tokens: Vec<String> = translated
            .split('\n')
            .map(|t| t.trim().to_string())
            .collect();
        if tokens.len() != fragments.len() {
            bail!(
                "Google translate produced {} tokens for {} fragments",
                tokens.len(),
                fragments.len()
            );
        }
        Ok(tokens)
    }
}
