//! Baidu provider: one signed request per fragment.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::KeyTranslator;
use crate::config::BaiduApiKey;

const ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";
const SALT: &str = "1435660288";

pub struct BaiduTranslator {
    client: reqwest::blocking::Client,
    credentials: BaiduApiKey,
}

impl BaiduTranslator {
    pub fn new(credentials: BaiduApiKey) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            credentials,
        }
    }

    fn translate_one(&self, fragment: &str) -> Result<String> {
        let sign = format!(
            "{:x}",
            md5::compute(format!(
                "{}{}{}{}",
                self.credentials.app_id, fragment, SALT, self.credentials.app_key
            ))
        );
        let response: Value = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", fragment),
                ("from", "zh"),
                ("to", "en"),
                ("appid", self.credentials.app_id.as_str()),
                ("salt", SALT),
                ("sign", sign.as_str()),
            ])
            .send()
            .context("Baidu translate request failed")?
            .json()
            .context("Baidu translate returned malformed JSON")?;

        if let Some(code) = response.get("error_code").and_then(Value::as_str) {
            bail!("Baidu translate error {}", code);
        }
        response
            .get("trans_result")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|r| r.get("dst"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Baidu translate returned an unexpected payload"))
    }
}

impl KeyTranslator for BaiduTranslator {
    fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>> {
        if !fragments.is_empty() && self.credentials.app_id.is_empty() {
            bail!("Baidu translate requires baiduApiKey.appId in kiwi-config.json");
        }
        fragments.iter().map(|f| self.translate_one(f)).collect()
    }
}
