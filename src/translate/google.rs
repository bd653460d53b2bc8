//! Google Translate provider.
//!
//! Uses the unofficial `translate_a/single` endpoint (the one the website
//! itself calls) which needs no API key. The response is a bare JSON array:
//! index 0 holds translated chunks, index 2 the detected source language.

use crate::error::{Result, SubgenError};
use crate::translate::TranslationProvider;
use async_trait::async_trait;
use serde_json::Value;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Languages offered as translation targets.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("Arabic", "ar"),
    ("Chinese (Simplified)", "zh-CN"),
    ("Chinese (Traditional)", "zh-TW"),
    ("Czech", "cs"),
    ("Danish", "da"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Finnish", "fi"),
    ("French", "fr"),
    ("German", "de"),
    ("Greek", "el"),
    ("Hebrew", "iw"),
    ("Hindi", "hi"),
    ("Hungarian", "hu"),
    ("Indonesian", "id"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Norwegian", "no"),
    ("Polish", "pl"),
    ("Portuguese", "pt"),
    ("Romanian", "ro"),
    ("Russian", "ru"),
    ("Spanish", "es"),
    ("Swedish", "sv"),
    ("Thai", "th"),
    ("Turkish", "tr"),
    ("Ukrainian", "uk"),
    ("Vietnamese", "vi"),
];

pub struct GoogleTranslateProvider {
    client: reqwest::Client,
}

impl GoogleTranslateProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, text: &str, source: &str, target: &str) -> Result<Value> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubgenError::Translation {
                message: format!("provider returned HTTP {}", response.status()),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SubgenError::Translation {
            message: format!("unparsable provider response: {e}"),
        })
    }
}

impl Default for GoogleTranslateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let value = self.call(text, source, target).await?;
        let translated = extract_translation(&value)?;
        Ok(translated)
    }

    async fn detect_language(&self, text: &str) -> Result<String> {
        let value = self.call(text, "auto", "en").await?;
        extract_detected_language(&value)
    }

    fn supported_languages(&self) -> &[(&'static str, &'static str)] {
        LANGUAGES
    }
}

/// Concatenate the translated chunks at index 0 of the response.
fn extract_translation(value: &Value) -> Result<String> {
    let chunks = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| SubgenError::Translation {
            message: "response has no translation chunks".to_string(),
        })?;

    let mut out = String::new();
    for chunk in chunks {
        if let Some(text) = chunk.get(0).and_then(Value::as_str) {
            out.push_str(text);
        }
    }

    if out.trim().is_empty() {
        return Err(SubgenError::Translation {
            message: "response contained an empty translation".to_string(),
        });
    }
    Ok(out)
}

/// Detected source language sits at index 2 of the response.
fn extract_detected_language(value: &Value) -> Result<String> {
    value
        .get(2)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SubgenError::Translation {
            message: "response has no detected language".to_string(),
        })
}
