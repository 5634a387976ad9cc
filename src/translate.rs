//! Machine translation of repository descriptions.
//!
//! Descriptions are kept in French and English. An edit arrives in one of
//! the two and the other is regenerated through a [`Translator`]. Translation
//! never fails from the caller's point of view: any problem yields the source
//! text unchanged.

use crate::model::Description;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    /// Parse a language code, falling back to French for anything unknown.
    pub fn parse_or_default(code: Option<&str>) -> Self {
        code.and_then(Self::from_code).unwrap_or_default()
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Language::Fr => Language::En,
            Language::En => Language::Fr,
        }
    }

    fn english_name(self) -> &'static str {
        match self {
            Language::Fr => "French",
            Language::En => "English",
        }
    }
}

pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: Language, target: Language) -> String;
}

/// Leaves text as it is; used when no translation backend is configured.
pub struct Untranslated;

impl Translator for Untranslated {
    fn translate(&self, text: &str, _source: Language, _target: Language) -> String {
        text.to_string()
    }
}

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiTranslator {
    api_key: String,
    agent: ureq::Agent,
}

impl OpenAiTranslator {
    pub fn new(api_key: impl Into<String>) -> Self {
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(30)))
            .build()
            .new_agent();
        Self {
            api_key: api_key.into(),
            agent,
        }
    }

    pub fn from_env() -> Option<Self> {
        env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }

    fn request(&self, text: &str, source: Language, target: Language) -> Result<String, String> {
        let body = ChatRequest {
            model: OPENAI_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: format!(
                        "You are a translator. Translate the following text from {} to {}. \
                         Return only the translated text, nothing else. Keep it concise.",
                        source.english_name(),
                        target.english_name()
                    ),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: 0.3,
            max_tokens: 200,
        };

        let response = self
            .agent
            .post(OPENAI_URL)
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        if status >= 400 {
            let detail = response.into_body().read_to_string().unwrap_or_default();
            return Err(format!("status {status}: {detail}"));
        }

        let parsed: ChatResponse = response
            .into_body()
            .read_json()
            .map_err(|e| e.to_string())?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "empty response".to_string())
    }
}

impl Translator for OpenAiTranslator {
    fn translate(&self, text: &str, source: Language, target: Language) -> String {
        if text.trim().is_empty() || source == target {
            return text.to_string();
        }
        match self.request(text, source, target) {
            Ok(translated) => translated,
            Err(e) => {
                log::warn!("translation {} -> {} failed: {e}", source.code(), target.code());
                text.to_string()
            }
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI when `OPENAI_API_KEY` is set, otherwise no translation.
pub fn translator_from_env() -> Arc<dyn Translator> {
    match OpenAiTranslator::from_env() {
        Some(t) => {
            log::info!("description translation enabled ({OPENAI_MODEL})");
            Arc::new(t)
        }
        None => {
            log::debug!("OPENAI_API_KEY not set, descriptions will not be translated");
            Arc::new(Untranslated)
        }
    }
}

pub fn make_bilingual(text: &str, source: Language, translator: &dyn Translator) -> Description {
    let target = source.other();
    let mut texts = BTreeMap::new();
    texts.insert(source.code().to_string(), text.to_string());
    texts.insert(
        target.code().to_string(),
        translator.translate(text, source, target),
    );
    Description::Bilingual(texts)
}
