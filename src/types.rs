//! Request types and validation for `POST /create-deck`

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// A validated deck request
///
/// Both language names are non-empty and `sentences` holds at least one entry.
/// Individual sentences are not checked here; incomplete ones are skipped
/// during assembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeckRequest {
    /// Language being learned; also names the deck
    pub target_language: String,
    /// Language the learner already knows
    pub origin_language: String,
    /// Sentence pairs, in the order their notes are added
    pub sentences: Vec<SentenceInput>,
}

/// One sentence pair as received
///
/// Empty strings and non-string values are read as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentenceInput {
    /// Sentence in the target language (card front)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    /// Translation in the origin language (card back)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_language: Option<String>,
    /// Remote audio for the target sentence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl SentenceInput {
    /// Both language fields, when both are present
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((
            self.target_language.as_deref()?,
            self.origin_language.as_deref()?,
        ))
    }

    fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(obj) => Self {
                target_language: non_empty_str(obj, "target_language").map(str::to_string),
                origin_language: non_empty_str(obj, "origin_language").map(str::to_string),
                audio_url: non_empty_str(obj, "audio_url").map(str::to_string),
            },
            None => Self::default(),
        }
    }
}

impl DeckRequest {
    /// Parse and validate a raw request body.
    ///
    /// Checks run in order: payload shape, `target_language`,
    /// `origin_language`, `sentences`. The first failure is logged and returned.
    pub fn from_slice(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "request body is not valid JSON");
                return Err(ValidationError::InvalidPayload);
            }
        };

        let obj = match value.as_object() {
            Some(obj) if !obj.is_empty() => obj,
            _ => {
                tracing::error!("no JSON object payload received");
                return Err(ValidationError::InvalidPayload);
            }
        };

        let target_language = required_str(obj, "target_language")?;
        let origin_language = required_str(obj, "origin_language")?;

        let sentences = match obj.get("sentences").and_then(Value::as_array) {
            Some(items) if !items.is_empty() => {
                items.iter().map(SentenceInput::from_value).collect()
            }
            _ => {
                tracing::error!(field = "sentences", "invalid or missing field");
                return Err(ValidationError::InvalidField("sentences"));
            }
        };

        Ok(Self {
            target_language: target_language.to_string(),
            origin_language: origin_language.to_string(),
            sentences,
        })
    }
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ValidationError> {
    non_empty_str(obj, key).ok_or_else(|| {
        tracing::error!(field = key, "invalid or missing field");
        ValidationError::InvalidField(key)
    })
}
