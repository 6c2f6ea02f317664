//! Prompt suggestions for an uploaded key frame
//!
//! Sends the reference frame to the analysis model and turns its JSON answer into short
//! follow-up phrases the user can pick as the next description.
use crate::backends::GenAiBackend;
use crate::image_data::EncodedImage;
use crate::prompts;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("analysis request failed: {0}")]
    Transport(String),
    #[error("analysis answer is not valid JSON: {0}")]
    Parse(String),
}

/// Suggestion service adapter
pub struct SuggestionService {
    backend: Arc<dyn GenAiBackend>,
    language: String,
}

impl SuggestionService {
    pub fn new(backend: Arc<dyn GenAiBackend>, language: impl Into<String>) -> Self {
        Self {
            backend,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Suggest follow-up phrases for `image`
    pub async fn suggest(&self, image: &EncodedImage) -> Result<Vec<String>, SuggestionError> {
        let inline = image.inline();
        let instruction = prompts::analysis_instruction(&self.language);
        let schema = prompts::suggestion_schema();

        debug!(
            "Analyzing {} key frame with {}",
            inline.mime_type,
            self.backend.name()
        );

        let text = self
            .backend
            .analyze_image(&inline, &instruction, &schema)
            .await
            .map_err(|e| {
                warn!("Analysis failed: {:#}", e);
                SuggestionError::Transport(format!("{:#}", e))
            })?;

        let suggestions = parse_suggestions(&text)?;
        debug!("Received {} suggestions", suggestions.len());
        Ok(suggestions)
    }
}

/// Extract the `suggestions` array from the model's JSON answer.
///
/// Text that is not JSON at all is an error. Valid JSON without a `suggestions` array
/// yields no suggestions; non-string entries are skipped.
pub fn parse_suggestions(text: &str) -> Result<Vec<String>, SuggestionError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| SuggestionError::Parse(e.to_string()))?;

    let suggestions = value
        .get("suggestions")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(postprocess::clean_suggestion)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(suggestions)
}

/// Models occasionally wrap JSON mode answers in a ```json fence
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Suggestion post-processing utilities
pub mod postprocess {
    /// Collapse whitespace and drop surrounding quotes
    pub fn clean_suggestion(suggestion: &str) -> String {
        suggestion
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
