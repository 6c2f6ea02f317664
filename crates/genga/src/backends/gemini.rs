//! Gemini API backend integration
//!
//! `generateContent` serves key-frame analysis and image edits,
//! Imagen's `predict` serves text-to-image generation.
use super::{BackendConfig, BackendType, GenAiBackend, ImageParams};
use crate::image_data::InlineImage;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gemini API backend
pub struct GeminiBackend {
    api_key: String,
    api_url: String,
    analysis_model: String,
    edit_model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Create new Gemini backend
    pub fn new(config: BackendConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .context("Gemini backend requires api_key")?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        Ok(Self {
            api_key,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            analysis_model: config.analysis_model,
            edit_model: config.edit_model,
            image_model: config.image_model,
            client: builder.build().context("failed to build HTTP client")?,
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_url, model, method)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, url: String, body: &B) -> Result<R> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Gemini API error: {} - {}", status, response.text().await?);
        }

        response
            .json()
            .await
            .with_context(|| format!("unexpected response body from {}", url))
    }

    async fn generate_content(
        &self,
        model: &str,
        image: &InlineImage,
        instruction: &str,
        generation_config: GenerationConfig,
    ) -> Result<GenerateContentResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::image(image), Part::text(instruction)],
            }],
            generation_config,
        };

        self.post(self.model_url(model, "generateContent"), &request).await
    }
}

#[async_trait::async_trait]
impl GenAiBackend for GeminiBackend {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Gemini
    }

    async fn is_available(&self) -> Result<bool> {
        // Listing models is the cheapest authenticated call
        match self
            .client
            .get(format!("{}/models", self.api_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn analyze_image(
        &self,
        image: &InlineImage,
        instruction: &str,
        response_schema: &serde_json::Value,
    ) -> Result<String> {
        let config = GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(response_schema.clone()),
            response_modalities: None,
        };

        let response = self
            .generate_content(&self.analysis_model, image, instruction, config)
            .await?;

        Ok(response.text())
    }

    async fn edit_image(&self, image: &InlineImage, instruction: &str) -> Result<Vec<InlineImage>> {
        let config = GenerationConfig {
            response_mime_type: None,
            response_schema: None,
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
        };

        let response = self
            .generate_content(&self.edit_model, image, instruction, config)
            .await?;

        Ok(response.images())
    }

    async fn generate_images(&self, instruction: &str, params: &ImageParams) -> Result<Vec<InlineImage>> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: instruction.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: params.count,
                aspect_ratio: params.aspect_ratio.clone(),
                output_options: OutputOptions {
                    mime_type: params.output_mime_type.clone(),
                },
            },
        };

        let response: PredictResponse = self
            .post(self.model_url(&self.image_model, "predict"), &request)
            .await?;

        Ok(response.images(&params.output_mime_type))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn image(image: &InlineImage) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: Some(image.mime_type.clone()),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }

    /// Inline images of the first candidate, in order
    fn images(&self) -> Vec<InlineImage> {
        self.first_parts()
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .filter(|blob| !blob.data.is_empty())
            .map(|blob| {
                InlineImage::new(
                    blob.mime_type.clone().unwrap_or_else(|| "image/png".to_string()),
                    blob.data.clone(),
                )
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u8,
    aspect_ratio: String,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: String,
}

#[derive(Debug, Deserialize, Default)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

impl PredictResponse {
    fn images(&self, fallback_mime: &str) -> Vec<InlineImage> {
        self.predictions
            .iter()
            .filter_map(|prediction| {
                let data = prediction.bytes_base64_encoded.as_ref()?;
                if data.is_empty() {
                    return None;
                }
                let mime = prediction
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| fallback_mime.to_string());
                Some(InlineImage::new(mime, data.clone()))
            })
            .collect()
    }
}
