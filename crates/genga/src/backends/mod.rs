//! Generative-AI backends
//!
//! Unified interface over the three model capabilities the studio consumes:
//! - multimodal analysis of a key frame (structured JSON answer)
//! - image-conditioned edit (reference frame + instruction → images)
//! - text-to-image generation (instruction + count → images)

pub mod gemini;
pub mod mock;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub use gemini::GeminiBackend;
pub use mock::{BackendCall, MockBackend};

use crate::image_data::InlineImage;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Google Gemini / Imagen REST API
    Gemini,
    /// Offline backend producing placeholder frames
    Mock,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Parameters of a text-to-image request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageParams {
    /// Number of images to produce
    pub count: u8,
    /// Output MIME type
    pub output_mime_type: String,
    /// Aspect ratio, `W:H`
    pub aspect_ratio: String,
}

impl ImageParams {
    /// Widescreen JPEG frames, the format key frames are requested in
    pub fn key_frames(count: u8) -> Self {
        Self {
            count,
            output_mime_type: "image/jpeg".to_string(),
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Generative-AI backend trait
#[async_trait::async_trait]
pub trait GenAiBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Backend type
    fn backend_type(&self) -> BackendType;

    /// Check if backend is available/configured
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    /// Ask the analysis model about `image`; returns the raw JSON text it answered with
    async fn analyze_image(
        &self,
        image: &InlineImage,
        instruction: &str,
        response_schema: &serde_json::Value,
    ) -> Result<String>;

    /// Produce images conditioned on `image`; an empty vector means the model answered without one
    async fn edit_image(&self, image: &InlineImage, instruction: &str) -> Result<Vec<InlineImage>>;

    /// Produce `params.count` images from text
    async fn generate_images(&self, instruction: &str, params: &ImageParams) -> Result<Vec<InlineImage>>;
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend type
    pub backend_type: BackendType,

    /// API base URL
    pub api_url: String,

    /// API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model answering key-frame analysis
    pub analysis_model: String,

    /// Model continuing a reference frame
    pub edit_model: String,

    /// Text-to-image model
    pub image_model: String,

    /// Request timeout in seconds; `None` leaves the transport default
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(BackendType::Gemini)
    }
}

impl BackendConfig {
    /// Create new backend config
    pub fn new(backend_type: BackendType) -> Self {
        Self {
            backend_type,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout_secs: None,
        }
    }

    /// With API endpoint
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    /// With API key
    pub fn with_api_key(mut self, key: String) -> Self {
        self.api_key = Some(key);
        self
    }

    /// With timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Save configuration to JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}

/// Backend factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create backend from config
    pub fn create(config: BackendConfig) -> Result<Arc<dyn GenAiBackend>> {
        match config.backend_type {
            BackendType::Gemini => {
                let backend = GeminiBackend::new(config)?;
                Ok(Arc::new(backend))
            }
            BackendType::Mock => Ok(Arc::new(MockBackend::placeholder())),
        }
    }

    /// Create default Gemini backend
    pub fn gemini(api_key: String) -> Result<GeminiBackend> {
        let config = BackendConfig::new(BackendType::Gemini).with_api_key(api_key);
        GeminiBackend::new(config)
    }
}
