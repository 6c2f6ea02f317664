//! Genga Studio
//!
//! Describe an anime key-frame scene, optionally hand over a reference frame, and get
//! AI-drawn key frames back: either a sequence drawn from text or the next frame
//! continuing the reference.

pub mod backends;
pub mod config;
pub mod error;
pub mod generation;
pub mod image_data;
pub mod prompts;
pub mod scene;
pub mod session;
pub mod style;
pub mod suggestion;
pub mod view;

pub use backends::{BackendConfig, BackendFactory, BackendType, GenAiBackend, MockBackend};
pub use config::StudioConfig;
pub use error::SessionError;
pub use generation::{GeneratedFrame, GenerationJob, GenerationMode, GenerationService};
pub use image_data::{parse_data_url, EncodedImage, InlineImage};
pub use scene::{FrameCount, SceneRequest};
pub use session::{AnalysisJob, RequestStatus, Session, StudioServices};
pub use style::{ArtStyle, ScenePreset, PRESETS};
pub use suggestion::SuggestionService;
pub use view::{OutputPanel, StudioView};

use anyhow::Result;
use std::sync::Arc;

/// Build the backend and adapters described by `config`
pub fn connect(config: &StudioConfig) -> Result<(Arc<dyn GenAiBackend>, StudioServices)> {
    let backend = BackendFactory::create(config.backend.clone())?;
    let services = StudioServices::new(backend.clone(), config.suggestion_language.clone());
    Ok((backend, services))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_offline() {
        let config = StudioConfig::default().offline();
        let (backend, services) = connect(&config).unwrap();
        assert_eq!(backend.backend_type(), BackendType::Mock);
        assert_eq!(services.suggestions.language(), "English");
    }

    #[test]
    fn test_connect_without_key_fails() {
        assert!(connect(&StudioConfig::default()).is_err());
    }
}
