//! Key-frame generation
//!
//! Two modes, picked by whether a reference frame is present:
//! - `Edit`: continue the reference frame (image-conditioned, always one frame)
//! - `Sequence`: draw N frames from the description alone (text-to-image)
use crate::backends::{GenAiBackend, ImageParams};
use crate::image_data::{EncodedImage, InlineImage};
use crate::prompts;
use crate::scene::FrameCount;
use crate::style::ArtStyle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// What a generation call draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    Edit {
        reference: EncodedImage,
        modification: String,
    },
    Sequence {
        description: String,
        frames: FrameCount,
    },
}

impl GenerationMode {
    pub fn kind(&self) -> GenerationKind {
        match self {
            Self::Edit { .. } => GenerationKind::Edit,
            Self::Sequence { .. } => GenerationKind::Sequence,
        }
    }

    /// Frames requested from the backend
    pub fn requested_frames(&self) -> u8 {
        match self {
            Self::Edit { .. } => 1,
            Self::Sequence { frames, .. } => frames.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Edit,
    Sequence,
}

/// Inputs of one generation call, detached from the session that issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub style: ArtStyle,
    pub mode: GenerationMode,
}

impl GenerationJob {
    pub fn instruction(&self) -> String {
        match &self.mode {
            GenerationMode::Edit { modification, .. } => {
                prompts::edit_instruction(self.style, modification)
            }
            GenerationMode::Sequence {
                description,
                frames,
            } => prompts::sequence_instruction(self.style, description, frames.get()),
        }
    }
}

/// One generated frame; `position` counts from 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFrame {
    pub position: usize,
    pub image: EncodedImage,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service answered but produced no usable image
    #[error("no images returned for {kind:?} generation")]
    NoImages { kind: GenerationKind },
    #[error("generation request failed: {0}")]
    Transport(String),
}

/// Generation service adapter
pub struct GenerationService {
    backend: Arc<dyn GenAiBackend>,
}

impl GenerationService {
    pub fn new(backend: Arc<dyn GenAiBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate(&self, job: &GenerationJob) -> Result<Vec<GeneratedFrame>, GenerationError> {
        let instruction = job.instruction();
        let kind = job.mode.kind();

        info!(
            "Generating {} frame(s) ({:?}, {}) with {}",
            job.mode.requested_frames(),
            kind,
            job.style,
            self.backend.name()
        );

        let result = match &job.mode {
            GenerationMode::Edit { reference, .. } => {
                self.backend.edit_image(&reference.inline(), &instruction).await
            }
            GenerationMode::Sequence { frames, .. } => {
                self.backend
                    .generate_images(&instruction, &ImageParams::key_frames(frames.get()))
                    .await
            }
        };

        let images = result.map_err(|e| {
            warn!("Generation failed: {:#}", e);
            GenerationError::Transport(format!("{:#}", e))
        })?;

        if images.is_empty() {
            warn!("{:?} generation returned no images", kind);
            return Err(GenerationError::NoImages { kind });
        }

        debug!("Received {} image(s)", images.len());
        Ok(number_frames(images))
    }
}

fn number_frames(images: Vec<InlineImage>) -> Vec<GeneratedFrame> {
    images
        .iter()
        .enumerate()
        .map(|(index, image)| GeneratedFrame {
            position: index + 1,
            image: EncodedImage::from_inline(image),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{BackendCall, MockBackend};

    fn sequence_job(frames: u8) -> GenerationJob {
        GenerationJob {
            style: ArtStyle::CinematicAction,
            mode: GenerationMode::Sequence {
                description: "dragon fight".to_string(),
                frames: FrameCount::new(frames).unwrap(),
            },
        }
    }

    fn edit_job() -> GenerationJob {
        GenerationJob {
            style: ArtStyle::ShonenFlame,
            mode: GenerationMode::Edit {
                reference: EncodedImage::parse("data:image/png;base64,AAAA").unwrap(),
                modification: "step back".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_sequence_requests_frame_count() {
        let backend = Arc::new(MockBackend::new().with_generated_images(None));
        let service = GenerationService::new(backend.clone());

        let frames = service.generate(&sequence_job(3)).await.unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames.iter().map(|f| f.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        match &backend.calls()[..] {
            [BackendCall::Generate { count, instruction }] => {
                assert_eq!(*count, 3);
                assert!(instruction.contains("Cinematic Action"));
            }
            other => panic!("unexpected calls {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_edit_uses_edit_endpoint() {
        let backend = Arc::new(
            MockBackend::new().with_edit_images(vec![InlineImage::new("image/webp", "UklG")]),
        );
        let service = GenerationService::new(backend.clone());

        let frames = service.generate(&edit_job()).await.unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].image.as_str(), "data:image/webp;base64,UklG");

        assert!(matches!(
            &backend.calls()[..],
            [BackendCall::Edit { mime_type, .. }] if mime_type == "image/png"
        ));
    }

    #[tokio::test]
    async fn test_empty_edit_is_domain_failure() {
        let service = GenerationService::new(Arc::new(MockBackend::new()));
        let err = service.generate(&edit_job()).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::NoImages {
                kind: GenerationKind::Edit
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_sequence_is_domain_failure() {
        let backend = Arc::new(MockBackend::new());
        let service = GenerationService::new(backend.clone());

        let err = service.generate(&sequence_job(3)).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::NoImages {
                kind: GenerationKind::Sequence
            }
        ));
        assert!(matches!(
            &backend.calls()[..],
            [BackendCall::Generate { count: 3, .. }]
        ));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let service = GenerationService::new(Arc::new(MockBackend::new().with_failure("timeout")));
        let err = service.generate(&sequence_job(2)).await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[test]
    fn test_requested_frames() {
        assert_eq!(edit_job().mode.requested_frames(), 1);
        assert_eq!(sequence_job(5).mode.requested_frames(), 5);
    }
}
