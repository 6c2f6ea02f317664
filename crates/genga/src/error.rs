//! User-facing studio errors
use crate::generation::{GenerationError, GenerationKind};
use crate::image_data::ImageDataError;
use crate::suggestion::SuggestionError;
use serde::Serialize;
use thiserror::Error;

/// Everything the studio reports to the user. `Display` is the user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionError {
    #[error("Please enter a description of the scene or the modification you want.")]
    EmptyDescription,

    #[error("The number of frames must be between 1 and 5.")]
    InvalidFrameCount { requested: u8 },

    #[error("Unknown art style '{name}'.")]
    UnknownStyle { name: String },

    #[error("The selected file is not a readable image: {reason}")]
    InvalidImage { reason: String },

    #[error("There is no suggestion at position {index}.")]
    UnknownSuggestion { index: usize },

    #[error("There is no example at position {index}.")]
    UnknownPreset { index: usize },

    #[error("Another request is still running. Please wait for it to finish.")]
    Busy,

    #[error("Image analysis failed. You can write your own description.")]
    AnalysisFailed,

    #[error("The AI could not modify the image. Try a different description.")]
    EditProducedNoImage,

    #[error("The AI could not generate images. Please try again with a different request.")]
    NoImagesGenerated,

    #[error("An error occurred while contacting the server. Please check your internet connection and try again.")]
    Connection,
}

impl SessionError {
    /// Input problems caught before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyDescription
                | Self::InvalidFrameCount { .. }
                | Self::UnknownStyle { .. }
                | Self::InvalidImage { .. }
        )
    }
}

impl From<SuggestionError> for SessionError {
    fn from(_: SuggestionError) -> Self {
        Self::AnalysisFailed
    }
}

impl From<GenerationError> for SessionError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::NoImages {
                kind: GenerationKind::Edit,
            } => Self::EditProducedNoImage,
            GenerationError::NoImages {
                kind: GenerationKind::Sequence,
            } => Self::NoImagesGenerated,
            GenerationError::Transport(_) => Self::Connection,
        }
    }
}

impl From<ImageDataError> for SessionError {
    fn from(err: ImageDataError) -> Self {
        Self::InvalidImage {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_mapping() {
        let edit: SessionError = GenerationError::NoImages {
            kind: GenerationKind::Edit,
        }
        .into();
        assert_eq!(edit, SessionError::EditProducedNoImage);

        let sequence: SessionError = GenerationError::NoImages {
            kind: GenerationKind::Sequence,
        }
        .into();
        assert_eq!(sequence, SessionError::NoImagesGenerated);

        let transport: SessionError = GenerationError::Transport("dns".to_string()).into();
        assert_eq!(transport, SessionError::Connection);
    }

    #[test]
    fn test_analysis_errors_collapse() {
        let err: SessionError = SuggestionError::Parse("eof".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Image analysis failed. You can write your own description."
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(SessionError::EmptyDescription.is_validation());
        assert!(!SessionError::Busy.is_validation());
        assert!(!SessionError::Connection.is_validation());
    }

    #[test]
    fn test_serialized_kind() {
        let json = serde_json::to_value(SessionError::UnknownSuggestion { index: 2 }).unwrap();
        assert_eq!(json["kind"], "unknown_suggestion");
        assert_eq!(json["index"], 2);
    }
}
