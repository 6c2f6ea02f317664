//! Studio session: the single controller owning all UI state
//!
//! Service calls are split in three steps so a caller sharing the session behind a lock
//! never holds it across an await:
//! 1. `begin_*` checks the status, performs the transition and returns a job owning its inputs
//! 2. the job runs against [`StudioServices`] without touching the session
//! 3. `finish_*` applies the outcome and returns the status to `Idle`
//!
//! Only one call is in flight at a time; a second one is rejected with [`SessionError::Busy`].
use crate::backends::GenAiBackend;
use crate::error::SessionError;
use crate::generation::{GeneratedFrame, GenerationError, GenerationJob, GenerationMode, GenerationService};
use crate::image_data::EncodedImage;
use crate::scene::{FrameCount, SceneRequest};
use crate::style::{self, ArtStyle};
use crate::suggestion::{SuggestionError, SuggestionService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Analyzing,
    Generating,
}

impl RequestStatus {
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Analysis of a freshly uploaded reference image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub image: EncodedImage,
}

/// Service adapters sharing one injected backend, scoped to the session's lifetime
pub struct StudioServices {
    pub suggestions: SuggestionService,
    pub generation: GenerationService,
}

impl StudioServices {
    pub fn new(backend: Arc<dyn GenAiBackend>, suggestion_language: impl Into<String>) -> Self {
        Self {
            suggestions: SuggestionService::new(backend.clone(), suggestion_language),
            generation: GenerationService::new(backend),
        }
    }
}

/// Studio session
#[derive(Debug, Clone, Default)]
pub struct Session {
    request: SceneRequest,
    suggestions: Vec<String>,
    frames: Vec<GeneratedFrame>,
    status: RequestStatus,
    last_error: Option<SessionError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> &SceneRequest {
        &self.request
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn frames(&self) -> &[GeneratedFrame] {
        &self.frames
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.request.description = description.into();
    }

    pub fn set_style(&mut self, style: ArtStyle) {
        self.request.style = style;
    }

    /// Set the preferred frame count; it only takes effect while no reference image is present
    pub fn set_frame_count(&mut self, count: u8) -> Result<(), SessionError> {
        let count = FrameCount::new(count).ok_or(SessionError::InvalidFrameCount { requested: count })?;
        self.request.frame_count = count;
        Ok(())
    }

    /// Copy suggestion `index` into the description
    pub fn select_suggestion(&mut self, index: usize) -> Result<(), SessionError> {
        let suggestion = self
            .suggestions
            .get(index)
            .ok_or(SessionError::UnknownSuggestion { index })?;
        self.request.description = suggestion.clone();
        Ok(())
    }

    /// Overwrite description and style from example `index`, dropping image and suggestions
    pub fn apply_preset(&mut self, index: usize) -> Result<(), SessionError> {
        let preset = style::preset(index).ok_or(SessionError::UnknownPreset { index })?;
        debug!("Applying preset '{}'", preset.name);
        self.request.apply_preset(preset);
        self.suggestions.clear();
        Ok(())
    }

    /// Store a reference image and start its analysis
    pub fn upload_image(&mut self, image: EncodedImage) -> Result<AnalysisJob, SessionError> {
        if self.status.is_busy() {
            return Err(SessionError::Busy);
        }

        self.request.reference_image = Some(image.clone());
        self.suggestions.clear();
        self.last_error = None;
        self.status = RequestStatus::Analyzing;

        info!("Reference image uploaded ({}), analyzing", image.mime_type());
        Ok(AnalysisJob { image })
    }

    /// Apply the outcome of an analysis started by [`Session::upload_image`]
    pub fn finish_analysis(&mut self, outcome: Result<Vec<String>, SuggestionError>) {
        if self.status != RequestStatus::Analyzing {
            warn!("Analysis finished while {:?}; ignoring", self.status);
            return;
        }
        self.status = RequestStatus::Idle;

        match outcome {
            Ok(suggestions) => self.suggestions = suggestions,
            Err(e) => {
                warn!("Analysis failed: {}", e);
                self.last_error = Some(e.into());
            }
        }
    }

    /// Drop the reference image and its suggestions
    pub fn remove_image(&mut self) {
        self.request.reference_image = None;
        self.suggestions.clear();
    }

    /// Validate the request and start a generation
    pub fn begin_generation(&mut self) -> Result<GenerationJob, SessionError> {
        if self.status.is_busy() {
            return Err(SessionError::Busy);
        }

        let description = self.request.description.trim();
        if description.is_empty() {
            self.last_error = Some(SessionError::EmptyDescription);
            return Err(SessionError::EmptyDescription);
        }

        let mode = match &self.request.reference_image {
            Some(reference) => GenerationMode::Edit {
                reference: reference.clone(),
                modification: description.to_string(),
            },
            None => GenerationMode::Sequence {
                description: description.to_string(),
                frames: self.request.frame_count,
            },
        };
        let job = GenerationJob {
            style: self.request.style,
            mode,
        };

        self.status = RequestStatus::Generating;
        self.last_error = None;
        self.frames.clear();

        Ok(job)
    }

    /// Apply the outcome of a generation started by [`Session::begin_generation`]
    pub fn finish_generation(&mut self, outcome: Result<Vec<GeneratedFrame>, GenerationError>) {
        if self.status != RequestStatus::Generating {
            warn!("Generation finished while {:?}; ignoring", self.status);
            return;
        }
        self.status = RequestStatus::Idle;

        match outcome {
            Ok(frames) => {
                info!("Generated {} frame(s)", frames.len());
                self.frames = frames;
            }
            Err(e) => self.last_error = Some(e.into()),
        }
    }

    /// Upload and analyze in one go, for callers that own the session outright
    pub async fn upload_and_analyze(
        &mut self,
        services: &StudioServices,
        image: EncodedImage,
    ) -> Result<(), SessionError> {
        let job = self.upload_image(image)?;
        let outcome = services.suggestions.suggest(&job.image).await;
        self.finish_analysis(outcome);
        Ok(())
    }

    /// Run a whole generation, for callers that own the session outright.
    ///
    /// Validation and busy errors come back as `Err`; service failures land in
    /// [`Session::last_error`] like they do for the UI.
    pub async fn generate(&mut self, services: &StudioServices) -> Result<(), SessionError> {
        let job = self.begin_generation()?;
        let outcome = services.generation.generate(&job).await;
        self.finish_generation(outcome);
        Ok(())
    }
}
