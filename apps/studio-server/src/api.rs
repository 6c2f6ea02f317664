/// REST API endpoints for the studio session
/// Mutations run synchronously under the session lock; service calls run in background tasks

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use genga::{
    AnalysisJob, ArtStyle, EncodedImage, FrameCount, GenerationJob, ScenePreset, SessionError,
    StudioView, PRESETS,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::page;
use crate::AppState;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    Session(SessionError),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::Session(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Session(e) = self;
        let status = match &e {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            SessionError::UnknownSuggestion { .. } | SessionError::UnknownPreset { .. } => {
                StatusCode::NOT_FOUND
            }
            SessionError::Busy => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": e.to_string() }))).into_response()
    }
}

/// Partial update of the scene inputs
#[derive(Debug, Default, Deserialize)]
pub struct SceneUpdate {
    pub description: Option<String>,
    pub style: Option<String>,
    pub frame_count: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct ImageUpload {
    pub data_url: String,
}

#[derive(Debug, Serialize)]
pub struct StyleEntry {
    pub value: ArtStyle,
    pub label: &'static str,
}

fn view(state: &AppState) -> StudioView {
    StudioView::from_session(&state.session.lock())
}

/// GET / - Studio page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&view(&state)))
}

/// GET /api/state - Current view
pub async fn get_state(State(state): State<AppState>) -> Json<StudioView> {
    Json(view(&state))
}

/// PUT /api/scene - Update description, style and frame count
pub async fn update_scene(
    State(state): State<AppState>,
    Json(req): Json<SceneUpdate>,
) -> Result<Json<StudioView>, ApiError> {
    // Validate everything before touching the session
    let style = req
        .style
        .as_deref()
        .map(|name| {
            name.parse::<ArtStyle>()
                .map_err(|_| SessionError::UnknownStyle { name: name.to_string() })
        })
        .transpose()?;
    if let Some(requested) = req.frame_count {
        if FrameCount::new(requested).is_none() {
            return Err(SessionError::InvalidFrameCount { requested }.into());
        }
    }

    let mut session = state.session.lock();
    if let Some(description) = req.description {
        session.set_description(description);
    }
    if let Some(style) = style {
        session.set_style(style);
    }
    if let Some(count) = req.frame_count {
        session.set_frame_count(count)?;
    }

    Ok(Json(StudioView::from_session(&session)))
}

/// POST /api/image - Store a reference image and analyze it in the background
pub async fn upload_image(
    State(state): State<AppState>,
    Json(req): Json<ImageUpload>,
) -> Result<(StatusCode, Json<StudioView>), ApiError> {
    let image = EncodedImage::parse(req.data_url).map_err(SessionError::from)?;

    let (job, view) = {
        let mut session = state.session.lock();
        let job = session.upload_image(image)?;
        (job, StudioView::from_session(&session))
    };
    spawn_analysis(state, job);

    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// DELETE /api/image - Remove the reference image and its suggestions
pub async fn remove_image(State(state): State<AppState>) -> Json<StudioView> {
    let mut session = state.session.lock();
    session.remove_image();
    Json(StudioView::from_session(&session))
}

/// POST /api/suggestions/:index/select - Copy a suggestion into the description
pub async fn select_suggestion(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<StudioView>, ApiError> {
    let mut session = state.session.lock();
    session.select_suggestion(index)?;
    Ok(Json(StudioView::from_session(&session)))
}

/// POST /api/presets/:index/apply - Fill the scene from an example
pub async fn apply_preset(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<StudioView>, ApiError> {
    let mut session = state.session.lock();
    session.apply_preset(index)?;
    Ok(Json(StudioView::from_session(&session)))
}

/// POST /api/generate - Validate the request and generate in the background
pub async fn generate(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<StudioView>), ApiError> {
    let (job, view) = {
        let mut session = state.session.lock();
        let job = session.begin_generation()?;
        (job, StudioView::from_session(&session))
    };
    spawn_generation(state, job);

    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// GET /api/styles - Art style catalogue
pub async fn list_styles() -> Json<Vec<StyleEntry>> {
    Json(
        ArtStyle::ALL
            .into_iter()
            .map(|value| StyleEntry {
                value,
                label: value.label(),
            })
            .collect(),
    )
}

/// GET /api/presets - Example scenes
pub async fn list_presets() -> Json<Vec<ScenePreset>> {
    Json(PRESETS.to_vec())
}

fn spawn_analysis(state: AppState, job: AnalysisJob) {
    tokio::spawn(async move {
        debug!("Analysis task started");
        let outcome = state.services.suggestions.suggest(&job.image).await;
        state.session.lock().finish_analysis(outcome);
    });
}

fn spawn_generation(state: AppState, job: GenerationJob) {
    tokio::spawn(async move {
        debug!("Generation task started ({:?})", job.mode.kind());
        let outcome = state.services.generation.generate(&job).await;
        state.session.lock().finish_generation(outcome);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: SessionError) -> StatusCode {
        ApiError::from(e).into_response().status()
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(status_of(SessionError::EmptyDescription), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(SessionError::InvalidImage {
                reason: "empty".to_string()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(SessionError::UnknownPreset { index: 7 }), StatusCode::NOT_FOUND);
        assert_eq!(status_of(SessionError::Busy), StatusCode::CONFLICT);
        assert_eq!(
            status_of(SessionError::Connection),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
