//! Genga Studio server
//! Serves the studio page and the JSON action API over one shared session

pub mod api;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use genga::{Session, StudioServices};
use parking_lot::Mutex;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    /// Never held across an await
    pub session: Arc<Mutex<Session>>,
    pub services: Arc<StudioServices>,
}

impl AppState {
    pub fn new(services: StudioServices) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            services: Arc::new(services),
        }
    }
}

/// Largest accepted request body; reference frames arrive as base64 data URLs
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/api/state", get(api::get_state))
        .route("/api/scene", put(api::update_scene))
        .route(
            "/api/image",
            post(api::upload_image)
                .delete(api::remove_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/suggestions/:index/select", post(api::select_suggestion))
        .route("/api/presets/:index/apply", post(api::apply_preset))
        .route("/api/generate", post(api::generate))
        // Catalogues
        .route("/api/styles", get(api::list_styles))
        .route("/api/presets", get(api::list_presets))
        .layer(TraceLayer::new_for_http())
        // CORS for local development
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
