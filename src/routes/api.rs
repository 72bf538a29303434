use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// API Router Module
///
/// Defines the JSON/multipart endpoints consumed by the pages. Access control
/// is not decided here: the gate layered over the whole router allows
/// `/api/videos` anonymously (it is on the public API list) and bounces
/// signed-out callers of the upload endpoints to sign-in.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/videos
        // Lists hosted videos with metadata. Public: the landing page renders
        // it without a session.
        .route("/api/videos", get(handlers::get_videos))
        // POST /api/video-upload
        // Multipart (file, title, description, originalSize). Forwards the
        // bytes to the Media Backend; gated.
        .route("/api/video-upload", post(handlers::upload_video))
        // POST /api/image-upload
        // Multipart (file). Returns the provider public id used for
        // social-format transformations; gated.
        .route("/api/image-upload", post(handlers::upload_image))
}
