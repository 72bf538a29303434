use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod config;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod media;
pub mod models;

// Module for routing segregation (Pages, API).
pub mod routes;
use routes::{api, pages};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use gate::RouteTables;
pub use identity::{IdentityState, MockIdentityProvider, SessionVerifier};
pub use media::{CloudinaryMediaClient, MediaState, MockMediaBackend};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas that have been decorated with
/// the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(handlers::get_videos, handlers::upload_video, handlers::upload_image),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::VideoRecord, models::VideoUploadResponse, models::ImageUploadResponse,
        )
    ),
    tags(
        (name = "xform-portal", description = "Xform Media Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and immutable
/// container holding all essential application services and configuration.
/// The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Identity collaborator: resolves a request's session to a user id.
    pub identity: IdentityState,
    /// Media collaborator: the external provider owning storage and transforms.
    pub media: MediaState,
    /// The gate's route classification tables, passed explicitly rather than
    /// read from ambient globals.
    pub route_tables: RouteTables,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers to selectively pull components from the
// shared AppState. The API handlers only ever need the media collaborator; the
// gate middleware takes the whole state (identity plus route tables).

impl FromRef<AppState> for MediaState {
    fn from_ref(app_state: &AppState) -> MediaState {
        app_state.media.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies the access
/// gate and global middleware, and registers the application state.
///
/// The gate layer wraps the page and API routers, so every portal request is
/// classified and decided before its handler runs. The docs and health
/// endpoints are mounted beside the gated tree: they are operational surface,
/// equivalent to the framework-reserved paths the gate's matcher skips.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Gated Portal Routes
    // Pages and API share one gate layer; the gate's own matcher decides
    // which paths it evaluates. The fallback sits inside the layer so unknown
    // protected paths are still classified (and redirected) before any 404.
    let portal_router = Router::new()
        .merge(pages::page_routes())
        .merge(api::api_routes())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::access_gate,
        ));

    // 3. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", axum::routing::get(|| async { "ok" }))
        .merge(portal_router)
        // Apply the Unified State to all routes.
        .with_state(state);

    // 4. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: Wraps the entire request/response lifecycle in a tracing span.
                // Uses the `trace_span_logger` to include the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: Ensures the generated x-request-id header is
                // returned to the client and injected into subsequent service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer (Applied last, allowing all traffic in/out after processing)
        .layer(cors)
}

/// not_found
///
/// Fallback for paths without a handler. Only ever reached once the gate has
/// allowed the request through.
async fn not_found() -> axum::http::StatusCode {
    axum::http::StatusCode::NOT_FOUND
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI, so every log
/// line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    // The structured log format used by the tracing macros.
    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
