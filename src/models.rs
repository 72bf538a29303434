use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to the Media Provider) ---

/// VideoRecord
///
/// Represents one hosted video as reported by the Media Backend. This is the
/// primary data structure rendered by the dashboard; nothing here is persisted
/// locally — every listing is fetched fresh from the provider.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VideoRecord {
    /// The provider-assigned asset identifier, used to build playback and
    /// download URLs on the client.
    pub public_id: String,
    pub title: String,
    pub description: String,
    /// Size of the file the user originally selected, in bytes, as reported
    /// by the upload form. Round-trips through provider metadata.
    pub original_size: u64,
    /// Size of the provider-hosted rendition, in bytes.
    pub compressed_size: u64,
    /// Playback duration in seconds, as measured by the provider.
    pub duration: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// --- Response Payloads (Output Schemas) ---

/// VideoUploadResponse
///
/// Returned by POST /api/video-upload once the provider has accepted the file.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VideoUploadResponse {
    /// The provider-assigned identifier of the freshly uploaded video.
    pub public_id: String,
}

/// ImageUploadResponse
///
/// Returned by POST /api/image-upload. The client uses the public id to
/// request provider-side transformations (social-format crops) of the image.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImageUploadResponse {
    pub public_id: String,
}
