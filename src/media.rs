use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

use crate::{config::AppConfig, models::VideoRecord};

// 1. MediaBackend Contract
/// MediaBackend
///
/// Defines the abstract contract for all interactions with the external media
/// provider. The provider owns the hard parts — transcoding, cropping,
/// storage — so this boundary only moves bytes and metadata. The trait allows
/// us to swap the concrete implementation—from the real REST client
/// (CloudinaryMediaClient) in production to the in-memory Mock
/// (MockMediaBackend) during testing—without affecting the calling handlers.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Lists all hosted videos with their metadata, newest first.
    async fn list_videos(&self) -> Result<Vec<VideoRecord>, String>;

    /// Uploads a video file together with its user-entered metadata.
    /// `original_size` is the byte size of the file before the provider's
    /// compression, as reported by the upload form.
    async fn upload_video(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        title: &str,
        description: &str,
        original_size: u64,
    ) -> Result<VideoRecord, String>;

    /// Uploads an image and returns the provider-assigned public id the
    /// client uses to request transformations.
    async fn upload_image(&self, bytes: Vec<u8>, filename: &str) -> Result<String, String>;
}

/// MediaState
///
/// The concrete type used to share the media collaborator across the application state.
pub type MediaState = Arc<dyn MediaBackend>;

// 2. The Real Implementation (Cloudinary-style REST API)

/// Wire shape of one asset in the provider's resource listing.
#[derive(Deserialize)]
struct ProviderResource {
    public_id: String,
    bytes: u64,
    #[serde(default)]
    duration: f64,
    created_at: chrono::DateTime<Utc>,
    #[serde(default)]
    context: Option<ProviderContext>,
}

/// The provider nests per-asset key/value metadata under `context.custom`.
#[derive(Deserialize, Default)]
struct ProviderContext {
    #[serde(default)]
    custom: ProviderCustomContext,
}

#[derive(Deserialize, Default)]
struct ProviderCustomContext {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    original_size: String,
}

#[derive(Deserialize)]
struct ProviderListResponse {
    resources: Vec<ProviderResource>,
}

#[derive(Deserialize)]
struct ProviderUploadResponse {
    public_id: String,
    bytes: u64,
    #[serde(default)]
    duration: f64,
    created_at: chrono::DateTime<Utc>,
}

impl ProviderResource {
    fn into_record(self) -> VideoRecord {
        let custom = self.context.unwrap_or_default().custom;
        VideoRecord {
            public_id: self.public_id,
            title: custom.title,
            description: custom.description,
            // Context values arrive as strings; an asset uploaded outside
            // this portal simply has no recorded original size.
            original_size: custom.original_size.parse().unwrap_or(0),
            compressed_size: self.bytes,
            duration: self.duration,
            created_at: self.created_at,
        }
    }
}

/// CloudinaryMediaClient
///
/// The concrete implementation talking to a Cloudinary-style media API over
/// HTTPS. Listings use the provider's resource endpoint with basic auth;
/// uploads go through the signed multipart upload endpoint, with title,
/// description and original size attached as per-asset context metadata.
#[derive(Clone)]
pub struct CloudinaryMediaClient {
    http: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryMediaClient {
    /// Constructs the client using credentials and configuration from AppConfig.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.media_base_url.trim_end_matches('/').to_string(),
            cloud_name: config.media_cloud_name.clone(),
            api_key: config.media_api_key.clone(),
            api_secret: config.media_api_secret.clone(),
        }
    }

    /// sign_params
    ///
    /// The provider's request signature: SHA-256 over the non-auth params
    /// sorted alphabetically and joined as a query string, with the API
    /// secret appended. Params must be pre-sorted by key.
    fn sign_params(&self, params: &[(&str, &str)]) -> String {
        let joined = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Builds the signed multipart upload form shared by video and image uploads.
    fn upload_form(&self, bytes: Vec<u8>, filename: &str, context: Option<String>) -> reqwest::multipart::Form {
        let timestamp = Utc::now().timestamp().to_string();

        // Sorted by key: context < timestamp.
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(ctx) = context.as_deref() {
            params.push(("context", ctx));
        }
        params.push(("timestamp", &timestamp));
        params.push(("signature_algorithm", "sha256"));
        params.sort_by_key(|(k, _)| *k);
        let signature = self.sign_params(&params);

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
            )
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);
        if let Some(ctx) = context {
            form = form.text("context", ctx);
        }
        form
    }
}

#[async_trait]
impl MediaBackend for CloudinaryMediaClient {
    /// list_videos
    ///
    /// GET /v1_1/{cloud}/resources/video with context metadata expanded.
    async fn list_videos(&self) -> Result<Vec<VideoRecord>, String> {
        let url = format!(
            "{}/v1_1/{}/resources/video",
            self.base_url, self.cloud_name
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("context", "true"),
                ("max_results", "100"),
                ("direction", "desc"),
            ])
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let listing: ProviderListResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(listing
            .resources
            .into_iter()
            .map(ProviderResource::into_record)
            .collect())
    }

    /// upload_video
    ///
    /// POST /v1_1/{cloud}/video/upload. The user-entered metadata rides along
    /// as context so the listing endpoint can hand it back verbatim.
    async fn upload_video(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        title: &str,
        description: &str,
        original_size: u64,
    ) -> Result<VideoRecord, String> {
        let url = format!("{}/v1_1/{}/video/upload", self.base_url, self.cloud_name);

        // Context pairs use the provider's pipe-delimited encoding.
        let context = format!(
            "title={}|description={}|original_size={}",
            title, description, original_size
        );
        let form = self.upload_form(bytes, filename, Some(context));

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let uploaded: ProviderUploadResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(VideoRecord {
            public_id: uploaded.public_id,
            title: title.to_string(),
            description: description.to_string(),
            original_size,
            compressed_size: uploaded.bytes,
            duration: uploaded.duration,
            created_at: uploaded.created_at,
        })
    }

    /// upload_image
    ///
    /// POST /v1_1/{cloud}/image/upload. Cropping and format conversion happen
    /// later, provider-side, keyed by the returned public id.
    async fn upload_image(&self, bytes: Vec<u8>, filename: &str) -> Result<String, String> {
        let url = format!("{}/v1_1/{}/image/upload", self.base_url, self.cloud_name);
        let form = self.upload_form(bytes, filename, None);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let uploaded: ProviderUploadResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(uploaded.public_id)
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockMediaBackend
///
/// A mock implementation of `MediaBackend` used exclusively for unit and
/// integration testing. Records live in memory for the lifetime of the test,
/// so upload-then-list flows can be exercised without a network connection.
#[derive(Clone, Default)]
pub struct MockMediaBackend {
    videos: Arc<Mutex<Vec<VideoRecord>>>,
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockMediaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            videos: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }

    /// Seeds the mock with pre-existing records for listing tests.
    pub fn with_videos(videos: Vec<VideoRecord>) -> Self {
        Self {
            videos: Arc::new(Mutex::new(videos)),
            should_fail: false,
        }
    }
}

#[async_trait]
impl MediaBackend for MockMediaBackend {
    async fn list_videos(&self) -> Result<Vec<VideoRecord>, String> {
        if self.should_fail {
            return Err("Mock Media Error: Simulation requested".to_string());
        }
        Ok(self.videos.lock().unwrap().clone())
    }

    async fn upload_video(
        &self,
        bytes: Vec<u8>,
        _filename: &str,
        title: &str,
        description: &str,
        original_size: u64,
    ) -> Result<VideoRecord, String> {
        if self.should_fail {
            return Err("Mock Media Error: Simulation requested".to_string());
        }
        let record = VideoRecord {
            public_id: format!("video-{}", uuid::Uuid::new_v4()),
            title: title.to_string(),
            description: description.to_string(),
            original_size,
            compressed_size: bytes.len() as u64,
            duration: 0.0,
            created_at: Utc::now(),
        };
        self.videos.lock().unwrap().insert(0, record.clone());
        Ok(record)
    }

    async fn upload_image(&self, _bytes: Vec<u8>, _filename: &str) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Media Error: Simulation requested".to_string());
        }
        Ok(format!("image-{}", uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic_and_secret_bound() {
        let client = CloudinaryMediaClient::new(&AppConfig::default());
        let params = [("context", "title=a"), ("timestamp", "1700000000")];
        let first = client.sign_params(&params);
        let second = client.sign_params(&params);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64); // hex-encoded SHA-256

        let other = CloudinaryMediaClient::new(&AppConfig {
            media_api_secret: "another-secret".to_string(),
            ..AppConfig::default()
        });
        assert_ne!(first, other.sign_params(&params));
    }

    #[tokio::test]
    async fn mock_upload_then_list_round_trips_metadata() {
        let mock = MockMediaBackend::new();
        mock.upload_video(vec![0u8; 16], "clip.mp4", "My Clip", "demo", 1024)
            .await
            .unwrap();

        let videos = mock.list_videos().await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].title, "My Clip");
        assert_eq!(videos[0].original_size, 1024);
        assert_eq!(videos[0].compressed_size, 16);
    }

    #[tokio::test]
    async fn failing_mock_surfaces_errors() {
        let mock = MockMediaBackend::new_failing();
        assert!(mock.list_videos().await.is_err());
        assert!(mock.upload_image(vec![], "x.png").await.is_err());
    }
}
