use crate::{
    media::MediaState,
    models::{ImageUploadResponse, VideoRecord, VideoUploadResponse},
};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

// --- API Handlers ---

/// get_videos
///
/// [Public API] Lists all hosted videos with their metadata, fetched fresh
/// from the Media Backend on every call. This is the one API route reachable
/// without a session, so the dashboard and the landing page can both render it.
#[utoipa::path(
    get,
    path = "/api/videos",
    responses(
        (status = 200, description = "Hosted videos, newest first", body = [VideoRecord]),
        (status = 500, description = "Media provider unavailable")
    )
)]
pub async fn get_videos(
    State(media): State<MediaState>,
) -> Result<Json<Vec<VideoRecord>>, StatusCode> {
    match media.list_videos().await {
        Ok(videos) => Ok(Json(videos)),
        Err(e) => {
            tracing::error!(error = %e, "video listing failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// upload_video
///
/// [Gated API] Accepts the video-upload form (multipart: `file`, `title`,
/// `description`, `originalSize`) and forwards it to the Media Backend, which
/// owns compression and storage. The handler itself never inspects the video
/// bytes.
#[utoipa::path(
    post,
    path = "/api/video-upload",
    responses(
        (status = 200, description = "Video accepted by the provider", body = VideoUploadResponse),
        (status = 400, description = "Missing file part"),
        (status = 500, description = "Provider rejected the upload")
    )
)]
pub async fn upload_video(
    State(media): State<MediaState>,
    mut multipart: Multipart,
) -> Result<Json<VideoUploadResponse>, StatusCode> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut title = String::new();
    let mut description = String::new();
    let mut original_size: u64 = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        // Copy the part name out before the field is consumed below.
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.mp4").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| StatusCode::BAD_REQUEST)?
                    .to_vec();
                file = Some((bytes, filename));
            }
            "title" => title = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?,
            "description" => {
                description = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?
            }
            "originalSize" => {
                original_size = field
                    .text()
                    .await
                    .map_err(|_| StatusCode::BAD_REQUEST)?
                    .parse()
                    .map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            // Unknown parts are ignored rather than rejected.
            _ => {}
        }
    }

    let Some((bytes, filename)) = file else {
        return Err(StatusCode::BAD_REQUEST);
    };

    match media
        .upload_video(bytes, &filename, &title, &description, original_size)
        .await
    {
        Ok(record) => Ok(Json(VideoUploadResponse {
            public_id: record.public_id,
        })),
        Err(e) => {
            tracing::error!(error = %e, title = %title, "video upload failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// upload_image
///
/// [Gated API] Accepts the social-share image form (multipart: `file`) and
/// forwards it to the Media Backend. The returned public id is all the client
/// needs to request provider-side crops into the social formats.
#[utoipa::path(
    post,
    path = "/api/image-upload",
    responses(
        (status = 200, description = "Image accepted by the provider", body = ImageUploadResponse),
        (status = 400, description = "Missing file part"),
        (status = 500, description = "Provider rejected the upload")
    )
)]
pub async fn upload_image(
    State(media): State<MediaState>,
    mut multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, StatusCode> {
    let mut file: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.png").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| StatusCode::BAD_REQUEST)?
                .to_vec();
            file = Some((bytes, filename));
        }
    }

    let Some((bytes, filename)) = file else {
        return Err(StatusCode::BAD_REQUEST);
    };

    match media.upload_image(bytes, &filename).await {
        Ok(public_id) => Ok(Json(ImageUploadResponse { public_id })),
        Err(e) => {
            tracing::error!(error = %e, "image upload failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
