use crate::AppState;
use axum::{Router, response::Html, routing::get};

/// Pages Router Module
///
/// Defines the HTML surface of the portal. Every page is a thin form or
/// listing over the API routes; all heavy lifting (auth session management,
/// transcoding, cropping) belongs to the external providers. Which of these
/// pages a caller may see is decided by the gate layered over the router,
/// driven by the public-page table.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Public landing page with sign-in/sign-up calls to action.
        .route("/", get(landing))
        // GET /sign-in, GET /sign-up
        // The Identity Provider's hosted widgets mount here. Signed-in users
        // never see these: the gate bounces them to /home.
        .route("/sign-in", get(sign_in))
        .route("/sign-up", get(sign_up))
        // GET /home
        // The dashboard: renders the video listing fetched from /api/videos.
        .route("/home", get(home))
        // GET /video-upload
        // Gated upload form posting to /api/video-upload.
        .route("/video-upload", get(video_upload))
        // GET /social-share
        // Gated image form posting to /api/image-upload, with provider-side
        // crop format pickers.
        .route("/social-share", get(social_share))
}

async fn landing() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html><head><title>Xform</title></head>
<body>
  <h1>Welcome to Xform</h1>
  <p>Upload and share videos with cloud-based processing.</p>
  <nav><a href="/sign-in">Sign In</a> <a href="/sign-up">Sign Up</a></nav>
</body></html>"#,
    )
}

async fn sign_in() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html><head><title>Sign In - Xform</title></head>
<body><h1>Sign In</h1><div id="identity-widget" data-mode="sign-in"></div></body></html>"#,
    )
}

async fn sign_up() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html><head><title>Sign Up - Xform</title></head>
<body><h1>Sign Up</h1><div id="identity-widget" data-mode="sign-up"></div></body></html>"#,
    )
}

async fn home() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html><head><title>Home - Xform</title></head>
<body>
  <h1>Your Videos</h1>
  <div id="video-list" data-source="/api/videos"></div>
  <nav><a href="/video-upload">Upload Video</a> <a href="/social-share">Social Share</a></nav>
</body></html>"#,
    )
}

async fn video_upload() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html><head><title>Video Upload - Xform</title></head>
<body>
  <h1>Upload Video</h1>
  <form action="/api/video-upload" method="post" enctype="multipart/form-data">
    <input type="text" name="title" placeholder="Title" required>
    <textarea name="description" placeholder="Description"></textarea>
    <input type="hidden" name="originalSize" value="0">
    <input type="file" name="file" accept="video/*" required>
    <button type="submit">Upload</button>
  </form>
</body></html>"#,
    )
}

async fn social_share() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html><head><title>Social Share - Xform</title></head>
<body>
  <h1>Social Media Image Creator</h1>
  <form action="/api/image-upload" method="post" enctype="multipart/form-data">
    <input type="file" name="file" accept="image/*" required>
    <button type="submit">Upload</button>
  </form>
  <select id="format">
    <option>Instagram Square (1:1)</option>
    <option>Instagram Portrait (4:5)</option>
    <option>Twitter Post (16:9)</option>
    <option>Twitter Header (3:1)</option>
    <option>Facebook Cover (205:78)</option>
  </select>
  <div id="preview"></div>
</body></html>"#,
    )
}
