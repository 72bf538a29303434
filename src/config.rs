use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring consistency across all threads and services
/// (e.g., Identity verification, Media provider client). It is pulled into the
/// application state via FromRef, embodying the "immutable AppConfig" part of the
/// Unified State Pattern.
#[derive(Clone)]
pub struct AppConfig {
    // Shared secret used to verify the Identity Provider's session tokens (HS256).
    pub session_secret: String,
    // Name of the cookie carrying the session token.
    pub session_cookie: String,
    // Media provider account identifier (the "cloud name" path segment of its REST API).
    pub media_cloud_name: String,
    // API key presented to the media provider on every signed request.
    pub media_api_key: String,
    // API secret used for request signing and listing auth. Never logged.
    pub media_api_secret: String,
    // Base URL of the media provider's REST API. Overridable so local setups can point at a stub.
    pub media_base_url: String,
    // Runtime environment marker. Controls feature activation (e.g., Dev Bypass).
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between development utilities
/// (pretty logs, identity bypass header) and hardened production behavior
/// (JSON logs, mandatory secrets).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows us to instantiate the configuration without needing to set environment
    /// variables for lightweight unit or integration testing state scaffolding.
    fn default() -> Self {
        // Provide safe, non-panicking dummy values for test state setup
        Self {
            session_secret: "super-secure-test-secret-value-local".to_string(),
            session_cookie: "__session".to_string(),
            media_cloud_name: "xform-test".to_string(),
            media_api_key: "test-key".to_string(),
            media_api_secret: "test-secret".to_string(),
            media_base_url: "http://localhost:9000".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at startup.
    /// It reads all parameters from environment variables and implements the **fail-fast** principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current runtime environment
    /// (especially Production) is not found. This prevents the application from starting
    /// with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // Session Secret Resolution
        // The production secret is mandatory and must be explicitly set.
        let session_secret = match env {
            Env::Production => env::var("SESSION_JWT_SECRET")
                .expect("FATAL: SESSION_JWT_SECRET must be set in production."),
            // In local, we provide a fallback, though the developer should ideally use the actual secret.
            _ => env::var("SESSION_JWT_SECRET")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        let session_cookie =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "__session".to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                session_secret,
                session_cookie,
                // Local development defaults to a stubbed media provider endpoint;
                // the real one can still be opted into via MEDIA_BASE_URL.
                media_cloud_name: env::var("MEDIA_CLOUD_NAME")
                    .unwrap_or_else(|_| "xform-dev".to_string()),
                media_api_key: env::var("MEDIA_API_KEY").unwrap_or_else(|_| "dev-key".to_string()),
                media_api_secret: env::var("MEDIA_API_SECRET")
                    .unwrap_or_else(|_| "dev-secret".to_string()),
                media_base_url: env::var("MEDIA_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            },
            Env::Production => {
                // Production environment demands explicit setting of all provider secrets.
                Self {
                    env: Env::Production,
                    session_secret,
                    session_cookie,
                    media_cloud_name: env::var("MEDIA_CLOUD_NAME")
                        .expect("FATAL: MEDIA_CLOUD_NAME required in prod"),
                    media_api_key: env::var("MEDIA_API_KEY")
                        .expect("FATAL: MEDIA_API_KEY required in prod"),
                    media_api_secret: env::var("MEDIA_API_SECRET")
                        .expect("FATAL: MEDIA_API_SECRET required in prod"),
                    media_base_url: env::var("MEDIA_BASE_URL")
                        .unwrap_or_else(|_| "https://api.cloudinary.com".to_string()),
                }
            }
        }
    }
}
