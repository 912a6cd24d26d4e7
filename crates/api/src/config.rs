use std::path::PathBuf;

use lacquer_core::catalog::query::{PageSize, DEFAULT_PAGE_SIZE};
use lacquer_core::image::DEFAULT_MAX_UPLOAD_BYTES;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Cookie whose presence marks an authenticated session.
    pub auth_cookie_name: String,
    /// Directory uploaded images are written to.
    pub image_dir: PathBuf,
    /// Public URL prefix stored images are served under.
    pub image_public_url: String,
    /// Page size of the paginated polish listing.
    pub admin_page_size: i64,
    /// Largest accepted image upload or remote download, in bytes.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                         |
    /// |------------------------|---------------------------------|
    /// | `HOST`                 | `0.0.0.0`                       |
    /// | `PORT`                 | `3000`                          |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                            |
    /// | `AUTH_COOKIE_NAME`     | `lacquer_session`               |
    /// | `IMAGE_DIR`            | `storage/images`                |
    /// | `IMAGE_PUBLIC_URL`     | `http://localhost:3000/images`  |
    /// | `ADMIN_PAGE_SIZE`      | `10`                            |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let auth_cookie_name =
            std::env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| "lacquer_session".into());

        let image_dir = PathBuf::from(
            std::env::var("IMAGE_DIR").unwrap_or_else(|_| "storage/images".into()),
        );

        let image_public_url = std::env::var("IMAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}/images"));

        let admin_page_size: i64 = std::env::var("ADMIN_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .expect("ADMIN_PAGE_SIZE must be a valid i64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            auth_cookie_name,
            image_dir,
            image_public_url,
            admin_page_size,
            max_upload_bytes,
        }
    }

    /// Page size for the paginated listing, clamped to the allowed range.
    pub fn admin_page_size(&self) -> PageSize {
        PageSize::limited(self.admin_page_size)
    }
}
