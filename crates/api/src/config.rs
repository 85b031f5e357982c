use std::path::PathBuf;

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
    /// Size cap of the fixed per-session workset.
    pub images_per_session: usize,
    /// Combined dataset index: a JSON array of image records.
    pub pool_index_path: PathBuf,
    /// Root of the merged image tree (`gazefollow/` and `vat/` subtrees).
    pub merged_root: PathBuf,
    /// Durable annotation store document.
    pub annotations_path: PathBuf,
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
    /// | `IMAGES_PER_SESSION`   | `500`                           |
    /// | `POOL_INDEX_PATH`      | `combined_gazefollow_vat.json`  |
    /// | `MERGED_ROOT`          | `merged_images`                 |
    /// | `ANNOTATIONS_PATH`     | `annotations.json`              |
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

        let images_per_session: usize = std::env::var("IMAGES_PER_SESSION")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("IMAGES_PER_SESSION must be a valid usize");

        let pool_index_path = std::env::var("POOL_INDEX_PATH")
            .unwrap_or_else(|_| "combined_gazefollow_vat.json".into())
            .into();

        let merged_root = std::env::var("MERGED_ROOT")
            .unwrap_or_else(|_| "merged_images".into())
            .into();

        let annotations_path = std::env::var("ANNOTATIONS_PATH")
            .unwrap_or_else(|_| "annotations.json".into())
            .into();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            images_per_session,
            pool_index_path,
            merged_root,
            annotations_path,
        }
    }
}
