use std::path::PathBuf;

/// Client configuration loaded from environment variables.
///
/// The base URL is the only required setting; everything else has
/// defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Admission API base URL, without a trailing slash.
    pub base_url: String,
    /// Where the session JSON file lives.
    pub session_path: PathBuf,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Required | Default                  |
    /// |------------------------|----------|--------------------------|
    /// | `API_BASE_URL`         | **yes**  | --                       |
    /// | `SESSION_PATH`         | no       | `.matric/session.json`   |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`                     |
    ///
    /// # Panics
    ///
    /// Panics if `API_BASE_URL` is not set or is empty.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("API_BASE_URL").expect("API_BASE_URL must be set in the environment");
        assert!(!base_url.is_empty(), "API_BASE_URL must not be empty");
        let base_url = base_url.trim_end_matches('/').to_string();

        let session_path: PathBuf = std::env::var("SESSION_PATH")
            .unwrap_or_else(|_| ".matric/session.json".into())
            .into();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            session_path,
            request_timeout_secs,
        }
    }
}
