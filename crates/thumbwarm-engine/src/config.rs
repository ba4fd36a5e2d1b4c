//! Engine and backend configuration.

/// Default cap on concurrent backend calls.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Warm-up engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of backend calls outstanding at once.
    pub max_in_flight: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// HTTP backend configuration.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Site root that serves the `/thumbs` route.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// File name of the image served when a source is missing.
    pub placeholder_file: String,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            timeout_secs: 30,
            placeholder_file: "default.png".to_string(),
        }
    }
}
