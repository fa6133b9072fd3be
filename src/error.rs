use std::path::PathBuf;

/// Errors raised while talking to the trial-search service or preparing a run.
///
/// Contract failures found in a response are not errors of this type; they are
/// reported as [`crate::validation::Violation`] values.
#[derive(Debug, thiserror::Error)]
pub enum TrialCheckError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{api} API error: {message}")]
    Api { api: String, message: String },

    #[error("{api} returned invalid JSON: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
