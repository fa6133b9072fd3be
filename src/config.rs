use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::TrialCheckError;

/// Path suffix appended to the configured `API_URL.endpoint`.
pub const TRIAL_SEARCH_RESOURCE: &str = "/trial_search";

pub const DEFAULT_CONFIG_PATH: &str = "properties.toml";
pub const CONFIG_PATH_ENV: &str = "TRIALCHECK_CONFIG";
pub const API_BASE_ENV: &str = "TRIALCHECK_API_BASE";

#[derive(Debug, Deserialize)]
struct PropertiesFile {
    #[serde(rename = "API_URL")]
    api_url: Option<ApiUrlSection>,
}

#[derive(Debug, Deserialize)]
struct ApiUrlSection {
    endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    endpoint_base: String,
}

impl ServiceConfig {
    pub fn new(endpoint_base: impl Into<String>) -> Self {
        Self {
            endpoint_base: endpoint_base.into(),
        }
    }

    /// Resolves the configuration the way the CLI does: `TRIALCHECK_API_BASE`
    /// wins, then an explicit path, then `TRIALCHECK_CONFIG`, then
    /// `properties.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the chosen properties file is unreadable or lacks
    /// a non-empty `API_URL.endpoint`.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, TrialCheckError> {
        resolve_with(
            explicit,
            std::env::var(API_BASE_ENV).ok(),
            std::env::var(CONFIG_PATH_ENV).ok(),
        )
    }

    /// Reads `[API_URL] endpoint` from a TOML properties file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, or when the
    /// endpoint is missing or blank.
    pub fn load(path: &Path) -> Result<Self, TrialCheckError> {
        let raw = std::fs::read_to_string(path).map_err(|err| TrialCheckError::Config {
            path: path.to_path_buf(),
            message: format!("cannot read properties file: {err}"),
        })?;
        Self::from_toml_str(&raw, path)
    }

    fn from_toml_str(raw: &str, path: &Path) -> Result<Self, TrialCheckError> {
        let parsed: PropertiesFile = toml::from_str(raw).map_err(|err| TrialCheckError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let section = parsed.api_url.ok_or_else(|| TrialCheckError::Config {
            path: path.to_path_buf(),
            message: "missing [API_URL] section".into(),
        })?;
        let endpoint = section
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TrialCheckError::Config {
                path: path.to_path_buf(),
                message: "API_URL.endpoint must be a non-empty URL".into(),
            })?;
        Ok(Self::new(endpoint))
    }

    pub fn endpoint_base(&self) -> &str {
        &self.endpoint_base
    }

    /// Full search endpoint: base URL plus [`TRIAL_SEARCH_RESOURCE`].
    pub fn trial_search_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint_base().trim_end_matches('/'),
            TRIAL_SEARCH_RESOURCE.trim_start_matches('/')
        )
    }
}

fn resolve_with(
    explicit: Option<&Path>,
    api_base_override: Option<String>,
    config_env: Option<String>,
) -> Result<ServiceConfig, TrialCheckError> {
    if let Some(base) = api_base_override
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        debug!(base, "using {API_BASE_ENV} override");
        return Ok(ServiceConfig::new(base));
    }

    let path = explicit.map(Path::to_path_buf).unwrap_or_else(|| {
        config_env
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    });
    debug!(path = %path.display(), "loading service config");
    ServiceConfig::load(&path)
}
