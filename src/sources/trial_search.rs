use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::entities::query::{QueryParameters, STATUS_BAD_REQUEST, STATUS_OK};
use crate::entities::trial::{TrialRecord, TrialSearchResponse};
use crate::error::TrialCheckError;
use crate::validation::schema::json_type_name;
use crate::validation::{Rule, Violation};

const TRIAL_SEARCH_API: &str = "trial-search";
const BODY_FIELD: &str = "<body>";

/// Status and decoded body of one search call, success or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub status: u16,
    pub body: Value,
}

impl SearchResponse {
    /// The body as trial records.
    ///
    /// # Errors
    ///
    /// Returns a response-shape violation unless the body is a JSON array whose
    /// elements are all objects.
    pub fn records(&self) -> Result<TrialSearchResponse, Violation> {
        let Value::Array(items) = &self.body else {
            return Err(shape_violation(
                None,
                format!(
                    "expected a JSON array of trials, got {}",
                    json_type_name(&self.body)
                ),
            ));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(TrialRecord::new(map.clone())),
                other => Err(shape_violation(
                    Some(i),
                    format!("expected a trial object, got {}", json_type_name(other)),
                )),
            })
            .collect()
    }
}

fn shape_violation(record: Option<usize>, detail: String) -> Violation {
    Violation::ContractViolation {
        record,
        field: BODY_FIELD.to_string(),
        rule: Rule::ResponseShape,
        detail,
    }
}

/// Anything that can answer a ZIP/radius trial search.
#[async_trait]
pub trait TrialSearchClient: Send + Sync {
    async fn search(&self, query: &QueryParameters) -> Result<SearchResponse, TrialCheckError>;

    /// Short label for reports and logs.
    fn describe(&self) -> String;
}

/// Sends `GET <endpoint>?zip5_code=..&radius_in_miles=..` to a live service.
#[derive(Clone)]
pub struct HttpTrialSearchClient {
    client: reqwest::Client,
    url: String,
}

impl HttpTrialSearchClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, TrialCheckError> {
        Self::with_url(config.trial_search_url())
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, TrialCheckError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            url: url.into(),
        })
    }
}

fn decode_body(status: reqwest::StatusCode, bytes: &[u8]) -> Result<Value, TrialCheckError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(source) if status.is_success() => Err(TrialCheckError::ApiJson {
            api: TRIAL_SEARCH_API.to_string(),
            source,
        }),
        // Error pages are often plain text; keep them for the report.
        Err(_) => Ok(Value::String(crate::sources::body_excerpt(bytes))),
    }
}

#[async_trait]
impl TrialSearchClient for HttpTrialSearchClient {
    async fn search(&self, query: &QueryParameters) -> Result<SearchResponse, TrialCheckError> {
        let radius = query.radius_in_miles.to_string();
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("zip5_code", query.zip5_code.as_str()),
                ("radius_in_miles", radius.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let bytes = crate::sources::read_limited_body(resp, TRIAL_SEARCH_API).await?;
        debug!(
            zip5_code = %query.zip5_code,
            radius_in_miles = query.radius_in_miles,
            status = status.as_u16(),
            bytes = bytes.len(),
            "trial search answered"
        );
        Ok(SearchResponse {
            status: status.as_u16(),
            body: decode_body(status, &bytes)?,
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Answers every valid query with the same immutable dataset and rejects
/// invalid queries with 400, the way the live service does.
#[derive(Debug, Clone)]
pub struct FixtureTrialSearchClient {
    dataset: Arc<Vec<Value>>,
}

impl FixtureTrialSearchClient {
    pub fn new(dataset: Vec<Value>) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    pub fn from_records(records: Vec<TrialRecord>) -> Self {
        Self::new(records.into_iter().map(TrialRecord::into_value).collect())
    }

    /// Client serving the bundled two-trial Chicago dataset.
    pub fn chicago() -> Result<Self, TrialCheckError> {
        Ok(Self::from_records(crate::fixtures::chicago_trial_records()?))
    }
}

#[async_trait]
impl TrialSearchClient for FixtureTrialSearchClient {
    async fn search(&self, query: &QueryParameters) -> Result<SearchResponse, TrialCheckError> {
        if let Some(reason) = query.invalid_reason() {
            return Ok(SearchResponse {
                status: STATUS_BAD_REQUEST,
                body: json!({ "detail": reason }),
            });
        }
        Ok(SearchResponse {
            status: STATUS_OK,
            body: Value::Array(self.dataset.to_vec()),
        })
    }

    fn describe(&self) -> String {
        format!("fixture ({} trials)", self.dataset.len())
    }
}
