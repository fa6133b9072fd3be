use std::sync::OnceLock;
use std::time::Duration;

use crate::error::TrialCheckError;

pub mod trial_library;
pub mod trial_search;

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
const BODY_EXCERPT_CHARS: usize = 200;

/// Process-wide HTTP client. No retry or cache layer: every request is sent once.
pub(crate) fn shared_client() -> Result<reqwest::Client, TrialCheckError> {
    static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("trialcheck/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(TrialCheckError::HttpClientInit)?;

    match HTTP_CLIENT.set(client.clone()) {
        Ok(()) => Ok(client),
        Err(_) => HTTP_CLIENT
            .get()
            .cloned()
            .ok_or_else(|| TrialCheckError::Api {
                api: "http".into(),
                message: "HTTP client initialization race".into(),
            }),
    }
}

fn body_too_large(api: &str, limit: usize) -> TrialCheckError {
    TrialCheckError::Api {
        api: api.to_string(),
        message: format!("Response body exceeds {limit} bytes"),
    }
}

fn append_within_limit(
    body: &mut Vec<u8>,
    chunk: &[u8],
    limit: usize,
    api: &str,
) -> Result<(), TrialCheckError> {
    match body.len().checked_add(chunk.len()) {
        Some(total) if total <= limit => {
            body.extend_from_slice(chunk);
            Ok(())
        }
        _ => Err(body_too_large(api, limit)),
    }
}

pub(crate) async fn read_limited_body(
    resp: reqwest::Response,
    api: &str,
) -> Result<Vec<u8>, TrialCheckError> {
    read_body_with_limit(resp, api, MAX_BODY_BYTES).await
}

/// Reads the body chunk by chunk and stops as soon as `limit` is passed, so a
/// response without `Content-Length` is never buffered beyond the cap.
async fn read_body_with_limit(
    mut resp: reqwest::Response,
    api: &str,
    limit: usize,
) -> Result<Vec<u8>, TrialCheckError> {
    if resp.content_length().is_some_and(|len| len > limit as u64) {
        return Err(body_too_large(api, limit));
    }
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        append_within_limit(&mut body, &chunk, limit, api)?;
    }
    Ok(body)
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.chars().count() <= BODY_EXCERPT_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(BODY_EXCERPT_CHARS).collect();
    out.push('…');
    out
}
