use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// One attribute rejected by the API, with every message it returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Error body carried per-attribute messages under `errors`.
    #[error("api error ({status}): {message}")]
    Validation {
        status: u16,
        message: String,
        failures: Vec<ValidationFailure>,
    },
    #[error("api error ({status}): {message}")]
    Generic { status: u16, message: String },
    /// A value could not be placed into the request path as a single segment.
    #[error("invalid request path: {0}")]
    InvalidPath(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/*──────── error body ────────*/

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

/// Turn a non-2xx response body into an [`ApiError`].
///
/// Bodies that are not JSON fall back to the status' canonical reason.
pub(crate) fn decode_error(status: reqwest::StatusCode, body: &[u8]) -> ApiError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned());

    if parsed.errors.is_empty() {
        return ApiError::Generic {
            status: status.as_u16(),
            message,
        };
    }

    // BTreeMap keeps fields sorted
    let failures = parsed
        .errors
        .into_iter()
        .map(|(field, messages)| ValidationFailure { field, messages })
        .collect();
    ApiError::Validation {
        status: status.as_u16(),
        message,
        failures,
    }
}
