use super::types::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Request-level failure body, e.g. an invalid API key.
#[derive(Debug, Deserialize)]
pub struct ServiceError {
    #[serde(rename = "Status")]
    pub status: ResultStatus,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResultStatus {
    #[serde(rename = "Code")]
    pub code: StatusCode,
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the service's response array.
///
/// Fields the client does not use are kept verbatim in `extra`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OptimizationResult {
    #[serde(rename = "Status")]
    pub status: ResultStatus,
    #[serde(rename = "OriginalURL", default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(rename = "LossyURL", default, skip_serializing_if = "Option::is_none")]
    pub lossy_url: Option<String>,
    #[serde(rename = "LosslessURL", default, skip_serializing_if = "Option::is_none")]
    pub lossless_url: Option<String>,
    #[serde(rename = "WebPLossyURL", default, skip_serializing_if = "Option::is_none")]
    pub webp_lossy_url: Option<String>,
    #[serde(rename = "WebPLosslessURL", default, skip_serializing_if = "Option::is_none")]
    pub webp_lossless_url: Option<String>,
    #[serde(rename = "Key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OptimizationResult {
    pub const fn code(&self) -> StatusCode {
        self.status.code
    }

    pub const fn is_pending(&self) -> bool {
        self.status.code.is_pending()
    }

    pub const fn is_success(&self) -> bool {
        self.status.code.is_success()
    }

    pub fn message(&self) -> Option<&str> {
        self.status.message.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Lossy variant when present, lossless otherwise.
    ///
    /// The service sends `"NA"` or an empty string for variants it did
    /// not produce.
    pub fn optimized_url(&self) -> Option<&str> {
        [self.lossy_url.as_deref(), self.lossless_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.is_empty() && *url != "NA")
    }
}

/// A local file submitted for upload under a logical name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}
