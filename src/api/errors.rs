use thiserror::Error;
use url::Url;

use crate::{errors::RequestFailure, files::FileError};

use super::types::StatusCode;

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("[E001] Invalid endpoint URL: {0}\n\nSuggestions:\n  • Provide a valid HTTP or HTTPS URL\n  • Example: https://api.shortpixel.com")]
    InvalidEndpoint(Url),

    #[error(transparent)]
    Failure(#[from] RequestFailure),

    #[error("[E003] Service rejected the request with code {code}: {message}\n\nSuggestions:\n  • Check that the API key is valid and has credits left\n  • Verify the submitted URLs are publicly reachable")]
    Service { code: StatusCode, message: String },

    #[error("[E004] Unexpected response from service: {0}")]
    UnexpectedResponse(String),

    #[error("[E005] Service returned no result for {0}")]
    EmptyResponse(String),

    #[error("[E006] Extra option '{0}' collides with a recognized option\n\nSuggestions:\n  • Set the option through its dedicated field instead")]
    ReservedOption(String),

    #[error("[E007] Polling was cancelled")]
    Cancelled,

    #[error(transparent)]
    Files(#[from] FileError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("[E001] Invalid URL format: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl ApiClientError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint(_) | Self::UrlParse(_) => "E001",
            Self::Failure(f) => f.error_code(),
            Self::Service { .. } => "E003",
            Self::UnexpectedResponse(_) => "E004",
            Self::EmptyResponse(_) => "E005",
            Self::ReservedOption(_) => "E006",
            Self::Cancelled => "E007",
            Self::Files(e) => e.error_code(),
            Self::Reqwest(_) | Self::Json(_) | Self::IoError(_) => "E999",
        }
    }
}
