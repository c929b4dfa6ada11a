use reqwest::StatusCode;
use std::fmt::{self, Formatter};
use thiserror::Error;
use url::Url;

/// Non-2xx answer from the service or from an optimized image download.
#[derive(Debug, Error)]
pub struct RequestFailure {
    pub url: Url,
    pub status: StatusCode,
    pub msg: String,
}

impl RequestFailure {
    pub fn new(url: Url, status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            url,
            status,
            msg: msg.into(),
        }
    }

    pub const fn error_code(&self) -> &'static str {
        "E002"
    }

    fn suggestions(&self) -> Vec<&'static str> {
        match self.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => vec![
                "Check that the API key is correct",
                "Set the key with --api-key or SHORTPIXEL_API_KEY",
            ],
            StatusCode::NOT_FOUND => vec![
                "Check that the URL is correct",
                "Optimized images expire after a while, resubmit the image",
            ],
            StatusCode::PAYLOAD_TOO_LARGE => vec![
                "Upload fewer files per request",
                "Submit large images by URL instead",
            ],
            StatusCode::TOO_MANY_REQUESTS => vec![
                "Wait a moment before retrying",
                "Consider reducing request frequency",
            ],
            status if status.is_server_error() => vec![
                "The service is having trouble, try again later",
            ],
            _ => vec!["Check the request options and try again"],
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        writeln!(
            formatter,
            "[{}] Request to {} failed with status {}",
            self.error_code(),
            self.url,
            self.status
        )?;
        if !self.msg.is_empty() {
            writeln!(formatter, "Server response: {}", self.msg)?;
        }
        write!(formatter, "\nSuggestions:")?;
        for suggestion in self.suggestions() {
            write!(formatter, "\n  • {suggestion}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_contains_status_and_body() {
        let url = Url::parse("https://api.example.com/v2/reducer.php").unwrap();
        let failure = RequestFailure::new(url, StatusCode::NOT_FOUND, "gone");
        let message = failure.to_string();

        assert!(message.contains("[E002]"));
        assert!(message.contains("404"));
        assert!(message.contains("Server response: gone"));
        assert!(message.contains("Check that the URL is correct"));
    }

    #[test]
    fn empty_body_is_omitted() {
        let url = Url::parse("https://api.example.com/").unwrap();
        let failure = RequestFailure::new(url, StatusCode::BAD_GATEWAY, "");
        let message = failure.to_string();

        assert!(!message.contains("Server response"));
        assert!(message.contains("try again later"));
    }
}
