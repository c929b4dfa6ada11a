#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use reqwest::StatusCode as HttpStatus;
use shortpixel::api::{ApiClientError, StatusCode};
use shortpixel::errors::RequestFailure;
use shortpixel::files::FileError;
use url::Url;

#[test]
fn test_request_failure_error_with_status_specific_suggestions() {
    let url = Url::parse("https://api.shortpixel.com/v2/reducer.php").unwrap();

    let unauthorized = RequestFailure::new(url.clone(), HttpStatus::UNAUTHORIZED, "bad key");
    let message = format!("{unauthorized}");
    assert!(message.contains("[E002]"));
    assert!(message.contains("401"));
    assert!(message.contains("Server response: bad key"));
    assert!(message.contains("SHORTPIXEL_API_KEY"));

    let rate_limited = RequestFailure::new(url, HttpStatus::TOO_MANY_REQUESTS, "slow down");
    let message = format!("{rate_limited}");
    assert!(message.contains("Wait a moment before retrying"));
    assert!(message.contains("reducing request frequency"));
}

#[test]
fn test_service_error_message() {
    let error = ApiClientError::Service {
        code: StatusCode::Error(-403),
        message: "Quota exceeded".to_string(),
    };
    let message = format!("{error}");

    assert!(message.contains("[E003]"));
    assert!(message.contains("Error(-403)"));
    assert!(message.contains("Quota exceeded"));
    assert!(message.contains("credits left"));
    assert_eq!(error.error_code(), "E003");
}

#[test]
fn test_reserved_option_message() {
    let error = ApiClientError::ReservedOption("lossy".to_string());
    let message = format!("{error}");

    assert!(message.contains("[E006]"));
    assert!(message.contains("'lossy'"));
    assert!(message.contains("dedicated field"));
}

#[test]
fn test_error_codes_are_distinct() {
    let url = Url::parse("ftp://example.com").unwrap();
    let errors = vec![
        ApiClientError::InvalidEndpoint(url.clone()),
        ApiClientError::Failure(RequestFailure::new(
            Url::parse("https://example.com").unwrap(),
            HttpStatus::BAD_REQUEST,
            "",
        )),
        ApiClientError::Service {
            code: StatusCode::Error(-1),
            message: String::new(),
        },
        ApiClientError::UnexpectedResponse("null".to_string()),
        ApiClientError::EmptyResponse("http://x/a.jpg".to_string()),
        ApiClientError::ReservedOption("key".to_string()),
        ApiClientError::Cancelled,
    ];

    let codes: Vec<&str> = errors.iter().map(ApiClientError::error_code).collect();
    assert_eq!(
        codes,
        vec!["E001", "E002", "E003", "E004", "E005", "E006", "E007"]
    );
}

#[test]
fn test_file_errors_carry_their_codes() {
    let not_dir = ApiClientError::from(FileError::NotADirectory(PathBuf::from("/tmp/x.jpg")));
    assert_eq!(not_dir.error_code(), "E010");
    assert!(format!("{not_dir}").contains("/tmp/x.jpg is not a directory"));

    let no_name = FileError::MissingFileName(PathBuf::from("/"));
    assert_eq!(no_name.error_code(), "E011");
    assert!(format!("{no_name}").contains("[E011]"));

    let onto_itself =
        ApiClientError::from(FileError::BackupIsSource(PathBuf::from("/img/a.jpg")));
    assert_eq!(onto_itself.error_code(), "E014");
    assert!(format!("{onto_itself}").contains("/img/a.jpg would overwrite the file itself"));
}

#[test]
fn test_cancelled_message() {
    assert_eq!(
        format!("{}", ApiClientError::Cancelled),
        "[E007] Polling was cancelled"
    );
}
