#![allow(dead_code)]

use std::{fs, path::Path, path::PathBuf, time::Duration};

use mockito::{Mock, Server};
use shortpixel::{
    api::{ApiClient, PollPolicy},
    config::{ClientConfig, Credentials, Endpoints},
};
use url::Url;

pub const API_KEY: &str = "test-key";
pub const PLUGIN_VERSION: &str = "TEST1";
pub const REDUCER: &str = "/v2/reducer.php";
pub const POST_REDUCER: &str = "/v2/post-reducer.php";

pub fn client_for(server: &Server) -> ApiClient {
    let base = Url::parse(&server.url()).unwrap();
    let config = ClientConfig::new(Credentials::new(API_KEY).with_plugin_version(PLUGIN_VERSION))
        .with_endpoints(Endpoints::from_base(&base).unwrap())
        .with_timeout(Duration::from_secs(10));
    ApiClient::new(config).unwrap()
}

/// Polls without real waiting.
pub fn quick_policy(max_checks: usize) -> PollPolicy {
    PollPolicy {
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
        factor: 1.0,
        max_checks,
        timeout: Duration::from_secs(30),
    }
}

pub fn reducer_mock(server: &mut Server, body: &str) -> Mock {
    server
        .mock("POST", REDUCER)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
}

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
