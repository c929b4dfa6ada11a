use std::{fmt, time::Duration};

use url::Url;

use crate::api::ApiClientError;

pub const DEFAULT_PLUGIN_VERSION: &str = "RSSDK";
pub const DEFAULT_BASE_URL: &str = "https://api.shortpixel.com";
const DEFAULT_REDUCER_URL: &str = "https://api.shortpixel.com/v2/reducer.php";
const DEFAULT_POST_REDUCER_URL: &str = "https://api.shortpixel.com/v2/post-reducer.php";

const REDUCER_PATH: [&str; 2] = ["v2", "reducer.php"];
const POST_REDUCER_PATH: [&str; 2] = ["v2", "post-reducer.php"];

/// API key and client version tag sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    plugin_version: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            plugin_version: DEFAULT_PLUGIN_VERSION.to_owned(),
        }
    }

    #[must_use]
    pub fn with_plugin_version(mut self, plugin_version: impl Into<String>) -> Self {
        self.plugin_version = plugin_version.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn plugin_version(&self) -> &str {
        &self.plugin_version
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("plugin_version", &self.plugin_version)
            .finish()
    }
}

/// The two service endpoints: JSON URL submission and multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub reducer: Url,
    pub post_reducer: Url,
}

impl Endpoints {
    /// # Errors
    ///
    /// Fails unless both URLs use `http` or `https`.
    pub fn new(reducer: Url, post_reducer: Url) -> Result<Self, ApiClientError> {
        for url in [&reducer, &post_reducer] {
            if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                return Err(ApiClientError::InvalidEndpoint(url.clone()));
            }
        }
        Ok(Self {
            reducer,
            post_reducer,
        })
    }

    /// Derives both endpoints from a base URL, appending `v2/reducer.php`
    /// and `v2/post-reducer.php` to its path.
    ///
    /// # Errors
    ///
    /// Fails if `base` cannot be a base or is not `http`/`https`.
    pub fn from_base(base: &Url) -> Result<Self, ApiClientError> {
        Self::new(join(base, &REDUCER_PATH)?, join(base, &POST_REDUCER_PATH)?)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            reducer: Url::parse(DEFAULT_REDUCER_URL).expect("default reducer URL is valid"),
            post_reducer: Url::parse(DEFAULT_POST_REDUCER_URL)
                .expect("default post-reducer URL is valid"),
        }
    }
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, ApiClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiClientError::InvalidEndpoint(base.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Everything an [`crate::api::ApiClient`] needs.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    /// Client-side HTTP timeout. `None` leaves waiting to the server-side
    /// `wait` option.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: Endpoints::default(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
