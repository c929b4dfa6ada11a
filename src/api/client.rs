use std::path::{Path, PathBuf};

use reqwest::blocking::{self, multipart, Client, Response};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use url::Url;

use crate::{
    config::{ClientConfig, Credentials, Endpoints},
    errors::RequestFailure,
    files,
    options::{form_text, OptimizeOptions},
};

use super::errors::ApiClientError;
use super::models::{FileInfo, OptimizationResult, ServiceError};

#[derive(Clone)]
pub struct ApiClient {
    credentials: Credentials,
    endpoints: Endpoints,
    client: Client,
}

/// `file_paths` form field: logical name to local path, in upload order.
struct FilePaths<'a>(&'a [FileInfo]);

impl Serialize for FilePaths<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|file| (file.name.as_str(), file.path.to_string_lossy())),
        )
    }
}

impl ApiClient {
    /// # Errors
    ///
    /// Fails if the underlying HTTP client can't be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiClientError> {
        let mut builder = blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        } else {
            // Blocking clients default to 30s, the service may hold
            // requests longer than that while `wait` runs out.
            builder = builder.timeout(None);
        }

        Ok(Self {
            credentials: config.credentials,
            endpoints: config.endpoints,
            client: builder.build()?,
        })
    }

    /// Client for the public endpoints with the default version tag.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client can't be built.
    pub fn with_key(api_key: impl Into<String>) -> Result<Self, ApiClientError> {
        Self::new(ClientConfig::new(Credentials::new(api_key)))
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn payload(&self, options: &OptimizeOptions) -> Result<Map<String, Value>, ApiClientError> {
        let mut payload = options.fields()?;
        payload.insert("key".to_owned(), Value::from(self.credentials.api_key()));
        payload.insert(
            "plugin_version".to_owned(),
            Value::from(self.credentials.plugin_version()),
        );
        Ok(payload)
    }

    /// Submits remote images for optimization.
    ///
    /// One result per URL, in submission order. With `replace_original`
    /// set nothing is replaced: there are no local files to write to.
    ///
    /// # Errors
    ///
    /// Will return `Err` on network failure, on a non-2xx answer or if the
    /// service rejects the whole request.
    pub fn submit_by_url<S: AsRef<str>>(
        &self,
        urls: &[S],
        options: &OptimizeOptions,
    ) -> Result<Vec<OptimizationResult>, ApiClientError> {
        let results = self.post_urls(urls, options)?;
        if options.replace_original {
            log::warn!("replace_original has no effect for URL submissions, no local files given");
        }
        Ok(results)
    }

    /// Re-submits one URL; this is how a pending optimization is polled.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::submit_by_url`].
    pub fn check_status(
        &self,
        url: &str,
        options: &OptimizeOptions,
    ) -> Result<Vec<OptimizationResult>, ApiClientError> {
        self.post_urls(&[url], options)
    }

    pub(super) fn post_urls<S: AsRef<str>>(
        &self,
        urls: &[S],
        options: &OptimizeOptions,
    ) -> Result<Vec<OptimizationResult>, ApiClientError> {
        let mut payload = self.payload(options)?;
        payload.insert(
            "urllist".to_owned(),
            Value::from(urls.iter().map(AsRef::as_ref).collect::<Vec<&str>>()),
        );

        let url = self.endpoints.reducer.clone();
        log::debug!("Submitting {} URL(s) to {url}", urls.len());
        let response = self
            .client
            .post(url.clone())
            .json(&payload)
            .send()
            .map_err(ApiClientError::Reqwest)?;

        parse_results(url, response)
    }

    /// Uploads local files for optimization.
    ///
    /// Each file is sent under its logical name, which the service echoes
    /// back as the result's `Key`. Files are opened just before sending and
    /// closed when the form is dropped, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Will return `Err` if a file can't be opened, on network failure or
    /// on a rejected request. With `replace_original` set, also if a
    /// replacement fails.
    pub fn submit_by_file(
        &self,
        files: &[FileInfo],
        options: &OptimizeOptions,
    ) -> Result<Vec<OptimizationResult>, ApiClientError> {
        let mut form = multipart::Form::new().percent_encode_noop();
        for (name, value) in self.payload(options)? {
            form = form.text(name, form_text(&value));
        }
        form = form.text("file_paths", serde_json::to_string(&FilePaths(files))?);

        for file in files {
            form = form.file(file.name.clone(), &file.path)?;
        }

        let url = self.endpoints.post_reducer.clone();
        log::debug!("Uploading {} file(s) to {url}", files.len());
        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .map_err(ApiClientError::Reqwest)?;

        let results = parse_results(url, response)?;
        if options.replace_original {
            self.replace_original_files(&results, files)?;
        }
        Ok(results)
    }

    /// Uploads every file directly inside `folder` in a single request.
    ///
    /// Files are keyed `file0`, `file1`, ... in file name order and copied to
    /// `backup_folder` first when one is given.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the folder can't be listed, a backup fails or
    /// the upload fails.
    pub fn optimize_folder(
        &self,
        folder: &Path,
        options: &OptimizeOptions,
        backup_folder: Option<&Path>,
    ) -> Result<Vec<OptimizationResult>, ApiClientError> {
        let files = files::folder_files(folder)?;
        if files.is_empty() {
            log::info!("No files to optimize in {}", folder.display());
            return Ok(vec![]);
        }

        if let Some(backup_folder) = backup_folder {
            files::backup_files(&files, backup_folder)?;
        }

        self.submit_by_file(&files, options)
    }

    /// Downloads the optimized image of every successful result and writes
    /// it over the local file whose logical name matches the result's key.
    ///
    /// Returns the paths that were replaced.
    ///
    /// # Errors
    ///
    /// Will return `Err` on the first failed download or write; files
    /// replaced before that keep their new contents.
    pub fn replace_original_files(
        &self,
        results: &[OptimizationResult],
        files: &[FileInfo],
    ) -> Result<Vec<PathBuf>, ApiClientError> {
        let mut replaced = vec![];
        for result in results.iter().filter(|result| result.is_success()) {
            let Some(key) = result.key() else {
                log::warn!("Skipping result without a key");
                continue;
            };
            let Some(file) = files.iter().find(|file| file.name == key) else {
                log::warn!("No local file for key {key}, skipping");
                continue;
            };
            let Some(optimized) = result.optimized_url() else {
                log::warn!("No optimized image for {}, skipping", file.path.display());
                continue;
            };

            let contents = self.download(Url::parse(optimized)?)?;
            files::replace_file(&file.path, &contents)?;
            log::info!(
                "Replaced {} with {} ({} bytes)",
                file.path.display(),
                optimized,
                contents.len()
            );
            replaced.push(file.path.clone());
        }
        Ok(replaced)
    }

    fn download(&self, url: Url) -> Result<Vec<u8>, ApiClientError> {
        let response = self.client.get(url.clone()).send()?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(ApiClientError::from(RequestFailure::new(
                url,
                status,
                response.text()?,
            )));
        }
        Ok(response.bytes()?.to_vec())
    }
}

fn parse_results(url: Url, response: Response) -> Result<Vec<OptimizationResult>, ApiClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiClientError::from(RequestFailure::new(
            url,
            status,
            response.text()?,
        )));
    }

    let response_text = response.text()?;
    log::debug!("Raw API Response: {response_text}");

    let body: Value = serde_json::from_str(&response_text).map_err(|e| {
        log::error!("Failed to parse JSON response: {e}");
        log::error!("Response text: {response_text}");
        ApiClientError::from(e)
    })?;

    match body {
        Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
        Value::Object(object) if object.contains_key("Status") => {
            let ServiceError { status } = serde_json::from_value(Value::Object(object))?;
            Err(ApiClientError::Service {
                code: status.code,
                message: status.message.unwrap_or_default(),
            })
        }
        other => Err(ApiClientError::UnexpectedResponse(other.to_string())),
    }
}
