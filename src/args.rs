use std::{path::PathBuf, time::Duration};

use serde_json::Value;
use url::Url;

use shortpixel::{
    api::{ApiClientError, Compression, PollPolicy, ResizeMode},
    config::{ClientConfig, Credentials, Endpoints, DEFAULT_BASE_URL, DEFAULT_PLUGIN_VERSION},
    options::OptimizeOptions,
};

#[derive(clap::Parser)]
#[command(name = "shortpixel")]
#[command(version)]
#[command(about = "Optimize images with the ShortPixel API")]
#[command(long_about = "
Submits images to the ShortPixel optimization API, by URL or by uploading local
files, and prints the service's results as JSON.

Examples:
  # Optimize a remote image and wait for the result
  shortpixel --api-key KEY batch --wait 10 https://example.com/photo.jpg

  # Upload a folder, keep copies of the originals, overwrite with results
  shortpixel folder ./images --backup ./images-backup --replace-original

  # Check on a pending image
  shortpixel status https://example.com/photo.jpg
")]
pub struct Args {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args)]
pub struct ConnectionArgs {
    /// ShortPixel API key
    #[arg(long, env = "SHORTPIXEL_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Client version tag reported to the service
    #[arg(long, env = "SHORTPIXEL_PLUGIN_VERSION", default_value = DEFAULT_PLUGIN_VERSION)]
    pub plugin_version: String,

    /// API base URL
    #[arg(
        long = "url",
        env = "SHORTPIXEL_API_URL",
        value_hint = clap::ValueHint::Url,
        value_parser = Url::parse,
        default_value = DEFAULT_BASE_URL
    )]
    pub base_url: Url,

    /// HTTP timeout in seconds (default: none)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    pub fn config(&self) -> Result<ClientConfig, ApiClientError> {
        let credentials =
            Credentials::new(self.api_key.clone()).with_plugin_version(self.plugin_version.clone());
        let config =
            ClientConfig::new(credentials).with_endpoints(Endpoints::from_base(&self.base_url)?);

        Ok(match self.timeout {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Submit remote images by URL
    Url {
        /// Image URLs
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Upload local image files
    File {
        /// Image files, keyed file0, file1, ... in the given order
        #[arg(required = true, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Check the status of a previously submitted URL
    Status {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Submit URLs one by one and wait for each to finish
    Batch {
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,

        #[command(flatten)]
        options: OptionArgs,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Upload every file directly inside a folder
    Folder {
        #[arg(value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
        path: PathBuf,

        /// Copy the originals here before uploading
        #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
        backup: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
pub enum CompressionKind {
    Lossless,
    Lossy,
    Glossy,
}

impl From<CompressionKind> for Compression {
    fn from(kind: CompressionKind) -> Self {
        match kind {
            CompressionKind::Lossless => Self::Lossless,
            CompressionKind::Lossy => Self::Lossy,
            CompressionKind::Glossy => Self::Glossy,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy)]
pub enum ResizeKind {
    /// Cover the box
    Outer,
    /// Fit inside the box
    Inner,
}

impl From<ResizeKind> for ResizeMode {
    fn from(kind: ResizeKind) -> Self {
        match kind {
            ResizeKind::Outer => Self::Outer,
            ResizeKind::Inner => Self::Inner,
        }
    }
}

#[derive(clap::Args)]
pub struct OptionArgs {
    /// Compression level
    #[arg(long, value_enum, default_value = "lossy")]
    pub lossy: CompressionKind,

    /// Seconds the service may wait before answering pending
    #[arg(long, default_value_t = 20)]
    pub wait: u32,

    /// Resize to WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", value_parser = dimensions_value_parser)]
    pub resize: Option<(u32, u32)>,

    /// How --resize fits the image into the box
    #[arg(long, value_enum, default_value = "outer")]
    pub resize_mode: ResizeKind,

    /// Keep EXIF metadata
    #[arg(long, default_value_t = false)]
    pub keep_exif: bool,

    /// Don't convert CMYK images to RGB
    #[arg(long, default_value_t = false)]
    pub no_cmyk2rgb: bool,

    /// Convert to another format, e.g. +webp or jpg
    #[arg(long, value_name = "FORMAT")]
    pub convert_to: Option<String>,

    /// Remove the image background
    #[arg(long, default_value_t = false)]
    pub bg_remove: bool,

    /// Ask the service to re-optimize even if it has a cached result
    #[arg(long, default_value_t = false)]
    pub refresh: bool,

    /// Overwrite uploaded local files with the optimized images
    #[arg(long, default_value_t = false)]
    pub replace_original: bool,

    /// Raw service option, repeatable. JSON values are sent as JSON
    #[arg(long = "extra", value_name = "KEY=VALUE", value_parser = extra_value_parser)]
    pub extra: Vec<(String, Value)>,
}

impl OptionArgs {
    pub fn to_options(&self) -> OptimizeOptions {
        let mut options = OptimizeOptions::default()
            .with_compression(self.lossy.into())
            .with_wait(self.wait)
            .with_keep_exif(self.keep_exif)
            .with_cmyk2rgb(!self.no_cmyk2rgb)
            .with_bg_remove(self.bg_remove)
            .with_refresh(self.refresh)
            .with_replace_original(self.replace_original);

        if let Some((width, height)) = self.resize {
            options = options.with_resize(self.resize_mode.into(), width, height);
        }
        if let Some(format) = &self.convert_to {
            options = options.with_convert_to(format.clone());
        }
        for (name, value) in &self.extra {
            options = options.with_extra(name.clone(), value.clone());
        }
        options
    }
}

#[derive(clap::Args)]
pub struct PollArgs {
    /// Seconds between status checks
    #[arg(long, value_name = "SECONDS", default_value_t = 1)]
    pub poll_interval: u64,

    /// Maximum status checks per URL (default: --wait)
    #[arg(long, value_name = "N")]
    pub max_checks: Option<usize>,

    /// Growth factor of the interval between checks
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub backoff: f32,

    /// Give up polling a URL after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub poll_timeout: Option<u64>,
}

impl PollArgs {
    pub fn policy(&self, wait: u32) -> PollPolicy {
        let interval = Duration::from_secs(self.poll_interval);
        let mut policy = PollPolicy::fixed(interval, self.max_checks.unwrap_or(wait as usize));
        if self.backoff > 1.0 {
            policy.factor = self.backoff;
            policy.max_delay = interval.mul_f32(self.backoff.powi(8));
        }
        if let Some(secs) = self.poll_timeout {
            policy.timeout = Duration::from_secs(secs);
        }
        policy
    }
}

fn dimensions_value_parser(raw: &str) -> Result<(u32, u32), String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Expected WIDTHxHEIGHT, got {raw}"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format!("Invalid dimension {value:?} in {raw}"))
    };
    Ok((parse(width)?, parse(height)?))
}

fn extra_value_parser(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got {raw}"))?;
    if name.is_empty() {
        return Err("Option name cannot be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((name.to_string(), value))
}
