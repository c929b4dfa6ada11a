//! # ShortPixel client
//!
//! A blocking Rust client for the ShortPixel image optimization API.
//! Images are submitted by URL or uploaded from disk, pending optimizations
//! are polled, and optimized results can be written back over the local
//! originals.
//!
//! ## Features
//!
//! - **URL and upload submission**: both service endpoints, one result per image
//! - **Typed options**: every recognized option plus an explicit map for raw extras
//! - **Polling**: bounded, cancellable status checks with configurable backoff
//! - **Local files**: folder uploads, copy backups, atomic in-place replacement
//!
//! The library logs through the `log` facade and never installs a logger.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use shortpixel::{
//!     api::{batch_optimize, ApiClient, CancelToken, PollPolicy},
//!     options::OptimizeOptions,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::with_key("YOUR_API_KEY")?;
//! let options = OptimizeOptions::default().with_wait(5);
//!
//! let results = batch_optimize(
//!     &client,
//!     &["https://example.com/photo.jpg"],
//!     &options,
//!     &PollPolicy::from_wait(options.wait),
//!     &CancelToken::new(),
//! )?;
//! for result in results {
//!     println!("{}: {:?}", result.code(), result.optimized_url());
//! }
//! # Ok(())
//! # }
//! ```

/// API client, response models and polling
pub mod api;

/// Credentials, endpoints and client configuration
pub mod config;

/// HTTP-level request failures
pub mod errors;

/// Folder listing, backups and in-place replacement
pub mod files;

/// Optimization request options
pub mod options;
