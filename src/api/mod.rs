// Re-export the API module components
pub use self::{
    client::ApiClient,
    errors::ApiClientError,
    models::{FileInfo, OptimizationResult, ResultStatus},
    polling::{batch_optimize, poll_until_optimized, CancelToken, PollPolicy},
    types::{Compression, ResizeMode, StatusCode},
};

// Module declarations
mod client;
mod errors;
mod models;
mod polling;
mod types;
