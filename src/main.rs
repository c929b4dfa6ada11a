mod args;
mod progress;

use crate::args::{Args, Commands};

use clap::Parser;
use shortpixel::api::{batch_optimize, ApiClient, CancelToken, FileInfo, OptimizationResult};

use crate::progress::with_spinner;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Args {
        connection,
        command: cmd,
    } = Args::parse();
    let client = ApiClient::new(connection.config()?)?;

    let results: Vec<OptimizationResult> = match &cmd {
        Commands::Url { urls, options } => with_spinner("Submitting URLs...", || {
            client.submit_by_url(urls, &options.to_options())
        })?,
        Commands::File { paths, options } => {
            let files: Vec<FileInfo> = paths
                .iter()
                .enumerate()
                .map(|(index, path)| FileInfo::new(format!("file{index}"), path))
                .collect();
            with_spinner("Uploading files...", || {
                client.submit_by_file(&files, &options.to_options())
            })?
        }
        Commands::Status { url, options } => with_spinner("Checking status...", || {
            client.check_status(url, &options.to_options())
        })?,
        Commands::Batch {
            urls,
            options,
            poll,
        } => {
            let options = options.to_options();
            let policy = poll.policy(options.wait);
            with_spinner("Optimizing images...", || {
                batch_optimize(&client, urls, &options, &policy, &CancelToken::new())
            })?
        }
        Commands::Folder {
            path,
            backup,
            options,
        } => with_spinner("Uploading folder...", || {
            client.optimize_folder(path, &options.to_options(), backup.as_deref())
        })?,
    };

    let pending = results.iter().filter(|result| result.is_pending()).count();
    if pending > 0 {
        log::warn!("{pending} image(s) still pending, check again later with `status`");
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
