use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use backon::{BlockingRetryable, ExponentialBuilder};

use crate::options::OptimizeOptions;

use super::client::ApiClient;
use super::errors::ApiClientError;
use super::models::OptimizationResult;

/// How long and how often a pending optimization is re-checked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollPolicy {
    /// Delay before the first check and between early checks.
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Growth of the delay between consecutive checks. `1.0` keeps it fixed.
    pub factor: f32,
    /// Upper bound on status checks per URL.
    pub max_checks: usize,
    /// Polling stops once this much time has passed, whatever the count.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            factor: 1.5,
            max_checks: 20,
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollPolicy {
    /// Checks every `interval`, at most `checks` times.
    ///
    /// Bounded by the count alone, the service may hold each check for up to
    /// `wait` seconds.
    pub const fn fixed(interval: Duration, checks: usize) -> Self {
        Self {
            min_delay: interval,
            max_delay: interval,
            factor: 1.0,
            max_checks: checks,
            timeout: Duration::MAX,
        }
    }

    /// One check per second, `wait` checks at most.
    pub const fn from_wait(wait: u32) -> Self {
        Self::fixed(Duration::from_secs(1), wait as usize)
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay.max(self.min_delay))
            .with_factor(self.factor.max(1.0))
            .with_max_times(self.max_checks.saturating_sub(1))
    }
}

/// Shared flag that stops polling at the next check.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Poll {
    NotDone(OptimizationResult),
    Failed(ApiClientError),
}

const fn is_not_done(poll: &Poll) -> bool {
    match poll {
        Poll::NotDone(_) => true,
        Poll::Failed(_) => false,
    }
}

/// Re-checks `url` until the service reports success.
///
/// `last` is the result that was pending; it is returned unchanged when the
/// policy allows no checks. Any status other than success, error codes
/// included, counts as not done yet. Running out of checks or time is not an
/// error: the last observed result is returned.
///
/// # Errors
///
/// Will return `Err` on network or parse failure, on an empty response and
/// on cancellation.
pub fn poll_until_optimized(
    api: &ApiClient,
    url: &str,
    last: OptimizationResult,
    options: &OptimizeOptions,
    policy: &PollPolicy,
    cancel: &CancelToken,
) -> Result<OptimizationResult, ApiClientError> {
    if cancel.is_cancelled() {
        return Err(ApiClientError::Cancelled);
    }
    if policy.max_checks == 0 || last.is_success() {
        return Ok(last);
    }

    let started = Instant::now();
    let fetch = || -> Result<OptimizationResult, Poll> {
        if cancel.is_cancelled() {
            return Err(Poll::Failed(ApiClientError::Cancelled));
        }
        let result = first_result(url, api.check_status(url, options)).map_err(Poll::Failed)?;
        if result.is_success() {
            Ok(result)
        } else {
            Err(Poll::NotDone(result))
        }
    };

    std::thread::sleep(policy.min_delay);
    fetch
        .retry(policy.backoff())
        .sleep(std::thread::sleep)
        .when(|poll| {
            is_not_done(poll) && !cancel.is_cancelled() && started.elapsed() < policy.timeout
        })
        .notify(|poll, dur: Duration| {
            if let Poll::NotDone(result) = poll {
                log::info!("{url} is {}, checking again in {dur:?}", result.code());
            }
        })
        .call()
        .or_else(|poll| match poll {
            Poll::NotDone(_) if cancel.is_cancelled() => Err(ApiClientError::Cancelled),
            Poll::NotDone(last) => {
                log::warn!(
                    "{url} still not optimized after polling, last status {}",
                    last.code()
                );
                Ok(last)
            }
            Poll::Failed(err) => Err(err),
        })
}

/// Submits each URL on its own and polls the pending ones.
///
/// The output holds one result per URL, in input order: success, still
/// pending, or whatever error code the service last reported.
///
/// # Errors
///
/// Will return `Err` on the first network or parse failure, or when
/// cancelled.
pub fn batch_optimize<S: AsRef<str>>(
    api: &ApiClient,
    urls: &[S],
    options: &OptimizeOptions,
    policy: &PollPolicy,
    cancel: &CancelToken,
) -> Result<Vec<OptimizationResult>, ApiClientError> {
    if options.replace_original {
        log::warn!("replace_original has no effect for URL submissions, no local files given");
    }

    let mut results = Vec::with_capacity(urls.len());
    for url in urls {
        let url = url.as_ref();
        if cancel.is_cancelled() {
            return Err(ApiClientError::Cancelled);
        }

        let result = first_result(url, api.post_urls(&[url], options))?;
        let result = if result.is_pending() {
            poll_until_optimized(api, url, result, options, policy, cancel)?
        } else {
            result
        };
        results.push(result);
    }
    Ok(results)
}

fn first_result(
    url: &str,
    results: Result<Vec<OptimizationResult>, ApiClientError>,
) -> Result<OptimizationResult, ApiClientError> {
    results?
        .into_iter()
        .next()
        .ok_or_else(|| ApiClientError::EmptyResponse(url.to_owned()))
}
