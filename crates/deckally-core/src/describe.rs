//! Image description contract.
//!
//! [`ImageDescriber`] is the seam for whatever produces image descriptions:
//! a local vision model, a remote API, a human workflow. This crate ships no
//! transport; it defines the trait, the failure handling around any
//! implementation ([`Resilient`]), and the placeholder text used when no
//! description can be obtained.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Word count above which a description is clipped
pub const MAX_DESCRIPTION_WORDS: usize = 100;

/// Word count a clipped description is cut down to
pub const CLIPPED_DESCRIPTION_WORDS: usize = 50;

/// Errors a describer backend can report
#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("image file not found: {0}")]
    ImageNotFound(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend request failed: {0}")]
    RequestFailed(String),

    #[error("backend returned an empty description")]
    EmptyResponse,

    #[error("time budget of {0:?} exhausted")]
    TimedOut(Duration),

    #[error("circuit breaker open after {0} consecutive failures")]
    CircuitOpen(u32),
}

/// How much detail a description should carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    /// Key elements only, suitable for alt text
    #[default]
    Brief,
    /// A fuller description, suitable for a visible caption
    Detailed,
}

/// A source of image descriptions.
///
/// Implementations should return raw backend text; callers run it through
/// [`clip_description`] before storing it anywhere.
pub trait ImageDescriber {
    /// Whether the backend is reachable right now.
    ///
    /// A cheap liveness probe, not a guarantee that `describe` will succeed.
    fn is_available(&self) -> bool;

    /// Describe the image at `path`
    fn describe(&self, path: &Path, detail: DetailLevel) -> Result<String, DescribeError>;
}

/// Placeholder alt text used when no description could be generated.
///
/// `slide_number` is one-based, matching what a presenter sees.
pub fn placeholder_description(slide_number: usize) -> String {
    format!("Image on slide {} (AI description not available)", slide_number)
}

/// Placeholder caption for the sole image on a slide, which presumably
/// carries the slide's content
pub fn single_image_placeholder(slide_number: usize) -> String {
    format!(
        "This image is the main content of slide {} (AI description not available)",
        slide_number
    )
}

/// Clip an over-long description.
///
/// Backends sometimes ramble; anything over [`MAX_DESCRIPTION_WORDS`] words
/// is cut to the first [`CLIPPED_DESCRIPTION_WORDS`] with a trailing
/// ellipsis.
pub fn clip_description(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > MAX_DESCRIPTION_WORDS {
        format!("{}...", words[..CLIPPED_DESCRIPTION_WORDS].join(" "))
    } else {
        text.trim().to_string()
    }
}

/// Retry and failure-isolation settings for [`Resilient`]
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Pause between attempts
    pub backoff: Duration,
    /// Total time budget across all attempts for one image
    pub timeout: Duration,
    /// Consecutive failures after which the breaker opens
    pub failure_threshold: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
            failure_threshold: 3,
        }
    }
}

/// Wraps a describer with retries, a time budget, and a circuit breaker.
///
/// Once [`RetryPolicy::failure_threshold`] images in a row have failed, the
/// breaker opens and further calls fail fast with
/// [`DescribeError::CircuitOpen`] instead of burning the remaining slides'
/// time on a dead backend. One success resets the count.
pub struct Resilient<D> {
    inner: D,
    policy: RetryPolicy,
    consecutive_failures: AtomicU32,
}

impl<D: ImageDescriber> Resilient<D> {
    pub fn new(inner: D) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: D, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            consecutive_failures: AtomicU32::new(0),
        }
    }

    /// Whether the breaker is currently open
    pub fn is_open(&self) -> bool {
        self.consecutive_failures.load(Ordering::Relaxed) >= self.policy.failure_threshold
    }

    fn record_failure(&self) {
        let count = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if count >= self.policy.failure_threshold {
            log::warn!("describer circuit breaker open after {} consecutive failures", count);
        }
    }
}

impl<D: ImageDescriber> ImageDescriber for Resilient<D> {
    fn is_available(&self) -> bool {
        !self.is_open() && self.inner.is_available()
    }

    fn describe(&self, path: &Path, detail: DetailLevel) -> Result<String, DescribeError> {
        if self.is_open() {
            return Err(DescribeError::CircuitOpen(
                self.consecutive_failures.load(Ordering::Relaxed),
            ));
        }

        let started = Instant::now();
        let mut attempt = 0;
        loop {
            match self.inner.describe(path, detail) {
                Ok(text) if !text.trim().is_empty() => {
                    self.consecutive_failures.store(0, Ordering::Relaxed);
                    return Ok(text);
                }
                Ok(_) => {
                    log::debug!("describer returned empty text for {}", path.display());
                }
                Err(err) => {
                    log::debug!("describe attempt {} failed: {}", attempt + 1, err);
                }
            }

            attempt += 1;
            if attempt > self.policy.max_retries {
                self.record_failure();
                return Err(DescribeError::RequestFailed(format!(
                    "{} attempts failed for {}",
                    attempt,
                    path.display()
                )));
            }
            if started.elapsed() + self.policy.backoff > self.policy.timeout {
                self.record_failure();
                return Err(DescribeError::TimedOut(self.policy.timeout));
            }
            std::thread::sleep(self.policy.backoff);
        }
    }
}

/// A describer that never produces a description.
///
/// Stands in when no backend is configured; callers fall back to
/// [`placeholder_description`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderDescriber;

impl ImageDescriber for PlaceholderDescriber {
    fn is_available(&self) -> bool {
        false
    }

    fn describe(&self, _path: &Path, _detail: DetailLevel) -> Result<String, DescribeError> {
        Err(DescribeError::Unavailable("no describer configured".into()))
    }
}
