//! Exponential backoff for calls to the analysis service.
//!
//! Rate limits (429), request timeouts (408), 5xx responses and network
//! errors are transient. Everything else fails on the first attempt.

use anyhow::Result;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts including the first.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Outcome of one failed attempt.
#[derive(Debug)]
pub enum AttemptError {
    /// Worth another try.
    Transient(String),
    /// Give up immediately.
    Fatal(anyhow::Error),
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Run `operation` until it succeeds, fails fatally, or the attempts run out.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, label: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut last_error = String::from("no attempt made");

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Transient(msg)) => {
                tracing::warn!(
                    "{} failed on attempt {}/{}: {}",
                    label,
                    attempt,
                    attempts,
                    msg.chars().take(200).collect::<String>()
                );
                last_error = msg;
            }
        }

        if attempt < attempts {
            let sleep_time = delay + jitter();
            tracing::info!(
                "{} retrying in {:.1}s (attempt {}/{})",
                label,
                sleep_time.as_secs_f64(),
                attempt + 1,
                attempts
            );
            tokio::time::sleep(sleep_time).await;
            delay = Duration::from_secs_f64(
                (delay.as_secs_f64() * config.backoff_factor).min(config.max_delay.as_secs_f64()),
            );
        }
    }

    anyhow::bail!(
        "{}: all {} attempts failed, last error: {}",
        label,
        attempts,
        last_error
    )
}

/// 0-250ms taken from the clock's sub-second nanos.
fn jitter() -> Duration {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    Duration::from_millis(u64::from(nanos % 250))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_factor: 2.0,
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&fast(), "test", || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(AttemptError::Transient(format!("503 on call {}", n)))
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_stops_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = with_retry(&fast(), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AttemptError::Fatal(anyhow::anyhow!("401 unauthorized")))
        })
        .await;
        assert!(result.unwrap_err().to_string().contains("401"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = with_retry(&fast(), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AttemptError::Transient("429".into()))
        })
        .await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("all 3 attempts failed"), "{}", err);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
