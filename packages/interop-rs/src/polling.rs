//! Bounded-retry polling primitive
//!
//! Every waiter in the relay is a thin fetch closure handed to [`poll_until`].
//! The loop invokes the closure at a fixed interval until it yields a value,
//! reports a fatal error, or the policy's timeout elapses.
//!
//! Deadlines are local to each call: a caller wrapping several waiters in an
//! outer deadline only regains control between steps or when the current
//! step's own budget runs out.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use crate::error::RelayError;

/// Default interval between attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default total budget for one wait
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Poll interval and timeout for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    timeout: Duration,
}

impl PollPolicy {
    /// Create a policy, enforcing `interval > 0` and `timeout >= interval`
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, RelayError> {
        if interval.is_zero() {
            return Err(RelayError::InvalidPolicy(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if timeout < interval {
            return Err(RelayError::InvalidPolicy(format!(
                "timeout {:?} is shorter than interval {:?}",
                timeout, interval
            )));
        }
        Ok(Self { interval, timeout })
    }

    /// Create a policy from millisecond/second settings
    pub fn from_millis_and_secs(interval_ms: u64, timeout_secs: u64) -> Result<Self, RelayError> {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_secs(timeout_secs),
        )
    }

    /// Time between attempts
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total budget
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of fetches a never-ready wait performs before timing out.
    ///
    /// The first fetch happens immediately and the last one at or just past
    /// the deadline.
    pub fn max_attempts(&self) -> u32 {
        let per_interval = self.timeout.as_nanos().div_ceil(self.interval.as_nanos());
        u32::try_from(per_interval)
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Why a single fetch attempt did not produce a value
#[derive(Debug)]
pub enum PollError {
    /// Swallowed and retried (endpoint unreachable, rate limited, ...)
    Transient(eyre::Report),
    /// Aborts the wait immediately
    Fatal(RelayError),
}

impl From<eyre::Report> for PollError {
    fn from(report: eyre::Report) -> Self {
        PollError::Transient(report)
    }
}

impl From<RelayError> for PollError {
    fn from(err: RelayError) -> Self {
        PollError::Fatal(err)
    }
}

/// Poll `fetch` until it returns `Some`, fails fatally, or the policy times out.
///
/// `Ok(None)` and transient errors are both treated as "not yet available".
/// Each attempt is bounded by the budget left at its start, so a hung fetch
/// counts as a transient failure and cannot hold the loop past its deadline.
/// On timeout the error names `operation` and carries the elapsed time and
/// number of attempts.
pub async fn poll_until<T, F, Fut>(
    operation: &str,
    policy: &PollPolicy,
    mut fetch: F,
) -> Result<T, RelayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, PollError>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let remaining = policy.timeout().saturating_sub(start.elapsed());
        match timeout(remaining, fetch()).await {
            Ok(Ok(Some(value))) => {
                debug!(operation, attempts, "{} ready", operation);
                return Ok(value);
            }
            Ok(Ok(None)) => {
                debug!(operation, attempts, "{} not ready, retrying...", operation);
            }
            Ok(Err(PollError::Transient(e))) => {
                debug!(
                    operation,
                    attempts,
                    error = %e,
                    "{} check failed, retrying...",
                    operation
                );
            }
            Ok(Err(PollError::Fatal(e))) => return Err(e),
            Err(_) => {
                debug!(
                    operation,
                    attempts,
                    budget = ?remaining,
                    "{} check did not complete within remaining budget",
                    operation
                );
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= policy.timeout() {
            return Err(RelayError::Timeout {
                operation: operation.to_string(),
                elapsed,
                attempts,
            });
        }
        sleep(policy.interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio_test::assert_err;

    fn policy(interval_ms: u64, timeout_ms: u64) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
        .unwrap()
    }

    #[test]
    fn test_policy_rejects_zero_interval() {
        let result = PollPolicy::new(Duration::ZERO, Duration::from_secs(1));
        assert!(matches!(result, Err(RelayError::InvalidPolicy(_))));
    }

    #[test]
    fn test_policy_rejects_timeout_below_interval() {
        let result = PollPolicy::new(Duration::from_secs(2), Duration::from_secs(1));
        assert!(matches!(result, Err(RelayError::InvalidPolicy(_))));
    }

    #[test]
    fn test_policy_max_attempts() {
        assert_eq!(policy(1000, 5000).max_attempts(), 6);
        assert_eq!(policy(1000, 1000).max_attempts(), 2);
        assert_eq!(policy(300, 1000).max_attempts(), 5);
        assert_eq!(PollPolicy::default().max_attempts(), 301);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_absent_times_out_within_bounds() {
        let policy = policy(100, 1000);
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = Instant::now();

        let result: Result<(), _> = poll_until("always absent", &policy, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        })
        .await;

        let elapsed = start.elapsed();
        match result {
            Err(RelayError::Timeout {
                operation,
                attempts,
                ..
            }) => {
                assert_eq!(operation, "always absent");
                assert_eq!(attempts, calls.load(Ordering::SeqCst));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(elapsed >= policy.timeout() - policy.interval());
        assert!(elapsed <= policy.timeout() + policy.interval());
        assert_eq!(calls.load(Ordering::SeqCst), policy.max_attempts());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_kth_attempt() {
        let policy = policy(100, 10_000);
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let value = poll_until("kth", &policy, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(if n == 4 { Some(n) } else { None })
        })
        .await
        .unwrap();

        assert_eq!(value, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_do_not_abort() {
        let policy = policy(100, 10_000);
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let value = poll_until("flaky", &policy, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= 3 {
                Err(PollError::Transient(eyre::eyre!("connection refused")))
            } else {
                Ok(Some("ready"))
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_short_circuits() {
        let policy = policy(100, 10_000);
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = Instant::now();

        let result: Result<(), _> = poll_until("fatal", &policy, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PollError::Fatal(RelayError::MissingArtifact(
                "gone".to_string(),
            )))
        })
        .await;

        let err = assert_err!(result);
        assert!(matches!(err, RelayError::MissingArtifact(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_fetch_is_bounded_by_policy() {
        let policy = policy(1000, 10_000);
        let start = Instant::now();

        let result: Result<(), _> = poll_until("hung", &policy, move || async move {
            std::future::pending::<Result<Option<()>, PollError>>().await
        })
        .await;

        assert!(matches!(result, Err(RelayError::Timeout { attempts: 1, .. })));
        assert_eq!(start.elapsed(), policy.timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_counts_as_transient() {
        let policy = policy(1000, 10_000);
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = Instant::now();

        let value = poll_until("stalled once", &policy, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 1 {
                sleep(Duration::from_secs(3)).await;
                Ok(None)
            } else {
                Ok(Some(n))
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_until_timeout() {
        let policy = policy(500, 2000);

        let result: Result<(), _> = poll_until("unreachable", &policy, move || async move {
            Err(PollError::Transient(eyre::eyre!("503 service unavailable")))
        })
        .await;

        assert!(matches!(result, Err(RelayError::Timeout { attempts: 5, .. })));
    }
}
