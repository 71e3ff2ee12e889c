//! Conflict-retry transport
//!
//! A write that hits the remote lock signal is retried on a fixed interval
//! until it succeeds, fails with any other error, or the ceiling is reached.
//! [`retry_locked_write`] awaits the loop in place; [`spawn_locked_write`]
//! runs it as a background task and hands back a [`RetryHandle`] that can
//! be cancelled or awaited.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rulesheet_client::{ClientError, ClientResult};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{SyncError, SyncResult};
use crate::log::SyncLog;

/// Default delay between attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);
/// Default total retry window
pub const DEFAULT_RETRY_CEILING: Duration = Duration::from_secs(30);

/// Fixed-interval retry schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            ceiling: DEFAULT_RETRY_CEILING,
        }
    }
}

impl RetryPolicy {
    pub fn new(interval: Duration, ceiling: Duration) -> Self {
        Self { interval, ceiling }
    }

    /// Same interval, ceiling cut to the time left before `deadline`
    pub fn until(&self, deadline: Instant) -> Self {
        let left = deadline.saturating_duration_since(Instant::now());
        Self {
            interval: self.interval,
            ceiling: self.ceiling.min(left),
        }
    }

    /// Attempts that fit in the ceiling, at least one
    pub fn max_attempts(&self) -> usize {
        let interval = self.interval.as_millis().max(1);
        ((self.ceiling.as_millis() / interval) as usize).max(1)
    }
}

/// How a retried write ended
#[derive(Debug)]
pub enum RetryOutcome {
    Succeeded { attempts: usize },
    /// Stopped on a non-lock error
    Failed { attempts: usize, error: ClientError },
    /// Still locked when the ceiling was reached
    Exhausted { attempts: usize },
    Cancelled { attempts: usize },
}

impl RetryOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            RetryOutcome::Succeeded { attempts }
            | RetryOutcome::Failed { attempts, .. }
            | RetryOutcome::Exhausted { attempts }
            | RetryOutcome::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }

    /// Attempt count on success, the surfaced error otherwise
    pub fn into_result(self) -> SyncResult<usize> {
        match self {
            RetryOutcome::Succeeded { attempts } => Ok(attempts),
            RetryOutcome::Failed { error, .. } => Err(error.into()),
            RetryOutcome::Exhausted { attempts } => Err(SyncError::Conflict(format!(
                "resource still locked after {attempts} attempts"
            ))),
            RetryOutcome::Cancelled { attempts } => Err(SyncError::Conflict(format!(
                "write cancelled after {attempts} attempts"
            ))),
        }
    }
}

/// Run `write` until it stops reporting the lock signal
pub async fn retry_locked_write<F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut write: F,
) -> RetryOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<()>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempts = 0;

    loop {
        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled { attempts };
        }

        attempts += 1;
        match write().await {
            Ok(()) => return RetryOutcome::Succeeded { attempts },
            Err(err) if err.is_locked() => {
                if attempts >= max_attempts {
                    return RetryOutcome::Exhausted { attempts };
                }
                tokio::select! {
                    _ = cancel.cancelled() => return RetryOutcome::Cancelled { attempts },
                    _ = tokio::time::sleep(policy.interval) => {}
                }
            }
            Err(error) => return RetryOutcome::Failed { attempts, error },
        }
    }
}

/// Background retried write
///
/// Dropping the handle does not stop the task; it still ends at the ceiling.
#[derive(Debug)]
pub struct RetryHandle {
    cancel: CancellationToken,
    task: JoinHandle<RetryOutcome>,
}

impl RetryHandle {
    /// Stop retrying; an attempt already in flight is not aborted
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the terminal outcome
    pub async fn wait(self) -> Result<RetryOutcome, JoinError> {
        self.task.await
    }
}

/// Spawn the retry loop for `write` as a tokio task
///
/// `cancel` stops the loop between attempts. The terminal outcome is
/// logged under `label`.
pub fn spawn_locked_write<F, Fut>(
    policy: RetryPolicy,
    cancel: CancellationToken,
    log: Arc<dyn SyncLog>,
    label: String,
    write: F,
) -> RetryHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ClientResult<()>> + Send + 'static,
{
    let token = cancel.clone();
    let task = tokio::spawn(async move {
        let outcome = retry_locked_write(&policy, &token, write).await;
        match &outcome {
            RetryOutcome::Succeeded { attempts } => {
                log.info(&format!("{label} written after {attempts} attempt(s)"));
            }
            RetryOutcome::Failed { attempts, error } => {
                log.info(&format!("{label} failed after {attempts} attempt(s): {error}"));
            }
            RetryOutcome::Exhausted { attempts } => {
                log.info(&format!("{label} still locked after {attempts} attempts, giving up"));
            }
            RetryOutcome::Cancelled { attempts } => {
                log.debug(&format!("{label} cancelled after {attempts} attempt(s)"));
            }
        }
        outcome
    });

    RetryHandle { cancel, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NullLog;
    use crate::testing::MemoryLog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn locked() -> ClientError {
        ClientError::Locked("The workbook is locked".into())
    }

    /// Write that reports the lock signal `locked_for` times, then succeeds
    fn scripted(
        locked_for: usize,
    ) -> (
        Arc<AtomicUsize>,
        impl FnMut() -> std::future::Ready<ClientResult<()>>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let write = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if n < locked_for { Err(locked()) } else { Ok(()) })
        };
        (calls, write)
    }

    #[test]
    fn test_default_policy_allows_sixty_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(500));
        assert_eq!(policy.ceiling, Duration::from_secs(30));
        assert_eq!(policy.max_attempts(), 60);
        assert_eq!(
            RetryPolicy::new(Duration::from_secs(5), Duration::from_secs(1)).max_attempts(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_shortens_ceiling() {
        let policy = RetryPolicy::default();

        let near = policy.until(Instant::now() + Duration::from_secs(2));
        assert_eq!(near.ceiling, Duration::from_secs(2));
        assert_eq!(near.max_attempts(), 4);

        let far = policy.until(Instant::now() + Duration::from_secs(300));
        assert_eq!(far, policy);

        let passed = policy.until(Instant::now());
        assert_eq!(passed.max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_fourth_attempt() {
        let (calls, write) = scripted(3);
        let started = Instant::now();

        let outcome =
            retry_locked_write(&RetryPolicy::default(), &CancellationToken::new(), write).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1500) && elapsed < Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_lock_stops_at_ceiling() {
        let (calls, write) = scripted(usize::MAX);
        let started = Instant::now();

        let outcome =
            retry_locked_write(&RetryPolicy::default(), &CancellationToken::new(), write).await;

        assert!(matches!(outcome, RetryOutcome::Exhausted { attempts: 60 }));
        assert_eq!(calls.load(Ordering::SeqCst), 60);
        assert!(started.elapsed() <= Duration::from_secs(30));
        assert!(matches!(outcome.into_result(), Err(SyncError::Conflict(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_error_stops_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::default();
        let outcome = retry_locked_write(&policy, &CancellationToken::new(), || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err(ClientError::Api {
                status: 500,
                code: "generalException".into(),
                message: "boom".into(),
            }))
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Failed { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome.into_result(), Err(SyncError::Transport(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_write_reports_completion() {
        let (calls, write) = scripted(2);
        let log = Arc::new(MemoryLog::default());

        let handle = spawn_locked_write(
            RetryPolicy::default(),
            CancellationToken::new(),
            log.clone(),
            "upload".into(),
            write,
        );
        let outcome = handle.wait().await.unwrap();

        assert!(matches!(outcome, RetryOutcome::Succeeded { attempts: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(log.contains("upload written after 3 attempt(s)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_write_terminates() {
        let (calls, write) = scripted(usize::MAX);
        let handle = spawn_locked_write(
            RetryPolicy::default(),
            CancellationToken::new(),
            Arc::new(NullLog),
            "upload".into(),
            write,
        );

        handle.cancel();
        let outcome = handle.wait().await.unwrap();

        assert!(matches!(outcome, RetryOutcome::Cancelled { .. }));
        assert!(calls.load(Ordering::SeqCst) < 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_shutdown_cancels_child_write() {
        let (_calls, write) = scripted(usize::MAX);
        let shutdown = CancellationToken::new();
        let handle = spawn_locked_write(
            RetryPolicy::default(),
            shutdown.child_token(),
            Arc::new(NullLog),
            "upload".into(),
            write,
        );

        tokio::time::sleep(Duration::from_millis(1200)).await;
        shutdown.cancel();
        let outcome = handle.wait().await.unwrap();

        assert!(matches!(outcome, RetryOutcome::Cancelled { attempts: 3 }));
    }
}
