//! Oracle wait coordinator.
//!
//! Polls externally visible status until it matches a target. It never asks
//! why the oracle has not updated; it only observes.

use propchain_core::PropertyStatus;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep_until, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Interval between status polls.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Interval between polls while an oracle round-trip is expected.
pub const ORACLE_POLL_INTERVAL: Duration = Duration::from_secs(15);
/// Pause after a failed poll.
pub const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

// Stand-in for a timeout too large to represent as an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    pub interval: Duration,
    pub error_backoff: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitError {
    #[error("Timed out after {}s waiting for status {target}", .elapsed.as_secs())]
    Timeout {
        target: PropertyStatus,
        elapsed: Duration,
    },

    #[error("Wait cancelled")]
    Cancelled,
}

/// Poll until `poll` yields `target`, returning the elapsed time.
///
/// Poll errors are logged and retried after `spec.error_backoff`. Sleeps are
/// clamped to the deadline and a poll still in flight at the deadline is
/// abandoned, so `Timeout` is returned at the deadline.
pub async fn await_condition<P, Fut, E>(
    mut poll: P,
    target: PropertyStatus,
    spec: &WaitSpec,
    cancel: &CancellationToken,
) -> Result<Duration, WaitError>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<PropertyStatus, E>>,
    E: Display,
{
    let started = Instant::now();
    let deadline = started
        .checked_add(spec.timeout)
        .unwrap_or_else(|| started + FAR_FUTURE);
    let mut polls = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        if Instant::now() >= deadline {
            break;
        }

        polls += 1;
        let pause = match timeout_at(deadline, poll()).await {
            Ok(Ok(status)) if status == target => {
                let elapsed = started.elapsed();
                debug!(
                    target_status = %target,
                    polls,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Status reached"
                );
                return Ok(elapsed);
            }
            Ok(Ok(status)) => {
                debug!(
                    observed = %status,
                    target_status = %target,
                    polls,
                    "Status not reached yet"
                );
                spec.interval
            }
            Ok(Err(e)) => {
                warn!(error = %e, target_status = %target, polls, "Status poll failed");
                spec.error_backoff
            }
            Err(_) => {
                warn!(target_status = %target, polls, "Status poll still running at deadline");
                break;
            }
        };

        let wake = Instant::now()
            .checked_add(pause)
            .map_or(deadline, |wake| wake.min(deadline));
        tokio::select! {
            _ = cancel.cancelled() => return Err(WaitError::Cancelled),
            _ = sleep_until(wake) => {}
        }
    }

    Err(WaitError::Timeout {
        target,
        elapsed: started.elapsed(),
    })
}
