//! Health poll — waits for the resource to report `ACTIVE`.
//!
//! The transition logic is the pure [`decide`] function. The async driver
//! makes one immediate read, then one read per poll interval, and feeds
//! every observation through `decide` until a terminal decision.
//!
//! ```text
//! ACTIVE                    → Ready (return observed capacity)
//! FAILED                    → Failed
//! STARTING / PAUSED / UNKNOWN → KeepWaiting
//! read error on a tick      → KeepWaiting (logged)
//! elapsed >= timeout        → TimedOut
//! cancelled                 → Cancelled
//! ```
//!
//! A read error on the immediate first read is not retried here and aborts
//! the poll: a transport failure means the provider cannot be reached at
//! all, an error status means it refused the read.

use std::time::Duration;

use ballast_provider::{CapacityProvider, ObservedCapacity, ResourceStatus};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ReconcilerConfig;
use crate::error::{ReconcileError, ReconcileResult};

/// Outcome of evaluating one poll observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Resource is `ACTIVE`; mutation may proceed.
    Ready,
    /// Resource is `FAILED`; abort without retrying.
    Failed,
    TimedOut,
    Cancelled,
    KeepWaiting,
}

/// Decide the next poll transition.
///
/// `status` is `None` when the read for this tick failed.
pub fn decide(
    status: Option<ResourceStatus>,
    elapsed: Duration,
    timeout: Duration,
    cancelled: bool,
) -> PollDecision {
    if cancelled {
        return PollDecision::Cancelled;
    }
    match status {
        Some(ResourceStatus::Active) => PollDecision::Ready,
        Some(ResourceStatus::Failed) => PollDecision::Failed,
        _ if elapsed >= timeout => PollDecision::TimedOut,
        _ => PollDecision::KeepWaiting,
    }
}

/// Block until the target resource is `ACTIVE` and return that observation.
pub(crate) async fn wait_for_active(
    provider: &dyn CapacityProvider,
    config: &ReconcilerConfig,
    cancel: &CancellationToken,
) -> ReconcileResult<ObservedCapacity> {
    let timeout = config.poll_timeout();

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReconcileError::Cancelled),
        result = tokio::time::timeout(timeout, poll_until_terminal(provider, config, cancel)) => {
            result.unwrap_or(Err(ReconcileError::PollTimeout { waited: timeout }))
        }
    }
}

async fn poll_until_terminal(
    provider: &dyn CapacityProvider,
    config: &ReconcilerConfig,
    cancel: &CancellationToken,
) -> ReconcileResult<ObservedCapacity> {
    let resource = config.target_resource();
    let interval = config.poll_interval();
    let timeout = config.poll_timeout();
    let started = Instant::now();

    let mut ticker = tokio::time::interval_at(started + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut observed = Some(
        provider
            .get_current_capacity(resource)
            .await
            .map_err(ReconcileError::from_read)?,
    );

    loop {
        let status = observed.as_ref().map(|c| c.status);
        let decision = decide(status, started.elapsed(), timeout, cancel.is_cancelled());

        match (decision, observed) {
            (PollDecision::Ready, Some(capacity)) => {
                debug!(
                    resource = %resource,
                    current = capacity.current_capacity,
                    "instance is ACTIVE"
                );
                return Ok(capacity);
            }
            (PollDecision::Failed, _) => {
                warn!(resource = %resource, "instance is in FAILED state");
                return Err(ReconcileError::ResourceFailed {
                    resource: resource.to_string(),
                });
            }
            (PollDecision::TimedOut, _) => {
                return Err(ReconcileError::PollTimeout { waited: timeout });
            }
            (PollDecision::Cancelled, _) => return Err(ReconcileError::Cancelled),
            _ => {
                if let Some(status) = status {
                    info!(resource = %resource, %status, "instance not ACTIVE yet, waiting");
                }
            }
        }

        ticker.tick().await;

        observed = match provider.get_current_capacity(resource).await {
            Ok(capacity) => Some(capacity),
            Err(e) => {
                warn!(resource = %resource, error = %e, "error checking instance status");
                None
            }
        };
    }
}
