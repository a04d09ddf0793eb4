//! Reconciler — cooldown-gated, health-gated convergence.
//!
//! One `Reconciler` exists per managed resource. It is constructed once at
//! startup and shared behind an `Arc`; there is no global instance.

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;

use ballast_provider::CapacityProvider;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ReconcilerConfig;
use crate::error::{Direction, ReconcileError, ReconcileResult};
use crate::poll;
use crate::status::{cooldown_remaining, StatusSnapshot};

/// One bounded capacity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleStep {
    pub direction: Direction,
    pub amount: u32,
}

/// Plan the next step from `current` toward `target`.
///
/// Returns `None` once converged. The amount never exceeds `max_step` nor
/// the remaining distance, so a step cannot overshoot the target or remove
/// more replicas than exist.
pub fn plan_step(current: u32, target: u32, max_step: u32) -> Option<ScaleStep> {
    match current.cmp(&target) {
        Ordering::Equal => None,
        Ordering::Less => Some(ScaleStep {
            direction: Direction::Add,
            amount: max_step.min(target - current),
        }),
        Ordering::Greater => Some(ScaleStep {
            direction: Direction::Remove,
            amount: max_step.min(current - target),
        }),
    }
}

#[derive(Debug, Clone, Copy)]
struct LastAction {
    /// Monotonic time, used for cooldown math.
    at: Instant,
    /// Wall-clock time, used for display.
    wall: DateTime<Utc>,
}

/// Mutable run-state. Only ever copied out or updated in place; the lock
/// guarding it is never held across an await.
#[derive(Debug, Clone, Copy, Default)]
struct RunState {
    in_progress: bool,
    target_capacity: u32,
    last_action: Option<LastAction>,
}

/// Clears the in-flight flag when dropped, whichever way the run ends
/// (return, error, panic, or the future being dropped).
struct InFlight<'a> {
    state: &'a RwLock<RunState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write();
        state.in_progress = false;
        state.target_capacity = 0;
    }
}

/// Drives a resource's replica count toward a target.
pub struct Reconciler {
    config: ReconcilerConfig,
    provider: Arc<dyn CapacityProvider>,
    state: RwLock<RunState>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig, provider: Arc<dyn CapacityProvider>) -> Self {
        Self {
            config,
            provider,
            state: RwLock::new(RunState::default()),
        }
    }

    /// Read-only view of the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Converge the resource to `target` replicas.
    ///
    /// Blocks until the observed capacity equals `target` or a terminal
    /// error occurs. Fails fast with [`ReconcileError::Conflict`] if a
    /// convergence is already running; callers are never queued.
    pub async fn scale_to_target(
        &self,
        target: u32,
        cancel: &CancellationToken,
    ) -> ReconcileResult<()> {
        let _in_flight = self.begin(target)?;
        let resource = self.config.target_resource();

        info!(resource = %resource, target, "scaling to target capacity");

        loop {
            self.wait_for_cooldown(cancel).await?;

            let observed = poll::wait_for_active(self.provider.as_ref(), &self.config, cancel).await?;
            let current = observed.current_capacity;

            let Some(step) = plan_step(current, target, self.config.step()) else {
                info!(resource = %resource, target, "already at target capacity");
                return Ok(());
            };

            info!(
                resource = %resource,
                current,
                target,
                direction = %step.direction,
                amount = step.amount,
                "applying scaling step"
            );

            self.apply(step, cancel).await?;
            self.record_action();
        }
    }

    /// Current provider view plus a consistent copy of run-state.
    ///
    /// Performs exactly one provider read and never waits on an in-flight
    /// convergence.
    pub async fn get_status(&self, cancel: &CancellationToken) -> ReconcileResult<StatusSnapshot> {
        let observed = cancellable(
            cancel,
            self.provider
                .get_current_capacity(self.config.target_resource()),
        )
        .await?
        .map_err(ReconcileError::from_read)?;

        let state = *self.state.read();
        let remaining = cooldown_remaining(
            state.last_action.map(|a| a.at),
            self.config.cooldown(),
            Instant::now(),
        );

        Ok(StatusSnapshot::new(
            observed,
            state.in_progress,
            state.target_capacity,
            state.last_action.map(|a| a.wall),
            remaining,
        ))
    }

    /// Claim the single convergence slot.
    fn begin(&self, target: u32) -> ReconcileResult<InFlight<'_>> {
        let mut state = self.state.write();
        if state.in_progress {
            warn!(
                requested = target,
                in_flight = state.target_capacity,
                "scaling operation already in progress"
            );
            return Err(ReconcileError::Conflict {
                in_flight_target: state.target_capacity,
            });
        }
        state.in_progress = true;
        state.target_capacity = target;

        Ok(InFlight { state: &self.state })
    }

    async fn wait_for_cooldown(&self, cancel: &CancellationToken) -> ReconcileResult<()> {
        let last_action = self.state.read().last_action.map(|a| a.at);
        let remaining = cooldown_remaining(last_action, self.config.cooldown(), Instant::now());
        if remaining.is_zero() {
            return Ok(());
        }

        info!(
            resource = %self.config.target_resource(),
            wait_secs = remaining.as_secs_f64(),
            "within cooldown period, waiting before scaling"
        );
        cancellable(cancel, tokio::time::sleep(remaining)).await
    }

    async fn apply(&self, step: ScaleStep, cancel: &CancellationToken) -> ReconcileResult<()> {
        let resource = self.config.target_resource();
        let call = async {
            match step.direction {
                Direction::Add => self.provider.add_capacity(resource, step.amount).await,
                Direction::Remove => self.provider.remove_capacity(resource, step.amount).await,
            }
        };

        let instance = cancellable(cancel, call)
            .await?
            .map_err(|source| ReconcileError::MutationFailed {
                direction: step.direction,
                amount: step.amount,
                source,
            })?;

        debug!(
            resource = %resource,
            instance_id = %instance.instance_id,
            direction = %step.direction,
            amount = step.amount,
            "scaling step accepted"
        );
        Ok(())
    }

    fn record_action(&self) {
        self.state.write().last_action = Some(LastAction {
            at: Instant::now(),
            wall: Utc::now(),
        });
    }
}

/// Run `fut` unless `cancel` fires first.
async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> ReconcileResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReconcileError::Cancelled),
        out = fut => Ok(out),
    }
}
