//! ballast-reconcile — drives a resource's replica count toward a target.
//!
//! The [`Reconciler`] converges in bounded steps. Before every step it
//! waits out the cooldown since the previous action and polls the capacity
//! provider until the resource reports `ACTIVE`. At most one convergence
//! runs at a time; a second caller is rejected rather than queued.
//!
//! # Convergence Loop
//!
//! ```text
//! loop:
//!     wait until now - last_action >= cooldown
//!     observed = poll until ACTIVE (FAILED / timeout / cancel abort)
//!     if observed == target: done
//!     amount = min(step, |target - observed|)
//!     add or remove `amount`; last_action = now
//! ```
//!
//! Run-state lives behind a single lock that is never held across a sleep
//! or a provider call, so [`Reconciler::get_status`] never waits on an
//! in-flight convergence.

pub mod config;
pub mod error;
pub mod poll;
pub mod reconciler;
pub mod status;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ReconcilerConfig, ReconcilerConfigBuilder};
pub use error::{Direction, ErrorKind, ReconcileError, ReconcileResult};
pub use poll::PollDecision;
pub use reconciler::{plan_step, Reconciler, ScaleStep};
pub use status::StatusSnapshot;

pub use tokio_util::sync::CancellationToken;
