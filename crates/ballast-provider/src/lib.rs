//! ballast-provider — the capacity provider contract.
//!
//! The capacity provider holds the ground truth for a managed resource: its
//! operational status and replica count. It also performs the actual
//! add/remove replica actions. Ballast talks to it through a local sidecar
//! over plain HTTP.
//!
//! # Components
//!
//! - **`CapacityProvider`** — async trait consumed by the reconciler
//! - **`SidecarClient`** — hyper-based HTTP implementation with retries
//! - **`DryRunProvider`** — in-memory stand-in that never touches the sidecar
//! - **`RetryPolicy`** — exponential backoff for transport failures
//!
//! # Sidecar API
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `{base}{alias}/capacity` | — |
//! | POST | `{base}{alias}/capacity/add` | `{"capacityToBeAdded": n}` |
//! | POST | `{base}{alias}/capacity/remove` | `{"capacityToBeRemoved": n}` |

pub mod client;
pub mod dry_run;
pub mod error;
pub mod retry;
pub mod types;

use async_trait::async_trait;

pub use client::{SidecarClient, DEFAULT_BASE_URL};
pub use dry_run::DryRunProvider;
pub use error::{ProviderError, ProviderResult};
pub use retry::RetryPolicy;
pub use types::{ObservedCapacity, ResourceInstance, ResourceStatus};

/// Source of truth for a resource's capacity, and the executor of
/// capacity changes.
///
/// Implementations must be cheap to share behind an `Arc`. Dropping a
/// returned future aborts the underlying request.
#[async_trait]
pub trait CapacityProvider: Send + Sync {
    /// Read the current status and replica count of `resource_alias`.
    async fn get_current_capacity(&self, resource_alias: &str) -> ProviderResult<ObservedCapacity>;

    /// Add `amount` replicas. `amount == 0` is a no-op success.
    async fn add_capacity(&self, resource_alias: &str, amount: u32)
    -> ProviderResult<ResourceInstance>;

    /// Remove `amount` replicas. `amount == 0` is a no-op success.
    async fn remove_capacity(
        &self,
        resource_alias: &str,
        amount: u32,
    ) -> ProviderResult<ResourceInstance>;
}
