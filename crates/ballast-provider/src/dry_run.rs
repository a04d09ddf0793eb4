//! Dry-run provider — answers every call without contacting the sidecar.
//!
//! Reports the resource as `ACTIVE` and keeps a simulated replica count in
//! memory so a convergence run against it terminates.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::error::ProviderResult;
use crate::types::{ObservedCapacity, ResourceInstance, ResourceStatus};
use crate::CapacityProvider;

/// Replica count reported before any simulated mutation.
pub const DRY_RUN_INITIAL_CAPACITY: u32 = 10;

/// In-memory capacity provider for dry runs and local testing.
#[derive(Debug)]
pub struct DryRunProvider {
    capacity: AtomicU32,
}

impl Default for DryRunProvider {
    fn default() -> Self {
        Self::new(DRY_RUN_INITIAL_CAPACITY)
    }
}

impl DryRunProvider {
    pub fn new(initial_capacity: u32) -> Self {
        Self {
            capacity: AtomicU32::new(initial_capacity),
        }
    }

    /// Current simulated replica count.
    pub fn capacity(&self) -> u32 {
        self.capacity.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapacityProvider for DryRunProvider {
    async fn get_current_capacity(&self, resource_alias: &str) -> ProviderResult<ObservedCapacity> {
        Ok(ObservedCapacity {
            resource_alias: resource_alias.to_string(),
            status: ResourceStatus::Active,
            current_capacity: self.capacity(),
            observed_at: Some(Utc::now()),
            ..ObservedCapacity::default()
        })
    }

    async fn add_capacity(
        &self,
        resource_alias: &str,
        amount: u32,
    ) -> ProviderResult<ResourceInstance> {
        let previous = self.capacity.fetch_add(amount, Ordering::SeqCst);
        info!(resource = %resource_alias, amount, from = previous, "dry run: add capacity");
        Ok(ResourceInstance::for_alias(resource_alias))
    }

    async fn remove_capacity(
        &self,
        resource_alias: &str,
        amount: u32,
    ) -> ProviderResult<ResourceInstance> {
        let previous = self
            .capacity
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                Some(c.saturating_sub(amount))
            })
            .unwrap_or_default();
        info!(resource = %resource_alias, amount, from = previous, "dry run: remove capacity");
        Ok(ResourceInstance::for_alias(resource_alias))
    }
}
