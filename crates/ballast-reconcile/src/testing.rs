//! Scripted capacity provider for reconciler tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use ballast_provider::{
    CapacityProvider, ObservedCapacity, ProviderError, ProviderResult, ResourceInstance,
    ResourceStatus,
};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

/// One scripted answer to a capacity read.
#[derive(Debug, Clone, Copy)]
pub enum Read {
    Status(ResourceStatus),
    TransportError,
    /// Provider answers 404 for the alias.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Add(u32),
    Remove(u32),
}

#[derive(Debug)]
struct Inner {
    capacity: u32,
    reads: VecDeque<Read>,
    /// Status reported once the script runs out.
    fallback: ResourceStatus,
    reads_made: u32,
    mutations: Vec<(Mutation, Instant)>,
    fail_mutations: bool,
}

/// In-memory provider whose capacity follows the mutations it receives.
#[derive(Debug)]
pub struct FakeProvider {
    inner: Mutex<Inner>,
    /// When set, each mutation waits for a permit before completing.
    gate: Option<Arc<Notify>>,
    /// Signalled whenever a mutation starts.
    mutation_started: Arc<Notify>,
}

impl FakeProvider {
    pub fn new(capacity: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                capacity,
                reads: VecDeque::new(),
                fallback: ResourceStatus::Active,
                reads_made: 0,
                mutations: Vec::new(),
                fail_mutations: false,
            }),
            gate: None,
            mutation_started: Arc::new(Notify::new()),
        }
    }

    pub fn with_reads(self, reads: impl IntoIterator<Item = Read>) -> Self {
        self.inner.lock().reads.extend(reads);
        self
    }

    pub fn with_fallback(self, status: ResourceStatus) -> Self {
        self.inner.lock().fallback = status;
        self
    }

    pub fn failing_mutations(self) -> Self {
        self.inner.lock().fail_mutations = true;
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn mutation_started(&self) -> Arc<Notify> {
        self.mutation_started.clone()
    }

    pub fn capacity(&self) -> u32 {
        self.inner.lock().capacity
    }

    pub fn reads_made(&self) -> u32 {
        self.inner.lock().reads_made
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.inner.lock().mutations.iter().map(|(m, _)| *m).collect()
    }

    pub fn mutation_times(&self) -> Vec<Instant> {
        self.inner.lock().mutations.iter().map(|(_, at)| *at).collect()
    }

    async fn mutate(&self, resource_alias: &str, mutation: Mutation) -> ProviderResult<ResourceInstance> {
        let fail = {
            let mut inner = self.inner.lock();
            inner.mutations.push((mutation, Instant::now()));
            inner.fail_mutations
        };
        self.mutation_started.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if fail {
            return Err(ProviderError::Status {
                status: 500,
                body: "capacity change rejected".to_string(),
            });
        }

        let mut inner = self.inner.lock();
        inner.capacity = match mutation {
            Mutation::Add(n) => inner.capacity + n,
            Mutation::Remove(n) => inner
                .capacity
                .checked_sub(n)
                .expect("reconciler removed more capacity than exists"),
        };
        Ok(ResourceInstance::for_alias(resource_alias))
    }
}

#[async_trait]
impl CapacityProvider for FakeProvider {
    async fn get_current_capacity(&self, resource_alias: &str) -> ProviderResult<ObservedCapacity> {
        let mut inner = self.inner.lock();
        inner.reads_made += 1;
        let read = inner
            .reads
            .pop_front()
            .unwrap_or(Read::Status(inner.fallback));

        match read {
            Read::Status(status) => Ok(ObservedCapacity {
                instance_id: "instance-1".to_string(),
                resource_id: "r-1".to_string(),
                resource_alias: resource_alias.to_string(),
                status,
                current_capacity: inner.capacity,
                observed_at: None,
            }),
            Read::TransportError => Err(ProviderError::Transport {
                attempts: 4,
                message: "connection refused".to_string(),
            }),
            Read::NotFound => Err(ProviderError::Status {
                status: 404,
                body: format!("resource {resource_alias} not found"),
            }),
        }
    }

    async fn add_capacity(&self, resource_alias: &str, amount: u32) -> ProviderResult<ResourceInstance> {
        self.mutate(resource_alias, Mutation::Add(amount)).await
    }

    async fn remove_capacity(
        &self,
        resource_alias: &str,
        amount: u32,
    ) -> ProviderResult<ResourceInstance> {
        self.mutate(resource_alias, Mutation::Remove(amount)).await
    }
}
