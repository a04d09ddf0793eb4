//! Wire types exchanged with the capacity provider.
//!
//! Field names follow the sidecar's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational status of a resource instance as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    Active,
    Starting,
    Paused,
    Failed,
    /// Also used for any status string the provider adds later.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Active => "ACTIVE",
            ResourceStatus::Starting => "STARTING",
            ResourceStatus::Paused => "PAUSED",
            ResourceStatus::Failed => "FAILED",
            ResourceStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fresh observation of a resource's capacity. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedCapacity {
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub resource_alias: String,
    #[serde(default)]
    pub status: ResourceStatus,
    pub current_capacity: u32,
    #[serde(default, rename = "lastObservedTimestamp")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Identity of the resource a mutation was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstance {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_alias: String,
}

impl ResourceInstance {
    /// Response used for requests that never reach the provider.
    pub fn for_alias(resource_alias: &str) -> Self {
        Self {
            resource_alias: resource_alias.to_string(),
            ..Self::default()
        }
    }
}
