//! Status snapshot returned by [`Reconciler::get_status`](crate::Reconciler::get_status).

use std::time::Duration;

use ballast_provider::{ObservedCapacity, ResourceStatus};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tokio::time::Instant;

/// Observed capacity combined with a point-in-time copy of run-state.
///
/// Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub instance_id: String,
    pub resource_id: String,
    pub resource_alias: String,
    pub status: ResourceStatus,
    pub current_capacity: u32,
    pub observed_at: Option<DateTime<Utc>>,
    pub scaling_in_progress: bool,
    /// Target of the in-flight convergence, 0 when idle.
    pub target_capacity: u32,
    pub last_action_time: Option<DateTime<Utc>>,
    pub in_cooldown_period: bool,
    #[serde(rename = "cooldownRemainingSecs", serialize_with = "as_secs_f64")]
    pub cooldown_remaining: Duration,
}

impl StatusSnapshot {
    pub(crate) fn new(
        observed: ObservedCapacity,
        scaling_in_progress: bool,
        target_capacity: u32,
        last_action_time: Option<DateTime<Utc>>,
        cooldown_remaining: Duration,
    ) -> Self {
        Self {
            instance_id: observed.instance_id,
            resource_id: observed.resource_id,
            resource_alias: observed.resource_alias,
            status: observed.status,
            current_capacity: observed.current_capacity,
            observed_at: observed.observed_at,
            scaling_in_progress,
            target_capacity,
            last_action_time,
            in_cooldown_period: !cooldown_remaining.is_zero(),
            cooldown_remaining,
        }
    }
}

/// `max(0, cooldown - (now - last_action))`, or zero if there was no action.
pub fn cooldown_remaining(last_action: Option<Instant>, cooldown: Duration, now: Instant) -> Duration {
    match last_action {
        Some(at) => cooldown.saturating_sub(now.saturating_duration_since(at)),
        None => Duration::ZERO,
    }
}

fn as_secs_f64<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(60);

    #[test]
    fn no_action_means_no_cooldown() {
        let now = Instant::now();
        assert_eq!(cooldown_remaining(None, COOLDOWN, now), Duration::ZERO);
    }

    #[test]
    fn remaining_counts_down() {
        let at = Instant::now();
        let now = at + Duration::from_secs(20);
        assert_eq!(
            cooldown_remaining(Some(at), COOLDOWN, now),
            Duration::from_secs(40)
        );
    }

    #[test]
    fn remaining_never_goes_negative() {
        let at = Instant::now();
        let now = at + Duration::from_secs(600);
        assert_eq!(cooldown_remaining(Some(at), COOLDOWN, now), Duration::ZERO);
    }

    #[test]
    fn serializes_camel_case() {
        let observed = ObservedCapacity {
            resource_alias: "worker".to_string(),
            status: ResourceStatus::Active,
            current_capacity: 3,
            ..ObservedCapacity::default()
        };
        let snapshot = StatusSnapshot::new(observed, true, 5, None, Duration::from_millis(1500));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["resourceAlias"], "worker");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["currentCapacity"], 3);
        assert_eq!(json["scalingInProgress"], true);
        assert_eq!(json["targetCapacity"], 5);
        assert_eq!(json["inCooldownPeriod"], true);
        assert_eq!(json["cooldownRemainingSecs"], 1.5);
        assert!(json["lastActionTime"].is_null());
    }
}
