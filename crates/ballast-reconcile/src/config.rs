//! Reconciler configuration.
//!
//! A [`ReconcilerConfig`] can only be obtained through
//! [`ReconcilerConfigBuilder::build`], which rejects values the
//! convergence loop cannot run with. The reconciler itself never
//! re-validates.

use std::time::Duration;

use thiserror::Error;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("target resource alias must not be empty")]
    EmptyTargetResource,

    #[error("step size must be at least 1")]
    ZeroStep,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("poll timeout must be greater than zero")]
    ZeroPollTimeout,
}

/// Immutable settings for one reconciler instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    target_resource: String,
    cooldown: Duration,
    step: u32,
    poll_interval: Duration,
    poll_timeout: Duration,
    dry_run: bool,
}

impl ReconcilerConfig {
    /// Start building a config for `target_resource` with default values.
    pub fn builder(target_resource: impl Into<String>) -> ReconcilerConfigBuilder {
        ReconcilerConfigBuilder::new(target_resource)
    }

    /// Alias of the resource being scaled.
    pub fn target_resource(&self) -> &str {
        &self.target_resource
    }

    /// Minimum time between two capacity mutations.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Maximum replicas added or removed per mutation. Always >= 1.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Period of the health poll. Always > 0.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// How long the health poll waits for `ACTIVE` before giving up.
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Builder for [`ReconcilerConfig`].
#[derive(Debug, Clone)]
pub struct ReconcilerConfigBuilder {
    target_resource: String,
    cooldown: Duration,
    step: u32,
    poll_interval: Duration,
    poll_timeout: Duration,
    dry_run: bool,
}

impl ReconcilerConfigBuilder {
    /// Defaults: 5m cooldown, step 1, 30s poll interval, 15m poll timeout.
    pub fn new(target_resource: impl Into<String>) -> Self {
        Self {
            target_resource: target_resource.into(),
            cooldown: Duration::from_secs(300),
            step: 1,
            poll_interval: Duration::from_secs(30),
            poll_timeout: Duration::from_secs(900),
            dry_run: false,
        }
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate and produce the config.
    pub fn build(self) -> Result<ReconcilerConfig, ConfigError> {
        let target_resource = self.target_resource.trim().to_string();
        if target_resource.is_empty() {
            return Err(ConfigError::EmptyTargetResource);
        }
        if self.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll_timeout.is_zero() {
            return Err(ConfigError::ZeroPollTimeout);
        }

        Ok(ReconcilerConfig {
            target_resource,
            cooldown: self.cooldown,
            step: self.step,
            poll_interval: self.poll_interval,
            poll_timeout: self.poll_timeout,
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReconcilerConfig::builder("worker").build().unwrap();
        assert_eq!(config.target_resource(), "worker");
        assert_eq!(config.cooldown(), Duration::from_secs(300));
        assert_eq!(config.step(), 1);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.poll_timeout(), Duration::from_secs(900));
        assert!(!config.dry_run());
    }

    #[test]
    fn overrides_are_applied() {
        let config = ReconcilerConfig::builder("worker")
            .cooldown(Duration::from_secs(10))
            .step(3)
            .poll_interval(Duration::from_secs(2))
            .poll_timeout(Duration::from_secs(60))
            .dry_run(true)
            .build()
            .unwrap();

        assert_eq!(config.cooldown(), Duration::from_secs(10));
        assert_eq!(config.step(), 3);
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.poll_timeout(), Duration::from_secs(60));
        assert!(config.dry_run());
    }

    #[test]
    fn zero_cooldown_is_allowed() {
        let config = ReconcilerConfig::builder("worker")
            .cooldown(Duration::ZERO)
            .build()
            .unwrap();
        assert!(config.cooldown().is_zero());
    }

    #[test]
    fn rejects_empty_resource() {
        let err = ReconcilerConfig::builder("  ").build().unwrap_err();
        assert_eq!(err, ConfigError::EmptyTargetResource);
    }

    #[test]
    fn rejects_zero_step() {
        let err = ReconcilerConfig::builder("worker").step(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroStep);
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let err = ReconcilerConfig::builder("worker")
            .poll_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroPollInterval);
    }

    #[test]
    fn rejects_zero_poll_timeout() {
        let err = ReconcilerConfig::builder("worker")
            .poll_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroPollTimeout);
    }
}
