//! Command-line and environment configuration.
//!
//! Every flag can also be set through the environment variable named in
//! its `env` attribute. Durations are whole seconds.

use std::time::Duration;

use ballast_provider::DEFAULT_BASE_URL;
use ballast_reconcile::{ConfigError, ReconcilerConfig};
use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Parser)]
#[command(name = "ballastd", about = "Ballast capacity controller", version)]
pub struct Cli {
    /// Alias of the resource to scale.
    #[arg(long, env = "AUTOSCALER_TARGET_RESOURCE")]
    pub target_resource: String,

    /// Minimum seconds between two scaling actions.
    #[arg(long, env = "AUTOSCALER_COOLDOWN", default_value_t = 300)]
    pub cooldown: u64,

    /// Maximum replicas added or removed per action.
    #[arg(long, env = "AUTOSCALER_STEPS", default_value_t = 1)]
    pub steps: u32,

    /// Simulate the capacity provider instead of calling the sidecar.
    #[arg(
        long,
        env = "AUTOSCALER_DRY_RUN",
        default_value = "false",
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,

    /// Seconds to wait for the resource to become ACTIVE.
    #[arg(long, env = "AUTOSCALER_WAIT_FOR_ACTIVE_TIMEOUT", default_value_t = 900)]
    pub wait_for_active_timeout: u64,

    /// Seconds between status checks while waiting for ACTIVE.
    #[arg(long, env = "AUTOSCALER_WAIT_FOR_ACTIVE_CHECK_INTERVAL", default_value_t = 30)]
    pub wait_for_active_check_interval: u64,

    /// Capacity provider sidecar base URL.
    #[arg(long, env = "BALLAST_PROVIDER_URL", default_value = DEFAULT_BASE_URL)]
    pub provider_url: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Log level: debug, info, warn, error. Ignored when RUST_LOG is set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, ignore_case = true, default_value = "json")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Build the validated reconciler config.
    pub fn reconciler_config(&self) -> Result<ReconcilerConfig, ConfigError> {
        ReconcilerConfig::builder(self.target_resource.clone())
            .cooldown(Duration::from_secs(self.cooldown))
            .step(self.steps)
            .poll_interval(Duration::from_secs(self.wait_for_active_check_interval))
            .poll_timeout(Duration::from_secs(self.wait_for_active_timeout))
            .dry_run(self.dry_run)
            .build()
    }
}

/// Map a `LOG_LEVEL` value to a filter directive; unknown values mean info.
pub fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}
