//! Process-wide publisher settings, fixed at startup.
//!
//! Loaded with the `config` crate from an optional file and `STRIDE_*`
//! environment variables, e.g. `STRIDE_TOPIC_PREFIX=acme` or
//! `STRIDE_PUBLISH_TIMEOUT_MS=5000`.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigurationError;

pub const DEFAULT_TOPIC_PREFIX: &str = "stride";
pub const DEFAULT_ENVIRONMENT: &str = "local";
pub const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PARTITION_BUCKETS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublisherSettings {
    /// First topic segment, e.g. `stride`.
    pub topic_prefix: String,
    /// Deployment profile used as the second topic segment, e.g. `local`.
    pub environment: String,
    /// Upper bound for the blocking publish path.
    pub publish_timeout_ms: u64,
    /// Number of key buckets per event kind for derived partition keys.
    pub partition_buckets: u32,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            publish_timeout_ms: DEFAULT_PUBLISH_TIMEOUT_MS,
            partition_buckets: DEFAULT_PARTITION_BUCKETS,
        }
    }
}

impl PublisherSettings {
    /// Defaults overridden by `STRIDE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::load(None)
    }

    /// Defaults, then the optional file, then `STRIDE_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: PublisherSettings = builder
            .add_source(Environment::with_prefix("STRIDE").try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        tracing::info!(
            topic_prefix = %settings.topic_prefix,
            environment = %settings.environment,
            publish_timeout_ms = settings.publish_timeout_ms,
            partition_buckets = settings.partition_buckets,
            "loaded publisher settings"
        );
        Ok(settings)
    }

    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_partition_buckets(mut self, buckets: u32) -> Self {
        self.partition_buckets = buckets;
        self
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    /// Check numeric settings. Topic segments are checked by the resolver.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.publish_timeout_ms == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "publish_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.partition_buckets == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "partition_buckets",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
