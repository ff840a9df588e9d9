//! Configuration management for the cluster runner.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Section-wise validation
mod cluster;
mod fixture;
mod output;
mod poll;
mod provision;
mod subnet;
pub use cluster::*;
pub use fixture::*;
pub use output::*;
pub use poll::*;
pub use provision::*;
pub use subnet::*;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Environment variable prefix, e.g. `RUNNER__CLUSTER__NODE_COUNT=3`
pub const ENV_PREFIX: &str = "RUNNER";

/// Immutable runner configuration handed to the orchestrator at construction.
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct RunnerConfig {
    /// Fleet size, binary and log locations
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Confirmation poll interval and deadlines
    #[serde(default)]
    pub poll: PollConfig,
    /// Keystore credentials and the funded genesis identity
    #[serde(default)]
    pub fixture: FixtureConfig,
    /// Wallet pool and transfer amounts
    #[serde(default)]
    pub provision: ProvisionConfig,
    /// Optional custom subnet and blockchain
    #[serde(default)]
    pub subnet: SubnetConfig,
    /// Where the cluster record is persisted
    #[serde(default)]
    pub output: OutputConfig,
}

impl Debug for RunnerConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("cluster", &self.cluster)
            .field("poll", &self.poll)
            .field("subnet", &self.subnet)
            .field("output", &self.output)
            .finish()
    }
}

impl RunnerConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `RUNNER__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so CLI flags and `with_override_config()` can still
    /// be applied. Callers MUST call `validate()` before handing the config out.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("RUNNER__CLUSTER__NODE_COUNT", "3");
    /// let cfg = RunnerConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.cluster.validate()?;
        self.poll.validate()?;
        self.fixture.validate()?;
        self.provision.validate()?;
        self.subnet.validate()?;
        self.output.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
