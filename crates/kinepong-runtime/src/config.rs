//! Configuration
//!
//! JSON file, every field optional. Durations are humantime strings such as
//! `"5s"` or `"250ms"`. Unknown keys are rejected so typos surface at startup.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kinepong_core::KinepongError;
use kinepong_state::{
    ResolverConfig, TargetSmoother, DEFAULT_EDGE_MARGIN, DEFAULT_LIVENESS_TIMEOUT,
    DEFAULT_SMOOTHING_FACTOR,
};
use kinepong_transport::{validate_endpoint, ReconnectPolicy, DEFAULT_ENDPOINT};
use kinepong_wire::{ExtractorConfig, DEFAULT_FOOT_MIN_VISIBILITY, DEFAULT_HAND_MIN_VISIBILITY};

use crate::NodeConfig;

/// Overrides `endpoint`
pub const ENV_ENDPOINT: &str = "KINEPONG_ENDPOINT";

/// Overrides `logging.filter`
pub const ENV_LOG: &str = "KINEPONG_LOG";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for KinepongError {
    fn from(err: ConfigError) -> Self {
        KinepongError::Config(err.to_string())
    }
}

/// Top-level configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KinepongConfig {
    pub endpoint: String,
    #[serde(with = "humantime_duration")]
    pub liveness_timeout: Duration,
    #[serde(with = "humantime_duration")]
    pub tick_interval: Duration,
    pub extractor: ExtractorSection,
    pub world: WorldSection,
    pub smoothing: SmoothingSection,
    pub reconnect: ReconnectSection,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorSection {
    pub hand_min_visibility: f32,
    pub foot_min_visibility: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldSection {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmoothingSection {
    pub factor: f32,
    pub margin: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconnectSection {
    #[serde(with = "humantime_duration")]
    pub initial_delay: Duration,
    #[serde(with = "humantime_duration")]
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: bool,
}

/// Logging output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives
    pub filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for KinepongConfig {
    fn default() -> Self {
        KinepongConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
            tick_interval: Duration::from_millis(16),
            extractor: ExtractorSection::default(),
            world: WorldSection::default(),
            smoothing: SmoothingSection::default(),
            reconnect: ReconnectSection::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExtractorSection {
    fn default() -> Self {
        ExtractorSection {
            hand_min_visibility: DEFAULT_HAND_MIN_VISIBILITY,
            foot_min_visibility: DEFAULT_FOOT_MIN_VISIBILITY,
        }
    }
}

impl Default for WorldSection {
    fn default() -> Self {
        let resolver = ResolverConfig::default();
        WorldSection {
            width: resolver.world_width,
            height: resolver.world_height,
        }
    }
}

impl Default for SmoothingSection {
    fn default() -> Self {
        SmoothingSection {
            factor: DEFAULT_SMOOTHING_FACTOR,
            margin: DEFAULT_EDGE_MARGIN,
        }
    }
}

impl Default for ReconnectSection {
    fn default() -> Self {
        let policy = ReconnectPolicy::default();
        ReconnectSection {
            initial_delay: policy.initial_delay,
            max_delay: policy.max_delay,
            multiplier: policy.multiplier,
            jitter: policy.jitter,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl KinepongConfig {
    /// Read, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse without environment overrides or validation
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply `KINEPONG_ENDPOINT` and `KINEPONG_LOG`
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(filter) = non_empty(ENV_LOG) {
            self.logging.filter = filter;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.endpoint).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "world size must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        for (name, value) in [
            ("extractor.hand_min_visibility", self.extractor.hand_min_visibility),
            ("extractor.foot_min_visibility", self.extractor.foot_min_visibility),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if !(self.smoothing.factor > 0.0 && self.smoothing.factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "smoothing.factor must be in (0, 1], got {}",
                self.smoothing.factor
            )));
        }
        if !(self.smoothing.margin >= 0.0) {
            return Err(ConfigError::Invalid("smoothing.margin must be >= 0".into()));
        }
        if self.liveness_timeout.is_zero() {
            return Err(ConfigError::Invalid("liveness_timeout must be > 0".into()));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid("tick_interval must be > 0".into()));
        }
        if !(self.reconnect.multiplier >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "reconnect.multiplier must be >= 1, got {}",
                self.reconnect.multiplier
            )));
        }
        if self.reconnect.max_delay < self.reconnect.initial_delay {
            return Err(ConfigError::Invalid(
                "reconnect.max_delay must be >= reconnect.initial_delay".into(),
            ));
        }
        Ok(())
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            hand_min_visibility: self.extractor.hand_min_visibility,
            foot_min_visibility: self.extractor.foot_min_visibility,
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            world_width: self.world.width,
            world_height: self.world.height,
        }
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: self.reconnect.initial_delay,
            max_delay: self.reconnect.max_delay,
            multiplier: self.reconnect.multiplier,
            jitter: self.reconnect.jitter,
        }
    }

    pub fn smoother(&self) -> TargetSmoother {
        TargetSmoother::new(
            self.smoothing.factor,
            self.smoothing.margin,
            self.world.width,
            self.world.height,
        )
    }

    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            endpoint: self.endpoint.clone(),
            extractor: self.extractor_config(),
            resolver: self.resolver_config(),
            reconnect: self.reconnect_policy(),
            liveness_timeout: self.liveness_timeout,
        }
    }
}

/// Serde adapter for humantime duration strings
mod humantime_duration {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(text.trim()).map_err(de::Error::custom)
    }
}
