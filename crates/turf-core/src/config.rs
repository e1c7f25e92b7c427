//! Configuration loading and typed config structures for the engine.
//!
//! The canonical configuration lives in `turf-config.yaml` at the project
//! root. Game-balance numbers (decay steps, tension weights, effect
//! durations) are configuration, not architecture: they live here so
//! operators can retune them without touching engine code.

use serde::Deserialize;
use std::path::Path;
use turf_types::EffectType;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `turf-config.yaml`. All fields default to
/// workable values so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// World-level settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Regions seeded at startup.
    #[serde(default)]
    pub regions: Vec<RegionSeed>,

    /// Periodic worker intervals.
    #[serde(default)]
    pub workers: WorkerConfig,

    /// Aggregation tuning.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Decay tuning.
    #[serde(default)]
    pub decay: DecayConfig,

    /// Effect catalog timing overrides.
    #[serde(default)]
    pub effects: Vec<EffectOverride>,

    /// Infrastructure connection settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DATABASE_URL` in the environment overrides
    /// `infrastructure.database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
        }
    }
}

/// A region to create at world setup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionSeed {
    /// District name.
    pub name: String,
    /// Default policing level, 0-100.
    #[serde(default = "default_baseline")]
    pub base_police: i64,
    /// Default economic strength, 0-100.
    #[serde(default = "default_baseline")]
    pub base_economy: i64,
}

/// Periodic worker intervals, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkerConfig {
    /// Interval between aggregation sweeps.
    #[serde(default = "default_aggregation_interval_secs")]
    pub aggregation_interval_secs: u64,
    /// Interval between decay sweeps. Also the idle threshold: only
    /// regions untouched for at least this long are decayed.
    #[serde(default = "default_decay_interval_secs")]
    pub decay_interval_secs: u64,
    /// Interval between trigger evaluation / expiry sweeps.
    #[serde(default = "default_trigger_interval_secs")]
    pub trigger_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            aggregation_interval_secs: default_aggregation_interval_secs(),
            decay_interval_secs: default_decay_interval_secs(),
            trigger_interval_secs: default_trigger_interval_secs(),
        }
    }
}

/// Aggregation tuning parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggregationConfig {
    /// Maximum events folded per region per tick; leftovers drain on
    /// the next tick.
    #[serde(default = "default_max_events_per_batch")]
    pub max_events_per_batch: usize,
    /// Trailing window for the crew-tension recomputation, in hours.
    #[serde(default = "default_tension_window_hours")]
    pub tension_window_hours: i64,
    /// Tension points contributed per qualifying conflict event.
    #[serde(default = "default_tension_per_conflict")]
    pub tension_per_conflict: i64,
    /// Minimum severity for a conflict event to count toward tension.
    #[serde(default = "default_tension_min_severity")]
    pub tension_min_severity: u8,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_events_per_batch: default_max_events_per_batch(),
            tension_window_hours: default_tension_window_hours(),
            tension_per_conflict: default_tension_per_conflict(),
            tension_min_severity: default_tension_min_severity(),
        }
    }
}

/// Decay tuning parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecayConfig {
    /// Points that crime index and police presence move toward 50 per
    /// decay interval (never overshooting).
    #[serde(default = "default_metric_step")]
    pub metric_step: i64,
    /// Points subtracted from heat level per interval, floored at 0.
    #[serde(default = "default_heat_step")]
    pub heat_step: i64,
    /// Points subtracted from crew tension per interval, floored at 0.
    #[serde(default = "default_tension_step")]
    pub tension_step: i64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            metric_step: default_metric_step(),
            heat_step: default_heat_step(),
            tension_step: default_tension_step(),
        }
    }
}

/// Overrides the timing of one catalog effect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EffectOverride {
    /// The effect to override.
    pub effect_type: EffectType,
    /// New duration in seconds, if set.
    #[serde(default)]
    pub duration_secs: Option<i64>,
    /// New cooldown in seconds, if set.
    #[serde(default)]
    pub cooldown_secs: Option<i64>,
}

/// Infrastructure connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` URL for durable event history and snapshots.
    /// `None` disables persistence (in-memory only).
    #[serde(default)]
    pub database_url: Option<String>,
    /// Bind address for the observer HTTP server.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: default_bind_addr(),
        }
    }
}

impl InfrastructureConfig {
    /// Apply environment variable overrides (`DATABASE_URL`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database_url = Some(url);
            }
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_world_name() -> String {
    String::from("turf")
}

const fn default_baseline() -> i64 {
    50
}

const fn default_aggregation_interval_secs() -> u64 {
    60
}

const fn default_decay_interval_secs() -> u64 {
    3600
}

const fn default_trigger_interval_secs() -> u64 {
    300
}

const fn default_max_events_per_batch() -> usize {
    256
}

const fn default_tension_window_hours() -> i64 {
    24
}

const fn default_tension_per_conflict() -> i64 {
    25
}

const fn default_tension_min_severity() -> u8 {
    7
}

const fn default_metric_step() -> i64 {
    5
}

const fn default_heat_step() -> i64 {
    10
}

const fn default_tension_step() -> i64 {
    10
}

fn default_bind_addr() -> String {
    String::from("0.0.0.0:8420")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = EngineConfig::parse("{}").unwrap();
        assert_eq!(config.workers.decay_interval_secs, 3600);
        assert_eq!(config.aggregation.max_events_per_batch, 256);
        assert_eq!(config.decay.metric_step, 5);
        assert!(config.regions.is_empty());
    }

    #[test]
    fn region_seeds_parse() {
        let yaml = r"
world:
  name: testville
regions:
  - name: Dockside
    base_police: 30
    base_economy: 40
  - name: Uptown
";
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "testville");
        assert_eq!(config.regions.len(), 2);
        let dockside = config.regions.first().unwrap();
        assert_eq!(dockside.base_police, 30);
        let uptown = config.regions.get(1).unwrap();
        assert_eq!(uptown.base_police, 50);
    }

    #[test]
    fn effect_overrides_parse() {
        let yaml = r"
effects:
  - effect_type: PoliceCrackdown
    duration_secs: 7200
";
        let config = EngineConfig::parse(yaml).unwrap();
        let over = config.effects.first().unwrap();
        assert_eq!(over.effect_type, EffectType::PoliceCrackdown);
        assert_eq!(over.duration_secs, Some(7200));
        assert_eq!(over.cooldown_secs, None);
    }
}
