//! Environment-based configuration with validated defaults for every tunable
//! the rest of the system reads at startup: topic retention, scheduler
//! cadence, risk decay, resilience thresholds, and the HTTP/metrics ports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    InvalidEnvironment(String),
    InvalidValue { var: String, value: String },
    ValidationError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(env) => write!(f, "invalid environment: {env}"),
            Self::InvalidValue { var, value } => write!(f, "invalid value for {var}: {value}"),
            Self::ValidationError(msg) => write!(f, "configuration validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Deployment environment. Only affects default log verbosity; no config
/// section in this crate varies its validation rules by environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// # Errors
    ///
    /// Returns an error if `s` is not a recognized environment name.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Default topic shape, per spec.md's `Topic` type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub default_num_partitions: u32,
    pub default_retention_ms: i64,
    pub retention_sweep_interval_secs: u64,
}

impl TopicConfig {
    /// # Errors
    ///
    /// Returns an error if any field is non-positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_num_partitions == 0 {
            return Err(ConfigError::ValidationError("default_num_partitions must be > 0".to_string()));
        }
        if self.default_retention_ms <= 0 {
            return Err(ConfigError::ValidationError("default_retention_ms must be > 0".to_string()));
        }
        if self.retention_sweep_interval_secs == 0 {
            return Err(ConfigError::ValidationError("retention_sweep_interval_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            default_num_partitions: 4,
            default_retention_ms: 3_600_000,
            retention_sweep_interval_secs: 60,
        }
    }
}

/// Default cadence for an `AgentScheduler` when an agent doesn't override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub scan_interval_ms: u64,
    pub event_acceleration_threshold: usize,
}

impl SchedulerConfig {
    /// # Errors
    ///
    /// Returns an error if `scan_interval_ms` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval_ms == 0 {
            return Err(ConfigError::ValidationError("scan_interval_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { scan_interval_ms: 30_000, event_acceleration_threshold: 10 }
    }
}

/// Risk-profile decay parameters (spec.md's 30-day half-life).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub decay_half_life_days: f64,
}

impl RiskConfig {
    /// # Errors
    ///
    /// Returns an error if `decay_half_life_days` is non-positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decay_half_life_days <= 0.0 {
            return Err(ConfigError::ValidationError("decay_half_life_days must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self { decay_half_life_days: 30.0 }
    }
}

/// Circuit breaker defaults shared by the completion/ML boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    pub circuit_breaker_threshold: usize,
    pub circuit_breaker_timeout_secs: u64,
    pub max_retries: usize,
}

impl ResilienceConfig {
    /// # Errors
    ///
    /// Returns an error if any field is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.circuit_breaker_threshold == 0 {
            return Err(ConfigError::ValidationError("circuit_breaker_threshold must be > 0".to_string()));
        }
        if self.circuit_breaker_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("circuit_breaker_timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn circuit_breaker_timeout(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_timeout_secs)
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self { circuit_breaker_threshold: 5, circuit_breaker_timeout_secs: 60, max_retries: 3 }
    }
}

/// Server and metrics endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080, metrics_enabled: true, metrics_port: 9090 }
    }
}

/// Observability configuration (log level only; metrics are under
/// `ServerConfig` since they share the process's bound ports).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl ObservabilityConfig {
    /// # Errors
    ///
    /// Returns an error if `log_level` isn't a recognized tracing level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "invalid log_level: {}. Must be one of: {}",
                self.log_level,
                valid.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

/// Whole-system configuration, loaded from environment variables with
/// validated defaults for everything left unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub topics: TopicConfig,
    pub scheduler: SchedulerConfig,
    pub risk: RiskConfig,
    pub resilience: ResilienceConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `FRAUDGUARD_ENV`, `FRAUDGUARD_PORT`,
    /// `FRAUDGUARD_METRICS_PORT`, `FRAUDGUARD_LOG_LEVEL`,
    /// `FRAUDGUARD_SCAN_INTERVAL_MS`, `FRAUDGUARD_ACCELERATION_THRESHOLD`,
    /// `FRAUDGUARD_TOPIC_RETENTION_MS`, `FRAUDGUARD_RISK_HALF_LIFE_DAYS`.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable can't be parsed, or if the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match std::env::var("FRAUDGUARD_ENV") {
            Ok(value) => Environment::parse(&value)?,
            Err(_) => Environment::Development,
        };

        let mut config = Self {
            environment,
            server: ServerConfig::default(),
            topics: TopicConfig::default(),
            scheduler: SchedulerConfig::default(),
            risk: RiskConfig::default(),
            resilience: ResilienceConfig::default(),
            observability: ObservabilityConfig {
                log_level: if environment.is_production() { "warn".to_string() } else { "info".to_string() },
            },
        };

        parse_env_override("FRAUDGUARD_PORT", &mut config.server.port)?;
        parse_env_override("FRAUDGUARD_METRICS_PORT", &mut config.server.metrics_port)?;
        parse_env_override("FRAUDGUARD_SCAN_INTERVAL_MS", &mut config.scheduler.scan_interval_ms)?;
        parse_env_override("FRAUDGUARD_ACCELERATION_THRESHOLD", &mut config.scheduler.event_acceleration_threshold)?;
        parse_env_override("FRAUDGUARD_TOPIC_RETENTION_MS", &mut config.topics.default_retention_ms)?;
        parse_env_override("FRAUDGUARD_RISK_HALF_LIFE_DAYS", &mut config.risk.decay_half_life_days)?;

        if let Ok(level) = std::env::var("FRAUDGUARD_LOG_LEVEL") {
            config.observability.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error from the first section whose invariants don't hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topics.validate()?;
        self.scheduler.validate()?;
        self.risk.validate()?;
        self.resilience.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            topics: TopicConfig::default(),
            scheduler: SchedulerConfig::default(),
            risk: RiskConfig::default(),
            resilience: ResilienceConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn parse_env_override<T: std::str::FromStr>(var: &str, slot: &mut T) -> Result<(), ConfigError> {
    if let Ok(value) = std::env::var(var) {
        *slot = value.parse().map_err(|_| ConfigError::InvalidValue { var: var.to_string(), value })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_common_aliases() {
        assert_eq!(Environment::parse("dev").unwrap(), Environment::Development);
        assert_eq!(Environment::parse("PRODUCTION").unwrap(), Environment::Production);
        assert!(Environment::parse("nope").is_err());
    }

    #[test]
    fn default_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn topic_config_rejects_zero_retention() {
        let mut topics = TopicConfig::default();
        topics.default_retention_ms = 0;
        assert!(topics.validate().is_err());
    }

    #[test]
    fn risk_config_rejects_non_positive_half_life() {
        let mut risk = RiskConfig::default();
        risk.decay_half_life_days = 0.0;
        assert!(risk.validate().is_err());
    }

    #[test]
    fn observability_config_rejects_unknown_log_level() {
        let config = ObservabilityConfig { log_level: "verbose".to_string() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn resilience_config_timeout_converts_to_duration() {
        let config = ResilienceConfig::default();
        assert_eq!(config.circuit_breaker_timeout(), Duration::from_secs(60));
    }
}
