use crate::error::{VeritorError, VeritorResult};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment, used as a closed set of override points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Weights applied to each domain score when computing the overall score.
///
/// Must sum to 1.0; validated at load time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_privacy_weight")]
    pub privacy: f64,
    #[serde(default = "default_access_weight")]
    pub access: f64,
    #[serde(default = "default_governance_weight")]
    pub governance: f64,
    #[serde(default = "default_security_weight")]
    pub security: f64,
    #[serde(default = "default_regulatory_weight")]
    pub regulatory: f64,
}

fn default_privacy_weight() -> f64 {
    0.25
}

fn default_access_weight() -> f64 {
    0.20
}

fn default_governance_weight() -> f64 {
    0.20
}

fn default_security_weight() -> f64 {
    0.25
}

fn default_regulatory_weight() -> f64 {
    0.10
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            privacy: default_privacy_weight(),
            access: default_access_weight(),
            governance: default_governance_weight(),
            security: default_security_weight(),
            regulatory: default_regulatory_weight(),
        }
    }
}

impl ScoreWeights {
    /// Sum of all five weights.
    pub fn sum(&self) -> f64 {
        self.privacy + self.access + self.governance + self.security + self.regulatory
    }
}

/// Engine configuration.
///
/// Every field has a serde default so a partial TOML file is accepted;
/// environment-specific values are applied through [`ComplianceConfig::for_environment`]
/// rather than ad-hoc struct spreading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    #[serde(default = "default_environment")]
    pub environment: Environment,
    /// Seconds between real-time monitoring refreshes.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Maximum age of the cached status before a query triggers a refresh.
    #[serde(default = "default_status_max_age_secs")]
    pub status_max_age_secs: u64,
    /// Per-call timeout for collaborator I/O, in milliseconds.
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,
    /// Whether non-critical violations may be remediated automatically.
    #[serde(default)]
    pub auto_remediation: bool,
    /// Cron schedule driving per-regulation assessment timers.
    #[serde(default = "default_assessment_schedule")]
    pub assessment_schedule: String,
    #[serde(default)]
    pub weights: ScoreWeights,
    /// Directory for persisted reports and metric snapshots.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Directory for the append-only audit trail.
    #[serde(default = "default_audit_dir")]
    pub audit_dir: PathBuf,
    /// Number of metric snapshots retained for trend computation.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_status_max_age_secs() -> u64 {
    600
}

fn default_collaborator_timeout_ms() -> u64 {
    5_000
}

fn default_assessment_schedule() -> String {
    // Weekly, Monday 01:00 UTC (7-field: sec min hour dom month dow year).
    "0 0 1 * * Mon *".to_string()
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from("audit")
}

fn default_history_limit() -> usize {
    96
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            refresh_interval_secs: default_refresh_interval_secs(),
            status_max_age_secs: default_status_max_age_secs(),
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
            auto_remediation: false,
            assessment_schedule: default_assessment_schedule(),
            weights: ScoreWeights::default(),
            report_dir: default_report_dir(),
            audit_dir: default_audit_dir(),
            history_limit: default_history_limit(),
        }
    }
}

impl ComplianceConfig {
    /// Defaults adjusted for the given environment.
    ///
    /// Development shortens intervals for fast feedback and assesses daily;
    /// production uses the conservative defaults with a longer status cache.
    pub fn for_environment(environment: Environment) -> Self {
        let base = Self::default();
        match environment {
            Environment::Development => Self {
                environment,
                refresh_interval_secs: 30,
                status_max_age_secs: 60,
                collaborator_timeout_ms: 2_000,
                // Daily 01:00 UTC.
                assessment_schedule: "0 0 1 * * * *".to_string(),
                ..base
            },
            Environment::Staging => Self {
                environment,
                refresh_interval_secs: 120,
                status_max_age_secs: 300,
                ..base
            },
            Environment::Production => Self {
                environment,
                status_max_age_secs: 900,
                ..base
            },
        }
    }

    /// Parse a TOML document into a config.
    pub fn from_toml_str(content: &str) -> VeritorResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| VeritorError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_toml_file(path: &Path) -> VeritorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VeritorError::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check internal consistency: weight sum, non-zero intervals, and a
    /// parseable assessment schedule.
    pub fn validate(&self) -> VeritorResult<()> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(VeritorError::Config(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        if self.refresh_interval_secs == 0 {
            return Err(VeritorError::Config(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.collaborator_timeout_ms == 0 {
            return Err(VeritorError::Config(
                "collaborator_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.history_limit == 0 {
            return Err(VeritorError::Config(
                "history_limit must be greater than zero".to_string(),
            ));
        }
        Schedule::from_str(&self.assessment_schedule).map_err(|e| {
            VeritorError::Config(format!(
                "Invalid assessment schedule '{}': {}",
                self.assessment_schedule, e
            ))
        })?;
        Ok(())
    }

    /// Collaborator timeout as a [`Duration`].
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    /// Refresh interval as a [`Duration`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Maximum cached status age as a [`chrono::Duration`].
    pub fn status_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.status_max_age_secs as i64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ComplianceConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.auto_remediation);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = ScoreWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_environment_overrides() {
        let dev = ComplianceConfig::for_environment(Environment::Development);
        assert_eq!(dev.refresh_interval_secs, 30);
        assert!(dev.validate().is_ok());

        let staging = ComplianceConfig::for_environment(Environment::Staging);
        assert_eq!(staging.refresh_interval_secs, 120);

        let prod = ComplianceConfig::for_environment(Environment::Production);
        assert_eq!(prod.refresh_interval_secs, 300);
        assert_eq!(prod.status_max_age_secs, 900);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = ComplianceConfig::from_toml_str(
            r#"
environment = "production"
auto_remediation = true
"#,
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.auto_remediation);
        // Unspecified fields take defaults.
        assert_eq!(config.refresh_interval_secs, 300);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let result = ComplianceConfig::from_toml_str(
            r#"
[weights]
privacy = 0.5
access = 0.5
governance = 0.5
security = 0.5
regulatory = 0.5
"#,
        );
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("sum to 1.0"), "unexpected error: {message}");
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        let result = ComplianceConfig::from_toml_str(r#"assessment_schedule = "not a cron""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = ComplianceConfig::from_toml_str("refresh_interval_secs = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = ComplianceConfig::from_toml_str("{{{{not toml");
        assert!(result.is_err());
    }
}
