use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use veritor_core::{Domain, Severity};
use veritor_engine::RegulationStatus;
use veritor_lifecycle::{ComplianceRisk, ComplianceViolation};

/// What a recommendation asks the organization to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ResolveCriticalViolations,
    MitigateHighRisks,
    ImprovementProgram,
    DegradedData,
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationKind::ResolveCriticalViolations => write!(f, "resolve_critical_violations"),
            RecommendationKind::MitigateHighRisks => write!(f, "mitigate_high_risks"),
            RecommendationKind::ImprovementProgram => write!(f, "improvement_program"),
            RecommendationKind::DegradedData => write!(f, "degraded_data"),
        }
    }
}

/// An actionable recommendation synthesized during status aggregation.
///
/// Regenerated fresh on every recompute, never accumulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRecommendation {
    pub priority: Severity,
    pub kind: RecommendationKind,
    pub message: String,
}

/// Point-in-time compliance snapshot, the single source of truth.
///
/// Immutable once published; each recompute replaces the whole snapshot so
/// readers never see fields from two different passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceStatus {
    pub timestamp: DateTime<Utc>,
    /// Weighted score over all domains, 0–100.
    pub overall_score: f64,
    pub regulations: Vec<RegulationStatus>,
    /// Open violations at snapshot time.
    pub violations: Vec<ComplianceViolation>,
    /// Open risks at snapshot time.
    pub risks: Vec<ComplianceRisk>,
    pub recommendations: Vec<ComplianceRecommendation>,
    /// Domains whose collaborator failed during this recompute.
    pub degraded_domains: Vec<Domain>,
}

impl ComplianceStatus {
    /// The pre-first-refresh snapshot. Timestamped at the epoch so any
    /// staleness check refreshes it immediately.
    pub fn empty() -> Self {
        Self {
            timestamp: DateTime::<Utc>::MIN_UTC,
            overall_score: 0.0,
            regulations: Vec::new(),
            violations: Vec::new(),
            risks: Vec::new(),
            recommendations: Vec::new(),
            degraded_domains: Vec::new(),
        }
    }

    /// Whether this snapshot is older than `max_age`.
    pub fn is_stale(&self, max_age: chrono::Duration) -> bool {
        Utc::now() - self.timestamp > max_age
    }

    /// Open critical violations in this snapshot.
    pub fn critical_violations(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Critical)
            .count()
    }
}
