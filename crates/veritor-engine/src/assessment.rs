use crate::evidence::{Evidence, EvidenceRef};
use crate::templates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use veritor_catalog::Requirement;
use veritor_core::{RemediationPlan, RequirementCategory, Severity};

/// Assessment outcome for a single requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceState {
    Compliant,
    Partial,
    NonCompliant,
    NotApplicable,
}

impl ComplianceState {
    /// Weight this state contributes to the regulation compliance level.
    pub fn weight(&self) -> f64 {
        match self {
            ComplianceState::Compliant | ComplianceState::NotApplicable => 1.0,
            ComplianceState::Partial => 0.5,
            ComplianceState::NonCompliant => 0.0,
        }
    }
}

impl std::fmt::Display for ComplianceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceState::Compliant => write!(f, "compliant"),
            ComplianceState::Partial => write!(f, "partial"),
            ComplianceState::NonCompliant => write!(f, "non_compliant"),
            ComplianceState::NotApplicable => write!(f, "not_applicable"),
        }
    }
}

/// Latest assessment outcome for one requirement. Superseded wholesale on
/// each reassessment, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementStatus {
    pub requirement_id: String,
    pub state: ComplianceState,
    pub evidence: Vec<EvidenceRef>,
    pub gaps: Vec<String>,
    pub remediation_plan: Option<RemediationPlan>,
    pub assessed_at: DateTime<Utc>,
}

/// Assessment outcome for a whole regulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationStatus {
    pub regulation_id: String,
    pub regulation_name: String,
    /// 0–100, weighted over requirement states.
    pub compliance_level: f64,
    pub requirements: Vec<RequirementStatus>,
    pub last_audit: DateTime<Utc>,
    pub next_audit: Option<DateTime<Utc>>,
}

impl RegulationStatus {
    /// Total number of open gaps across all requirements.
    pub fn gap_count(&self) -> usize {
        self.requirements.iter().map(|r| r.gaps.len()).sum()
    }

    /// Ids of requirements currently assessed non-compliant.
    pub fn non_compliant_ids(&self) -> Vec<&str> {
        self.requirements
            .iter()
            .filter(|r| r.state == ComplianceState::NonCompliant)
            .map(|r| r.requirement_id.as_str())
            .collect()
    }
}

/// Severity of the gaps on a requirement in the given state.
///
/// Deterministic classification: security failures are critical, subject
/// rights failures are high, any other failure is medium, and a partial
/// state is always low.
pub fn gap_severity(category: RequirementCategory, state: ComplianceState) -> Severity {
    match (category, state) {
        (RequirementCategory::Security, ComplianceState::NonCompliant) => Severity::Critical,
        (RequirementCategory::Rights, ComplianceState::NonCompliant) => Severity::High,
        (_, ComplianceState::NonCompliant) => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Assess one requirement against the evidence collected for it.
///
/// A requirement with no declared evidence is not applicable. Otherwise
/// every declared evidence type missing from the collection becomes a gap;
/// zero gaps is compliant, fewer gaps than half the declared types is
/// partial, anything else is non-compliant.
pub fn assess_requirement(requirement: &Requirement, evidence: &[Evidence]) -> RequirementStatus {
    let assessed_at = Utc::now();

    if requirement.evidence_requirements.is_empty() {
        return RequirementStatus {
            requirement_id: requirement.id.clone(),
            state: ComplianceState::NotApplicable,
            evidence: Vec::new(),
            gaps: Vec::new(),
            remediation_plan: None,
            assessed_at,
        };
    }

    let gaps: Vec<String> = requirement
        .evidence_requirements
        .iter()
        .filter(|er| !evidence.iter().any(|e| e.evidence_type == er.evidence_type))
        .map(|er| format!("Missing evidence: {} ({})", er.evidence_type, er.description))
        .collect();

    let declared = requirement.evidence_requirements.len() as f64;
    let state = if gaps.is_empty() {
        ComplianceState::Compliant
    } else if (gaps.len() as f64) < declared / 2.0 {
        ComplianceState::Partial
    } else {
        ComplianceState::NonCompliant
    };

    let severity = gap_severity(requirement.category, state);
    let remediation_plan = if !gaps.is_empty() && severity >= Severity::High {
        Some(templates::remediation_plan(requirement.category, severity))
    } else {
        None
    };

    RequirementStatus {
        requirement_id: requirement.id.clone(),
        state,
        evidence: evidence.iter().map(EvidenceRef::from).collect(),
        gaps,
        remediation_plan,
        assessed_at,
    }
}

/// Compliance level over a set of requirement statuses, 0–100.
pub fn compliance_level(statuses: &[RequirementStatus]) -> f64 {
    if statuses.is_empty() {
        return 100.0;
    }
    let total: f64 = statuses.iter().map(|s| s.state.weight()).sum();
    (100.0 * total / statuses.len() as f64).round()
}
