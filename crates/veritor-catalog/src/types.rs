use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use veritor_core::{RequirementCategory, Severity};

/// Kind of evidence that can satisfy an evidence requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Policy,
    Procedure,
    AuditLog,
    Configuration,
    AccessReview,
    TrainingRecord,
    TestResult,
    Certificate,
    RiskAssessment,
    IncidentRecord,
    DataInventory,
    ConsentProof,
}

impl std::fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EvidenceType::Policy => "policy",
            EvidenceType::Procedure => "procedure",
            EvidenceType::AuditLog => "audit_log",
            EvidenceType::Configuration => "configuration",
            EvidenceType::AccessReview => "access_review",
            EvidenceType::TrainingRecord => "training_record",
            EvidenceType::TestResult => "test_result",
            EvidenceType::Certificate => "certificate",
            EvidenceType::RiskAssessment => "risk_assessment",
            EvidenceType::IncidentRecord => "incident_record",
            EvidenceType::DataInventory => "data_inventory",
            EvidenceType::ConsentProof => "consent_proof",
        };
        write!(f, "{name}")
    }
}

/// How often a piece of evidence must be refreshed to stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceFrequency {
    Continuous,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

/// Declares what evidence satisfies a requirement and how often it is
/// collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRequirement {
    pub evidence_type: EvidenceType,
    pub description: String,
    pub frequency: EvidenceFrequency,
    /// Whether collection happens without a human in the loop.
    pub automated: bool,
}

impl EvidenceRequirement {
    /// Create a manually-collected evidence requirement.
    pub fn new(
        evidence_type: EvidenceType,
        description: impl Into<String>,
        frequency: EvidenceFrequency,
    ) -> Self {
        Self {
            evidence_type,
            description: description.into(),
            frequency,
            automated: false,
        }
    }

    /// Mark collection as automated.
    pub fn automated(mut self) -> Self {
        self.automated = true;
        self
    }
}

/// A scheduled, machine-evaluable test tied to a requirement.
///
/// A breach of `threshold` spawns a violation with this check's severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatedCheck {
    pub id: String,
    pub name: String,
    /// 7-field cron expression, evaluated in UTC.
    pub schedule: String,
    /// Query evaluated by the check probe, in the probe's own language.
    pub query: String,
    /// The check breaches when the observed value is strictly greater.
    pub threshold: f64,
    pub severity: Severity,
}

impl AutomatedCheck {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        schedule: impl Into<String>,
        query: impl Into<String>,
        threshold: f64,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schedule: schedule.into(),
            query: query.into(),
            threshold,
            severity,
        }
    }
}

/// An individually assessable obligation within a regulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub category: RequirementCategory,
    pub description: String,
    pub evidence_requirements: Vec<EvidenceRequirement>,
    pub automated_checks: Vec<AutomatedCheck>,
}

impl Requirement {
    pub fn new(
        id: impl Into<String>,
        category: RequirementCategory,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            description: description.into(),
            evidence_requirements: Vec::new(),
            automated_checks: Vec::new(),
        }
    }

    /// Add an evidence requirement.
    pub fn with_evidence(mut self, evidence: EvidenceRequirement) -> Self {
        self.evidence_requirements.push(evidence);
        self
    }

    /// Add an automated check.
    pub fn with_check(mut self, check: AutomatedCheck) -> Self {
        self.automated_checks.push(check);
        self
    }
}

/// A versioned regulatory framework definition. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regulation {
    pub id: String,
    pub name: String,
    pub version: String,
    pub effective_date: NaiveDate,
    pub jurisdictions: Vec<String>,
    pub requirements: Vec<Requirement>,
}

impl Regulation {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        effective_date: NaiveDate,
        jurisdictions: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            effective_date,
            jurisdictions: jurisdictions.iter().map(|j| (*j).to_string()).collect(),
            requirements: Vec::new(),
        }
    }

    /// Add a requirement.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Look up a requirement by id.
    pub fn requirement(&self, id: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.id == id)
    }

    /// All automated checks across all requirements, paired with the owning
    /// requirement id.
    pub fn checks(&self) -> impl Iterator<Item = (&Requirement, &AutomatedCheck)> {
        self.requirements
            .iter()
            .flat_map(|r| r.automated_checks.iter().map(move |c| (r, c)))
    }
}

/// Catalog dates are fixed constants; tests assert the expected values.
pub(crate) fn effective(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_builder() {
        let requirement = Requirement::new(
            "test-req",
            RequirementCategory::Security,
            "Encrypt data at rest",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::Configuration,
                "Encryption settings export",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        )
        .with_check(AutomatedCheck::new(
            "test-check",
            "Unencrypted stores",
            "0 0 3 * * * *",
            "count_unencrypted_stores",
            0.0,
            Severity::High,
        ));

        assert_eq!(requirement.evidence_requirements.len(), 1);
        assert!(requirement.evidence_requirements[0].automated);
        assert_eq!(requirement.automated_checks.len(), 1);
        assert_eq!(requirement.automated_checks[0].severity, Severity::High);
    }

    #[test]
    fn test_regulation_lookup() {
        let regulation = Regulation::new(
            "test-reg",
            "Test Regulation",
            "1.0",
            effective(2024, 1, 1),
            &["EU"],
        )
        .with_requirement(Requirement::new(
            "test-req",
            RequirementCategory::Privacy,
            "Minimize collected data",
        ));

        assert!(regulation.requirement("test-req").is_some());
        assert!(regulation.requirement("missing").is_none());
        assert_eq!(regulation.jurisdictions, vec!["EU".to_string()]);
    }

    #[test]
    fn test_checks_iterator_pairs_requirement() {
        let regulation = Regulation::new(
            "test-reg",
            "Test Regulation",
            "1.0",
            effective(2024, 1, 1),
            &["EU"],
        )
        .with_requirement(
            Requirement::new("req-a", RequirementCategory::Access, "Review grants")
                .with_check(AutomatedCheck::new(
                    "check-a",
                    "Stale grants",
                    "0 0 4 * * * *",
                    "stale_grants",
                    10.0,
                    Severity::Medium,
                )),
        );

        let pairs: Vec<_> = regulation.checks().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.id, "req-a");
        assert_eq!(pairs[0].1.id, "check-a");
    }

    #[test]
    fn test_evidence_type_display() {
        assert_eq!(EvidenceType::AccessReview.to_string(), "access_review");
        assert_eq!(EvidenceType::ConsentProof.to_string(), "consent_proof");
    }

    #[test]
    fn test_regulation_serialization_round_trip() {
        let regulation = Regulation::new(
            "test-reg",
            "Test Regulation",
            "1.0",
            effective(2024, 6, 15),
            &["US"],
        );
        let json = serde_json::to_string(&regulation).unwrap();
        let parsed: Regulation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, "test-reg");
        assert_eq!(parsed.effective_date, effective(2024, 6, 15));
    }
}
