use serde::{Deserialize, Serialize};

/// Severity of a violation, gap, or finding.
///
/// Ordered so that `Low < Medium < High < Critical`, which lets callers use
/// comparison operators for threshold rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Category of a regulatory requirement.
///
/// Closed enum so the gap-severity classification and remediation-template
/// lookup can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementCategory {
    /// Technical and organizational security measures.
    Security,
    /// Data subject rights (access, erasure, portability).
    Rights,
    /// Lawfulness, consent, and data minimization.
    Privacy,
    /// Accountability, records, and oversight structures.
    Governance,
    /// Authorization and access management controls.
    Access,
    /// Retention and disposal obligations.
    Retention,
    /// Notices, disclosures, and communication duties.
    Transparency,
    /// Breach detection and notification duties.
    Breach,
}

impl std::fmt::Display for RequirementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequirementCategory::Security => "security",
            RequirementCategory::Rights => "rights",
            RequirementCategory::Privacy => "privacy",
            RequirementCategory::Governance => "governance",
            RequirementCategory::Access => "access",
            RequirementCategory::Retention => "retention",
            RequirementCategory::Transparency => "transparency",
            RequirementCategory::Breach => "breach",
        };
        write!(f, "{name}")
    }
}
