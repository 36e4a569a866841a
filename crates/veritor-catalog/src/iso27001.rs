//! ISO/IEC 27001:2022 catalog definition.
//!
//! Covers the Annex A control themes plus the clause 6 and clause 9
//! management system obligations.

use crate::types::{
    effective, AutomatedCheck, EvidenceFrequency, EvidenceRequirement, EvidenceType, Regulation,
    Requirement,
};
use veritor_core::{RequirementCategory, Severity};

/// Build the ISO 27001 regulation entry.
pub fn regulation() -> Regulation {
    Regulation::new(
        "iso27001",
        "ISO/IEC 27001 Information Security Management",
        "2022",
        effective(2022, 10, 25),
        &["Global"],
    )
    .with_requirement(
        Requirement::new(
            "iso27001-clause-6",
            RequirementCategory::Governance,
            "Risk assessment and treatment planning (clause 6.1)",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::RiskAssessment,
            "Information security risk assessment with treatment plan",
            EvidenceFrequency::Annual,
        )),
    )
    .with_requirement(
        Requirement::new(
            "iso27001-clause-9",
            RequirementCategory::Governance,
            "Performance evaluation: internal audit and management review (clause 9)",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Certificate,
            "Internal audit report and management review minutes",
            EvidenceFrequency::Annual,
        )),
    )
    .with_requirement(
        Requirement::new(
            "iso27001-a5",
            RequirementCategory::Governance,
            "Organizational controls: policies, roles, supplier relationships (Annex A.5)",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Approved information security policy set",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::DataInventory,
            "Asset and information classification inventory",
            EvidenceFrequency::Quarterly,
        )),
    )
    .with_requirement(
        Requirement::new(
            "iso27001-a6",
            RequirementCategory::Governance,
            "People controls: screening, awareness, disciplinary process (Annex A.6)",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::TrainingRecord,
            "Security awareness training records for all staff",
            EvidenceFrequency::Annual,
        )),
    )
    .with_requirement(
        Requirement::new(
            "iso27001-a8",
            RequirementCategory::Security,
            "Technological controls: endpoint, crypto, logging, vulnerability management (Annex A.8)",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::Configuration,
                "Hardening and cryptographic configuration baselines",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "Centralized security event logs",
                EvidenceFrequency::Continuous,
            )
            .automated(),
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::TestResult,
            "Vulnerability scan and penetration test results",
            EvidenceFrequency::Quarterly,
        ))
        .with_check(AutomatedCheck::new(
            "iso27001-patch-latency",
            "Critical vulnerabilities unpatched past SLA",
            "0 0 8 * * * *",
            "critical_vulnerabilities_over_sla",
            0.0,
            Severity::High,
        )),
    )
}
