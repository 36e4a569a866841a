//! CCPA catalog definition (California Civil Code 1798.100 ff.), including
//! the CPRA amendments.

use crate::types::{
    effective, AutomatedCheck, EvidenceFrequency, EvidenceRequirement, EvidenceType, Regulation,
    Requirement,
};
use veritor_core::{RequirementCategory, Severity};

/// Build the CCPA regulation entry.
pub fn regulation() -> Regulation {
    Regulation::new(
        "ccpa",
        "California Consumer Privacy Act",
        "CPRA amended",
        effective(2020, 1, 1),
        &["US-CA"],
    )
    .with_requirement(
        Requirement::new(
            "ccpa-1798-100",
            RequirementCategory::Rights,
            "Right to know: disclose categories and specific pieces of collected information",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Procedure,
            "Consumer request intake and verification procedure",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "Request handling log with 45 day response tracking",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        ),
    )
    .with_requirement(
        Requirement::new(
            "ccpa-1798-105",
            RequirementCategory::Rights,
            "Right to delete personal information, with service provider propagation",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "Deletion request completion log including downstream processors",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        )
        .with_check(AutomatedCheck::new(
            "ccpa-deletion-backlog",
            "Deletion requests past the 45 day deadline",
            "0 0 7 * * * *",
            "deletion_requests_overdue",
            0.0,
            Severity::High,
        )),
    )
    .with_requirement(
        Requirement::new(
            "ccpa-1798-120",
            RequirementCategory::Privacy,
            "Right to opt out of sale or sharing of personal information",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::ConsentProof,
                "Opt-out preference records honored across processing systems",
                EvidenceFrequency::Continuous,
            )
            .automated(),
        ),
    )
    .with_requirement(
        Requirement::new(
            "ccpa-1798-130",
            RequirementCategory::Transparency,
            "Notice at collection and privacy policy disclosure duties",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Published privacy policy with required CCPA disclosures",
            EvidenceFrequency::Annual,
        )),
    )
    .with_requirement(
        Requirement::new(
            "ccpa-1798-150",
            RequirementCategory::Security,
            "Reasonable security procedures protecting personal information",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::RiskAssessment,
            "Security program assessment against a recognized framework",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::Configuration,
                "Encryption and redaction configuration for consumer records",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        ),
    )
}
