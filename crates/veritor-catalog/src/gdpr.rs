//! GDPR (EU 2016/679) catalog definition.
//!
//! Requirement ids follow the article numbering; the selection covers the
//! articles an assessment can meaningfully evidence, not the full text.

use crate::types::{
    effective, AutomatedCheck, EvidenceFrequency, EvidenceRequirement, EvidenceType, Regulation,
    Requirement,
};
use veritor_core::{RequirementCategory, Severity};

/// Build the GDPR regulation entry.
pub fn regulation() -> Regulation {
    Regulation::new(
        "gdpr",
        "General Data Protection Regulation",
        "2016/679",
        effective(2018, 5, 25),
        &["EU", "EEA"],
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-5",
            RequirementCategory::Privacy,
            "Principles relating to processing: lawfulness, purpose limitation, data minimisation",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Data processing policy covering all Article 5 principles",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::DataInventory,
            "Inventory of processing purposes per data category",
            EvidenceFrequency::Quarterly,
        )),
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-7",
            RequirementCategory::Privacy,
            "Conditions for consent: demonstrable, specific, withdrawable",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::ConsentProof,
                "Consent records with timestamp and purpose for active subjects",
                EvidenceFrequency::Continuous,
            )
            .automated(),
        )
        .with_check(AutomatedCheck::new(
            "gdpr-consent-coverage",
            "Processing without recorded consent",
            "0 0 2 * * * *",
            "subjects_processed_without_consent",
            0.0,
            Severity::High,
        )),
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-15",
            RequirementCategory::Rights,
            "Right of access: subjects can obtain their data within one month",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Procedure,
            "Documented subject access request procedure",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "Access request handling log with response times",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        ),
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-17",
            RequirementCategory::Rights,
            "Right to erasure: personal data deleted without undue delay on request",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "Erasure request completion log",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        )
        .with_check(AutomatedCheck::new(
            "gdpr-erasure-backlog",
            "Erasure requests past the statutory deadline",
            "0 0 6 * * * *",
            "erasure_requests_overdue",
            0.0,
            Severity::High,
        )),
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-25",
            RequirementCategory::Governance,
            "Data protection by design and by default",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Procedure,
            "Privacy review step in the change management process",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::RiskAssessment,
            "Data protection impact assessments for high-risk processing",
            EvidenceFrequency::Quarterly,
        )),
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-30",
            RequirementCategory::Governance,
            "Records of processing activities maintained and current",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::DataInventory,
            "Article 30 register of processing activities",
            EvidenceFrequency::Quarterly,
        )),
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-32",
            RequirementCategory::Security,
            "Security of processing: encryption, confidentiality, resilience, testing",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Information security policy",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::Configuration,
                "Encryption configuration for stores holding personal data",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::TestResult,
            "Results of regular security testing",
            EvidenceFrequency::Quarterly,
        ))
        .with_check(AutomatedCheck::new(
            "gdpr-encryption-coverage",
            "Personal data stores without encryption at rest",
            "0 0 3 * * * *",
            "unencrypted_personal_data_stores",
            0.0,
            Severity::Critical,
        )),
    )
    .with_requirement(
        Requirement::new(
            "gdpr-art-33",
            RequirementCategory::Breach,
            "Breach notification to the supervisory authority within 72 hours",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Procedure,
            "Breach response procedure naming the notification owner",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::IncidentRecord,
            "Incident records with notification timestamps",
            EvidenceFrequency::Continuous,
        ))
        .with_check(AutomatedCheck::new(
            "gdpr-breach-notification-sla",
            "Breach notifications past the 72 hour deadline",
            "0 0 * * * * *",
            "breach_notifications_overdue",
            0.0,
            Severity::Critical,
        )),
    )
}
