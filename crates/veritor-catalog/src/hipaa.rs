//! HIPAA catalog definition, centered on the Security and Breach
//! Notification Rules (45 CFR Parts 160 and 164).

use crate::types::{
    effective, AutomatedCheck, EvidenceFrequency, EvidenceRequirement, EvidenceType, Regulation,
    Requirement,
};
use veritor_core::{RequirementCategory, Severity};

/// Build the HIPAA regulation entry.
pub fn regulation() -> Regulation {
    Regulation::new(
        "hipaa",
        "Health Insurance Portability and Accountability Act",
        "2013 Omnibus",
        effective(2013, 9, 23),
        &["US"],
    )
    .with_requirement(
        Requirement::new(
            "hipaa-164-308",
            RequirementCategory::Governance,
            "Administrative safeguards: risk analysis, workforce training, contingency planning",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::RiskAssessment,
            "Enterprise risk analysis covering all systems handling PHI",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::TrainingRecord,
            "Workforce security training completion records",
            EvidenceFrequency::Annual,
        )),
    )
    .with_requirement(
        Requirement::new(
            "hipaa-164-310",
            RequirementCategory::Security,
            "Physical safeguards: facility access controls and workstation security",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Facility access control and media disposal policy",
            EvidenceFrequency::Annual,
        )),
    )
    .with_requirement(
        Requirement::new(
            "hipaa-164-312",
            RequirementCategory::Security,
            "Technical safeguards: access control, audit controls, transmission security",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::Configuration,
                "Encryption configuration for PHI at rest and in transit",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "System activity logs for PHI access",
                EvidenceFrequency::Continuous,
            )
            .automated(),
        )
        .with_check(AutomatedCheck::new(
            "hipaa-phi-access-anomalies",
            "Anomalous PHI access events",
            "0 0 1 * * * *",
            "phi_access_anomalies",
            0.0,
            Severity::High,
        )),
    )
    .with_requirement(
        Requirement::new(
            "hipaa-164-502",
            RequirementCategory::Privacy,
            "Uses and disclosures of PHI limited to the minimum necessary",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Minimum necessary policy with role-based disclosure limits",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::DataInventory,
            "Inventory of PHI disclosure flows",
            EvidenceFrequency::Quarterly,
        )),
    )
    .with_requirement(
        Requirement::new(
            "hipaa-164-524",
            RequirementCategory::Rights,
            "Individual right of access to PHI within 30 days",
        )
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
            "hipaa-164-404",
            RequirementCategory::Breach,
            "Breach notification to affected individuals within 60 days",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Procedure,
            "Breach notification procedure with escalation contacts",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::IncidentRecord,
            "Incident records with individual notification timestamps",
            EvidenceFrequency::Continuous,
        ))
        .with_check(AutomatedCheck::new(
            "hipaa-breach-notification-sla",
            "Breach notifications past the 60 day deadline",
            "0 0 5 * * * *",
            "phi_breach_notifications_overdue",
            0.0,
            Severity::Critical,
        )),
    )
}
