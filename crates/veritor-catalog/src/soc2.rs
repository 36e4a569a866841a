//! SOC 2 catalog definition based on the 2017 Trust Services Criteria.
//!
//! Requirement ids follow the common criteria (CC) series plus the
//! availability and confidentiality categories.

use crate::types::{
    effective, AutomatedCheck, EvidenceFrequency, EvidenceRequirement, EvidenceType, Regulation,
    Requirement,
};
use veritor_core::{RequirementCategory, Severity};

/// Build the SOC 2 regulation entry.
pub fn regulation() -> Regulation {
    Regulation::new(
        "soc2",
        "SOC 2 Trust Services Criteria",
        "2017 TSC",
        effective(2018, 12, 15),
        &["US", "Global"],
    )
    .with_requirement(
        Requirement::new(
            "soc2-cc1",
            RequirementCategory::Governance,
            "Control environment: integrity, board oversight, accountability structures",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Code of conduct and organizational chart with control ownership",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::TrainingRecord,
            "Annual ethics and security awareness training completion",
            EvidenceFrequency::Annual,
        )),
    )
    .with_requirement(
        Requirement::new(
            "soc2-cc6",
            RequirementCategory::Access,
            "Logical and physical access controls: provisioning, least privilege, revocation",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AccessReview,
                "Quarterly review of privileged account grants",
                EvidenceFrequency::Quarterly,
            )
            .automated(),
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Procedure,
            "Joiner, mover, leaver provisioning procedure",
            EvidenceFrequency::Annual,
        ))
        .with_check(AutomatedCheck::new(
            "soc2-stale-grants",
            "Access grants unused for 90 days",
            "0 0 4 * * * *",
            "stale_privileged_grants",
            0.0,
            Severity::Medium,
        )),
    )
    .with_requirement(
        Requirement::new(
            "soc2-cc7",
            RequirementCategory::Security,
            "System operations: anomaly detection, incident response, recovery",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "Security monitoring alert log with triage outcomes",
                EvidenceFrequency::Continuous,
            )
            .automated(),
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::IncidentRecord,
            "Incident postmortems with remediation actions",
            EvidenceFrequency::Quarterly,
        ))
        .with_check(AutomatedCheck::new(
            "soc2-unresolved-alerts",
            "Security alerts unresolved beyond SLA",
            "0 30 * * * * *",
            "security_alerts_over_sla",
            5.0,
            Severity::High,
        )),
    )
    .with_requirement(
        Requirement::new(
            "soc2-cc8",
            RequirementCategory::Governance,
            "Change management: authorized, tested, approved changes",
        )
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::AuditLog,
                "Deployment log with linked approvals",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        ),
    )
    .with_requirement(
        Requirement::new(
            "soc2-a1",
            RequirementCategory::Security,
            "Availability: capacity management, backup, and disaster recovery",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::TestResult,
            "Disaster recovery exercise results",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(
            EvidenceRequirement::new(
                EvidenceType::Configuration,
                "Backup configuration and restore verification",
                EvidenceFrequency::Monthly,
            )
            .automated(),
        ),
    )
    .with_requirement(
        Requirement::new(
            "soc2-c1",
            RequirementCategory::Retention,
            "Confidentiality: identification, retention, and disposal of confidential information",
        )
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::Policy,
            "Data classification and retention policy",
            EvidenceFrequency::Annual,
        ))
        .with_evidence(EvidenceRequirement::new(
            EvidenceType::AuditLog,
            "Disposal log for expired confidential records",
            EvidenceFrequency::Quarterly,
        )),
    )
}
