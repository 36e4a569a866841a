//! Remediation plan templates and mitigation strategies, keyed by
//! requirement category.

use chrono::{Duration, Utc};
use veritor_core::{
    RemediationAction, RemediationPlan, RemediationStep, RequirementCategory, Severity,
};

/// Team a remediation plan for this category is assigned to.
fn owner(category: RequirementCategory) -> &'static str {
    match category {
        RequirementCategory::Security | RequirementCategory::Breach => "security-team",
        RequirementCategory::Privacy
        | RequirementCategory::Rights
        | RequirementCategory::Transparency => "privacy-team",
        RequirementCategory::Governance | RequirementCategory::Retention => "governance-team",
        RequirementCategory::Access => "platform-team",
    }
}

fn step(description: &str, action: RemediationAction, due_in_days: i64) -> RemediationStep {
    RemediationStep::new(description, action, Utc::now() + Duration::days(due_in_days))
}

/// Build the remediation plan template for a requirement category.
///
/// Step order matters: automated containment first, process fixes after.
pub fn remediation_plan(category: RequirementCategory, priority: Severity) -> RemediationPlan {
    let steps = match category {
        RequirementCategory::Security => vec![
            step("Apply outstanding security patches", RemediationAction::ApplyPatch, 7),
            step("Enable encryption on affected stores", RemediationAction::ApplyEncryption, 14),
            step("Review the information security policy", RemediationAction::ReviewPolicy, 30),
        ],
        RequirementCategory::Rights => vec![
            step("Triage overdue data subject requests", RemediationAction::ManualReview, 3),
            step("Complete overdue erasures", RemediationAction::DeleteData, 7),
        ],
        RequirementCategory::Privacy => vec![
            step("Delete data lacking a lawful basis", RemediationAction::DeleteData, 14),
            step("Review processing purposes against policy", RemediationAction::ReviewPolicy, 30),
        ],
        RequirementCategory::Governance => vec![
            step("Review and reapprove governance policies", RemediationAction::ReviewPolicy, 14),
            step("Run refresher training for control owners", RemediationAction::TrainStaff, 30),
        ],
        RequirementCategory::Access => vec![
            step("Revoke stale and excessive grants", RemediationAction::UpdateAccessControl, 7),
            step("Review privileged account inventory", RemediationAction::ManualReview, 14),
        ],
        RequirementCategory::Retention => vec![
            step("Update retention schedules to policy", RemediationAction::UpdateRetentionPolicy, 14),
            step("Delete records past their retention date", RemediationAction::DeleteData, 30),
        ],
        RequirementCategory::Transparency => vec![
            step("Update public notices and disclosures", RemediationAction::ReviewPolicy, 14),
            step("Train staff on disclosure duties", RemediationAction::TrainStaff, 30),
        ],
        RequirementCategory::Breach => vec![
            step("Notify the supervisory authority", RemediationAction::NotifyAuthority, 1),
            step("Enable detection logging on affected systems", RemediationAction::EnableLogging, 7),
            step("Review the breach response procedure", RemediationAction::ReviewPolicy, 14),
        ],
    };
    RemediationPlan::new(steps, owner(category), priority)
}

/// A minimal fallback plan for findings outside the catalog.
pub fn manual_review_plan(priority: Severity) -> RemediationPlan {
    RemediationPlan::new(
        vec![step("Investigate and remediate the reported finding", RemediationAction::ManualReview, 7)],
        "governance-team",
        priority,
    )
}

/// Mitigation strategies suggested for risks in this category.
pub fn mitigation_strategies(category: RequirementCategory) -> Vec<String> {
    let strategies: &[&str] = match category {
        RequirementCategory::Security => &[
            "Increase monitoring coverage on affected systems",
            "Introduce compensating network segmentation",
            "Shorten the patch window for exposed services",
        ],
        RequirementCategory::Rights => &[
            "Automate fulfilment of high-volume request types",
            "Add deadline alerting on open subject requests",
        ],
        RequirementCategory::Privacy => &[
            "Reduce collected fields to the documented purpose",
            "Introduce periodic consent revalidation",
        ],
        RequirementCategory::Governance => &[
            "Assign a named owner per control",
            "Add control health to the management review agenda",
        ],
        RequirementCategory::Access => &[
            "Move privileged access behind just-in-time grants",
            "Automate deprovisioning on role change",
        ],
        RequirementCategory::Retention => &[
            "Automate deletion at end of retention",
            "Tag records with retention class at creation",
        ],
        RequirementCategory::Transparency => &[
            "Version public notices and review on each processing change",
        ],
        RequirementCategory::Breach => &[
            "Run breach response exercises twice a year",
            "Pre-draft authority notification templates",
        ],
    };
    strategies.iter().map(|s| (*s).to_string()).collect()
}
