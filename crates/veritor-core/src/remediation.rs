use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action taken by a remediation step.
///
/// The automatable subset is fixed: anything outside it requires a human,
/// regardless of how the plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationAction {
    UpdateAccessControl,
    ApplyEncryption,
    DeleteData,
    UpdateRetentionPolicy,
    EnableLogging,
    ApplyPatch,
    ReviewPolicy,
    NotifyAuthority,
    TrainStaff,
    ManualReview,
}

impl RemediationAction {
    /// Whether this action may be executed without a human in the loop.
    pub fn automatable(&self) -> bool {
        matches!(
            self,
            RemediationAction::UpdateAccessControl
                | RemediationAction::ApplyEncryption
                | RemediationAction::DeleteData
                | RemediationAction::UpdateRetentionPolicy
                | RemediationAction::EnableLogging
                | RemediationAction::ApplyPatch
        )
    }
}

/// Execution status of a single remediation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

/// One step within a remediation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationStep {
    pub description: String,
    pub action: RemediationAction,
    /// Set from [`RemediationAction::automatable`] when the plan is built.
    pub automated: bool,
    pub status: StepStatus,
    pub due_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
}

impl RemediationStep {
    /// Create a pending step; `automated` is derived from the action.
    pub fn new(description: impl Into<String>, action: RemediationAction, due_date: DateTime<Utc>) -> Self {
        Self {
            description: description.into(),
            action,
            automated: action.automatable(),
            status: StepStatus::Pending,
            due_date,
            completed_date: None,
        }
    }
}

/// A remediation plan attached to a violation or a requirement gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationPlan {
    pub id: Uuid,
    pub steps: Vec<RemediationStep>,
    pub estimated_completion: DateTime<Utc>,
    pub assigned_to: String,
    pub priority: Severity,
}

impl RemediationPlan {
    /// Create a plan over the given steps; estimated completion is the
    /// latest step due date (or now for an empty plan).
    pub fn new(steps: Vec<RemediationStep>, assigned_to: impl Into<String>, priority: Severity) -> Self {
        let estimated_completion = steps
            .iter()
            .map(|s| s.due_date)
            .max()
            .unwrap_or_else(Utc::now);
        Self {
            id: Uuid::new_v4(),
            steps,
            estimated_completion,
            assigned_to: assigned_to.into(),
            priority,
        }
    }

    /// Whether every step in the plan has completed.
    pub fn all_steps_completed(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    /// Whether every step in the plan is automatable.
    pub fn fully_automated(&self) -> bool {
        self.steps.iter().all(|s| s.automated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_automatable_set() {
        assert!(RemediationAction::UpdateAccessControl.automatable());
        assert!(RemediationAction::ApplyEncryption.automatable());
        assert!(RemediationAction::DeleteData.automatable());
        assert!(RemediationAction::UpdateRetentionPolicy.automatable());
        assert!(RemediationAction::EnableLogging.automatable());
        assert!(RemediationAction::ApplyPatch.automatable());

        assert!(!RemediationAction::ReviewPolicy.automatable());
        assert!(!RemediationAction::NotifyAuthority.automatable());
        assert!(!RemediationAction::TrainStaff.automatable());
        assert!(!RemediationAction::ManualReview.automatable());
    }

    #[test]
    fn test_step_derives_automated_flag() {
        let due = Utc::now();
        let auto = RemediationStep::new("rotate keys", RemediationAction::ApplyEncryption, due);
        assert!(auto.automated);
        assert_eq!(auto.status, StepStatus::Pending);

        let manual = RemediationStep::new("notify DPA", RemediationAction::NotifyAuthority, due);
        assert!(!manual.automated);
    }

    #[test]
    fn test_plan_estimated_completion_is_latest_due_date() {
        let near = Utc::now() + chrono::Duration::days(3);
        let far = Utc::now() + chrono::Duration::days(14);
        let plan = RemediationPlan::new(
            vec![
                RemediationStep::new("enable logging", RemediationAction::EnableLogging, far),
                RemediationStep::new("patch service", RemediationAction::ApplyPatch, near),
            ],
            "security-team",
            Severity::High,
        );
        assert_eq!(plan.estimated_completion, far);
        assert!(plan.fully_automated());
        assert!(!plan.all_steps_completed());
    }

    #[test]
    fn test_all_steps_completed() {
        let due = Utc::now();
        let mut plan = RemediationPlan::new(
            vec![RemediationStep::new("delete data", RemediationAction::DeleteData, due)],
            "privacy-team",
            Severity::Medium,
        );
        plan.steps[0].status = StepStatus::Completed;
        plan.steps[0].completed_date = Some(Utc::now());
        assert!(plan.all_steps_completed());
    }
}
