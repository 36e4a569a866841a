use crate::violation::ViolationStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use veritor_core::{RemediationExecutor, Severity, StepStatus, VeritorError, VeritorResult};

/// Result of one auto-remediation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationOutcome {
    pub violation_id: Uuid,
    /// Automated steps that completed in this attempt.
    pub executed_steps: usize,
    /// Description of the step that failed, if any.
    pub failed_step: Option<String>,
    /// Whether the violation is now resolved.
    pub resolved: bool,
}

/// Executes the automated steps of a violation's remediation plan.
///
/// Never touches critical violations: those always require a human, and a
/// call for one is rejected before any step runs. A step failure aborts the
/// remaining automated steps and leaves the violation unresolved.
///
/// Each step execution is bounded by `step_timeout`; an overrun counts as a
/// failed step, so a hung executor cannot pin the violation's record lock.
pub struct AutoRemediator {
    executor: Arc<dyn RemediationExecutor>,
    step_timeout: Duration,
}

impl AutoRemediator {
    pub fn new(executor: Arc<dyn RemediationExecutor>, step_timeout: Duration) -> Self {
        Self {
            executor,
            step_timeout,
        }
    }

    /// Run the automated steps of one violation's plan.
    ///
    /// The violation resolves only if afterwards every step of the plan,
    /// manual ones included, is completed.
    pub async fn remediate(
        &self,
        store: &ViolationStore,
        violation_id: Uuid,
    ) -> VeritorResult<RemediationOutcome> {
        let record = store.record(violation_id).ok_or_else(|| {
            VeritorError::Remediation(format!("Unknown violation '{violation_id}'"))
        })?;
        // Held across step execution: no concurrent attempt can interleave
        // on the same violation.
        let mut violation = record.write().await;

        if violation.severity == Severity::Critical {
            return Err(VeritorError::Remediation(format!(
                "Refusing to auto-remediate critical violation '{violation_id}'"
            )));
        }
        if violation.resolved {
            return Ok(RemediationOutcome {
                violation_id,
                executed_steps: 0,
                failed_step: None,
                resolved: true,
            });
        }

        let mut executed = 0usize;
        let mut failed_step: Option<String> = None;

        for index in 0..violation.remediation.steps.len() {
            let (automated, status) = {
                let step = &violation.remediation.steps[index];
                (step.automated, step.status)
            };
            if !automated || status == StepStatus::Completed {
                continue;
            }
            if failed_step.is_some() {
                violation.remediation.steps[index].status = StepStatus::Skipped;
                continue;
            }

            violation.remediation.steps[index].status = StepStatus::InProgress;
            let snapshot = violation.remediation.steps[index].clone();
            let result =
                tokio::time::timeout(self.step_timeout, self.executor.execute_step(&snapshot))
                    .await
                    .unwrap_or_else(|_| {
                        Err(VeritorError::Collaborator(format!(
                            "Remediation step '{}' timed out",
                            snapshot.description
                        )))
                    });
            match result {
                Ok(()) => {
                    let step = &mut violation.remediation.steps[index];
                    step.status = StepStatus::Completed;
                    step.completed_date = Some(Utc::now());
                    executed += 1;
                }
                Err(e) => {
                    warn!(
                        violation = %violation_id,
                        step = %snapshot.description,
                        error = %e,
                        "Remediation step failed, aborting remaining automated steps"
                    );
                    violation.remediation.steps[index].status = StepStatus::Failed;
                    failed_step = Some(snapshot.description);
                }
            }
        }

        let resolved = failed_step.is_none() && violation.remediation.all_steps_completed();
        if resolved {
            violation.resolved = true;
            violation.resolved_at = Some(Utc::now());
            info!(
                violation = %violation_id,
                steps = executed,
                "Violation auto-remediated"
            );
        }

        Ok(RemediationOutcome {
            violation_id,
            executed_steps: executed,
            failed_step,
            resolved,
        })
    }
}
