use crate::assessment::{assess_requirement, compliance_level, RegulationStatus};
use crate::checks;
use crate::evidence::{CheckProbe, EvidenceCollector};
use crate::templates;
use chrono::Utc;
use cron::Schedule;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use veritor_catalog::{AutomatedCheck, Regulation, RegulationCatalog};
use veritor_core::{
    ComplianceEvent, Domain, DomainStatus, RemediationPlan, RequirementCategory, Severity,
    VeritorError, VeritorResult,
};

/// An automated check paired with the regulation and requirement it
/// belongs to, as handed to the scheduler.
#[derive(Debug, Clone)]
pub struct ScheduledCheck {
    pub regulation_id: String,
    pub requirement_id: String,
    pub check: AutomatedCheck,
}

/// Runs scheduled requirement assessments over the regulation catalog.
///
/// Assessments for one regulation never overlap: each regulation id owns a
/// mutex taken for the duration of its run. On-demand callers wait on it;
/// scheduled runs skip instead, so a slow run cannot queue up followers.
pub struct RegulatoryEngine {
    catalog: RegulationCatalog,
    collector: Arc<dyn EvidenceCollector>,
    probe: Arc<dyn CheckProbe>,
    statuses: RwLock<HashMap<String, RegulationStatus>>,
    assessment_locks: HashMap<String, Mutex<()>>,
    schedule: Schedule,
    collaborator_timeout: Duration,
}

impl RegulatoryEngine {
    /// Create an engine over the given catalog and collaborators.
    ///
    /// `assessment_schedule` is a 7-field cron expression used to stamp
    /// `next_audit` on produced statuses. Calls into the collector and
    /// probe are bounded by `collaborator_timeout`; a call that overruns
    /// it fails the assessment instead of holding the regulation lock.
    pub fn new(
        catalog: RegulationCatalog,
        collector: Arc<dyn EvidenceCollector>,
        probe: Arc<dyn CheckProbe>,
        assessment_schedule: &str,
        collaborator_timeout: Duration,
    ) -> VeritorResult<Self> {
        let schedule = Schedule::from_str(assessment_schedule).map_err(|e| {
            VeritorError::Schedule(format!(
                "Invalid assessment schedule '{assessment_schedule}': {e}"
            ))
        })?;
        let assessment_locks = catalog
            .ids()
            .into_iter()
            .map(|id| (id, Mutex::new(())))
            .collect();
        Ok(Self {
            catalog,
            collector,
            probe,
            statuses: RwLock::new(HashMap::new()),
            assessment_locks,
            schedule,
            collaborator_timeout,
        })
    }

    /// The catalog this engine assesses against.
    pub fn catalog(&self) -> &RegulationCatalog {
        &self.catalog
    }

    /// Run an assessment for one regulation, waiting if one is in flight.
    pub async fn run_assessment(&self, regulation_id: &str) -> VeritorResult<RegulationStatus> {
        let (regulation, lock) = self.regulation_and_lock(regulation_id)?;
        let _guard = lock.lock().await;
        self.assess_locked(&regulation).await
    }

    /// Run an assessment unless one is already in flight for this
    /// regulation, in which case skip and return `None`.
    ///
    /// Used by the scheduler: a slow run covers its cycle, the next cycle
    /// retries.
    pub async fn try_run_assessment(
        &self,
        regulation_id: &str,
    ) -> VeritorResult<Option<RegulationStatus>> {
        let (regulation, lock) = self.regulation_and_lock(regulation_id)?;
        match lock.try_lock() {
            Ok(_guard) => self.assess_locked(&regulation).await.map(Some),
            Err(_) => {
                warn!(
                    regulation = %regulation_id,
                    "Assessment already in progress, skipping this cycle"
                );
                Ok(None)
            }
        }
    }

    /// Assess every regulation in the catalog concurrently.
    pub async fn run_all_assessments(&self) -> Vec<(String, VeritorResult<RegulationStatus>)> {
        let futures: Vec<_> = self
            .catalog
            .ids()
            .into_iter()
            .map(|id| async move {
                let result = self.run_assessment(&id).await;
                (id, result)
            })
            .collect();
        futures_util::future::join_all(futures).await
    }

    /// Latest status for one regulation, if it has been assessed.
    pub async fn status(&self, regulation_id: &str) -> Option<RegulationStatus> {
        self.statuses.read().await.get(regulation_id).cloned()
    }

    /// All latest regulation statuses, ordered by regulation id.
    pub async fn all_statuses(&self) -> Vec<RegulationStatus> {
        let statuses = self.statuses.read().await;
        let mut all: Vec<RegulationStatus> = statuses.values().cloned().collect();
        all.sort_by(|a, b| a.regulation_id.cmp(&b.regulation_id));
        all
    }

    /// The regulatory domain signal for status aggregation: mean compliance
    /// level across assessed regulations, with per-regulation detail.
    ///
    /// Zero before the first assessment has run.
    pub async fn domain_status(&self) -> DomainStatus {
        let statuses = self.statuses.read().await;
        let score = if statuses.is_empty() {
            0.0
        } else {
            statuses.values().map(|s| s.compliance_level).sum::<f64>() / statuses.len() as f64
        };
        let mut status = DomainStatus::new(Domain::Regulatory, score);
        for (id, s) in statuses.iter() {
            status
                .details
                .insert(id.clone(), serde_json::json!(s.compliance_level));
        }
        status
    }

    /// All automated checks in the catalog, for the scheduler to drive.
    pub fn scheduled_checks(&self) -> Vec<ScheduledCheck> {
        let mut all: Vec<ScheduledCheck> = self
            .catalog
            .iter()
            .flat_map(|regulation| {
                regulation.checks().map(|(requirement, check)| ScheduledCheck {
                    regulation_id: regulation.id.clone(),
                    requirement_id: requirement.id.clone(),
                    check: check.clone(),
                })
            })
            .collect();
        all.sort_by(|a, b| a.check.id.cmp(&b.check.id));
        all
    }

    /// Observe one check and synthesize a violation event if it breaches.
    pub async fn evaluate_check(
        &self,
        scheduled: &ScheduledCheck,
    ) -> VeritorResult<Option<ComplianceEvent>> {
        let observed = tokio::time::timeout(
            self.collaborator_timeout,
            self.probe.observe(&scheduled.check),
        )
        .await
        .map_err(|_| {
            VeritorError::Collaborator(format!(
                "Observation for check '{}' timed out",
                scheduled.check.id
            ))
        })?
        .map_err(|e| {
            VeritorError::Assessment(format!(
                "Observation for check '{}' failed: {e}",
                scheduled.check.id
            ))
        })?;
        debug!(
            check = %scheduled.check.id,
            observed,
            threshold = scheduled.check.threshold,
            "Evaluated automated check"
        );
        Ok(checks::breach_event(
            &scheduled.regulation_id,
            &scheduled.requirement_id,
            &scheduled.check,
            observed,
        ))
    }

    /// Remediation plan template for a requirement, at the given priority.
    ///
    /// Falls back to a manual review plan when the requirement is not in
    /// the catalog (violations can reference external findings).
    pub fn remediation_template(
        &self,
        regulation_id: &str,
        requirement_id: &str,
        priority: Severity,
    ) -> RemediationPlan {
        let category = self
            .catalog
            .get(regulation_id)
            .and_then(|regulation| regulation.requirement(requirement_id).map(|r| r.category));
        match category {
            Some(category) => templates::remediation_plan(category, priority),
            None => templates::manual_review_plan(priority),
        }
    }

    /// Suggested mitigation strategies for risks in a category.
    pub fn mitigation_strategies(&self, category: RequirementCategory) -> Vec<String> {
        templates::mitigation_strategies(category)
    }

    fn regulation_and_lock(
        &self,
        regulation_id: &str,
    ) -> VeritorResult<(Arc<Regulation>, &Mutex<()>)> {
        let regulation = self.catalog.get(regulation_id).ok_or_else(|| {
            VeritorError::Config(format!("Unknown regulation '{regulation_id}'"))
        })?;
        let lock = self.assessment_locks.get(regulation_id).ok_or_else(|| {
            VeritorError::Config(format!("Unknown regulation '{regulation_id}'"))
        })?;
        Ok((regulation, lock))
    }

    async fn assess_locked(&self, regulation: &Regulation) -> VeritorResult<RegulationStatus> {
        debug!(regulation = %regulation.id, "Starting assessment");
        let evidence = tokio::time::timeout(
            self.collaborator_timeout,
            self.collector.collect(&regulation.id, &regulation.requirements),
        )
        .await
        .map_err(|_| {
            VeritorError::Collaborator(format!(
                "Evidence collection for '{}' timed out",
                regulation.id
            ))
        })?
        .map_err(|e| {
            VeritorError::Assessment(format!(
                "Evidence collection for '{}' failed: {e}",
                regulation.id
            ))
        })?;

        let requirements: Vec<_> = regulation
            .requirements
            .iter()
            .map(|requirement| {
                let collected = evidence
                    .get(&requirement.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                assess_requirement(requirement, collected)
            })
            .collect();

        let status = RegulationStatus {
            regulation_id: regulation.id.clone(),
            regulation_name: regulation.name.clone(),
            compliance_level: compliance_level(&requirements),
            requirements,
            last_audit: Utc::now(),
            next_audit: self.schedule.upcoming(Utc).next(),
        };

        info!(
            regulation = %regulation.id,
            level = status.compliance_level,
            gaps = status.gap_count(),
            "Assessment complete"
        );
        self.statuses
            .write()
            .await
            .insert(regulation.id.clone(), status.clone());
        Ok(status)
    }
}
