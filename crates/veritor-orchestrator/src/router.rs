use crate::aggregator::{CollaboratorSet, StatusAggregator};
use crate::audit::AuditTrail;
use crate::metrics::ComplianceMetrics;
use crate::notify::{Notification, NotificationHub};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use veritor_core::{
    ComplianceEvent, DataRequest, DataRequestOutcome, RequirementCategory, Severity, VeritorError,
    VeritorResult,
};
use veritor_engine::RegulatoryEngine;
use veritor_lifecycle::{AutoRemediator, ComplianceRisk, ComplianceViolation, RiskStore, ViolationStore};

/// Routes compliance events to their handlers.
///
/// Every event is audit-logged before any handler runs, so the trail is
/// complete even when a handler fails partway. Handlers mutate the stores
/// and notify; they never fail the route for collaborator errors, which are
/// logged and absorbed. Only the data request path propagates errors, since
/// its caller is waiting on the outcome.
///
/// Every collaborator call is bounded by `collaborator_timeout`; an overrun
/// reads as a collaborator error, so a hung collaborator cannot wedge the
/// route.
pub struct EventRouter {
    collaborators: CollaboratorSet,
    engine: Arc<RegulatoryEngine>,
    aggregator: Arc<StatusAggregator>,
    violations: Arc<ViolationStore>,
    risks: Arc<RiskStore>,
    remediator: AutoRemediator,
    audit: Arc<AuditTrail>,
    hub: Arc<NotificationHub>,
    metrics: Arc<ComplianceMetrics>,
    auto_remediation: bool,
    collaborator_timeout: Duration,
}

impl EventRouter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        collaborators: CollaboratorSet,
        engine: Arc<RegulatoryEngine>,
        aggregator: Arc<StatusAggregator>,
        violations: Arc<ViolationStore>,
        risks: Arc<RiskStore>,
        remediator: AutoRemediator,
        audit: Arc<AuditTrail>,
        hub: Arc<NotificationHub>,
        metrics: Arc<ComplianceMetrics>,
        auto_remediation: bool,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            collaborators,
            engine,
            aggregator,
            violations,
            risks,
            remediator,
            audit,
            hub,
            metrics,
            auto_remediation,
            collaborator_timeout,
        }
    }

    async fn bounded<T>(
        &self,
        label: &str,
        call: impl Future<Output = VeritorResult<T>>,
    ) -> VeritorResult<T> {
        tokio::time::timeout(self.collaborator_timeout, call)
            .await
            .map_err(|_| VeritorError::Collaborator(format!("{label} timed out")))?
    }

    /// Route one event through audit logging and its handler.
    pub async fn route(&self, event: ComplianceEvent) -> VeritorResult<()> {
        self.audit.record_event(&event);
        self.metrics.incr_events_routed().await;

        match event {
            ComplianceEvent::BreachDetected {
                source,
                description,
                affected_systems,
                detected_at,
            } => {
                self.handle_breach(source, description, affected_systems, detected_at)
                    .await;
                Ok(())
            }
            ComplianceEvent::ViolationDetected {
                regulation,
                requirement,
                severity,
                description,
                affected_data,
            } => {
                self.handle_violation(regulation, requirement, severity, description, affected_data)
                    .await;
                Ok(())
            }
            ComplianceEvent::ControlFailed {
                control_id,
                category,
                impact,
                description,
            } => {
                self.handle_control_failed(control_id, category, impact, description)
                    .await;
                Ok(())
            }
            ComplianceEvent::ConsentWithdrawn {
                subject_id,
                purpose,
            } => {
                self.handle_consent_withdrawn(subject_id, purpose).await;
                Ok(())
            }
            ComplianceEvent::DataRequest { request } => {
                self.process_data_request(request).await.map(|_| ())
            }
            ComplianceEvent::PolicyUpdated { policy_id, summary } => {
                debug!(policy = %policy_id, summary, "Policy update recorded");
                Ok(())
            }
            ComplianceEvent::TrainingCompleted { subject_id, course } => {
                debug!(subject = %subject_id, course, "Training completion recorded");
                Ok(())
            }
        }
    }

    /// Record a violation with its remediation plan and notify.
    ///
    /// Critical violations always raise an alert and are never
    /// auto-remediated, whatever the configuration says.
    async fn handle_violation(
        &self,
        regulation: String,
        requirement: String,
        severity: Severity,
        description: String,
        affected_data: Vec<String>,
    ) {
        let plan = self
            .engine
            .remediation_template(&regulation, &requirement, severity);
        let violation = ComplianceViolation::new(
            regulation.clone(),
            requirement,
            severity,
            description.clone(),
            affected_data,
            plan,
        );
        let violation_id = self.violations.insert(violation);
        self.metrics.incr_violations_detected().await;
        info!(
            %violation_id,
            regulation,
            %severity,
            "Recorded compliance violation"
        );

        self.hub
            .emit(Notification::ViolationDetected {
                violation_id,
                regulation: regulation.clone(),
                severity,
            })
            .await;

        if severity == Severity::Critical {
            self.hub
                .emit(Notification::CriticalViolation {
                    violation_id,
                    regulation,
                    description,
                })
                .await;
            return;
        }

        if self.auto_remediation {
            self.metrics.incr_remediations_attempted().await;
            match self.remediator.remediate(&self.violations, violation_id).await {
                Ok(outcome) if outcome.resolved => {
                    self.hub
                        .emit(Notification::RemediationCompleted {
                            violation_id,
                            steps: outcome.executed_steps,
                        })
                        .await;
                }
                Ok(outcome) => {
                    if let Some(failed_step) = outcome.failed_step {
                        self.metrics.incr_remediations_failed().await;
                        self.hub
                            .emit(Notification::RemediationFailed {
                                violation_id,
                                failed_step,
                            })
                            .await;
                    } else {
                        info!(
                            %violation_id,
                            executed = outcome.executed_steps,
                            "Automated steps done, manual steps remain"
                        );
                    }
                }
                Err(e) => {
                    self.metrics.incr_remediations_failed().await;
                    warn!(%violation_id, "Auto-remediation error: {e}");
                }
            }
        }
    }

    /// Contain the breach, then force a status recompute so the published
    /// snapshot reflects the incident.
    async fn handle_breach(
        &self,
        source: String,
        description: String,
        affected_systems: Vec<String>,
        detected_at: DateTime<Utc>,
    ) {
        info!(
            source,
            %detected_at,
            affected = affected_systems.len(),
            "Containing reported breach"
        );
        self.hub
            .emit(Notification::IncidentOpened {
                source,
                description: description.clone(),
            })
            .await;

        if let Err(e) = self
            .bounded(
                "Breach containment",
                self.collaborators
                    .security
                    .contain_breach(&description, &affected_systems),
            )
            .await
        {
            warn!("Breach containment failed: {e}");
        }

        self.aggregator.refresh().await;
    }

    /// High-impact control failures become tracked risks with a review
    /// scheduled; lower impacts stay in the audit trail only.
    async fn handle_control_failed(
        &self,
        control_id: String,
        category: RequirementCategory,
        impact: Severity,
        description: String,
    ) {
        if impact < Severity::High {
            debug!(control = %control_id, %impact, "Control failure below risk threshold");
            return;
        }

        let impact_band = if impact == Severity::Critical { 5 } else { 4 };
        let risk = ComplianceRisk::new(
            category,
            format!("Control '{control_id}' failed: {description}"),
            4,
            impact_band,
        );
        let risk_score = risk.risk_score;
        let risk_id = self.risks.insert(risk);
        info!(%risk_id, control = %control_id, risk_score, "Recorded risk from failed control");

        self.hub
            .emit(Notification::RiskIdentified {
                risk_id,
                category,
                risk_score,
            })
            .await;

        if let Err(e) = self
            .bounded(
                "Control review scheduling",
                self.collaborators
                    .governance
                    .schedule_control_review(&control_id, &description),
            )
            .await
        {
            warn!(control = %control_id, "Failed to schedule control review: {e}");
        }
    }

    async fn handle_consent_withdrawn(&self, subject_id: String, purpose: String) {
        info!(subject = %subject_id, purpose, "Processing consent withdrawal");

        if let Err(e) = self
            .bounded(
                "Subject data restriction",
                self.collaborators.privacy.restrict_subject_data(&subject_id),
            )
            .await
        {
            warn!(subject = %subject_id, "Failed to restrict subject data: {e}");
        }

        match self
            .bounded(
                "Grant revocation",
                self.collaborators.access.revoke_grants(&subject_id),
            )
            .await
        {
            Ok(revoked) => info!(subject = %subject_id, revoked, "Revoked grants for subject"),
            Err(e) => warn!(subject = %subject_id, "Failed to revoke grants: {e}"),
        }
    }

    /// Validate and process a data subject request.
    ///
    /// Returns `Ok(None)` when validation rejects the request; collaborator
    /// errors propagate because the submitter is waiting on the result.
    pub async fn process_data_request(
        &self,
        request: DataRequest,
    ) -> VeritorResult<Option<DataRequestOutcome>> {
        let validation = self
            .bounded(
                "Data request validation",
                self.collaborators.privacy.validate_data_request(&request),
            )
            .await?;

        if !validation.valid {
            let reason = validation.reason.unwrap_or_else(|| "unspecified".into());
            warn!(request = %request.id, reason, "Rejected data subject request");
            self.audit.record(
                "data_request_rejected",
                serde_json::json!({
                    "request_id": request.id,
                    "subject_id": request.subject_id,
                    "reason": reason,
                }),
            );
            return Ok(None);
        }

        let outcome = self
            .bounded(
                "Data request processing",
                self.collaborators.privacy.process_data_request(&request),
            )
            .await?;
        self.audit.record(
            "data_request_processed",
            serde_json::json!({
                "request_id": outcome.request_id,
                "completed": outcome.completed,
            }),
        );
        info!(request = %request.id, completed = outcome.completed, "Processed data subject request");
        Ok(Some(outcome))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use veritor_catalog::{Regulation, RegulationCatalog, Requirement};
    use veritor_core::{
        DataRequestKind, Domain, DomainStatus, GovernanceCollaborator, PrivacyCollaborator,
        RemediationExecutor, RemediationStep, RequestValidation, ScoreWeights, SecurityCollaborator,
        VeritorError,
    };
    use veritor_core::AccessCollaborator;
    use veritor_engine::{CheckProbe, Evidence, EvidenceCollector};

    struct NullCollector;

    #[async_trait]
    impl EvidenceCollector for NullCollector {
        async fn collect(
            &self,
            _regulation_id: &str,
            _requirements: &[Requirement],
        ) -> VeritorResult<HashMap<String, Vec<Evidence>>> {
            Ok(HashMap::new())
        }
    }

    struct NullProbe;

    #[async_trait]
    impl CheckProbe for NullProbe {
        async fn observe(&self, _check: &veritor_catalog::AutomatedCheck) -> VeritorResult<f64> {
            Ok(0.0)
        }
    }

    #[derive(Default)]
    struct CountingPrivacy {
        restrictions: AtomicUsize,
        reject_requests: bool,
    }

    #[async_trait]
    impl PrivacyCollaborator for CountingPrivacy {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Privacy, 90.0))
        }

        async fn validate_data_request(
            &self,
            _request: &DataRequest,
        ) -> VeritorResult<RequestValidation> {
            if self.reject_requests {
                Ok(RequestValidation::invalid("unknown subject"))
            } else {
                Ok(RequestValidation::valid())
            }
        }

        async fn process_data_request(
            &self,
            request: &DataRequest,
        ) -> VeritorResult<DataRequestOutcome> {
            Ok(DataRequestOutcome {
                request_id: request.id,
                completed: true,
                summary: "export delivered".into(),
            })
        }

        async fn restrict_subject_data(&self, _subject_id: &str) -> VeritorResult<()> {
            self.restrictions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingAccess {
        revocations: AtomicUsize,
    }

    #[async_trait]
    impl AccessCollaborator for CountingAccess {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Access, 90.0))
        }

        async fn revoke_grants(&self, _subject_id: &str) -> VeritorResult<u32> {
            self.revocations.fetch_add(1, Ordering::SeqCst);
            Ok(3)
        }

        async fn authorize(&self, _subject_id: &str, _purpose: &str) -> VeritorResult<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct CountingGovernance {
        reviews: AtomicUsize,
    }

    #[async_trait]
    impl GovernanceCollaborator for CountingGovernance {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Governance, 90.0))
        }

        async fn schedule_control_review(&self, _control_id: &str, _note: &str) -> VeritorResult<()> {
            self.reviews.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingSecurity {
        containments: AtomicUsize,
    }

    #[async_trait]
    impl SecurityCollaborator for CountingSecurity {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Security, 90.0))
        }

        async fn contain_breach(
            &self,
            _description: &str,
            _affected_systems: &[String],
        ) -> VeritorResult<()> {
            self.containments.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Executes every step, failing those whose description matches.
    struct ScriptedExecutor {
        calls: AtomicUsize,
        fail_on: Mutex<Option<String>>,
    }

    impl ScriptedExecutor {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Mutex::new(None),
            }
        }

        fn fail_on(self, description: &str) -> Self {
            *self.fail_on.lock() = Some(description.to_string());
            self
        }
    }

    #[async_trait]
    impl RemediationExecutor for ScriptedExecutor {
        async fn execute_step(&self, step: &RemediationStep) -> VeritorResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.lock().as_deref() == Some(step.description.as_str()) {
                return Err(VeritorError::Remediation(format!(
                    "step '{}' failed",
                    step.description
                )));
            }
            Ok(())
        }
    }

    struct Harness {
        router: EventRouter,
        privacy: Arc<CountingPrivacy>,
        access: Arc<CountingAccess>,
        governance: Arc<CountingGovernance>,
        security: Arc<CountingSecurity>,
        executor: Arc<ScriptedExecutor>,
        violations: Arc<ViolationStore>,
        risks: Arc<RiskStore>,
        aggregator: Arc<StatusAggregator>,
        metrics: Arc<ComplianceMetrics>,
        _dir: tempfile::TempDir,
    }

    fn catalog() -> RegulationCatalog {
        let effective = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let regulation = Regulation::new("corp", "Corporate Baseline", "1.0", effective, &["Global"])
            .with_requirement(Requirement::new(
                "corp-ret-1",
                RequirementCategory::Retention,
                "Retention schedules enforced",
            ))
            .with_requirement(Requirement::new(
                "corp-sec-1",
                RequirementCategory::Security,
                "Production systems hardened",
            ));
        RegulationCatalog::empty().with_regulation(regulation)
    }

    fn harness(auto_remediation: bool, executor: ScriptedExecutor) -> Harness {
        let privacy = Arc::new(CountingPrivacy::default());
        let access = Arc::new(CountingAccess::default());
        let governance = Arc::new(CountingGovernance::default());
        let security = Arc::new(CountingSecurity::default());
        let executor = Arc::new(executor);
        let collaborators = CollaboratorSet {
            privacy: Arc::clone(&privacy) as Arc<dyn PrivacyCollaborator>,
            access: Arc::clone(&access) as Arc<dyn AccessCollaborator>,
            governance: Arc::clone(&governance) as Arc<dyn GovernanceCollaborator>,
            security: Arc::clone(&security) as Arc<dyn SecurityCollaborator>,
        };

        let engine = Arc::new(
            RegulatoryEngine::new(
                catalog(),
                Arc::new(NullCollector),
                Arc::new(NullProbe),
                "0 0 1 * * Mon *",
                Duration::from_millis(200),
            )
            .unwrap(),
        );
        let violations = Arc::new(ViolationStore::new());
        let risks = Arc::new(RiskStore::new());
        let hub = Arc::new(NotificationHub::new());
        let metrics = Arc::new(ComplianceMetrics::new());
        let aggregator = Arc::new(StatusAggregator::new(
            collaborators.clone(),
            Arc::clone(&engine),
            Arc::clone(&violations),
            Arc::clone(&risks),
            ScoreWeights::default(),
            Duration::from_millis(200),
            Arc::clone(&hub),
            Arc::clone(&metrics),
        ));
        let dir = tempfile::tempdir().unwrap();
        let audit = Arc::new(AuditTrail::new(dir.path().to_path_buf()));

        let router = EventRouter::new(
            collaborators,
            engine,
            Arc::clone(&aggregator),
            Arc::clone(&violations),
            Arc::clone(&risks),
            AutoRemediator::new(
                Arc::clone(&executor) as Arc<dyn RemediationExecutor>,
                Duration::from_millis(200),
            ),
            audit,
            hub,
            Arc::clone(&metrics),
            auto_remediation,
            Duration::from_millis(200),
        );

        Harness {
            router,
            privacy,
            access,
            governance,
            security,
            executor,
            violations,
            risks,
            aggregator,
            metrics,
            _dir: dir,
        }
    }

    fn violation_event(requirement: &str, severity: Severity) -> ComplianceEvent {
        ComplianceEvent::ViolationDetected {
            regulation: "corp".into(),
            requirement: requirement.into(),
            severity,
            description: "observed drift".into(),
            affected_data: vec![],
        }
    }

    #[tokio::test]
    async fn test_violation_recorded_with_catalog_plan() {
        let h = harness(false, ScriptedExecutor::new());
        h.router
            .route(violation_event("corp-sec-1", Severity::High))
            .await
            .unwrap();

        let open = h.violations.open_violations().await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].remediation.assigned_to, "security-team");
        assert_eq!(open[0].remediation.priority, Severity::High);
        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.metrics.snapshot().await.violations_detected, 1);
    }

    #[tokio::test]
    async fn test_auto_remediation_resolves_fully_automated_plan() {
        let h = harness(true, ScriptedExecutor::new());
        // The retention template is fully automated: both steps run and the
        // violation resolves in the same route call.
        h.router
            .route(violation_event("corp-ret-1", Severity::High))
            .await
            .unwrap();

        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 2);
        assert!(h.violations.open_violations().await.is_empty());
        assert_eq!(h.violations.len(), 1);
        assert_eq!(h.metrics.snapshot().await.remediations_attempted, 1);
        assert_eq!(h.metrics.snapshot().await.remediations_failed, 0);
    }

    #[tokio::test]
    async fn test_failed_step_leaves_violation_open() {
        let executor = ScriptedExecutor::new().fail_on("Delete records past their retention date");
        let h = harness(true, executor);
        h.router
            .route(violation_event("corp-ret-1", Severity::Medium))
            .await
            .unwrap();

        let open = h.violations.open_violations().await;
        assert_eq!(open.len(), 1);
        assert_eq!(h.metrics.snapshot().await.remediations_failed, 1);
    }

    #[tokio::test]
    async fn test_critical_violation_never_auto_remediated() {
        let h = harness(true, ScriptedExecutor::new());
        h.router
            .route(violation_event("corp-sec-1", Severity::Critical))
            .await
            .unwrap();

        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.violations.open_violations().await.len(), 1);
        assert_eq!(h.metrics.snapshot().await.remediations_attempted, 0);
    }

    #[tokio::test]
    async fn test_unknown_requirement_gets_manual_review_plan() {
        let h = harness(false, ScriptedExecutor::new());
        h.router
            .route(ComplianceEvent::ViolationDetected {
                regulation: "external-audit".into(),
                requirement: "finding-7".into(),
                severity: Severity::Medium,
                description: "external finding".into(),
                affected_data: vec![],
            })
            .await
            .unwrap();

        let open = h.violations.open_violations().await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].remediation.assigned_to, "governance-team");
        assert_eq!(open[0].remediation.steps.len(), 1);
    }

    #[tokio::test]
    async fn test_breach_contains_and_refreshes_status() {
        let h = harness(false, ScriptedExecutor::new());
        h.router
            .route(ComplianceEvent::BreachDetected {
                source: "ids".into(),
                description: "credential stuffing".into(),
                affected_systems: vec!["auth-gw".into()],
                detected_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(h.security.containments.load(Ordering::SeqCst), 1);
        // The forced refresh replaced the empty boot snapshot.
        let status = h.aggregator.current().await;
        assert!(status.timestamp > DateTime::<Utc>::MIN_UTC);
    }

    #[tokio::test]
    async fn test_high_impact_control_failure_creates_risk() {
        let h = harness(false, ScriptedExecutor::new());
        h.router
            .route(ComplianceEvent::ControlFailed {
                control_id: "ctl-ac-3".into(),
                category: RequirementCategory::Access,
                impact: Severity::Critical,
                description: "quarterly review skipped".into(),
            })
            .await
            .unwrap();

        let open = h.risks.open_risks().await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].likelihood, 4);
        assert_eq!(open[0].impact, 5);
        assert_eq!(open[0].risk_score, 20);
        assert_eq!(h.governance.reviews.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_low_impact_control_failure_only_audited() {
        let h = harness(false, ScriptedExecutor::new());
        h.router
            .route(ComplianceEvent::ControlFailed {
                control_id: "ctl-ac-3".into(),
                category: RequirementCategory::Access,
                impact: Severity::Medium,
                description: "review one day late".into(),
            })
            .await
            .unwrap();

        assert!(h.risks.open_risks().await.is_empty());
        assert_eq!(h.governance.reviews.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_consent_withdrawal_restricts_and_revokes() {
        let h = harness(false, ScriptedExecutor::new());
        h.router
            .route(ComplianceEvent::ConsentWithdrawn {
                subject_id: "user-81".into(),
                purpose: "marketing".into(),
            })
            .await
            .unwrap();

        assert_eq!(h.privacy.restrictions.load(Ordering::SeqCst), 1);
        assert_eq!(h.access.revocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_data_request_valid_path() {
        let h = harness(false, ScriptedExecutor::new());
        let request = DataRequest::new(DataRequestKind::Access, "user-4", "export my data");
        let outcome = h.router.process_data_request(request).await.unwrap();
        let outcome = outcome.unwrap();
        assert!(outcome.completed);
    }

    #[tokio::test]
    async fn test_data_request_rejected_returns_none() {
        let mut privacy = CountingPrivacy::default();
        privacy.reject_requests = true;
        let h = {
            let mut h = harness(false, ScriptedExecutor::new());
            // Swap in the rejecting privacy stub.
            let collaborators = CollaboratorSet {
                privacy: Arc::new(privacy),
                access: Arc::clone(&h.access) as Arc<dyn AccessCollaborator>,
                governance: Arc::clone(&h.governance) as Arc<dyn GovernanceCollaborator>,
                security: Arc::clone(&h.security) as Arc<dyn SecurityCollaborator>,
            };
            h.router.collaborators = collaborators;
            h
        };

        let request = DataRequest::new(DataRequestKind::Erasure, "ghost", "forget me");
        let outcome = h.router.process_data_request(request).await.unwrap();
        assert!(outcome.is_none());
    }

    struct StalledPrivacy;

    #[async_trait]
    impl PrivacyCollaborator for StalledPrivacy {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Privacy, 90.0))
        }

        async fn validate_data_request(
            &self,
            _request: &DataRequest,
        ) -> VeritorResult<RequestValidation> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(RequestValidation::valid())
        }

        async fn process_data_request(
            &self,
            request: &DataRequest,
        ) -> VeritorResult<DataRequestOutcome> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(DataRequestOutcome {
                request_id: request.id,
                completed: true,
                summary: String::new(),
            })
        }

        async fn restrict_subject_data(&self, _subject_id: &str) -> VeritorResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    struct StalledSecurity;

    #[async_trait]
    impl SecurityCollaborator for StalledSecurity {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Security, 90.0))
        }

        async fn contain_breach(
            &self,
            _description: &str,
            _affected_systems: &[String],
        ) -> VeritorResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stalled_privacy_fails_data_request_promptly() {
        let mut h = harness(false, ScriptedExecutor::new());
        h.router.collaborators.privacy = Arc::new(StalledPrivacy);

        let request = DataRequest::new(DataRequestKind::Access, "user-4", "export my data");
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            h.router.process_data_request(request),
        )
        .await
        .expect("request should fail within the collaborator timeout");
        assert!(matches!(result, Err(VeritorError::Collaborator(_))));
    }

    #[tokio::test]
    async fn test_stalled_containment_does_not_wedge_breach_handling() {
        let mut h = harness(false, ScriptedExecutor::new());
        h.router.collaborators.security = Arc::new(StalledSecurity);

        let routed = tokio::time::timeout(
            Duration::from_secs(2),
            h.router.route(ComplianceEvent::BreachDetected {
                source: "ids".into(),
                description: "credential stuffing".into(),
                affected_systems: vec!["auth-gw".into()],
                detected_at: Utc::now(),
            }),
        )
        .await
        .expect("breach handling should finish despite the stalled collaborator");
        assert!(routed.is_ok());
        // The containment overrun is absorbed and the refresh still ran.
        let status = h.aggregator.current().await;
        assert!(status.timestamp > DateTime::<Utc>::MIN_UTC);
    }

    #[tokio::test]
    async fn test_stalled_restriction_does_not_wedge_consent_withdrawal() {
        let mut h = harness(false, ScriptedExecutor::new());
        h.router.collaborators.privacy = Arc::new(StalledPrivacy);

        let routed = tokio::time::timeout(
            Duration::from_secs(2),
            h.router.route(ComplianceEvent::ConsentWithdrawn {
                subject_id: "user-81".into(),
                purpose: "marketing".into(),
            }),
        )
        .await
        .expect("consent handling should finish despite the stalled collaborator");
        assert!(routed.is_ok());
        // Revocation still ran after the restriction overran.
        assert_eq!(h.access.revocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_informational_events_route_cleanly() {
        let h = harness(false, ScriptedExecutor::new());
        h.router
            .route(ComplianceEvent::PolicyUpdated {
                policy_id: "pol-9".into(),
                summary: "updated retention tiers".into(),
            })
            .await
            .unwrap();
        h.router
            .route(ComplianceEvent::TrainingCompleted {
                subject_id: "emp-12".into(),
                course: "privacy-101".into(),
            })
            .await
            .unwrap();

        assert!(h.violations.is_empty());
        assert!(h.risks.is_empty());
        assert_eq!(h.metrics.snapshot().await.events_routed, 2);
    }
}
