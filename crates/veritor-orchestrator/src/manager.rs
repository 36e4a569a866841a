use crate::aggregator::{CollaboratorSet, StatusAggregator};
use crate::audit::AuditTrail;
use crate::metrics::ComplianceMetrics;
use crate::notify::{NotificationHub, NotificationSink};
use crate::report::{ComplianceReport, ReportCadence, ReportGenerator};
use crate::router::EventRouter;
use crate::scheduler::MonitorScheduler;
use crate::types::ComplianceStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use veritor_catalog::RegulationCatalog;
use veritor_core::{
    AccessCollaborator, ComplianceConfig, ComplianceEvent, DataRequest, DataRequestKind,
    DataRequestOutcome, GovernanceCollaborator, PrivacyCollaborator, RemediationExecutor,
    SecurityCollaborator, VeritorError, VeritorResult,
};
use veritor_engine::{CheckProbe, ComplianceState, EvidenceCollector, RegulatoryEngine};
use veritor_lifecycle::{AutoRemediator, RiskStore, ViolationStore};

/// Result of an on-demand compliance check.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceCheck {
    pub regulation_id: String,
    /// Set when the check was scoped to one requirement.
    pub requirement_id: Option<String>,
    pub compliant: bool,
    pub compliance_level: f64,
    /// The requirement's assessed state, for scoped checks.
    pub state: Option<ComplianceState>,
    pub gaps: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

/// Assembles a [`ComplianceManager`] from injected collaborators.
///
/// Every collaborator seam must be provided; there are no built-in
/// defaults reaching into global state.
pub struct ComplianceManagerBuilder {
    config: ComplianceConfig,
    catalog: RegulationCatalog,
    privacy: Option<Arc<dyn PrivacyCollaborator>>,
    access: Option<Arc<dyn AccessCollaborator>>,
    governance: Option<Arc<dyn GovernanceCollaborator>>,
    security: Option<Arc<dyn SecurityCollaborator>>,
    collector: Option<Arc<dyn EvidenceCollector>>,
    probe: Option<Arc<dyn CheckProbe>>,
    executor: Option<Arc<dyn RemediationExecutor>>,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl ComplianceManagerBuilder {
    pub fn new() -> Self {
        Self {
            config: ComplianceConfig::default(),
            catalog: RegulationCatalog::builtin(),
            privacy: None,
            access: None,
            governance: None,
            security: None,
            collector: None,
            probe: None,
            executor: None,
            sinks: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ComplianceConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the built-in regulation catalog.
    pub fn with_catalog(mut self, catalog: RegulationCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_privacy(mut self, privacy: Arc<dyn PrivacyCollaborator>) -> Self {
        self.privacy = Some(privacy);
        self
    }

    pub fn with_access(mut self, access: Arc<dyn AccessCollaborator>) -> Self {
        self.access = Some(access);
        self
    }

    pub fn with_governance(mut self, governance: Arc<dyn GovernanceCollaborator>) -> Self {
        self.governance = Some(governance);
        self
    }

    pub fn with_security(mut self, security: Arc<dyn SecurityCollaborator>) -> Self {
        self.security = Some(security);
        self
    }

    pub fn with_collector(mut self, collector: Arc<dyn EvidenceCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn CheckProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn RemediationExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Register a notification sink. May be called repeatedly.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Validate the configuration and wire the manager together.
    ///
    /// Must run inside a Tokio runtime: the audit trail spawns its writer
    /// task here.
    pub fn build(self) -> VeritorResult<ComplianceManager> {
        self.config.validate()?;

        let privacy = self.privacy.ok_or_else(|| missing("privacy"))?;
        let access = self.access.ok_or_else(|| missing("access"))?;
        let governance = self.governance.ok_or_else(|| missing("governance"))?;
        let security = self.security.ok_or_else(|| missing("security"))?;
        let collector = self.collector.ok_or_else(|| missing("evidence collector"))?;
        let probe = self.probe.ok_or_else(|| missing("check probe"))?;
        let executor = self.executor.ok_or_else(|| missing("remediation executor"))?;

        let collaborators = CollaboratorSet {
            privacy,
            access,
            governance,
            security,
        };

        let mut hub = NotificationHub::new();
        for sink in self.sinks {
            hub.add(sink);
        }
        let hub = Arc::new(hub);

        let metrics = Arc::new(ComplianceMetrics::new());
        let violations = Arc::new(ViolationStore::new());
        let risks = Arc::new(RiskStore::new());
        let engine = Arc::new(RegulatoryEngine::new(
            self.catalog,
            collector,
            probe,
            &self.config.assessment_schedule,
            self.config.collaborator_timeout(),
        )?);
        let aggregator = Arc::new(StatusAggregator::new(
            collaborators.clone(),
            Arc::clone(&engine),
            Arc::clone(&violations),
            Arc::clone(&risks),
            self.config.weights,
            self.config.collaborator_timeout(),
            Arc::clone(&hub),
            Arc::clone(&metrics),
        ));
        let audit = Arc::new(AuditTrail::new(self.config.audit_dir.clone()));
        let router = Arc::new(EventRouter::new(
            collaborators.clone(),
            Arc::clone(&engine),
            Arc::clone(&aggregator),
            Arc::clone(&violations),
            Arc::clone(&risks),
            AutoRemediator::new(executor, self.config.collaborator_timeout()),
            Arc::clone(&audit),
            Arc::clone(&hub),
            Arc::clone(&metrics),
            self.config.auto_remediation,
            self.config.collaborator_timeout(),
        ));
        let reports = Arc::new(ReportGenerator::new(
            self.config.report_dir.clone(),
            self.config.history_limit,
        ));

        Ok(ComplianceManager {
            config: self.config,
            collaborators,
            engine,
            aggregator,
            router,
            violations,
            risks,
            reports,
            audit,
            metrics,
            scheduler: MonitorScheduler::new(),
        })
    }
}

impl Default for ComplianceManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(name: &str) -> VeritorError {
    VeritorError::Config(format!("The {name} collaborator is required"))
}

/// Top-level compliance orchestrator.
///
/// Owns the regulatory engine, the violation and risk stores, the status
/// aggregator, the event router, and the background monitoring loops.
/// All collaborator subsystems are injected through the builder.
pub struct ComplianceManager {
    config: ComplianceConfig,
    collaborators: CollaboratorSet,
    engine: Arc<RegulatoryEngine>,
    aggregator: Arc<StatusAggregator>,
    router: Arc<EventRouter>,
    violations: Arc<ViolationStore>,
    risks: Arc<RiskStore>,
    reports: Arc<ReportGenerator>,
    audit: Arc<AuditTrail>,
    metrics: Arc<ComplianceMetrics>,
    scheduler: MonitorScheduler,
}

impl ComplianceManager {
    pub fn builder() -> ComplianceManagerBuilder {
        ComplianceManagerBuilder::new()
    }

    /// Run initial assessments, publish the first status snapshot, and
    /// start the background monitoring loops.
    pub async fn start(&self) -> VeritorResult<()> {
        info!(environment = %self.config.environment, "Starting compliance manager");

        for (regulation_id, result) in self.engine.run_all_assessments().await {
            if let Err(e) = result {
                warn!(regulation = %regulation_id, "Initial assessment failed: {e}");
            }
        }

        let status = self.aggregator.refresh().await;
        self.reports.record_snapshot(&status);

        self.scheduler.spawn_refresh_loop(
            Arc::clone(&self.aggregator),
            Arc::clone(&self.reports),
            self.config.refresh_interval(),
        );
        self.scheduler
            .spawn_assessment_loops(Arc::clone(&self.engine), &self.config.assessment_schedule)?;
        self.scheduler.spawn_check_loops(
            Arc::clone(&self.engine),
            Arc::clone(&self.router),
            Arc::clone(&self.metrics),
        );
        self.scheduler.spawn_report_loops(
            Arc::clone(&self.reports),
            Arc::clone(&self.aggregator),
            Arc::clone(&self.violations),
            Arc::clone(&self.metrics),
        );

        info!(
            tasks = self.scheduler.task_count(),
            "Compliance manager started"
        );
        Ok(())
    }

    /// The current compliance status, refreshed first when the cached
    /// snapshot is older than the configured maximum age.
    pub async fn get_compliance_status(&self) -> Arc<ComplianceStatus> {
        let current = self.aggregator.current().await;
        if current.is_stale(self.config.status_max_age()) {
            let fresh = self.aggregator.refresh().await;
            self.reports.record_snapshot(&fresh);
            return fresh;
        }
        current
    }

    /// Check compliance for a regulation, or one requirement within it.
    ///
    /// Runs an assessment on demand when none has happened yet. A
    /// requirement counts as compliant when its state is compliant or not
    /// applicable.
    pub async fn check_compliance(
        &self,
        regulation_id: &str,
        requirement_id: Option<&str>,
    ) -> VeritorResult<ComplianceCheck> {
        let status = match self.engine.status(regulation_id).await {
            Some(status) => status,
            None => self.engine.run_assessment(regulation_id).await?,
        };

        let checked_at = Utc::now();
        match requirement_id {
            Some(requirement_id) => {
                let requirement = status
                    .requirements
                    .iter()
                    .find(|r| r.requirement_id == requirement_id)
                    .ok_or_else(|| {
                        VeritorError::Config(format!(
                            "Unknown requirement '{requirement_id}' in regulation '{regulation_id}'"
                        ))
                    })?;
                Ok(ComplianceCheck {
                    regulation_id: status.regulation_id.clone(),
                    requirement_id: Some(requirement_id.to_string()),
                    compliant: requirement_compliant(requirement.state),
                    compliance_level: status.compliance_level,
                    state: Some(requirement.state),
                    gaps: requirement.gaps.clone(),
                    checked_at,
                })
            }
            None => Ok(ComplianceCheck {
                regulation_id: status.regulation_id.clone(),
                requirement_id: None,
                compliant: status
                    .requirements
                    .iter()
                    .all(|r| requirement_compliant(r.state)),
                compliance_level: status.compliance_level,
                state: None,
                gaps: status
                    .requirements
                    .iter()
                    .flat_map(|r| r.gaps.iter().cloned())
                    .collect(),
                checked_at,
            }),
        }
    }

    /// Authorize a data access request and audit the decision.
    pub async fn request_data_access(
        &self,
        subject_id: &str,
        purpose: &str,
    ) -> VeritorResult<bool> {
        let authorized = tokio::time::timeout(
            self.config.collaborator_timeout(),
            self.collaborators.access.authorize(subject_id, purpose),
        )
        .await
        .map_err(|_| {
            VeritorError::Collaborator("Data access authorization timed out".to_string())
        })??;
        self.audit.record(
            "data_access_request",
            serde_json::json!({
                "subject_id": subject_id,
                "purpose": purpose,
                "authorized": authorized,
            }),
        );
        info!(subject = %subject_id, purpose, authorized, "Processed data access request");
        Ok(authorized)
    }

    /// Submit a data subject request. Returns `Ok(None)` when validation
    /// rejects it.
    pub async fn process_data_subject_request(
        &self,
        kind: DataRequestKind,
        subject_id: &str,
        details: &str,
    ) -> VeritorResult<Option<DataRequestOutcome>> {
        let request = DataRequest::new(kind, subject_id, details);
        self.router.process_data_request(request).await
    }

    /// Route a compliance event from a collaborator subsystem.
    pub async fn handle_event(&self, event: ComplianceEvent) -> VeritorResult<()> {
        self.router.route(event).await
    }

    /// Build and persist a report for the cadence, from fresh status data.
    pub async fn generate_compliance_report(
        &self,
        cadence: ReportCadence,
    ) -> VeritorResult<ComplianceReport> {
        let status = self.get_compliance_status().await;
        let open = status.violations.len();
        let resolved = self.violations.len().saturating_sub(open);
        let report = self.reports.build(cadence, &status, resolved);
        self.reports.persist(&report).await?;
        self.metrics.incr_reports_generated().await;
        Ok(report)
    }

    /// Stop the background loops and wait for them to finish.
    pub async fn shutdown(&self) {
        info!("Shutting down compliance manager");
        self.scheduler.shutdown().await;
        info!("Compliance manager stopped");
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<ComplianceMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The violation store, for hosts that resolve violations manually.
    pub fn violations(&self) -> Arc<ViolationStore> {
        Arc::clone(&self.violations)
    }

    /// The risk store, for recording mitigations and closing risks.
    pub fn risks(&self) -> Arc<RiskStore> {
        Arc::clone(&self.risks)
    }

    pub fn engine(&self) -> Arc<RegulatoryEngine> {
        Arc::clone(&self.engine)
    }
}

fn requirement_compliant(state: ComplianceState) -> bool {
    matches!(
        state,
        ComplianceState::Compliant | ComplianceState::NotApplicable
    )
}
