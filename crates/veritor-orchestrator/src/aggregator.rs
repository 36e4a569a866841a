use crate::metrics::ComplianceMetrics;
use crate::notify::{Notification, NotificationHub};
use crate::types::{ComplianceRecommendation, ComplianceStatus, RecommendationKind};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};
use veritor_core::{
    AccessCollaborator, Domain, DomainStatus, GovernanceCollaborator, PrivacyCollaborator,
    ScoreWeights, SecurityCollaborator, Severity, VeritorResult,
};
use veritor_engine::RegulatoryEngine;
use veritor_lifecycle::{
    ComplianceRisk, ComplianceViolation, RiskStore, ViolationStore, HIGH_RISK_THRESHOLD,
};

/// The collaborator subsystems the orchestrator aggregates over.
#[derive(Clone)]
pub struct CollaboratorSet {
    pub privacy: Arc<dyn PrivacyCollaborator>,
    pub access: Arc<dyn AccessCollaborator>,
    pub governance: Arc<dyn GovernanceCollaborator>,
    pub security: Arc<dyn SecurityCollaborator>,
}

/// Builds and publishes [`ComplianceStatus`] snapshots.
///
/// Each refresh queries all collaborator domains concurrently under a
/// per-call timeout. A failed or slow collaborator degrades to its last
/// known score instead of failing the whole snapshot; affected domains are
/// listed in `degraded_domains` and surfaced as a recommendation.
pub struct StatusAggregator {
    collaborators: CollaboratorSet,
    engine: Arc<RegulatoryEngine>,
    violations: Arc<ViolationStore>,
    risks: Arc<RiskStore>,
    weights: ScoreWeights,
    timeout: Duration,
    last_known: Mutex<HashMap<Domain, f64>>,
    current: RwLock<Arc<ComplianceStatus>>,
    hub: Arc<NotificationHub>,
    metrics: Arc<ComplianceMetrics>,
}

impl StatusAggregator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        collaborators: CollaboratorSet,
        engine: Arc<RegulatoryEngine>,
        violations: Arc<ViolationStore>,
        risks: Arc<RiskStore>,
        weights: ScoreWeights,
        timeout: Duration,
        hub: Arc<NotificationHub>,
        metrics: Arc<ComplianceMetrics>,
    ) -> Self {
        Self {
            collaborators,
            engine,
            violations,
            risks,
            weights,
            timeout,
            last_known: Mutex::new(HashMap::new()),
            current: RwLock::new(Arc::new(ComplianceStatus::empty())),
            hub,
            metrics,
        }
    }

    /// The most recently published snapshot.
    pub async fn current(&self) -> Arc<ComplianceStatus> {
        Arc::clone(&*self.current.read().await)
    }

    /// Recompute and publish a fresh snapshot.
    ///
    /// The snapshot is assembled off to the side and swapped in whole, so
    /// concurrent readers see either the previous or the new one, never a
    /// mix.
    pub async fn refresh(&self) -> Arc<ComplianceStatus> {
        let (privacy, access, governance, security) = tokio::join!(
            self.guarded(Domain::Privacy, self.collaborators.privacy.status()),
            self.guarded(Domain::Access, self.collaborators.access.status()),
            self.guarded(Domain::Governance, self.collaborators.governance.status()),
            self.guarded(Domain::Security, self.collaborators.security.status()),
        );
        let regulatory = self.engine.domain_status().await;

        let degraded_domains: Vec<Domain> = [
            (Domain::Privacy, privacy.1),
            (Domain::Access, access.1),
            (Domain::Governance, governance.1),
            (Domain::Security, security.1),
        ]
        .iter()
        .filter(|(_, degraded)| *degraded)
        .map(|(domain, _)| *domain)
        .collect();

        let overall_score = (self.weights.privacy * privacy.0
            + self.weights.access * access.0
            + self.weights.governance * governance.0
            + self.weights.security * security.0
            + self.weights.regulatory * regulatory.score)
            .round()
            .clamp(0.0, 100.0);

        let violations = self.violations.open_violations().await;
        let risks = self.risks.open_risks().await;
        let recommendations =
            build_recommendations(overall_score, &violations, &risks, &degraded_domains);

        let status = Arc::new(ComplianceStatus {
            timestamp: Utc::now(),
            overall_score,
            regulations: self.engine.all_statuses().await,
            violations,
            risks,
            recommendations,
            degraded_domains,
        });

        *self.current.write().await = Arc::clone(&status);

        self.metrics
            .set_status(
                overall_score,
                status.violations.len(),
                status.risks.len(),
                status.degraded_domains.len(),
            )
            .await;
        self.metrics.incr_status_refreshes().await;
        self.hub
            .emit(Notification::StatusUpdated {
                overall_score,
                open_violations: status.violations.len(),
                open_risks: status.risks.len(),
            })
            .await;

        info!(
            overall_score,
            violations = status.violations.len(),
            risks = status.risks.len(),
            degraded = status.degraded_domains.len(),
            "Published compliance status"
        );
        status
    }

    /// Query one collaborator under the timeout, falling back to the last
    /// known score on failure. Returns `(score, degraded)`.
    async fn guarded<F>(&self, domain: Domain, status: F) -> (f64, bool)
    where
        F: Future<Output = VeritorResult<DomainStatus>>,
    {
        match tokio::time::timeout(self.timeout, status).await {
            Ok(Ok(status)) => {
                self.last_known.lock().insert(domain, status.score);
                (status.score, false)
            }
            Ok(Err(e)) => {
                warn!(%domain, "Collaborator status failed: {e}");
                (self.last_known_score(domain), true)
            }
            Err(_) => {
                warn!(%domain, "Collaborator status timed out");
                (self.last_known_score(domain), true)
            }
        }
    }

    fn last_known_score(&self, domain: Domain) -> f64 {
        self.last_known.lock().get(&domain).copied().unwrap_or(0.0)
    }
}

/// Synthesize recommendations for a snapshot. Always built from scratch;
/// recommendations are derived state and never accumulate across passes.
pub(crate) fn build_recommendations(
    overall_score: f64,
    violations: &[ComplianceViolation],
    risks: &[ComplianceRisk],
    degraded: &[Domain],
) -> Vec<ComplianceRecommendation> {
    let mut recommendations = Vec::new();

    let critical = violations
        .iter()
        .filter(|v| v.severity == Severity::Critical)
        .count();
    if critical > 0 {
        recommendations.push(ComplianceRecommendation {
            priority: Severity::Critical,
            kind: RecommendationKind::ResolveCriticalViolations,
            message: format!("Resolve {critical} critical violation(s) immediately"),
        });
    }

    // Keyed on the inherent score rather than the residual: a mitigated
    // high risk still warrants attention until it is closed.
    let high = risks
        .iter()
        .filter(|r| r.risk_score >= HIGH_RISK_THRESHOLD)
        .count();
    if high > 0 {
        recommendations.push(ComplianceRecommendation {
            priority: Severity::High,
            kind: RecommendationKind::MitigateHighRisks,
            message: format!("Mitigate {high} high risk(s) before the next assessment cycle"),
        });
    }

    if overall_score < 80.0 {
        recommendations.push(ComplianceRecommendation {
            priority: Severity::Medium,
            kind: RecommendationKind::ImprovementProgram,
            message: format!(
                "Overall compliance score {overall_score:.0} is below target, launch an improvement program"
            ),
        });
    }

    if !degraded.is_empty() {
        let names: Vec<String> = degraded.iter().map(Domain::to_string).collect();
        recommendations.push(ComplianceRecommendation {
            priority: Severity::Low,
            kind: RecommendationKind::DegradedData,
            message: format!(
                "Live data unavailable for {}, scores use last known values",
                names.join(", ")
            ),
        });
    }

    recommendations
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use veritor_catalog::{RegulationCatalog, Requirement};
    use veritor_core::{
        DataRequest, DataRequestOutcome, RemediationPlan, RequestValidation, RequirementCategory,
    };
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

    struct StubPrivacy {
        score: f64,
    }

    #[async_trait]
    impl PrivacyCollaborator for StubPrivacy {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Privacy, self.score))
        }

        async fn validate_data_request(
            &self,
            _request: &DataRequest,
        ) -> VeritorResult<RequestValidation> {
            Ok(RequestValidation::valid())
        }

        async fn process_data_request(
            &self,
            request: &DataRequest,
        ) -> VeritorResult<DataRequestOutcome> {
            Ok(DataRequestOutcome {
                request_id: request.id,
                completed: true,
                summary: "done".into(),
            })
        }

        async fn restrict_subject_data(&self, _subject_id: &str) -> VeritorResult<()> {
            Ok(())
        }
    }

    struct StubAccess {
        score: f64,
    }

    #[async_trait]
    impl AccessCollaborator for StubAccess {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Access, self.score))
        }

        async fn revoke_grants(&self, _subject_id: &str) -> VeritorResult<u32> {
            Ok(0)
        }

        async fn authorize(&self, _subject_id: &str, _purpose: &str) -> VeritorResult<bool> {
            Ok(true)
        }
    }

    struct StubGovernance {
        score: f64,
    }

    #[async_trait]
    impl GovernanceCollaborator for StubGovernance {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Governance, self.score))
        }

        async fn schedule_control_review(&self, _control_id: &str, _note: &str) -> VeritorResult<()> {
            Ok(())
        }
    }

    struct FlakySecurity {
        score: f64,
        healthy: AtomicBool,
    }

    #[async_trait]
    impl SecurityCollaborator for FlakySecurity {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            if self.healthy.load(Ordering::SeqCst) {
                Ok(DomainStatus::new(Domain::Security, self.score))
            } else {
                // Longer than any test timeout.
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(DomainStatus::new(Domain::Security, 0.0))
            }
        }

        async fn contain_breach(
            &self,
            _description: &str,
            _affected_systems: &[String],
        ) -> VeritorResult<()> {
            Ok(())
        }
    }

    fn aggregator(security: Arc<FlakySecurity>) -> StatusAggregator {
        let engine = RegulatoryEngine::new(
            RegulationCatalog::empty(),
            Arc::new(NullCollector),
            Arc::new(NullProbe),
            "0 0 1 * * Mon *",
            Duration::from_millis(100),
        )
        .unwrap();
        StatusAggregator::new(
            CollaboratorSet {
                privacy: Arc::new(StubPrivacy { score: 95.0 }),
                access: Arc::new(StubAccess { score: 95.0 }),
                governance: Arc::new(StubGovernance { score: 95.0 }),
                security,
            },
            Arc::new(engine),
            Arc::new(ViolationStore::new()),
            Arc::new(RiskStore::new()),
            ScoreWeights::default(),
            Duration::from_millis(50),
            Arc::new(NotificationHub::new()),
            Arc::new(ComplianceMetrics::new()),
        )
    }

    #[tokio::test]
    async fn test_refresh_publishes_weighted_score() {
        let security = Arc::new(FlakySecurity {
            score: 95.0,
            healthy: AtomicBool::new(true),
        });
        let aggregator = aggregator(security);

        let status = aggregator.refresh().await;
        // 95 in every collaborator domain, regulatory 0 with an empty
        // catalog: 95 * 0.9 = 85.5, rounded to 86.
        assert!((status.overall_score - 86.0).abs() < f64::EPSILON);
        assert!(status.degraded_domains.is_empty());
        assert!(status.recommendations.is_empty());

        let current = aggregator.current().await;
        assert_eq!(current.timestamp, status.timestamp);
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent_for_unchanged_inputs() {
        let security = Arc::new(FlakySecurity {
            score: 70.0,
            healthy: AtomicBool::new(true),
        });
        let aggregator = aggregator(security);

        let first = aggregator.refresh().await;
        let second = aggregator.refresh().await;

        assert!((first.overall_score - second.overall_score).abs() < f64::EPSILON);
        assert_eq!(first.recommendations.len(), second.recommendations.len());
        for (a, b) in first.recommendations.iter().zip(&second.recommendations) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.message, b.message);
        }
    }

    #[tokio::test]
    async fn test_timed_out_collaborator_degrades_to_last_known() {
        let security = Arc::new(FlakySecurity {
            score: 95.0,
            healthy: AtomicBool::new(true),
        });
        let aggregator = aggregator(Arc::clone(&security));

        // First refresh records 95 as the last known security score.
        aggregator.refresh().await;

        security.healthy.store(false, Ordering::SeqCst);
        let status = aggregator.refresh().await;

        // Score unchanged because the last known value fills in.
        assert!((status.overall_score - 86.0).abs() < f64::EPSILON);
        assert_eq!(status.degraded_domains, vec![Domain::Security]);
        assert_eq!(status.recommendations.len(), 1);
        assert_eq!(
            status.recommendations[0].kind,
            RecommendationKind::DegradedData
        );
        assert_eq!(status.recommendations[0].priority, Severity::Low);
        assert!(status.recommendations[0].message.contains("security"));
    }

    #[test]
    fn test_recommendations_cover_all_triggers() {
        let violation = ComplianceViolation::new(
            "gdpr",
            "gdpr-art-32",
            Severity::Critical,
            "unencrypted backups",
            vec![],
            RemediationPlan::new(vec![], "security-team", Severity::Critical),
        );
        let risk = ComplianceRisk::new(RequirementCategory::Security, "stale keys", 4, 4);

        let recommendations = build_recommendations(
            70.0,
            &[violation],
            &[risk],
            &[Domain::Privacy, Domain::Access],
        );

        let kinds: Vec<RecommendationKind> =
            recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::ResolveCriticalViolations,
                RecommendationKind::MitigateHighRisks,
                RecommendationKind::ImprovementProgram,
                RecommendationKind::DegradedData,
            ]
        );
        assert_eq!(recommendations[0].priority, Severity::Critical);
        assert!(recommendations[3].message.contains("privacy, access"));
    }

    #[test]
    fn test_mitigated_high_risk_still_recommended() {
        let mut risk = ComplianceRisk::new(RequirementCategory::Access, "orphaned accounts", 4, 4);
        risk.add_mitigation("quarterly access review", 100);
        assert!(risk.residual_risk < HIGH_RISK_THRESHOLD);

        let recommendations = build_recommendations(90.0, &[], &[risk], &[]);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].kind, RecommendationKind::MitigateHighRisks);
    }

    #[test]
    fn test_moderate_risk_not_recommended() {
        let risk = ComplianceRisk::new(RequirementCategory::Governance, "late reviews", 3, 4);
        let recommendations = build_recommendations(90.0, &[], &[risk], &[]);
        assert!(recommendations.is_empty());
    }
}
