use crate::aggregator::StatusAggregator;
use crate::metrics::ComplianceMetrics;
use crate::report::{ReportCadence, ReportGenerator};
use crate::router::EventRouter;
use chrono::Utc;
use cron::Schedule;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use veritor_core::{VeritorError, VeritorResult};
use veritor_engine::RegulatoryEngine;
use veritor_lifecycle::ViolationStore;

/// Sleep used when a schedule has no upcoming fire time, e.g. a
/// year-bounded expression that has run out.
const IDLE_RECHECK: Duration = Duration::from_secs(3600);

fn parse_schedule(expression: &str) -> VeritorResult<Schedule> {
    Schedule::from_str(expression)
        .map_err(|e| VeritorError::Schedule(format!("Invalid cron expression '{expression}': {e}")))
}

fn next_fire_delay(schedule: &Schedule) -> Duration {
    match schedule.upcoming(Utc).next() {
        Some(next) => (next - Utc::now()).to_std().unwrap_or_default(),
        None => IDLE_RECHECK,
    }
}

/// Owns the background monitoring tasks and their shutdown signal.
///
/// Every loop follows the same shape: sleep until the next tick, do the
/// work, go back to sleep, and bail out as soon as the shutdown flag
/// flips. Work is never half-abandoned; a tick in flight finishes before
/// the loop re-checks the flag.
pub struct MonitorScheduler {
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl MonitorScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Periodically refresh the published status and record history.
    pub fn spawn_refresh_loop(
        &self,
        aggregator: Arc<StatusAggregator>,
        reports: Arc<ReportGenerator>,
        every: Duration,
    ) {
        let mut shutdown = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(every) => {
                        let status = aggregator.refresh().await;
                        reports.record_snapshot(&status);
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Status refresh loop stopped");
        });
        self.tasks.lock().push(handle);
    }

    /// One assessment loop per catalog regulation, all on the same cron
    /// expression. A tick that finds the previous assessment still running
    /// skips; the next tick starts clean.
    pub fn spawn_assessment_loops(
        &self,
        engine: Arc<RegulatoryEngine>,
        expression: &str,
    ) -> VeritorResult<()> {
        let schedule = parse_schedule(expression)?;
        for regulation_id in engine.catalog().ids() {
            let engine = Arc::clone(&engine);
            let schedule = schedule.clone();
            let mut shutdown = self.shutdown_tx.subscribe();
            let handle = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(next_fire_delay(&schedule)) => {
                            match engine.try_run_assessment(&regulation_id).await {
                                Ok(Some(status)) => debug!(
                                    regulation = %regulation_id,
                                    level = status.compliance_level,
                                    "Scheduled assessment finished"
                                ),
                                // Skipped: a run is already in progress.
                                Ok(None) => {}
                                Err(e) => warn!(
                                    regulation = %regulation_id,
                                    "Scheduled assessment failed: {e}"
                                ),
                            }
                        }
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
            self.tasks.lock().push(handle);
        }
        Ok(())
    }

    /// One loop per automated check in the catalog, each on the check's
    /// own cron expression. Breaches route as violation events.
    pub fn spawn_check_loops(
        &self,
        engine: Arc<RegulatoryEngine>,
        router: Arc<EventRouter>,
        metrics: Arc<ComplianceMetrics>,
    ) {
        for scheduled in engine.scheduled_checks() {
            let schedule = match parse_schedule(&scheduled.check.schedule) {
                Ok(schedule) => schedule,
                Err(e) => {
                    warn!(check = %scheduled.check.id, "Skipping check with invalid schedule: {e}");
                    continue;
                }
            };
            let engine = Arc::clone(&engine);
            let router = Arc::clone(&router);
            let metrics = Arc::clone(&metrics);
            let mut shutdown = self.shutdown_tx.subscribe();
            let handle = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(next_fire_delay(&schedule)) => {
                            metrics.incr_checks_evaluated().await;
                            match engine.evaluate_check(&scheduled).await {
                                Ok(Some(event)) => {
                                    if let Err(e) = router.route(event).await {
                                        warn!(check = %scheduled.check.id, "Failed to route check breach: {e}");
                                    }
                                }
                                Ok(None) => debug!(check = %scheduled.check.id, "Check passed"),
                                Err(e) => warn!(check = %scheduled.check.id, "Check evaluation failed: {e}"),
                            }
                        }
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
            self.tasks.lock().push(handle);
        }
    }

    /// One loop per scheduled report cadence. Each tick refreshes the
    /// status so the report never describes stale data.
    pub fn spawn_report_loops(
        &self,
        reports: Arc<ReportGenerator>,
        aggregator: Arc<StatusAggregator>,
        violations: Arc<ViolationStore>,
        metrics: Arc<ComplianceMetrics>,
    ) {
        for cadence in [
            ReportCadence::Daily,
            ReportCadence::Weekly,
            ReportCadence::Monthly,
            ReportCadence::Quarterly,
        ] {
            let Some(expression) = cadence.cron_expression() else {
                continue;
            };
            let schedule = match parse_schedule(expression) {
                Ok(schedule) => schedule,
                Err(e) => {
                    warn!(%cadence, "Skipping report cadence: {e}");
                    continue;
                }
            };
            let reports = Arc::clone(&reports);
            let aggregator = Arc::clone(&aggregator);
            let violations = Arc::clone(&violations);
            let metrics = Arc::clone(&metrics);
            let mut shutdown = self.shutdown_tx.subscribe();
            let handle = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(next_fire_delay(&schedule)) => {
                            let status = aggregator.refresh().await;
                            reports.record_snapshot(&status);
                            let open = status.violations.len();
                            let resolved = violations.len().saturating_sub(open);
                            let report = reports.build(cadence, &status, resolved);
                            match reports.persist(&report).await {
                                Ok(_) => metrics.incr_reports_generated().await,
                                Err(e) => warn!(%cadence, "Failed to persist report: {e}"),
                            }
                        }
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
            self.tasks.lock().push(handle);
        }
    }

    /// Number of live background tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Flip the shutdown flag and wait for every task to finish.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send(true).is_err() {
            debug!("No scheduler tasks listening for shutdown");
        }
        let handles: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Scheduler task ended abnormally: {e}");
            }
        }
        info!("Monitor scheduler stopped");
    }
}

impl Default for MonitorScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::aggregator::CollaboratorSet;
    use crate::notify::NotificationHub;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use veritor_catalog::{RegulationCatalog, Requirement};
    use veritor_core::{
        AccessCollaborator, DataRequest, DataRequestOutcome, Domain, DomainStatus,
        GovernanceCollaborator, PrivacyCollaborator, RequestValidation, ScoreWeights,
        SecurityCollaborator,
    };
    use veritor_engine::{CheckProbe, Evidence, EvidenceCollector};
    use veritor_lifecycle::RiskStore;

    struct Quiet;

    #[async_trait]
    impl PrivacyCollaborator for Quiet {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Privacy, 90.0))
        }
        async fn validate_data_request(&self, _r: &DataRequest) -> VeritorResult<RequestValidation> {
            Ok(RequestValidation::valid())
        }
        async fn process_data_request(&self, r: &DataRequest) -> VeritorResult<DataRequestOutcome> {
            Ok(DataRequestOutcome {
                request_id: r.id,
                completed: true,
                summary: String::new(),
            })
        }
        async fn restrict_subject_data(&self, _s: &str) -> VeritorResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl AccessCollaborator for Quiet {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Access, 90.0))
        }
        async fn revoke_grants(&self, _s: &str) -> VeritorResult<u32> {
            Ok(0)
        }
        async fn authorize(&self, _s: &str, _p: &str) -> VeritorResult<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl GovernanceCollaborator for Quiet {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Governance, 90.0))
        }
        async fn schedule_control_review(&self, _c: &str, _n: &str) -> VeritorResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl SecurityCollaborator for Quiet {
        async fn status(&self) -> VeritorResult<DomainStatus> {
            Ok(DomainStatus::new(Domain::Security, 90.0))
        }
        async fn contain_breach(&self, _d: &str, _a: &[String]) -> VeritorResult<()> {
            Ok(())
        }
    }

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

    fn aggregator() -> (Arc<StatusAggregator>, Arc<RegulatoryEngine>) {
        let quiet = Arc::new(Quiet);
        let engine = Arc::new(
            RegulatoryEngine::new(
                RegulationCatalog::empty(),
                Arc::new(NullCollector),
                Arc::new(NullProbe),
                "0 0 1 * * Mon *",
                Duration::from_millis(100),
            )
            .unwrap(),
        );
        let aggregator = Arc::new(StatusAggregator::new(
            CollaboratorSet {
                privacy: Arc::clone(&quiet) as Arc<dyn PrivacyCollaborator>,
                access: Arc::clone(&quiet) as Arc<dyn AccessCollaborator>,
                governance: Arc::clone(&quiet) as Arc<dyn GovernanceCollaborator>,
                security: Arc::clone(&quiet) as Arc<dyn SecurityCollaborator>,
            },
            Arc::clone(&engine),
            Arc::new(ViolationStore::new()),
            Arc::new(RiskStore::new()),
            ScoreWeights::default(),
            Duration::from_millis(200),
            Arc::new(NotificationHub::new()),
            Arc::new(ComplianceMetrics::new()),
        ));
        (aggregator, engine)
    }

    #[tokio::test]
    async fn test_refresh_loop_records_history_until_shutdown() {
        let (aggregator, _engine) = aggregator();
        let reports = Arc::new(ReportGenerator::new(std::path::PathBuf::from("reports"), 16));
        let scheduler = MonitorScheduler::new();

        scheduler.spawn_refresh_loop(
            Arc::clone(&aggregator),
            Arc::clone(&reports),
            Duration::from_millis(30),
        );
        assert_eq!(scheduler.task_count(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        scheduler.shutdown().await;
        assert_eq!(scheduler.task_count(), 0);

        let recorded = reports.history().len();
        assert!(recorded >= 2, "expected at least 2 snapshots, got {recorded}");

        // No further snapshots after shutdown.
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(reports.history().len(), recorded);
    }

    #[tokio::test]
    async fn test_shutdown_without_tasks_is_harmless() {
        let scheduler = MonitorScheduler::new();
        scheduler.shutdown().await;
        scheduler.shutdown().await;
        assert_eq!(scheduler.task_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_assessment_schedule_rejected() {
        let (_aggregator, engine) = aggregator();
        let scheduler = MonitorScheduler::new();
        let result = scheduler.spawn_assessment_loops(engine, "not a cron line");
        assert!(result.is_err());
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_next_fire_delay_is_bounded_for_every_second_schedule() {
        let schedule = parse_schedule("* * * * * * *").unwrap();
        let delay = next_fire_delay(&schedule);
        assert!(delay <= Duration::from_secs(1));
    }
}
