use serde::Serialize;
use tokio::sync::RwLock;

/// Point-in-time view of orchestrator metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    // Gauges refreshed with each published status.
    pub overall_score: f64,
    pub open_violations: usize,
    pub open_risks: usize,
    pub degraded_domains: usize,
    // Monotonic counters.
    pub events_routed: u64,
    pub violations_detected: u64,
    pub remediations_attempted: u64,
    pub remediations_failed: u64,
    pub checks_evaluated: u64,
    pub reports_generated: u64,
    pub status_refreshes: u64,
}

/// Shared metrics for the compliance orchestrator.
pub struct ComplianceMetrics {
    inner: RwLock<MetricsSnapshot>,
}

impl ComplianceMetrics {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MetricsSnapshot::default()),
        }
    }

    /// Refresh the status gauges after a snapshot is published.
    pub async fn set_status(
        &self,
        overall_score: f64,
        open_violations: usize,
        open_risks: usize,
        degraded_domains: usize,
    ) {
        let mut snapshot = self.inner.write().await;
        snapshot.overall_score = overall_score;
        snapshot.open_violations = open_violations;
        snapshot.open_risks = open_risks;
        snapshot.degraded_domains = degraded_domains;
    }

    pub async fn incr_events_routed(&self) {
        self.inner.write().await.events_routed += 1;
    }

    pub async fn incr_violations_detected(&self) {
        self.inner.write().await.violations_detected += 1;
    }

    pub async fn incr_remediations_attempted(&self) {
        self.inner.write().await.remediations_attempted += 1;
    }

    pub async fn incr_remediations_failed(&self) {
        self.inner.write().await.remediations_failed += 1;
    }

    pub async fn incr_checks_evaluated(&self) {
        self.inner.write().await.checks_evaluated += 1;
    }

    pub async fn incr_reports_generated(&self) {
        self.inner.write().await.reports_generated += 1;
    }

    pub async fn incr_status_refreshes(&self) {
        self.inner.write().await.status_refreshes += 1;
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.inner.read().await.clone()
    }

    /// Serialize the current snapshot for dashboards and reports.
    pub async fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot().await).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for ComplianceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counters_accumulate() {
        let metrics = ComplianceMetrics::new();
        metrics.incr_events_routed().await;
        metrics.incr_events_routed().await;
        metrics.incr_violations_detected().await;
        metrics.incr_remediations_attempted().await;
        metrics.incr_remediations_failed().await;

        let snapshot = metrics.snapshot().await;
        assert_eq!(snapshot.events_routed, 2);
        assert_eq!(snapshot.violations_detected, 1);
        assert_eq!(snapshot.remediations_attempted, 1);
        assert_eq!(snapshot.remediations_failed, 1);
        assert_eq!(snapshot.reports_generated, 0);
    }

    #[tokio::test]
    async fn test_status_gauges_overwrite() {
        let metrics = ComplianceMetrics::new();
        metrics.set_status(88.0, 3, 2, 1).await;
        metrics.set_status(92.0, 1, 2, 0).await;

        let json = metrics.to_json().await;
        assert_eq!(json["overall_score"], 92.0);
        assert_eq!(json["open_violations"], 1);
        assert_eq!(json["degraded_domains"], 0);
    }
}
