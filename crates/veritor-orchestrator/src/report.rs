use crate::types::{ComplianceRecommendation, ComplianceStatus};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;
use veritor_core::{VeritorError, VeritorResult};
use veritor_engine::RegulationStatus;

/// Score movement smaller than this counts as stable.
const TREND_BAND: f64 = 2.0;

/// How often a report is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCadence {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    OnDemand,
}

impl ReportCadence {
    /// 7-field cron expression for scheduled cadences. On-demand reports
    /// have no schedule.
    pub fn cron_expression(&self) -> Option<&'static str> {
        match self {
            ReportCadence::Daily => Some("0 0 2 * * * *"),
            ReportCadence::Weekly => Some("0 0 3 * * Mon *"),
            ReportCadence::Monthly => Some("0 0 4 1 * * *"),
            ReportCadence::Quarterly => Some("0 0 5 1 Jan,Apr,Jul,Oct * *"),
            ReportCadence::OnDemand => None,
        }
    }

    /// Length of the reporting period, in days.
    pub fn period_days(&self) -> i64 {
        match self {
            ReportCadence::Daily | ReportCadence::OnDemand => 1,
            ReportCadence::Weekly => 7,
            ReportCadence::Monthly => 30,
            ReportCadence::Quarterly => 90,
        }
    }
}

impl std::fmt::Display for ReportCadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportCadence::Daily => write!(f, "daily"),
            ReportCadence::Weekly => write!(f, "weekly"),
            ReportCadence::Monthly => write!(f, "monthly"),
            ReportCadence::Quarterly => write!(f, "quarterly"),
            ReportCadence::OnDemand => write!(f, "on_demand"),
        }
    }
}

/// One point of compliance history, taken from a published snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub taken_at: DateTime<Utc>,
    pub overall_score: f64,
    pub open_violations: usize,
    pub open_risks: usize,
    /// Per-regulation compliance levels at this point.
    pub compliance_levels: HashMap<String, f64>,
}

/// Direction the overall score moved over the reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    fn from_delta(delta: f64) -> Self {
        if delta > TREND_BAND {
            TrendDirection::Improving
        } else if delta < -TREND_BAND {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Stable => write!(f, "stable"),
            TrendDirection::Declining => write!(f, "declining"),
        }
    }
}

/// A generated compliance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub id: Uuid,
    pub cadence: ReportCadence,
    pub generated_at: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub overall_score: f64,
    pub regulations: Vec<RegulationStatus>,
    pub open_violations: usize,
    /// Violations resolved since tracking began, as of this report.
    pub resolved_violations: usize,
    pub open_risks: usize,
    pub recommendations: Vec<ComplianceRecommendation>,
    pub trend: TrendDirection,
    pub summary: String,
}

/// Builds reports from published snapshots and a bounded score history.
pub struct ReportGenerator {
    history: Mutex<VecDeque<TrendPoint>>,
    history_limit: usize,
    report_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(report_dir: PathBuf, history_limit: usize) -> Self {
        Self {
            history: Mutex::new(VecDeque::new()),
            history_limit,
            report_dir,
        }
    }

    /// Record one history point from a published snapshot. Oldest points
    /// fall off once the limit is reached.
    pub fn record_snapshot(&self, status: &ComplianceStatus) {
        let point = TrendPoint {
            taken_at: status.timestamp,
            overall_score: status.overall_score,
            open_violations: status.violations.len(),
            open_risks: status.risks.len(),
            compliance_levels: status
                .regulations
                .iter()
                .map(|r| (r.regulation_id.clone(), r.compliance_level))
                .collect(),
        };
        let mut history = self.history.lock();
        history.push_back(point);
        while history.len() > self.history_limit {
            history.pop_front();
        }
    }

    /// History points currently retained, oldest first.
    pub fn history(&self) -> Vec<TrendPoint> {
        self.history.lock().iter().cloned().collect()
    }

    /// Score trend over the trailing `period`, comparing the oldest and
    /// newest retained points inside it. Fewer than two points is stable.
    pub fn trend(&self, period: Duration) -> TrendDirection {
        let cutoff = Utc::now() - period;
        let history = self.history.lock();
        let mut in_window = history.iter().filter(|p| p.taken_at >= cutoff);
        let (oldest, newest) = match (in_window.next(), in_window.last()) {
            (Some(oldest), Some(newest)) => (oldest, newest),
            _ => return TrendDirection::Stable,
        };
        TrendDirection::from_delta(newest.overall_score - oldest.overall_score)
    }

    /// Build a report for the cadence from the given snapshot.
    pub fn build(
        &self,
        cadence: ReportCadence,
        status: &ComplianceStatus,
        resolved_violations: usize,
    ) -> ComplianceReport {
        let generated_at = Utc::now();
        let period = Duration::days(cadence.period_days());
        let trend = self.trend(period);
        let summary = format!(
            "Overall compliance at {:.0}. {} open violation(s), {} resolved to date, {} open risk(s). Score trend over the period: {}.",
            status.overall_score,
            status.violations.len(),
            resolved_violations,
            status.risks.len(),
            trend,
        );
        ComplianceReport {
            id: Uuid::new_v4(),
            cadence,
            generated_at,
            period_start: generated_at - period,
            overall_score: status.overall_score,
            regulations: status.regulations.clone(),
            open_violations: status.violations.len(),
            resolved_violations,
            open_risks: status.risks.len(),
            recommendations: status.recommendations.clone(),
            trend,
            summary,
        }
    }

    /// Write the report as pretty JSON under the report directory.
    /// Returns the written path.
    pub async fn persist(&self, report: &ComplianceReport) -> VeritorResult<PathBuf> {
        tokio::fs::create_dir_all(&self.report_dir)
            .await
            .map_err(VeritorError::Io)?;
        let filename = format!(
            "{}-report-{}.json",
            report.cadence,
            report.generated_at.format("%Y%m%dT%H%M%SZ")
        );
        let path = self.report_dir.join(filename);
        let body = serde_json::to_vec_pretty(report)?;
        tokio::fs::write(&path, body).await.map_err(VeritorError::Io)?;
        info!(cadence = %report.cadence, path = %path.display(), "Persisted compliance report");
        Ok(path)
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}
