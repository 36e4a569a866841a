use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use veritor_core::{RequirementCategory, Severity};

/// Notifications emitted by the orchestrator.
///
/// Closed union so sinks match exhaustively; critical findings are always
/// emitted regardless of auto-remediation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A new compliance status snapshot was published.
    StatusUpdated {
        overall_score: f64,
        open_violations: usize,
        open_risks: usize,
    },
    /// A violation was recorded.
    ViolationDetected {
        violation_id: Uuid,
        regulation: String,
        severity: Severity,
    },
    /// A critical violation needs immediate human attention.
    CriticalViolation {
        violation_id: Uuid,
        regulation: String,
        description: String,
    },
    /// Auto-remediation completed and the violation is resolved.
    RemediationCompleted { violation_id: Uuid, steps: usize },
    /// An automated remediation step failed; the violation stays open.
    RemediationFailed {
        violation_id: Uuid,
        failed_step: String,
    },
    /// A breach triggered incident response.
    IncidentOpened { source: String, description: String },
    /// A new risk was identified from a failed control.
    RiskIdentified {
        risk_id: Uuid,
        category: RequirementCategory,
        risk_score: u8,
    },
}

impl Notification {
    /// Short kind tag for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::StatusUpdated { .. } => "status_updated",
            Notification::ViolationDetected { .. } => "violation_detected",
            Notification::CriticalViolation { .. } => "critical_violation",
            Notification::RemediationCompleted { .. } => "remediation_completed",
            Notification::RemediationFailed { .. } => "remediation_failed",
            Notification::IncidentOpened { .. } => "incident_opened",
            Notification::RiskIdentified { .. } => "risk_identified",
        }
    }
}

/// Receives orchestrator notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification);
}

/// Fans notifications out to every registered sink.
pub struct NotificationHub {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink to the hub.
    pub fn add(&mut self, sink: Arc<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Emit a notification to all sinks.
    pub async fn emit(&self, notification: Notification) {
        debug!(kind = notification.kind(), "Emitting notification");
        for sink in &self.sinks {
            sink.notify(&notification).await;
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
