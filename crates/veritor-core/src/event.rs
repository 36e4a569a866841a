use crate::severity::{RequirementCategory, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A data subject request routed through the privacy collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRequest {
    pub id: Uuid,
    pub kind: DataRequestKind,
    pub subject_id: String,
    pub details: String,
    pub submitted_at: DateTime<Utc>,
}

impl DataRequest {
    /// Create a new request submitted now.
    pub fn new(kind: DataRequestKind, subject_id: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            subject_id: subject_id.into(),
            details: details.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Kind of data subject request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRequestKind {
    Access,
    Erasure,
    Portability,
    Rectification,
    Restriction,
}

/// Compliance-relevant events received from collaborator subsystems.
///
/// Closed tagged union: the router matches exhaustively, so adding a variant
/// forces every handler site to decide what to do with it. Only the first
/// five variants are actionable; the rest terminate after audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComplianceEvent {
    /// A data breach was detected by the security subsystem.
    BreachDetected {
        source: String,
        description: String,
        affected_systems: Vec<String>,
        detected_at: DateTime<Utc>,
    },
    /// A requirement violation was detected (by a collaborator or a failed
    /// automated check).
    ViolationDetected {
        regulation: String,
        requirement: String,
        severity: Severity,
        description: String,
        #[serde(default)]
        affected_data: Vec<String>,
    },
    /// A monitored control failed.
    ControlFailed {
        control_id: String,
        category: RequirementCategory,
        impact: Severity,
        description: String,
    },
    /// A data subject withdrew consent for a processing purpose.
    ConsentWithdrawn {
        subject_id: String,
        purpose: String,
    },
    /// An inbound data subject request.
    DataRequest { request: DataRequest },
    /// A policy document changed. Audit-logged only.
    PolicyUpdated { policy_id: String, summary: String },
    /// A staff member completed compliance training. Audit-logged only.
    TrainingCompleted { subject_id: String, course: String },
}

impl ComplianceEvent {
    /// Short kind tag used for audit entries and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ComplianceEvent::BreachDetected { .. } => "breach_detected",
            ComplianceEvent::ViolationDetected { .. } => "violation_detected",
            ComplianceEvent::ControlFailed { .. } => "control_failed",
            ComplianceEvent::ConsentWithdrawn { .. } => "consent_withdrawn",
            ComplianceEvent::DataRequest { .. } => "data_request",
            ComplianceEvent::PolicyUpdated { .. } => "policy_updated",
            ComplianceEvent::TrainingCompleted { .. } => "training_completed",
        }
    }

    /// Whether this event triggers processing beyond the audit log.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            ComplianceEvent::BreachDetected { .. }
                | ComplianceEvent::ViolationDetected { .. }
                | ComplianceEvent::ControlFailed { .. }
                | ComplianceEvent::ConsentWithdrawn { .. }
                | ComplianceEvent::DataRequest { .. }
        )
    }
}
