use crate::error::VeritorResult;
use crate::event::DataRequest;
use crate::remediation::RemediationStep;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Domain a compliance signal originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Privacy,
    Access,
    Governance,
    Security,
    Regulatory,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Privacy => write!(f, "privacy"),
            Domain::Access => write!(f, "access"),
            Domain::Governance => write!(f, "governance"),
            Domain::Security => write!(f, "security"),
            Domain::Regulatory => write!(f, "regulatory"),
        }
    }
}

/// Status reported by one collaborator subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainStatus {
    pub domain: Domain,
    /// Domain compliance score, 0–100.
    pub score: f64,
    /// Domain-specific detail fields, opaque to the core.
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}

impl DomainStatus {
    /// Create a status with no detail fields.
    pub fn new(domain: Domain, score: f64) -> Self {
        Self {
            domain,
            score,
            details: HashMap::new(),
        }
    }
}

/// Result of validating an inbound data subject request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestValidation {
    pub valid: bool,
    pub reason: Option<String>,
}

impl RequestValidation {
    /// A passing validation.
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// A failing validation with the rejection reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of a processed data subject request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRequestOutcome {
    pub request_id: uuid::Uuid,
    pub completed: bool,
    pub summary: String,
}

/// Privacy subsystem seam: consent, data subject requests, restriction.
#[async_trait]
pub trait PrivacyCollaborator: Send + Sync {
    /// Current privacy domain status.
    async fn status(&self) -> VeritorResult<DomainStatus>;

    /// Validate an inbound data subject request before processing.
    async fn validate_data_request(&self, request: &DataRequest) -> VeritorResult<RequestValidation>;

    /// Process a validated data subject request.
    async fn process_data_request(&self, request: &DataRequest) -> VeritorResult<DataRequestOutcome>;

    /// Delete or restrict all processing for the given subject.
    async fn restrict_subject_data(&self, subject_id: &str) -> VeritorResult<()>;
}

/// Access-control subsystem seam: grants and authorization decisions.
#[async_trait]
pub trait AccessCollaborator: Send + Sync {
    /// Current access-control domain status.
    async fn status(&self) -> VeritorResult<DomainStatus>;

    /// Revoke all grants held by the subject. Returns the number revoked.
    async fn revoke_grants(&self, subject_id: &str) -> VeritorResult<u32>;

    /// Whether the subject may access data for the stated purpose.
    async fn authorize(&self, subject_id: &str, purpose: &str) -> VeritorResult<bool>;
}

/// Data-governance subsystem seam.
#[async_trait]
pub trait GovernanceCollaborator: Send + Sync {
    /// Current governance domain status.
    async fn status(&self) -> VeritorResult<DomainStatus>;

    /// Schedule a review of a failed control.
    async fn schedule_control_review(&self, control_id: &str, note: &str) -> VeritorResult<()>;
}

/// Security subsystem seam: posture score and breach containment.
#[async_trait]
pub trait SecurityCollaborator: Send + Sync {
    /// Current security domain status.
    async fn status(&self) -> VeritorResult<DomainStatus>;

    /// Contain an active breach. Called before anything else on breach events.
    async fn contain_breach(&self, description: &str, affected_systems: &[String]) -> VeritorResult<()>;
}

/// Executes a single automated remediation step in the owning subsystem.
#[async_trait]
pub trait RemediationExecutor: Send + Sync {
    /// Execute one automated step; an `Err` aborts the remaining steps of
    /// the plan.
    async fn execute_step(&self, step: &RemediationStep) -> VeritorResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_display() {
        assert_eq!(Domain::Privacy.to_string(), "privacy");
        assert_eq!(Domain::Regulatory.to_string(), "regulatory");
    }

    #[test]
    fn test_request_validation_constructors() {
        let ok = RequestValidation::valid();
        assert!(ok.valid);
        assert!(ok.reason.is_none());

        let rejected = RequestValidation::invalid("unknown subject");
        assert!(!rejected.valid);
        assert_eq!(rejected.reason.as_deref(), Some("unknown subject"));
    }

    #[test]
    fn test_domain_status_serialization() {
        let status = DomainStatus::new(Domain::Security, 87.5);
        let json = serde_json::to_string(&status).unwrap();
        let parsed: DomainStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.domain, Domain::Security);
        assert!((parsed.score - 87.5).abs() < f64::EPSILON);
    }
}
