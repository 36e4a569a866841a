use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use veritor_catalog::{AutomatedCheck, EvidenceType, Requirement};
use veritor_core::VeritorResult;

/// A piece of collected evidence, produced by an external collector.
///
/// The engine inspects it during an assessment and then keeps only a
/// lightweight [`EvidenceRef`]; the full payload stays with the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub id: Uuid,
    pub evidence_type: EvidenceType,
    pub collected_at: DateTime<Utc>,
    pub source: String,
    pub data: serde_json::Value,
    pub verified: bool,
}

impl Evidence {
    /// Create unverified evidence collected now.
    pub fn new(evidence_type: EvidenceType, source: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            evidence_type,
            collected_at: Utc::now(),
            source: source.into(),
            data,
            verified: false,
        }
    }

    /// Mark the evidence as verified.
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }
}

/// Reference to evidence retained in a requirement status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub id: Uuid,
    pub evidence_type: EvidenceType,
}

impl From<&Evidence> for EvidenceRef {
    fn from(evidence: &Evidence) -> Self {
        Self {
            id: evidence.id,
            evidence_type: evidence.evidence_type,
        }
    }
}

/// Collects evidence for a regulation's requirements.
///
/// Returns a map from requirement id to what was found; requirements with
/// nothing collected may be absent from the map entirely.
#[async_trait]
pub trait EvidenceCollector: Send + Sync {
    async fn collect(
        &self,
        regulation_id: &str,
        requirements: &[Requirement],
    ) -> VeritorResult<HashMap<String, Vec<Evidence>>>;
}

/// Observes the current value of an automated check's query.
#[async_trait]
pub trait CheckProbe: Send + Sync {
    async fn observe(&self, check: &AutomatedCheck) -> VeritorResult<f64>;
}
