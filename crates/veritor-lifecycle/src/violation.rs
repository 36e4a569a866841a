use chrono::{DateTime, Utc};
use parking_lot::RwLock as SyncRwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use veritor_core::{RemediationPlan, Severity};

/// A detected, trackable breach of a requirement.
///
/// Transitions only from open to resolved; a recurrence is a new violation,
/// never a reopened one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceViolation {
    pub id: Uuid,
    pub detected_at: DateTime<Utc>,
    pub regulation: String,
    pub requirement: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub affected_data: Vec<String>,
    pub remediation: RemediationPlan,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ComplianceViolation {
    /// Create an open violation detected now.
    pub fn new(
        regulation: impl Into<String>,
        requirement: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        affected_data: Vec<String>,
        remediation: RemediationPlan,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            detected_at: Utc::now(),
            regulation: regulation.into(),
            requirement: requirement.into(),
            severity,
            description: description.into(),
            affected_data,
            remediation,
            resolved: false,
            resolved_at: None,
        }
    }
}

/// In-memory violation set with one lock per record.
///
/// The outer map lock is only held for map operations; record mutation
/// happens under the record's own lock so slow remediation on one
/// violation never blocks reads of another.
#[derive(Default)]
pub struct ViolationStore {
    records: SyncRwLock<HashMap<Uuid, Arc<RwLock<ComplianceViolation>>>>,
}

impl ViolationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a violation, returning its id.
    pub fn insert(&self, violation: ComplianceViolation) -> Uuid {
        let id = violation.id;
        self.records
            .write()
            .insert(id, Arc::new(RwLock::new(violation)));
        id
    }

    /// Shared handle to one record, for in-place mutation.
    pub fn record(&self, id: Uuid) -> Option<Arc<RwLock<ComplianceViolation>>> {
        self.records.read().get(&id).cloned()
    }

    /// Snapshot of one violation.
    pub async fn get(&self, id: Uuid) -> Option<ComplianceViolation> {
        let record = self.record(id)?;
        let violation = record.read().await;
        Some(violation.clone())
    }

    /// Snapshot of all open violations, newest first.
    pub async fn open_violations(&self) -> Vec<ComplianceViolation> {
        let records: Vec<_> = self.records.read().values().cloned().collect();
        let mut open = Vec::new();
        for record in records {
            let violation = record.read().await;
            if !violation.resolved {
                open.push(violation.clone());
            }
        }
        open.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        open
    }

    /// Whether any open violation is critical.
    pub async fn has_open_critical(&self) -> bool {
        self.open_violations()
            .await
            .iter()
            .any(|v| v.severity == Severity::Critical)
    }

    /// Mark a violation resolved (human sign-off path). Returns the updated
    /// snapshot, or `None` for an unknown id.
    pub async fn resolve(&self, id: Uuid) -> Option<ComplianceViolation> {
        let record = self.record(id)?;
        let mut violation = record.write().await;
        if !violation.resolved {
            violation.resolved = true;
            violation.resolved_at = Some(Utc::now());
        }
        Some(violation.clone())
    }

    /// Number of stored violations, resolved included.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
