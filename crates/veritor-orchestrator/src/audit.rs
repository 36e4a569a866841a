use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{error, warn};
use veritor_core::ComplianceEvent;

/// One line in the append-only audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub event_kind: String,
    pub actionable: bool,
    pub details: serde_json::Value,
}

/// Append-only JSONL audit trail.
///
/// Records are sent over an unbounded channel to a background writer so the
/// event path never blocks on disk IO. Every routed event lands here before
/// any handler runs.
pub struct AuditTrail {
    tx: mpsc::UnboundedSender<AuditRecord>,
}

impl AuditTrail {
    /// Start the background writer appending to `compliance_audit.jsonl`
    /// under `log_dir`.
    pub fn new(log_dir: PathBuf) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditRecord>();

        tokio::spawn(async move {
            if let Err(e) = tokio::fs::create_dir_all(&log_dir).await {
                error!("Failed to create audit directory: {e}");
                return;
            }
            let path = log_dir.join("compliance_audit.jsonl");
            while let Some(record) = rx.recv().await {
                let line = match serde_json::to_string(&record) {
                    Ok(line) => line,
                    Err(e) => {
                        error!("Failed to serialize audit record: {e}");
                        continue;
                    }
                };
                match OpenOptions::new().append(true).create(true).open(&path).await {
                    Ok(mut file) => {
                        if let Err(e) = file.write_all(format!("{line}\n").as_bytes()).await {
                            error!("Failed to write audit record: {e}");
                        }
                    }
                    Err(e) => error!("Failed to open audit log: {e}"),
                }
            }
        });

        Self { tx }
    }

    /// Record a routed compliance event.
    pub fn record_event(&self, event: &ComplianceEvent) {
        let details = serde_json::to_value(event).unwrap_or(serde_json::Value::Null);
        self.record_with(event.kind(), event.is_actionable(), details);
    }

    /// Record an orchestrator-originated entry, e.g. a rejected data request.
    pub fn record(&self, kind: &str, details: serde_json::Value) {
        self.record_with(kind, false, details);
    }

    fn record_with(&self, kind: &str, actionable: bool, details: serde_json::Value) {
        let record = AuditRecord {
            timestamp: Utc::now(),
            event_kind: kind.to_string(),
            actionable,
            details,
        };
        if self.tx.send(record).is_err() {
            warn!("Audit channel closed, record dropped");
        }
    }
}
