//! Compliance orchestration for the Veritor system.
//!
//! Aggregates collaborator domain scores into a weighted compliance
//! status, routes compliance events through audit logging to their
//! handlers, runs the background monitoring loops, and produces scheduled
//! and on-demand reports.
//!
//! # Main types
//!
//! - [`ComplianceManager`]: the top-level facade, assembled by injection
//! - [`StatusAggregator`] / [`ComplianceStatus`]: weighted status snapshots
//! - [`EventRouter`]: audit-first event handling with auto-remediation
//! - [`MonitorScheduler`]: cron-driven background monitoring loops
//! - [`ReportGenerator`]: trend history and persisted reports

/// Weighted status aggregation over collaborator domains.
pub mod aggregator;
/// Append-only JSONL audit trail.
pub mod audit;
/// The manager facade and its builder.
pub mod manager;
/// Orchestrator gauges and counters.
pub mod metrics;
/// Notification fan-out to registered sinks.
pub mod notify;
/// Report building, trends, and persistence.
pub mod report;
/// Compliance event routing.
pub mod router;
/// Background monitoring loops and shutdown.
pub mod scheduler;
/// Status snapshot and recommendation types.
pub mod types;

pub use aggregator::{CollaboratorSet, StatusAggregator};
pub use audit::{AuditRecord, AuditTrail};
pub use manager::{ComplianceCheck, ComplianceManager, ComplianceManagerBuilder};
pub use metrics::{ComplianceMetrics, MetricsSnapshot};
pub use notify::{Notification, NotificationHub, NotificationSink};
pub use report::{ComplianceReport, ReportCadence, ReportGenerator, TrendDirection, TrendPoint};
pub use router::EventRouter;
pub use scheduler::MonitorScheduler;
pub use types::{ComplianceRecommendation, ComplianceStatus, RecommendationKind};
