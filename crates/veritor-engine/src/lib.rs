//! Regulatory assessment engine for the Veritor compliance system.
//!
//! Assesses catalog requirements against collected evidence, computes
//! per-regulation compliance levels, classifies gaps, and evaluates
//! scheduled automated checks that can spawn violations.
//!
//! # Main types
//!
//! - [`RegulatoryEngine`]: per-regulation assessments with mutual exclusion
//! - [`RegulationStatus`] / [`RequirementStatus`]: assessment outcomes
//! - [`EvidenceCollector`] / [`CheckProbe`]: the external collection seams
//! - [`templates`]: remediation plan and mitigation strategy templates

/// Requirement assessment rules and status types.
pub mod assessment;
/// Automated check breach rule.
pub mod checks;
/// The assessment engine.
pub mod engine;
/// Evidence types and collection seams.
pub mod evidence;
/// Remediation and mitigation templates.
pub mod templates;

pub use assessment::{
    assess_requirement, compliance_level, gap_severity, ComplianceState, RegulationStatus,
    RequirementStatus,
};
pub use engine::{RegulatoryEngine, ScheduledCheck};
pub use evidence::{CheckProbe, Evidence, EvidenceCollector, EvidenceRef};
