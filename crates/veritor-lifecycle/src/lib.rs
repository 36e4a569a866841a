//! Violation and risk lifecycle management for the Veritor compliance
//! engine.
//!
//! Owns the durable set of open and resolved violations, open and closed
//! risks, the residual-risk mathematics, and the automated remediation
//! executor with its critical-severity safety rule.
//!
//! # Main types
//!
//! - [`ViolationStore`] / [`ComplianceViolation`]: open-to-resolved lifecycle
//! - [`RiskStore`] / [`ComplianceRisk`]: likelihood times impact exposures
//! - [`AutoRemediator`]: runs the automated steps of a remediation plan

/// Automated remediation execution.
pub mod remediation;
/// Risk records and residual-risk math.
pub mod risk;
/// Violation records and store.
pub mod violation;

pub use remediation::{AutoRemediator, RemediationOutcome};
pub use risk::{ComplianceRisk, RiskMitigation, RiskStore, HIGH_RISK_THRESHOLD};
pub use violation::{ComplianceViolation, ViolationStore};
