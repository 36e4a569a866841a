//! Core types shared across the Veritor compliance engine.
//!
//! This crate holds the vocabulary every other Veritor crate speaks:
//! severities and requirement categories, compliance events, remediation
//! plans, the collaborator trait seams, configuration, and the error type.
//!
//! # Main types
//!
//! - [`Severity`]: ordered severity scale used by violations, gaps and plans
//! - [`ComplianceEvent`]: closed union of everything the engine reacts to
//! - [`RemediationPlan`]: ordered remediation steps with automation metadata
//! - [`ComplianceConfig`]: TOML-loadable engine configuration
//! - [`VeritorError`]: error taxonomy for the whole workspace

/// Collaborator trait seams and domain status types.
pub mod collaborator;
/// Engine configuration and environment overrides.
pub mod config;
/// Error types.
pub mod error;
/// Compliance events and data subject requests.
pub mod event;
/// Remediation actions, steps and plans.
pub mod remediation;
/// Severity scale and requirement categories.
pub mod severity;

pub use collaborator::{
    AccessCollaborator, DataRequestOutcome, Domain, DomainStatus, GovernanceCollaborator,
    PrivacyCollaborator, RemediationExecutor, RequestValidation, SecurityCollaborator,
};
pub use config::{ComplianceConfig, Environment, ScoreWeights};
pub use error::{VeritorError, VeritorResult};
pub use event::{ComplianceEvent, DataRequest, DataRequestKind};
pub use remediation::{RemediationAction, RemediationPlan, RemediationStep, StepStatus};
pub use severity::{RequirementCategory, Severity};
