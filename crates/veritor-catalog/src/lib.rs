//! Static regulatory catalog for the Veritor compliance engine.
//!
//! Regulations are versioned, immutable definitions of requirements, the
//! evidence that satisfies them, and the automated checks that watch them.
//! The catalog ships GDPR, HIPAA, CCPA, SOC 2 and ISO 27001 built in and
//! accepts custom regulations through [`RegulationCatalog::with_regulation`].
//!
//! # Main types
//!
//! - [`RegulationCatalog`]: the id-keyed regulation set, read-only after load
//! - [`Regulation`] / [`Requirement`]: the framework definitions themselves
//! - [`EvidenceRequirement`]: what evidence satisfies a requirement
//! - [`AutomatedCheck`]: scheduled machine-evaluable test templates

/// CCPA/CPRA definitions.
pub mod ccpa;
/// GDPR definitions.
pub mod gdpr;
/// HIPAA definitions.
pub mod hipaa;
/// ISO/IEC 27001 definitions.
pub mod iso27001;
/// SOC 2 Trust Services Criteria definitions.
pub mod soc2;

/// Catalog container.
pub mod catalog;
/// Catalog data types.
pub mod types;

pub use catalog::RegulationCatalog;
pub use types::{
    AutomatedCheck, EvidenceFrequency, EvidenceRequirement, EvidenceType, Regulation, Requirement,
};
