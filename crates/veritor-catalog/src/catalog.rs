use crate::types::Regulation;
use crate::{ccpa, gdpr, hipaa, iso27001, soc2};
use std::collections::HashMap;
use std::sync::Arc;

/// The set of regulations an engine instance assesses against.
///
/// Read-only after construction; entries are shared as [`Arc`]s so
/// assessment tasks can hold a regulation without copying it.
#[derive(Debug, Clone)]
pub struct RegulationCatalog {
    regulations: HashMap<String, Arc<Regulation>>,
}

impl RegulationCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self {
            regulations: HashMap::new(),
        }
    }

    /// The built-in catalog: GDPR, HIPAA, CCPA, SOC 2, ISO 27001.
    pub fn builtin() -> Self {
        Self::empty()
            .with_regulation(gdpr::regulation())
            .with_regulation(hipaa::regulation())
            .with_regulation(ccpa::regulation())
            .with_regulation(soc2::regulation())
            .with_regulation(iso27001::regulation())
    }

    /// Add or replace a regulation keyed by its id.
    pub fn with_regulation(mut self, regulation: Regulation) -> Self {
        self.regulations
            .insert(regulation.id.clone(), Arc::new(regulation));
        self
    }

    /// Look up a regulation by id.
    pub fn get(&self, id: &str) -> Option<Arc<Regulation>> {
        self.regulations.get(id).cloned()
    }

    /// All regulation ids, sorted for deterministic iteration.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.regulations.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Iterate over all regulations.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Regulation>> {
        self.regulations.values()
    }

    pub fn len(&self) -> usize {
        self.regulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regulations.is_empty()
    }
}

impl Default for RegulationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
