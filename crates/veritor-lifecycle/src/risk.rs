use chrono::{DateTime, Utc};
use parking_lot::RwLock as SyncRwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use veritor_core::{RequirementCategory, VeritorError, VeritorResult};

/// Default risk score at or above which a risk counts as high.
pub const HIGH_RISK_THRESHOLD: u8 = 15;

/// A mitigation applied to a risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMitigation {
    pub id: Uuid,
    pub description: String,
    /// 0–100, how much of the risk this mitigation removes.
    pub effectiveness: u8,
    pub implemented_at: DateTime<Utc>,
}

/// A forward-looking likelihood times impact exposure.
///
/// `risk_score` and `residual_risk` are derived fields, recomputed inside
/// the same mutation that changes their inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRisk {
    pub id: Uuid,
    pub category: RequirementCategory,
    pub description: String,
    /// 1–5.
    pub likelihood: u8,
    /// 1–5.
    pub impact: u8,
    /// `likelihood * impact`, 1–25.
    pub risk_score: u8,
    pub mitigations: Vec<RiskMitigation>,
    /// Score remaining after mitigations; never exceeds `risk_score`.
    pub residual_risk: u8,
    pub identified_at: DateTime<Utc>,
    pub mitigated: bool,
}

fn clamp_band(value: u8) -> u8 {
    value.clamp(1, 5)
}

impl ComplianceRisk {
    /// Create an open risk identified now. Likelihood and impact are
    /// clamped to 1–5.
    pub fn new(
        category: RequirementCategory,
        description: impl Into<String>,
        likelihood: u8,
        impact: u8,
    ) -> Self {
        let likelihood = clamp_band(likelihood);
        let impact = clamp_band(impact);
        let mut risk = Self {
            id: Uuid::new_v4(),
            category,
            description: description.into(),
            likelihood,
            impact,
            risk_score: 0,
            mitigations: Vec::new(),
            residual_risk: 0,
            identified_at: Utc::now(),
            mitigated: false,
        };
        risk.recompute();
        risk
    }

    pub fn set_likelihood(&mut self, likelihood: u8) {
        self.likelihood = clamp_band(likelihood);
        self.recompute();
    }

    pub fn set_impact(&mut self, impact: u8) {
        self.impact = clamp_band(impact);
        self.recompute();
    }

    /// Add a mitigation; the residual recompute happens inside the same
    /// call, so readers never see the mitigation without its effect.
    pub fn add_mitigation(&mut self, description: impl Into<String>, effectiveness: u8) {
        self.mitigations.push(RiskMitigation {
            id: Uuid::new_v4(),
            description: description.into(),
            effectiveness: effectiveness.min(100),
            implemented_at: Utc::now(),
        });
        self.recompute();
    }

    /// Diminishing-returns residual: combined mitigation effect is scaled
    /// by 0.8 and capped at a 90% reduction.
    fn recompute(&mut self) {
        self.risk_score = self.likelihood * self.impact;
        let combined: f64 = self
            .mitigations
            .iter()
            .map(|m| f64::from(m.effectiveness) / 100.0)
            .sum();
        let multiplier = 1.0 - (combined * 0.8).min(0.9);
        self.residual_risk = (f64::from(self.risk_score) * multiplier).round() as u8;
    }
}

/// In-memory risk set with one lock per record.
#[derive(Default)]
pub struct RiskStore {
    records: SyncRwLock<HashMap<Uuid, Arc<RwLock<ComplianceRisk>>>>,
}

impl RiskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a risk, returning its id.
    pub fn insert(&self, risk: ComplianceRisk) -> Uuid {
        let id = risk.id;
        self.records.write().insert(id, Arc::new(RwLock::new(risk)));
        id
    }

    /// Snapshot of one risk.
    pub async fn get(&self, id: Uuid) -> Option<ComplianceRisk> {
        let record = self.records.read().get(&id).cloned()?;
        let risk = record.read().await;
        Some(risk.clone())
    }

    /// Snapshot of all open risks, highest score first.
    pub async fn open_risks(&self) -> Vec<ComplianceRisk> {
        let records: Vec<_> = self.records.read().values().cloned().collect();
        let mut open = Vec::new();
        for record in records {
            let risk = record.read().await;
            if !risk.mitigated {
                open.push(risk.clone());
            }
        }
        open.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        open
    }

    /// Open risks at or above the high-risk threshold.
    pub async fn high_risks(&self) -> Vec<ComplianceRisk> {
        self.open_risks()
            .await
            .into_iter()
            .filter(|r| r.risk_score >= HIGH_RISK_THRESHOLD)
            .collect()
    }

    /// Add a mitigation to a risk under its record lock.
    pub async fn add_mitigation(
        &self,
        id: Uuid,
        description: impl Into<String>,
        effectiveness: u8,
    ) -> VeritorResult<ComplianceRisk> {
        let record = self.locked_record(id)?;
        let mut risk = record.write().await;
        risk.add_mitigation(description, effectiveness);
        Ok(risk.clone())
    }

    /// Re-rate a risk's likelihood under its record lock.
    pub async fn set_likelihood(&self, id: Uuid, likelihood: u8) -> VeritorResult<ComplianceRisk> {
        let record = self.locked_record(id)?;
        let mut risk = record.write().await;
        risk.set_likelihood(likelihood);
        Ok(risk.clone())
    }

    /// Re-rate a risk's impact under its record lock.
    pub async fn set_impact(&self, id: Uuid, impact: u8) -> VeritorResult<ComplianceRisk> {
        let record = self.locked_record(id)?;
        let mut risk = record.write().await;
        risk.set_impact(impact);
        Ok(risk.clone())
    }

    /// Close a risk as mitigated or accepted.
    pub async fn close(&self, id: Uuid) -> VeritorResult<ComplianceRisk> {
        let record = self.locked_record(id)?;
        let mut risk = record.write().await;
        risk.mitigated = true;
        Ok(risk.clone())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn locked_record(&self, id: Uuid) -> VeritorResult<Arc<RwLock<ComplianceRisk>>> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| VeritorError::Config(format!("Unknown risk '{id}'")))
    }
}
