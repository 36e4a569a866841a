//! Breach rule for automated checks.

use veritor_catalog::AutomatedCheck;
use veritor_core::ComplianceEvent;

/// Turn an observed check value into a violation event if it breaches.
///
/// A check breaches when the observed value is strictly greater than its
/// threshold; the synthesized violation carries the check's severity.
pub fn breach_event(
    regulation_id: &str,
    requirement_id: &str,
    check: &AutomatedCheck,
    observed: f64,
) -> Option<ComplianceEvent> {
    if observed > check.threshold {
        Some(ComplianceEvent::ViolationDetected {
            regulation: regulation_id.to_string(),
            requirement: requirement_id.to_string(),
            severity: check.severity,
            description: format!(
                "Automated check '{}' breached: {} = {observed}, threshold {}",
                check.name, check.query, check.threshold
            ),
            affected_data: Vec::new(),
        })
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use veritor_core::Severity;

    fn check() -> AutomatedCheck {
        AutomatedCheck::new(
            "test-check",
            "Stale grants",
            "0 0 4 * * * *",
            "stale_grants",
            5.0,
            Severity::Medium,
        )
    }

    #[test]
    fn test_value_over_threshold_breaches() {
        let event = breach_event("soc2", "soc2-cc6", &check(), 6.0).unwrap();
        match event {
            ComplianceEvent::ViolationDetected {
                regulation,
                requirement,
                severity,
                description,
                ..
            } => {
                assert_eq!(regulation, "soc2");
                assert_eq!(requirement, "soc2-cc6");
                assert_eq!(severity, Severity::Medium);
                assert!(description.contains("stale_grants"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_value_at_threshold_passes() {
        assert!(breach_event("soc2", "soc2-cc6", &check(), 5.0).is_none());
        assert!(breach_event("soc2", "soc2-cc6", &check(), 0.0).is_none());
    }
}
