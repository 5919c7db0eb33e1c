use serde::{Deserialize, Serialize};

use lagwatch_common::severity::Severity;

use crate::engine::FiringAlert;
use crate::event::AlertEvent;

/// While an instance matching `source` is firing, instances matching
/// `target` that agree on every label in `equal` are not dispatched. State
/// transitions keep running underneath; only notification is suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InhibitRule {
    pub source: Matcher,
    pub target: Matcher,
    #[serde(default)]
    pub equal: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Matcher {
    /// Condition name, trailing `*` allowed as a prefix wildcard.
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl Matcher {
    pub fn matches(&self, condition: &str, severity: Severity) -> bool {
        if let Some(ref pattern) = self.condition {
            if !pattern_matches(pattern, condition) {
                return false;
            }
        }
        if let Some(want) = self.severity {
            if severity != want {
                return false;
            }
        }
        true
    }
}

fn pattern_matches(pattern: &str, name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    pattern == name
}

pub fn is_inhibited(event: &AlertEvent, rules: &[InhibitRule], firing: &[FiringAlert]) -> bool {
    rules.iter().any(|rule| {
        if !rule.target.matches(&event.condition, event.severity) {
            return false;
        }
        firing.iter().any(|source| {
            source.fingerprint != event.fingerprint
                && rule.source.matches(&source.condition, source.severity)
                && rule
                    .equal
                    .iter()
                    .all(|label| source.labels.get(label) == event.labels.get(label))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AlertStatus;
    use lagwatch_common::labels::label_set;

    fn firing(condition: &str, severity: Severity, endpoint: &str) -> FiringAlert {
        FiringAlert {
            fingerprint: format!("fp-{condition}-{endpoint}"),
            condition: condition.into(),
            severity,
            labels: label_set([("endpoint", endpoint)]),
        }
    }

    fn event(condition: &str, severity: Severity, endpoint: &str) -> AlertEvent {
        AlertEvent {
            id: "e".into(),
            fingerprint: format!("fp-{condition}-{endpoint}"),
            condition: condition.into(),
            severity,
            status: AlertStatus::Firing,
            labels: label_set([("endpoint", endpoint)]),
            value: 1.0,
            started_at_ms: 0,
            resolved_at_ms: None,
        }
    }

    fn rule() -> InhibitRule {
        InhibitRule {
            source: Matcher {
                condition: Some("endpoint_unreachable".into()),
                severity: None,
            },
            target: Matcher {
                condition: Some("connector_*".into()),
                severity: None,
            },
            equal: vec!["endpoint".into()],
        }
    }

    #[test]
    fn suppresses_matching_target_on_same_endpoint() {
        let firing = vec![firing("endpoint_unreachable", Severity::Critical, "c1")];
        let e = event("connector_failed", Severity::Warning, "c1");
        assert!(is_inhibited(&e, &[rule()], &firing));
    }

    #[test]
    fn different_endpoint_not_suppressed() {
        let firing = vec![firing("endpoint_unreachable", Severity::Critical, "c1")];
        let e = event("connector_failed", Severity::Warning, "c2");
        assert!(!is_inhibited(&e, &[rule()], &firing));
    }

    #[test]
    fn no_firing_source_no_suppression() {
        let e = event("connector_failed", Severity::Warning, "c1");
        assert!(!is_inhibited(&e, &[rule()], &[]));
    }

    #[test]
    fn source_does_not_inhibit_itself() {
        let firing = vec![firing("connector_failed", Severity::Critical, "c1")];
        let e = event("connector_failed", Severity::Critical, "c1");
        let self_rule = InhibitRule {
            source: Matcher {
                condition: Some("connector_*".into()),
                severity: None,
            },
            target: Matcher {
                condition: Some("connector_*".into()),
                severity: None,
            },
            equal: vec!["endpoint".into()],
        };
        assert!(!is_inhibited(&e, &[self_rule], &firing));
    }

    #[test]
    fn severity_matcher() {
        let by_severity = InhibitRule {
            source: Matcher {
                condition: None,
                severity: Some(Severity::Critical),
            },
            target: Matcher {
                condition: None,
                severity: Some(Severity::Warning),
            },
            equal: vec!["endpoint".into()],
        };
        let firing = vec![firing("slot_lag_critical", Severity::Critical, "c1")];
        assert!(is_inhibited(
            &event("slot_lag_warning", Severity::Warning, "c1"),
            &[by_severity.clone()],
            &firing
        ));
        assert!(!is_inhibited(
            &event("other_critical", Severity::Critical, "c1"),
            &[by_severity],
            &firing
        ));
    }

    #[test]
    fn wildcard_patterns() {
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("slot_*", "slot_lag_critical"));
        assert!(!pattern_matches("slot_*", "connector_failed"));
        assert!(pattern_matches("connector_failed", "connector_failed"));
    }
}
