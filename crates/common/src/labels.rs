use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Sorted label set identifying the monitored entity (slot, connector, ...).
pub type LabelSet = BTreeMap<String, String>;

pub fn label_set<const N: usize>(pairs: [(&str, &str); N]) -> LabelSet {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn fingerprint(condition: &str, labels: &LabelSet) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    condition.hash(&mut hasher);
    for (k, v) in labels {
        k.hash(&mut hasher);
        v.hash(&mut hasher);
    }
    hasher.finish()
}

pub fn fingerprint_string(condition: &str, labels: &LabelSet) -> String {
    format!("{:016x}", fingerprint(condition, labels))
}
