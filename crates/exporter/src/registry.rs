use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use lagwatch_common::status::Reachability;

/// One Connect cluster REST endpoint. The id doubles as the metric label,
/// scheme stripped like the exposition `instance` label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub id: String,
    pub base_url: String,
}

impl Endpoint {
    pub fn from_url(url: &str) -> Self {
        let base_url = url.trim().trim_end_matches('/').to_string();
        let id = base_url
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .to_string();
        Self { id, base_url }
    }
}

/// Current target set plus per-endpoint reachability. The target list is
/// swapped atomically on reload; in-flight polls keep their own `Arc` and
/// their results for removed endpoints are dropped at publish time.
pub struct Registry {
    targets: RwLock<Arc<Vec<Endpoint>>>,
    reachability: DashMap<String, Reachability>,
}

impl Registry {
    pub fn new(urls: &[String]) -> Self {
        let targets: Vec<Endpoint> = urls.iter().map(|u| Endpoint::from_url(u)).collect();
        let reachability = DashMap::new();
        for endpoint in &targets {
            reachability.insert(endpoint.id.clone(), Reachability::Unknown);
        }
        Self {
            targets: RwLock::new(Arc::new(targets)),
            reachability,
        }
    }

    pub fn current_targets(&self) -> Arc<Vec<Endpoint>> {
        self.targets.read().expect("registry lock poisoned").clone()
    }

    pub fn reload(&self, urls: &[String]) {
        let targets: Vec<Endpoint> = urls.iter().map(|u| Endpoint::from_url(u)).collect();
        for endpoint in &targets {
            self.reachability
                .entry(endpoint.id.clone())
                .or_insert(Reachability::Unknown);
        }
        self.reachability
            .retain(|id, _| targets.iter().any(|e| &e.id == id));

        *self.targets.write().expect("registry lock poisoned") = Arc::new(targets);
    }

    /// Reachability updates come only from the poll cycle.
    pub fn mark(&self, id: &str, state: Reachability) {
        if let Some(mut entry) = self.reachability.get_mut(id) {
            *entry = state;
        }
    }

    pub fn reachability(&self, id: &str) -> Reachability {
        self.reachability
            .get(id)
            .map(|r| *r)
            .unwrap_or(Reachability::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_id_strips_scheme_and_slash() {
        let e = Endpoint::from_url("http://connect-a:8083/");
        assert_eq!(e.id, "connect-a:8083");
        assert_eq!(e.base_url, "http://connect-a:8083");

        let e = Endpoint::from_url("https://connect-b:8083");
        assert_eq!(e.id, "connect-b:8083");
    }

    #[test]
    fn starts_unknown_until_marked() {
        let registry = Registry::new(&["http://a:8083".into()]);
        assert_eq!(registry.reachability("a:8083"), Reachability::Unknown);

        registry.mark("a:8083", Reachability::Reachable);
        assert_eq!(registry.reachability("a:8083"), Reachability::Reachable);
    }

    #[test]
    fn reload_swaps_set_atomically() {
        let registry = Registry::new(&["http://a:8083".into(), "http://b:8083".into()]);
        let before = registry.current_targets();
        registry.mark("a:8083", Reachability::Reachable);

        registry.reload(&["http://b:8083".into(), "http://c:8083".into()]);

        // The old handle still sees the pre-reload set.
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].id, "a:8083");

        let after = registry.current_targets();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, "b:8083");
        assert_eq!(after[1].id, "c:8083");

        // Removed endpoints drop their reachability; new ones start unknown.
        assert_eq!(registry.reachability("a:8083"), Reachability::Unknown);
        assert_eq!(registry.reachability("c:8083"), Reachability::Unknown);
    }

    #[test]
    fn empty_target_set_is_valid() {
        let registry = Registry::new(&[]);
        assert!(registry.current_targets().is_empty());
    }

    #[test]
    fn mark_ignores_unregistered_endpoint() {
        let registry = Registry::new(&["http://a:8083".into()]);
        registry.mark("ghost:8083", Reachability::Reachable);
        assert_eq!(registry.reachability("ghost:8083"), Reachability::Unknown);
    }
}
