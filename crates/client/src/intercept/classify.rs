//! Request classification by URL-path substring.

use kiteshell_core::CacheStrategies;
use serde::Serialize;

/// Caching policy applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

/// Which of the two live partitions a policy reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    Static,
    Dynamic,
}

/// Classification result: the policy and its partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub policy: Policy,
    pub partition: PartitionKind,
}

impl Route {
    const STATIC: Route = Route { policy: Policy::CacheFirst, partition: PartitionKind::Static };
    const NETWORK: Route = Route { policy: Policy::NetworkFirst, partition: PartitionKind::Dynamic };
    const STALE: Route = Route { policy: Policy::StaleWhileRevalidate, partition: PartitionKind::Dynamic };
}

/// Immutable classification table.
///
/// Categories are checked static, network, stale; the first category with
/// any matching pattern wins. Unmatched paths are network-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    strategies: CacheStrategies,
}

impl Classifier {
    pub fn new(strategies: CacheStrategies) -> Self {
        Self { strategies }
    }

    pub fn classify(&self, path: &str) -> Route {
        if matches_any(&self.strategies.static_assets, path) {
            Route::STATIC
        } else if matches_any(&self.strategies.network, path) {
            Route::NETWORK
        } else if matches_any(&self.strategies.stale, path) {
            Route::STALE
        } else {
            Route::NETWORK
        }
    }

    pub fn strategies(&self) -> &CacheStrategies {
        &self.strategies
    }
}

fn matches_any(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|pattern| path.contains(pattern.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(CacheStrategies::default())
    }

    #[test]
    fn test_static_paths_are_cache_first() {
        for path in ["/img/Bakar.jpeg", "/fonts/Motiva-Sans-Bold.ttf", "/static/js/main.js"] {
            let route = classifier().classify(path);
            assert_eq!(route.policy, Policy::CacheFirst, "{path}");
            assert_eq!(route.partition, PartitionKind::Static, "{path}");
        }
    }

    #[test]
    fn test_api_paths_are_network_first() {
        let route = classifier().classify("/api/schedule");
        assert_eq!(route, Route { policy: Policy::NetworkFirst, partition: PartitionKind::Dynamic });
        assert_eq!(classifier().classify("/reviews/latest").policy, Policy::NetworkFirst);
    }

    #[test]
    fn test_content_paths_are_stale_while_revalidate() {
        let route = classifier().classify("/content/services.json");
        assert_eq!(route.policy, Policy::StaleWhileRevalidate);
        assert_eq!(route.partition, PartitionKind::Dynamic);
    }

    #[test]
    fn test_default_is_network_first() {
        let route = classifier().classify("/");
        assert_eq!(route.policy, Policy::NetworkFirst);
        assert_eq!(route.partition, PartitionKind::Dynamic);
        assert_eq!(classifier().classify("/manifest.json").policy, Policy::NetworkFirst);
    }

    #[test]
    fn test_substring_match_anywhere_in_path() {
        assert_eq!(classifier().classify("/de/img/gallery/1.webp").policy, Policy::CacheFirst);
    }

    #[test]
    fn test_category_order_static_wins() {
        assert_eq!(classifier().classify("/api/img/avatar.png").policy, Policy::CacheFirst);
        assert_eq!(classifier().classify("/content/api/x").policy, Policy::NetworkFirst);
    }

    #[test]
    fn test_custom_table() {
        let strategies = CacheStrategies {
            static_assets: vec!["/assets/".into()],
            network: vec![],
            stale: vec!["/schedule".into()],
        };
        let classifier = Classifier::new(strategies);
        assert_eq!(classifier.classify("/img/Bakar.jpeg").policy, Policy::NetworkFirst);
        assert_eq!(classifier.classify("/schedule").policy, Policy::StaleWhileRevalidate);
    }
}
