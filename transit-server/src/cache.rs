//! Caching layer for route queries.
//!
//! Planning is pure given a snapshot, so results are cached per
//! (snapshot version, origin, destination). A refresh bumps the version,
//! which makes every older entry unreachable; the cache is also cleared so
//! the old entries do not wait for their TTL.
//!
//! `NoRoute` answers are cached as well: they are an ordinary outcome and
//! just as expensive to recompute.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{Stop, StopId};
use crate::network::{NetworkSnapshot, NetworkSource, SnapshotStore, SourceError};
use crate::planner::{
    LookupKind, LookupResults, PlanError, PlannedRoute, PlannerConfig, RoutePlanner,
};

/// Cache key: (snapshot version, from, to).
type PlanKey = (u64, StopId, StopId);

/// Cached query outcome.
type PlanEntry = Result<Arc<PlannedRoute>, PlanError>;

/// Configuration for the plan cache.
#[derive(Debug, Clone)]
pub struct PlanCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for PlanCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
        }
    }
}

/// Cache of route query outcomes.
pub struct PlanCache {
    plans: MokaCache<PlanKey, PlanEntry>,
}

impl PlanCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &PlanCacheConfig) -> Self {
        let plans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { plans }
    }

    pub async fn get(&self, key: &PlanKey) -> Option<PlanEntry> {
        self.plans.get(key).await
    }

    pub async fn insert(&self, key: PlanKey, entry: PlanEntry) {
        self.plans.insert(key, entry).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.plans.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.plans.invalidate_all();
    }
}

/// Route planner over a refreshable snapshot, with caching.
pub struct CachedRoutePlanner<S> {
    store: SnapshotStore<S>,
    cache: PlanCache,
    config: PlannerConfig,
}

impl<S: NetworkSource> CachedRoutePlanner<S> {
    /// Create a new cached planner.
    pub fn new(
        store: SnapshotStore<S>,
        config: PlannerConfig,
        cache_config: &PlanCacheConfig,
    ) -> Self {
        Self {
            store,
            cache: PlanCache::new(cache_config),
            config,
        }
    }

    /// Plan a route on the current snapshot, using the cache if possible.
    pub async fn plan(&self, from: StopId, to: StopId) -> Result<Arc<PlannedRoute>, PlanError> {
        let snapshot = self.store.current().await;
        let key = (snapshot.version(), from, to);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(%from, %to, version = key.0, "plan cache hit");
            return cached;
        }

        let entry = RoutePlanner::new(&snapshot, &self.config)
            .plan(from, to)
            .map(Arc::new);

        // Usage errors depend only on the request; don't let them fill the cache.
        if !entry.as_ref().is_err_and(PlanError::is_usage) {
            self.cache.insert(key, entry.clone()).await;
        }

        entry
    }

    /// Stops matching a name query on the current snapshot.
    pub async fn search_stops(&self, query: &str, limit: Option<usize>) -> Vec<Stop> {
        let snapshot = self.store.current().await;
        RoutePlanner::new(&snapshot, &self.config)
            .search_stops(query, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Look up stops, edges or routes on the current snapshot.
    pub async fn lookup(&self, kind: LookupKind, query: &str) -> LookupResults {
        let snapshot = self.store.current().await;
        RoutePlanner::new(&snapshot, &self.config)
            .lookup(kind, query)
    }

    /// Rebuild the snapshot from the source and drop cached plans.
    pub async fn refresh(&self) -> Result<Arc<NetworkSnapshot>, SourceError> {
        let snapshot = self.store.refresh().await?;
        self.cache.invalidate_all();
        Ok(snapshot)
    }

    /// The snapshot currently in use.
    pub async fn snapshot(&self) -> Arc<NetworkSnapshot> {
        self.store.current().await
    }

    pub fn source(&self) -> &S {
        self.store.source()
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, RouteId};
    use crate::network::NetworkData;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that serves a different network on each fetch.
    struct SequenceSource {
        networks: Mutex<Vec<NetworkData>>,
        fetches: AtomicUsize,
    }

    impl SequenceSource {
        fn new(mut networks: Vec<NetworkData>) -> Self {
            networks.reverse();
            Self {
                networks: Mutex::new(networks),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl NetworkSource for SequenceSource {
        async fn fetch(&self) -> Result<NetworkData, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.networks
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| SourceError::Config("no more networks".into()))
        }

        fn describe(&self) -> String {
            "sequence".to_string()
        }
    }

    fn network(edges: &[(i64, i64, &str)]) -> NetworkData {
        NetworkData {
            stops: (1..=3)
                .map(|i| Stop::new(StopId(i), format!("Stop {i}")))
                .collect(),
            edges: edges
                .iter()
                .map(|(from, to, r)| {
                    let route = RouteId::new(r).unwrap();
                    Edge::new(StopId(*from), StopId(*to), route, Some(1.0))
                })
                .collect(),
            routes: vec![],
        }
    }

    async fn planner(networks: Vec<NetworkData>) -> CachedRoutePlanner<SequenceSource> {
        let store = SnapshotStore::load(SequenceSource::new(networks)).await.unwrap();
        CachedRoutePlanner::new(store, PlannerConfig::default(), &PlanCacheConfig::default())
    }

    #[test]
    fn default_config() {
        let config = PlanCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[test]
    fn cache_creation() {
        let cache = PlanCache::new(&PlanCacheConfig::default());
        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn repeated_plan_is_served_from_cache() {
        let planner = planner(vec![network(&[(1, 2, "R1")])]).await;

        let first = planner.plan(StopId(1), StopId(2)).await.unwrap();
        let second = planner.plan(StopId(1), StopId(2)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn no_route_is_cached_too() {
        let planner = planner(vec![network(&[(1, 2, "R1")])]).await;

        assert!(matches!(
            planner.plan(StopId(1), StopId(3)).await,
            Err(PlanError::NoRoute { .. })
        ));
        let key = (1, StopId(1), StopId(3));
        assert!(planner.cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn invalid_stop_is_not_cached() {
        let planner = planner(vec![network(&[(1, 2, "R1")])]).await;

        assert_eq!(
            planner.plan(StopId(1), StopId(42)).await,
            Err(PlanError::InvalidStop(StopId(42)))
        );
        let key = (1, StopId(1), StopId(42));
        assert!(planner.cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn refresh_changes_answers() {
        let planner = planner(vec![
            network(&[(1, 2, "R1")]),
            network(&[(1, 2, "R1"), (2, 3, "R1")]),
        ])
        .await;

        assert!(planner.plan(StopId(1), StopId(3)).await.is_err());

        let snapshot = planner.refresh().await.unwrap();
        assert_eq!(snapshot.version(), 2);

        let planned = planner.plan(StopId(1), StopId(3)).await.unwrap();
        assert_eq!(planned.network_version, 2);
        assert_eq!(planned.path.len(), 3);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_serving() {
        let planner = planner(vec![network(&[(1, 2, "R1")])]).await;

        assert!(planner.refresh().await.is_err());
        assert!(planner.plan(StopId(1), StopId(2)).await.is_ok());
        assert_eq!(planner.store.source().fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn search_stops_uses_current_snapshot() {
        let planner = planner(vec![network(&[])]).await;

        let stops = planner.search_stops("stop", Some(2)).await;
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].id, StopId(1));
    }

    #[tokio::test]
    async fn lookup_follows_refresh() {
        let planner = planner(vec![
            network(&[(1, 2, "R1")]),
            network(&[(1, 2, "R1"), (2, 3, "R7")]),
        ])
        .await;

        assert!(planner.lookup(LookupKind::Edges, "R7").await.is_empty());

        planner.refresh().await.unwrap();
        let LookupResults::Edges(edges) = planner.lookup(LookupKind::Edges, "R7").await else {
            panic!("expected edges");
        };
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, StopId(2));
    }

    #[tokio::test]
    async fn cached_plans_are_counted() {
        let planner = planner(vec![network(&[(1, 2, "R1")])]).await;

        planner.plan(StopId(1), StopId(2)).await.unwrap();
        planner.cache.plans.run_pending_tasks().await;
        assert_eq!(planner.cache_entry_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_queries_share_a_snapshot() {
        let planner = Arc::new(planner(vec![network(&[(1, 2, "R1"), (2, 3, "R2")])]).await);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let planner = planner.clone();
                tokio::spawn(async move { planner.plan(StopId(1), StopId(3)).await })
            })
            .collect();

        for handle in handles {
            let planned = handle.await.unwrap().unwrap();
            assert_eq!(planned.total_distance, 7.0);
        }
    }
}
