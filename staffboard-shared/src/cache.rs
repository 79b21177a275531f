/// Per-user cache of derived views
///
/// Aggregates such as dashboard counts and the assistant snapshot are cheap to
/// serve from memory and expensive to rebuild. Entries expire after a TTL and
/// are dropped eagerly by mutations that change the underlying data.
///
/// # Example
///
/// ```no_run
/// use staffboard_shared::cache::{View, ViewCache};
/// use staffboard_shared::dashboard::DashboardStats;
/// use std::time::Duration;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let cache = ViewCache::new(Duration::from_secs(30));
/// let stats: DashboardStats = cache
///     .get_or_load(user_id, View::Dashboard, || DashboardStats::load(&pool, user_id))
///     .await?;
///
/// // After creating an employee
/// cache.invalidate(user_id, &[View::Dashboard, View::Assistant]).await;
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Cached view kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Assistant,
}

impl View {
    pub const ALL: [View; 2] = [View::Dashboard, View::Assistant];
}

#[derive(Debug)]
struct CachedView {
    stored_at: Instant,
    value: Value,
}

#[derive(Debug, Default)]
struct Entries {
    views: HashMap<(Uuid, View), CachedView>,
    /// Bumped by every invalidation of the user's views
    generations: HashMap<Uuid, u64>,
}

#[derive(Debug)]
pub struct ViewCache {
    ttl: Duration,
    entries: RwLock<Entries>,
}

impl ViewCache {
    /// Creates a cache; a zero TTL disables caching
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if present and fresh, dropping it if expired
    pub async fn get<T: DeserializeOwned>(&self, user_id: Uuid, view: View) -> Option<T> {
        let key = (user_id, view);
        {
            let entries = self.entries.read().await;
            let cached = entries.views.get(&key)?;
            if cached.stored_at.elapsed() < self.ttl {
                return serde_json::from_value(cached.value.clone()).ok();
            }
        }

        let mut entries = self.entries.write().await;
        let expired = entries
            .views
            .get(&key)
            .is_some_and(|cached| cached.stored_at.elapsed() >= self.ttl);
        if expired {
            entries.views.remove(&key);
        }
        None
    }

    pub async fn put<T: Serialize>(&self, user_id: Uuid, view: View, value: &T) {
        self.store(user_id, view, value, None).await;
    }

    /// Stores a value unless the user's views were invalidated after `generation`
    async fn store<T: Serialize>(&self, user_id: Uuid, view: View, value: &T, generation: Option<u64>) {
        if self.ttl.is_zero() {
            return;
        }

        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(?view, error = %e, "Failed to cache view");
                return;
            }
        };

        let mut entries = self.entries.write().await;
        if let Some(generation) = generation {
            let current = entries.generations.get(&user_id).copied().unwrap_or(0);
            if current != generation {
                tracing::debug!(%user_id, ?view, "View invalidated during load, not cached");
                return;
            }
        }

        entries.views.insert(
            (user_id, view),
            CachedView {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    async fn generation(&self, user_id: Uuid) -> u64 {
        self.entries
            .read()
            .await
            .generations
            .get(&user_id)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the cached view or loads, stores and returns it
    ///
    /// A load that overlaps an invalidation is returned but not stored.
    pub async fn get_or_load<T, E, F, Fut>(&self, user_id: Uuid, view: View, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(user_id, view).await {
            tracing::debug!(%user_id, ?view, "View cache hit");
            return Ok(value);
        }

        tracing::debug!(%user_id, ?view, "View cache miss");
        let generation = self.generation(user_id).await;
        let value = load().await?;
        self.store(user_id, view, &value, Some(generation)).await;
        Ok(value)
    }

    /// Drops the given views for a user
    pub async fn invalidate(&self, user_id: Uuid, views: &[View]) {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(user_id).or_insert(0) += 1;
        for view in views {
            entries.views.remove(&(user_id, *view));
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.views.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardStats;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let user = Uuid::new_v4();
        let stats = DashboardStats::new(3, 2, 4, 1);

        cache.put(user, View::Dashboard, &stats).await;
        assert_eq!(cache.get::<DashboardStats>(user, View::Dashboard).await, Some(stats));
        assert_eq!(cache.get::<DashboardStats>(user, View::Assistant).await, None);
        assert_eq!(cache.get::<DashboardStats>(Uuid::new_v4(), View::Dashboard).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_only_touches_one_user() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let stats = DashboardStats::default();

        cache.put(a, View::Dashboard, &stats).await;
        cache.put(b, View::Dashboard, &stats).await;
        cache.invalidate(a, &View::ALL).await;

        assert!(cache.get::<DashboardStats>(a, View::Dashboard).await.is_none());
        assert!(cache.get::<DashboardStats>(b, View::Dashboard).await.is_some());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = ViewCache::new(Duration::ZERO);
        cache.put(Uuid::new_v4(), View::Dashboard, &DashboardStats::default()).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_or_load_loads_once() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let user = Uuid::new_v4();

        let first: Result<DashboardStats, ()> = cache
            .get_or_load(user, View::Dashboard, || async { Ok(DashboardStats::new(1, 1, 1, 1)) })
            .await;
        assert_eq!(first.unwrap().total_employees, 1);

        let second: Result<DashboardStats, ()> = cache
            .get_or_load(user, View::Dashboard, || async { Err(()) })
            .await;
        assert_eq!(second.unwrap().completion_rate, 100);
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let cache = ViewCache::new(Duration::from_millis(20));
        let user = Uuid::new_v4();

        cache.put(user, View::Dashboard, &DashboardStats::default()).await;
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get::<DashboardStats>(user, View::Dashboard).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_overlapping_invalidation_is_not_stored() {
        let cache = ViewCache::new(Duration::from_secs(60));
        let user = Uuid::new_v4();

        let stale: Result<DashboardStats, ()> = cache
            .get_or_load(user, View::Dashboard, || async {
                // A mutation lands while the stats are being computed
                cache.invalidate(user, &View::ALL).await;
                Ok(DashboardStats::new(1, 0, 0, 0))
            })
            .await;
        assert_eq!(stale.unwrap().total_employees, 1);
        assert!(cache.get::<DashboardStats>(user, View::Dashboard).await.is_none());

        let fresh: Result<DashboardStats, ()> = cache
            .get_or_load(user, View::Dashboard, || async { Ok(DashboardStats::new(2, 0, 0, 0)) })
            .await;
        assert_eq!(fresh.unwrap().total_employees, 2);
        assert_eq!(
            cache.get::<DashboardStats>(user, View::Dashboard).await.map(|s| s.total_employees),
            Some(2)
        );
    }
}
