//! In-memory memoization for provider calls.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a single pipeline call interacts with the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve a live entry if present, otherwise fetch and store.
    #[default]
    Use,
    /// Always fetch, then overwrite the stored entry.
    Refresh,
    /// Always fetch and leave the cache untouched.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        !matches!(self, Self::Bypass)
    }
}

/// Cache key: the memoized function plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub function: &'static str,
    pub args: Vec<String>,
}

impl CacheKey {
    pub fn new<I, S>(function: &'static str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function,
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, self.args.join(", "))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<CacheKey, CacheEntry<V>>,
    ttl: Duration,
}

/// Thread-safe TTL cache shared by clones.
#[derive(Debug)]
pub struct CacheStore<V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<V>>>,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> CacheStore<V> {
    /// A zero `ttl` disables the store: nothing is kept.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let store = self.inner.read().await;
        store
            .map
            .get(key)
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub async fn put(&self, key: CacheKey, value: V) {
        let mut store = self.inner.write().await;
        if store.ttl.is_zero() {
            return;
        }
        let expires_at = Instant::now() + store.ttl;
        store.map.insert(key, CacheEntry { value, expires_at });
    }

    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .map
            .retain(|_, entry| entry.expires_at > now);
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Entry count, expired entries included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        self.inner.read().await.ttl.is_zero()
    }
}
