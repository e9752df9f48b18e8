// ── Time-bounded memoization ──
//
// Maps (entity, accessor) to the last computed value and when it was
// computed. Lookups within the TTL window return the stored value; anything
// older is recomputed. The map lock is never held across an await, so two
// callers racing the same key may both fetch; the later insert wins.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use strum::{Display, IntoStaticStr};
use tokio::time::Instant;
use tracing::trace;

use wlcdash_api::Error;

use crate::model::MacAddress;

/// Which entity a cached value belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Client(MacAddress),
    /// `owner` is `None` for the network-wide aggregate.
    Application {
        name: String,
        owner: Option<MacAddress>,
    },
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(mac) => write!(f, "client {mac}"),
            Self::Application { name, owner: None } => write!(f, "application {name}"),
            Self::Application {
                name,
                owner: Some(mac),
            } => write!(f, "application {name} on {mac}"),
        }
    }
}

/// Which refreshable group of an entity a cached value holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Accessor {
    Network,
    Qos,
    Radio,
    Security,
    Mobility,
    Apps,
    ClientApp,
    NetworkApp,
}

pub type CacheKey = (EntityKey, Accessor);

/// A value plus the instant it was computed.
#[derive(Debug, Clone)]
pub struct CachedValue<V> {
    pub value: V,
    pub computed_at: Instant,
}

impl<V> CachedValue<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            computed_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.computed_at.elapsed() < ttl
    }
}

/// Concurrent TTL cache shared by every entity built from one controller.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: DashMap<CacheKey, CachedValue<V>>,
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The stored value for `key`, if it is still inside the TTL window.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, stamped now.
    pub fn insert(&self, key: CacheKey, value: V) {
        self.entries.insert(key, CachedValue::new(value));
    }

    /// Return the fresh value for `key`, or run `compute` and store its result.
    ///
    /// Failures are returned as-is and leave any previous entry untouched.
    pub async fn get_or_try_insert_with<F, Fut>(&self, key: CacheKey, compute: F) -> Result<V, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, Error>>,
    {
        if let Some(value) = self.get(&key) {
            trace!(entity = %key.0, accessor = %key.1, "cache hit");
            return Ok(value);
        }
        trace!(entity = %key.0, accessor = %key.1, "cache miss");
        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop one accessor's entry.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    /// Drop every accessor entry of one entity.
    pub fn invalidate_entity(&self, entity: &EntityKey) {
        self.entries.retain(|(e, _), _| e != entity);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
