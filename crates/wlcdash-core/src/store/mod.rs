// ── Entity cache ──
//
// One `TtlCache<Snapshot>` is shared by a controller and every entity it
// builds, so two `Client` handles for the same MAC reuse each other's fetches.

pub mod cache;

use wlcdash_api::models::{AppRecord, MobilityRecord};

use crate::model::{NetworkInfo, QosInfo, RadioInfo, SecurityInfo};

pub use cache::{Accessor, CacheKey, CachedValue, EntityKey, TtlCache};

/// A fetched, typed group as stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Network(NetworkInfo),
    Qos(QosInfo),
    Radio(RadioInfo),
    Security(SecurityInfo),
    Mobility(Vec<MobilityRecord>),
    Apps(Vec<AppRecord>),
    App(AppRecord),
}

/// The cache type used throughout the crate.
pub type EntityCache = TtlCache<Snapshot>;
