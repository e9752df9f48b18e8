// wlcdash-core: Entities, caching, and the controller facade over wlcdash-api.

pub mod config;
pub mod controller;
pub mod entity;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AuthCredentials, ControllerConfig, TlsVerification};
pub use controller::{Controller, TOP_APPS_PAGE};
pub use entity::{Application, Client};
pub use model::{MacAddress, NetworkInfo, QosInfo, RadioInfo, SecurityInfo};
pub use store::{EntityCache, Snapshot};

pub use wlcdash_api::models::{AppRecord, MobilityRecord};
pub use wlcdash_api::{Error, ErrorKind, SessionState};
