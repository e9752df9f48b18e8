// ── Application entity ──
//
// Traffic counters for one application, either network-wide or scoped to
// one client. The two scopes refresh from different endpoints.

use std::fmt;
use std::sync::Arc;

use bytesize::ByteSize;
use tracing::debug;

use wlcdash_api::models::{AppRecord, Grid};
use wlcdash_api::{Error, GridQuery, Session, SortDir, endpoints, validate};

use super::CLIENT_APPS_PAGE;
use crate::model::MacAddress;
use crate::store::{Accessor, EntityCache, EntityKey, Snapshot};

/// Byte counters for one application.
#[derive(Debug, Clone)]
pub struct Application {
    session: Arc<Session>,
    cache: Arc<EntityCache>,
    name: String,
    owner: Option<MacAddress>,
    icon: Option<String>,
    bytes_total: u64,
    bytes_recent: Option<u64>,
}

impl Application {
    /// A network-wide application with no counters yet. Call
    /// [`refresh`](Self::refresh) to populate it.
    pub fn network(session: Arc<Session>, cache: Arc<EntityCache>, name: impl Into<String>) -> Self {
        Self::with_owner(session, cache, name.into(), None)
    }

    /// An application as seen from one client.
    pub fn for_client(
        session: Arc<Session>,
        cache: Arc<EntityCache>,
        name: impl Into<String>,
        owner: MacAddress,
    ) -> Self {
        Self::with_owner(session, cache, name.into(), Some(owner))
    }

    fn with_owner(
        session: Arc<Session>,
        cache: Arc<EntityCache>,
        name: String,
        owner: Option<MacAddress>,
    ) -> Self {
        Self {
            session,
            cache,
            name,
            owner,
            icon: None,
            bytes_total: 0,
            bytes_recent: None,
        }
    }

    pub(crate) fn from_record(
        session: Arc<Session>,
        cache: Arc<EntityCache>,
        record: AppRecord,
        owner: Option<MacAddress>,
    ) -> Self {
        Self {
            session,
            cache,
            name: record.name,
            owner,
            icon: record.icon,
            bytes_total: record.bytes_total,
            bytes_recent: record.bytes_recent,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client this application was observed on. `None` for the
    /// network-wide aggregate.
    pub fn owner(&self) -> Option<&MacAddress> {
        self.owner.as_ref()
    }

    pub fn is_network_wide(&self) -> bool {
        self.owner.is_none()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn bytes_total(&self) -> u64 {
        self.bytes_total
    }

    /// Bytes in the last 90 seconds. Only the network-wide view reports it.
    pub fn bytes_recent(&self) -> Option<u64> {
        self.bytes_recent
    }

    /// Absolute difference in total bytes between two applications.
    pub fn bytes_delta(&self, other: &Self) -> u64 {
        self.bytes_total.abs_diff(other.bytes_total)
    }

    pub fn entity_key(&self) -> EntityKey {
        EntityKey::Application {
            name: self.name.clone(),
            owner: self.owner.clone(),
        }
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Re-read the counters from the controller, memoized per TTL window.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let snapshot = match &self.owner {
            Some(mac) => {
                self.cache
                    .get_or_try_insert_with((self.entity_key(), Accessor::ClientApp), || {
                        fetch_client_app(&self.session, mac, &self.name)
                    })
                    .await?
            }
            None => {
                self.cache
                    .get_or_try_insert_with((self.entity_key(), Accessor::NetworkApp), || {
                        fetch_network_app(&self.session, &self.name)
                    })
                    .await?
            }
        };
        self.apply(snapshot);
        Ok(())
    }

    /// Forget memoized counters so the next refresh hits the controller.
    pub fn invalidate(&self) {
        self.cache.invalidate_entity(&self.entity_key());
    }

    fn apply(&mut self, snapshot: Snapshot) {
        if let Snapshot::App(record) = snapshot {
            self.bytes_total = record.bytes_total;
            if record.bytes_recent.is_some() {
                self.bytes_recent = record.bytes_recent;
            }
            if record.icon.is_some() {
                self.icon = record.icon;
            }
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} total", self.name, ByteSize(self.bytes_total))?;
        match self.bytes_recent {
            Some(recent) => write!(f, ", {} recent)", ByteSize(recent)),
            None => f.write_str(", no recent data)"),
        }
    }
}

/// Pick the single record named `name`.
///
/// Names match exactly; zero or several matches are an ambiguous match.
pub fn select_app(records: Vec<AppRecord>, name: &str) -> Result<AppRecord, Error> {
    validate::exactly_one(
        records.into_iter().filter(|r| r.name == name),
        format!("application named '{name}'"),
    )
}

/// The per-client endpoint ignores name filters, so the whole list is
/// fetched and filtered here.
async fn fetch_client_app(session: &Session, mac: &MacAddress, name: &str) -> Result<Snapshot, Error> {
    debug!(%mac, app = name, "refreshing client application");
    let grid: Grid<AppRecord> = session
        .get_json(
            GridQuery::page(CLIENT_APPS_PAGE, CLIENT_APPS_PAGE)
                .device(mac.as_str())
                .sort_by("bytes_total", SortDir::Desc)
                .into_request(endpoints::CLIENT_APPS),
        )
        .await?;
    select_app(grid.data, name).map(Snapshot::App)
}

async fn fetch_network_app(session: &Session, name: &str) -> Result<Snapshot, Error> {
    debug!(app = name, "refreshing network application");
    let grid: Grid<AppRecord> = session
        .get_json(
            GridQuery::page(1, 1)
                .sort_by("bytes_total", SortDir::Desc)
                .filter_eq("name", name)
                .into_request(endpoints::APPS),
        )
        .await?;
    validate::exactly_one(grid.data, format!("application named '{name}'")).map(Snapshot::App)
}
