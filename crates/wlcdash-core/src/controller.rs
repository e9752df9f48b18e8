// ── Controller facade ──
//
// Entry point for consumers: owns the session and the entity cache,
// orchestrates login, and runs the multi-call listing flows.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use wlcdash_api::models::{AppRecord, ClientRecord, Grid, Summary};
use wlcdash_api::{
    Credentials, Error, GridQuery, Request, Session, SessionState, SortDir, endpoints,
};

use crate::config::ControllerConfig;
use crate::entity::{Application, Client};
use crate::model::MacAddress;
use crate::store::EntityCache;

/// Page size of the network-wide applications grid.
pub const TOP_APPS_PAGE: u64 = 150;

/// Handle to one controller dashboard.
///
/// Cheaply cloneable. Every entity it hands out shares its session and
/// cache.
#[derive(Debug, Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

#[derive(Debug)]
struct ControllerInner {
    session: Arc<Session>,
    cache: Arc<EntityCache>,
}

impl Controller {
    /// Build a controller from configuration. Does not contact it.
    pub fn new(config: &ControllerConfig) -> Result<Self, Error> {
        let credentials = Credentials::new(
            config.credentials.username.clone(),
            config.credentials.password.clone(),
        );
        let session = Session::new(&config.url, credentials, &config.transport())?
            .with_auto_login(config.auto_login);
        Ok(Self::with_session(session, config.cache_ttl))
    }

    /// Wrap an existing session.
    pub fn with_session(session: Session, cache_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                session: Arc::new(session),
                cache: Arc::new(EntityCache::new(cache_ttl)),
            }),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.inner.cache
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Authenticate with the dashboard. Safe to call repeatedly.
    pub async fn login(&self) -> Result<(), Error> {
        self.inner.session.login().await
    }

    pub fn state(&self) -> SessionState {
        self.inner.session.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe_state()
    }

    /// Drop every memoized entity group.
    pub fn invalidate(&self) {
        self.inner.cache.clear();
    }

    /// Forget authentication and cached data. The next call logs in again.
    pub fn logout(&self) {
        self.invalidate();
        self.inner.session.reset();
        info!(controller = %self.inner.session.base_url(), "session reset");
    }

    // ── Clients ──────────────────────────────────────────────────────

    /// Number of stations currently associated.
    pub async fn client_count(&self) -> Result<u64, Error> {
        let summary: Summary = self
            .inner
            .session
            .get_json(Request::get(endpoints::CLIENT_COUNTS))
            .await?;
        Ok(summary.total)
    }

    /// Every associated station, sorted by MAC.
    ///
    /// The client table needs a page size up front, so the count is read
    /// first and used as a single page.
    pub async fn clients(&self) -> Result<Vec<Client>, Error> {
        let count = self.client_count().await?;
        if count == 0 {
            return Ok(Vec::new());
        }
        debug!(count, "listing clients");

        let grid: Grid<ClientRecord> = self
            .inner
            .session
            .get_json(
                GridQuery::page(count, count)
                    .sort_by("macaddr", SortDir::Asc)
                    .into_request(endpoints::CLIENT_TABLE),
            )
            .await?;

        grid.data
            .into_iter()
            .map(|record| Client::from_record(self.session_handle(), self.cache_handle(), record))
            .collect()
    }

    /// Look up one station by MAC.
    ///
    /// The radio group is read to confirm the station is associated; the
    /// returned client has it populated.
    pub async fn client(&self, mac: &str) -> Result<Client, Error> {
        let mac = MacAddress::parse(mac)?;
        let mut client = Client::new(self.session_handle(), self.cache_handle(), mac);
        if !client.associated().await? {
            return Err(Error::client_not_present(client.mac()));
        }
        Ok(client)
    }

    // ── Applications ─────────────────────────────────────────────────

    /// Network-wide applications, busiest in the last 90 seconds first.
    ///
    /// The grid caps a page at [`TOP_APPS_PAGE`] rows; when the reported
    /// total is larger, the remainder is fetched with a second call.
    pub async fn top_apps(&self) -> Result<Vec<Application>, Error> {
        let first = self.apps_page(TOP_APPS_PAGE, 0).await?;
        let total = first.total;
        let mut records = first.data;

        if total > TOP_APPS_PAGE {
            let skip = u64::try_from(records.len()).unwrap_or(TOP_APPS_PAGE);
            let remainder = total - TOP_APPS_PAGE;
            debug!(total, remainder, "fetching second applications page");
            records.extend(self.apps_page(remainder, skip).await?.data);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                Application::from_record(self.session_handle(), self.cache_handle(), record, None)
            })
            .collect())
    }

    /// A network-wide application by exact name, refreshed.
    pub async fn application(&self, name: &str) -> Result<Application, Error> {
        if name.trim().is_empty() {
            return Err(Error::validation("application name must not be empty"));
        }
        let mut app = Application::network(self.session_handle(), self.cache_handle(), name);
        app.refresh().await?;
        Ok(app)
    }

    async fn apps_page(&self, take: u64, skip: u64) -> Result<Grid<AppRecord>, Error> {
        self.inner
            .session
            .get_json(
                GridQuery::page(take, TOP_APPS_PAGE)
                    .skip(skip)
                    .sort_by("bytes_90s", SortDir::Desc)
                    .sort_by("bytes_total", SortDir::Desc)
                    .into_request(endpoints::APPS),
            )
            .await
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn session_handle(&self) -> Arc<Session> {
        Arc::clone(&self.inner.session)
    }

    fn cache_handle(&self) -> Arc<EntityCache> {
        Arc::clone(&self.inner.cache)
    }
}
