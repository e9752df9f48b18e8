// ── Client entity ──
//
// One associated station. Each attribute group refreshes independently
// from its own detail endpoint and stays `None` until it has been read.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use wlcdash_api::kv::{self, sentinel_text};
use wlcdash_api::models::{AppRecord, ClientRecord, Grid, KvResponse, MobilityRecord, MobilityResponse};
use wlcdash_api::{
    Error, ErrorKind, FieldMap, Fields, GridQuery, Session, SortDir, endpoints,
    endpoints::maps,
};

use super::CLIENT_APPS_PAGE;
use super::application::Application;
use crate::model::{MacAddress, NetworkInfo, QosInfo, RadioInfo, SecurityInfo};
use crate::store::{Accessor, CacheKey, EntityCache, EntityKey, Snapshot};

/// A wireless station known to the controller.
#[derive(Debug, Clone)]
pub struct Client {
    session: Arc<Session>,
    cache: Arc<EntityCache>,
    mac: MacAddress,
    ip: Option<IpAddr>,
    hostname: Option<String>,
    device_type: Option<String>,
    icon: Option<String>,

    network: Option<NetworkInfo>,
    qos: Option<QosInfo>,
    radio: Option<RadioInfo>,
    security: Option<SecurityInfo>,
    mobility: Option<Vec<MobilityRecord>>,
    apps: Option<Vec<AppRecord>>,
}

impl Client {
    /// A client known only by MAC. Every group starts empty.
    pub fn new(session: Arc<Session>, cache: Arc<EntityCache>, mac: MacAddress) -> Self {
        Self {
            session,
            cache,
            mac,
            ip: None,
            hostname: None,
            device_type: None,
            icon: None,
            network: None,
            qos: None,
            radio: None,
            security: None,
            mobility: None,
            apps: None,
        }
    }

    /// Build from a client table row.
    ///
    /// The listing's IP column is free text; anything that is not an
    /// address is treated as unknown.
    pub fn from_record(
        session: Arc<Session>,
        cache: Arc<EntityCache>,
        record: ClientRecord,
    ) -> Result<Self, Error> {
        let mac = MacAddress::parse(&record.mac)
            .map_err(|_| Error::invalid_field("macaddr", &record.mac, "a MAC address"))?;
        let mut client = Self::new(session, cache, mac);
        client.ip = record.ip.as_deref().and_then(|ip| ip.trim().parse().ok());
        client.hostname = sentinel_text(record.hostname.as_deref());
        client.device_type = sentinel_text(record.devtype.as_deref());
        client.icon = record.icon;
        Ok(client)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn mac(&self) -> &MacAddress {
        &self.mac
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn device_type(&self) -> Option<&str> {
        self.device_type.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn network(&self) -> Option<&NetworkInfo> {
        self.network.as_ref()
    }

    pub fn qos(&self) -> Option<&QosInfo> {
        self.qos.as_ref()
    }

    pub fn radio(&self) -> Option<&RadioInfo> {
        self.radio.as_ref()
    }

    pub fn security(&self) -> Option<&SecurityInfo> {
        self.security.as_ref()
    }

    pub fn mobility(&self) -> Option<&[MobilityRecord]> {
        self.mobility.as_deref()
    }

    /// Raw per-application rows from the last apps refresh.
    pub fn app_records(&self) -> Option<&[AppRecord]> {
        self.apps.as_deref()
    }

    pub fn entity_key(&self) -> EntityKey {
        EntityKey::Client(self.mac.clone())
    }

    fn key(&self, accessor: Accessor) -> CacheKey {
        (self.entity_key(), accessor)
    }

    // ── Group refresh ────────────────────────────────────────────────

    pub async fn refresh_network(&mut self) -> Result<(), Error> {
        let snapshot = self
            .cache
            .get_or_try_insert_with(self.key(Accessor::Network), || {
                fetch_network(&self.session, &self.mac)
            })
            .await?;
        self.apply(snapshot);
        Ok(())
    }

    pub async fn refresh_qos(&mut self) -> Result<(), Error> {
        let snapshot = self
            .cache
            .get_or_try_insert_with(self.key(Accessor::Qos), || {
                fetch_qos(&self.session, &self.mac)
            })
            .await?;
        self.apply(snapshot);
        Ok(())
    }

    /// Refresh radio attributes. Also replaces hostname and device type,
    /// which the radio pane reports more reliably than the listing.
    pub async fn refresh_radio(&mut self) -> Result<(), Error> {
        let snapshot = self
            .cache
            .get_or_try_insert_with(self.key(Accessor::Radio), || {
                fetch_radio(&self.session, &self.mac)
            })
            .await?;
        self.apply(snapshot);
        Ok(())
    }

    pub async fn refresh_security(&mut self) -> Result<(), Error> {
        let snapshot = self
            .cache
            .get_or_try_insert_with(self.key(Accessor::Security), || {
                fetch_security(&self.session, &self.mac)
            })
            .await?;
        self.apply(snapshot);
        Ok(())
    }

    pub async fn refresh_mobility(&mut self) -> Result<(), Error> {
        let snapshot = self
            .cache
            .get_or_try_insert_with(self.key(Accessor::Mobility), || {
                fetch_mobility(&self.session, &self.mac)
            })
            .await?;
        self.apply(snapshot);
        Ok(())
    }

    pub async fn refresh_apps(&mut self) -> Result<(), Error> {
        let snapshot = self
            .cache
            .get_or_try_insert_with(self.key(Accessor::Apps), || {
                fetch_apps(&self.session, &self.mac)
            })
            .await?;
        self.apply(snapshot);
        Ok(())
    }

    /// Refresh every group.
    ///
    /// Best-effort: a failing group is logged and the rest still run.
    /// Returns the first failure, if any.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let results = [
            (Accessor::Apps, self.refresh_apps().await),
            (Accessor::Mobility, self.refresh_mobility().await),
            (Accessor::Network, self.refresh_network().await),
            (Accessor::Qos, self.refresh_qos().await),
            (Accessor::Radio, self.refresh_radio().await),
            (Accessor::Security, self.refresh_security().await),
        ];

        let mut first = None;
        for (group, result) in results {
            if let Err(e) = result {
                warn!(client = %self.mac, %group, error = %e, "group refresh failed");
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Forget every memoized group of this client.
    pub fn invalidate(&self) {
        self.cache.invalidate_entity(&self.entity_key());
    }

    fn apply(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Network(info) => {
                if let Some(ip4) = info.ip4 {
                    self.ip = Some(IpAddr::V4(ip4));
                }
                self.network = Some(info);
            }
            Snapshot::Qos(info) => self.qos = Some(info),
            Snapshot::Radio(info) => {
                self.hostname.clone_from(&info.hostname);
                self.device_type.clone_from(&info.device_type);
                self.radio = Some(info);
            }
            Snapshot::Security(info) => self.security = Some(info),
            Snapshot::Mobility(records) => self.mobility = Some(records),
            Snapshot::Apps(records) => self.apps = Some(records),
            // Stored under application keys only.
            Snapshot::App(_) => {}
        }
    }

    // ── Derived ──────────────────────────────────────────────────────

    /// Whether the station is currently associated.
    ///
    /// The radio pane has no rows for a station that is not associated.
    pub async fn associated(&mut self) -> Result<bool, Error> {
        match self.refresh_radio().await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NoResults => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Bytes sent and received since association. Zero when not reported.
    pub async fn bytes_total(&mut self) -> Result<u64, Error> {
        self.refresh_radio().await?;
        Ok(self
            .radio
            .as_ref()
            .and_then(|r| r.bytes_total)
            .unwrap_or_default())
    }

    /// Time since association. Zero when not reported.
    pub async fn uptime(&mut self) -> Result<Duration, Error> {
        self.refresh_radio().await?;
        Ok(self
            .radio
            .as_ref()
            .and_then(RadioInfo::uptime)
            .unwrap_or_default())
    }

    /// Per-application usage for this client, largest first.
    pub async fn apps(&mut self) -> Result<Vec<Application>, Error> {
        self.refresh_apps().await?;
        Ok(self
            .apps
            .iter()
            .flatten()
            .map(|record| {
                Application::from_record(
                    Arc::clone(&self.session),
                    Arc::clone(&self.cache),
                    record.clone(),
                    Some(self.mac.clone()),
                )
            })
            .collect())
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hostname {
            Some(name) => write!(f, "wireless client {} ({name})", self.mac),
            None => write!(f, "wireless client {}", self.mac),
        }
    }
}

// ── Fetchers ─────────────────────────────────────────────────────────

async fn fetch_fields(
    session: &Session,
    mac: &MacAddress,
    map: &FieldMap,
    path: &str,
) -> Result<Fields, Error> {
    debug!(%mac, group = map.name(), "refreshing client group");
    let response: KvResponse = session
        .get_json(GridQuery::new().device(mac.as_str()).into_request(path))
        .await?;
    kv::normalize(map, response.data.as_deref())
}

async fn fetch_network(session: &Session, mac: &MacAddress) -> Result<Snapshot, Error> {
    let fields = fetch_fields(session, mac, &maps::NETWORK, endpoints::CLIENT_NETWORK).await?;
    NetworkInfo::from_fields(&fields).map(Snapshot::Network)
}

async fn fetch_qos(session: &Session, mac: &MacAddress) -> Result<Snapshot, Error> {
    let fields = fetch_fields(session, mac, &maps::QOS, endpoints::CLIENT_QOS).await?;
    QosInfo::from_fields(&fields).map(Snapshot::Qos)
}

async fn fetch_radio(session: &Session, mac: &MacAddress) -> Result<Snapshot, Error> {
    let fields = fetch_fields(session, mac, &maps::RADIO, endpoints::CLIENT_RADIO).await?;
    RadioInfo::from_fields(&fields).map(Snapshot::Radio)
}

async fn fetch_security(session: &Session, mac: &MacAddress) -> Result<Snapshot, Error> {
    let fields = fetch_fields(session, mac, &maps::SECURITY, endpoints::CLIENT_SECURITY).await?;
    SecurityInfo::from_fields(&fields).map(Snapshot::Security)
}

async fn fetch_mobility(session: &Session, mac: &MacAddress) -> Result<Snapshot, Error> {
    debug!(%mac, group = "mobility", "refreshing client group");
    let response: MobilityResponse = session
        .get_json(GridQuery::new().device(mac.as_str()).into_request(endpoints::CLIENT_MOBILITY))
        .await?;
    response
        .mobility
        .map(Snapshot::Mobility)
        .ok_or_else(|| Error::no_results("mobility"))
}

async fn fetch_apps(session: &Session, mac: &MacAddress) -> Result<Snapshot, Error> {
    debug!(%mac, group = "apps", "refreshing client group");
    let grid: Grid<AppRecord> = session
        .get_json(
            GridQuery::page(CLIENT_APPS_PAGE, CLIENT_APPS_PAGE)
                .device(mac.as_str())
                .sort_by("bytes_total", SortDir::Desc)
                .into_request(endpoints::CLIENT_APPS),
        )
        .await?;
    Ok(Snapshot::Apps(grid.data))
}
