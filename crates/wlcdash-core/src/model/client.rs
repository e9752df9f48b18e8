// ── Client attribute groups ──
//
// One typed struct per detail endpoint. Each is built from normalized
// fields in a single step, so a group is either fully read or not present.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Serialize;

use wlcdash_api::{Error, Field, Fields};

/// Addressing and roaming attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    pub ip4: Option<Ipv4Addr>,
    /// The dashboard may list several addresses, so this stays text.
    pub ip6: Option<String>,
    pub vlan: Option<u16>,
    pub fastlane: Option<bool>,
    pub mobility_role: Option<String>,
}

impl NetworkInfo {
    pub fn from_fields(fields: &Fields) -> Result<Self, Error> {
        let ip4 = match fields.text(Field::Ip4)? {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| Error::invalid_field(Field::Ip4, &raw, "an IPv4 address"))?,
            ),
            None => None,
        };
        Ok(Self {
            ip4,
            ip6: fields.text(Field::Ip6)?,
            vlan: fields.number(Field::Vlan)?,
            fastlane: fields.flag(Field::Fastlane)?,
            mobility_role: fields.text(Field::MobilityRole)?,
        })
    }
}

/// Quality-of-service attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QosInfo {
    pub wmm: Option<bool>,
    pub apsd: Option<bool>,
    pub level: Option<String>,
}

impl QosInfo {
    pub fn from_fields(fields: &Fields) -> Result<Self, Error> {
        Ok(Self {
            wmm: fields.flag(Field::Wmm)?,
            apsd: fields.flag(Field::Apsd)?,
            level: fields.text(Field::QosLevel)?,
        })
    }
}

/// Radio link attributes, plus the identity fields the radio pane shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadioInfo {
    pub channel: Option<u16>,
    pub channel_width_mhz: Option<u16>,
    pub channel_width_max_mhz: Option<u16>,
    pub assoc_rate_mbps: Option<u32>,
    pub spatial_streams: Option<u8>,
    pub spatial_streams_max: Option<u8>,
    pub capability: Option<String>,
    pub rssi_dbm: Option<i32>,
    pub snr_db: Option<i32>,
    pub connection_score: Option<u32>,
    pub hostname: Option<String>,
    pub device_type: Option<String>,
    pub bytes_total: Option<u64>,
    pub assoc_time_secs: Option<u64>,
}

impl RadioInfo {
    pub fn from_fields(fields: &Fields) -> Result<Self, Error> {
        Ok(Self {
            channel: fields.number(Field::Channel)?,
            channel_width_mhz: fields.number(Field::ChannelWidth)?,
            channel_width_max_mhz: fields.number(Field::ChannelWidthMax)?,
            assoc_rate_mbps: fields.number(Field::AssocRate)?,
            spatial_streams: fields.number(Field::SpatialStreams)?,
            spatial_streams_max: fields.number(Field::SpatialStreamsMax)?,
            capability: fields.text(Field::Capability)?,
            rssi_dbm: fields.number(Field::Rssi)?,
            snr_db: fields.number(Field::Snr)?,
            connection_score: fields.number(Field::ConnectionScore)?,
            hostname: fields.text(Field::Hostname)?,
            device_type: fields.text(Field::DeviceType)?,
            bytes_total: fields.optional_number(Field::BytesTotal)?,
            assoc_time_secs: fields.optional_number(Field::AssocTime)?,
        })
    }

    /// Time since association, when the dashboard reports it.
    pub fn uptime(&self) -> Option<Duration> {
        self.assoc_time_secs.map(Duration::from_secs)
    }
}

/// Security attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityInfo {
    pub policy: Option<String>,
    pub cipher: Option<String>,
    pub key_management: Option<String>,
    pub eap_type: Option<String>,
    pub acl_v4: Option<String>,
    pub acl_v6: Option<String>,
}

impl SecurityInfo {
    pub fn from_fields(fields: &Fields) -> Result<Self, Error> {
        let (acl_v4, acl_v6) = match fields.text(Field::Acls)? {
            Some(raw) => split_acls(&raw)?,
            None => (None, None),
        };
        Ok(Self {
            policy: fields.text(Field::SecurityPolicy)?,
            cipher: fields.text(Field::Cipher)?,
            key_management: fields.text(Field::KeyManagement)?,
            eap_type: fields.optional_text(Field::EapType)?,
            acl_v4,
            acl_v6,
        })
    }
}

/// Split the "<v4>/<v6>" pair shown in the ACL row.
fn split_acls(raw: &str) -> Result<(Option<String>, Option<String>), Error> {
    let (v4, v6) = raw
        .split_once('/')
        .ok_or_else(|| Error::invalid_field(Field::Acls, raw, "an '<ipv4>/<ipv6>' pair"))?;
    let name = |s: &str| {
        let s = s.trim();
        (!s.is_empty() && !s.eq_ignore_ascii_case("none")).then(|| s.to_owned())
    };
    Ok((name(v4), name(v6)))
}
