// Key-value normalizer
//
// Detail endpoints answer with `{ data: [ { key, value }, ... ] }`, where
// `key` is the label the dashboard displays. A per-endpoint `FieldMap`
// selects the labels we model and renames them to canonical `Field`s;
// vendor sentinels ("Yes", "Unknown", ...) are coerced on the way.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::error::Error;
use crate::models::KvPair;

// ── Canonical fields ────────────────────────────────────────────────

/// Canonical name of a normalized attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // Network
    Ip4,
    Ip6,
    Vlan,
    Fastlane,
    MobilityRole,
    // QoS
    Wmm,
    Apsd,
    QosLevel,
    // Radio
    Channel,
    ChannelWidth,
    ChannelWidthMax,
    AssocRate,
    SpatialStreams,
    SpatialStreamsMax,
    Capability,
    Rssi,
    Snr,
    ConnectionScore,
    Hostname,
    DeviceType,
    BytesTotal,
    AssocTime,
    // Security
    SecurityPolicy,
    Cipher,
    KeyManagement,
    EapType,
    Acls,
}

/// Static mapping from dashboard display labels to canonical fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    name: &'static str,
    entries: &'static [(&'static str, Field)],
}

impl FieldMap {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, Field)]) -> Self {
        Self { name, entries }
    }

    /// Short name of the endpoint this map belongs to, used in errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn entries(&self) -> &'static [(&'static str, Field)] {
        self.entries
    }

    /// Canonical field for a display label. Labels match exactly.
    pub fn lookup(&self, display_key: &str) -> Option<Field> {
        self.entries
            .iter()
            .find(|(key, _)| *key == display_key)
            .map(|(_, field)| *field)
    }
}

// ── Values ──────────────────────────────────────────────────────────

/// A raw value after sentinel coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KvValue {
    /// "Unknown", "Unclassified" or a JSON null.
    Absent,
    /// "Yes"/"True" or "No"/"False".
    Flag(bool),
    /// Anything else, unchanged. Numbers stay text.
    Text(String),
}

impl KvValue {
    /// Coerce a raw dashboard string, matching sentinels case-insensitively.
    pub fn coerce(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "no" | "false" => Self::Flag(false),
            "yes" | "true" => Self::Flag(true),
            "unknown" | "unclassified" => Self::Absent,
            _ => Self::Text(raw.to_owned()),
        }
    }

    fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Absent,
            serde_json::Value::String(s) => Self::coerce(s),
            other => Self::coerce(&other.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for KvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("-"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Apply sentinel coercion to a free-text value outside a key-value list.
///
/// Returns `None` for absent sentinels and empty strings.
pub fn sentinel_text(raw: Option<&str>) -> Option<String> {
    match KvValue::coerce(raw?.trim()) {
        KvValue::Absent => None,
        KvValue::Text(s) if s.is_empty() => None,
        other => Some(other.to_string()),
    }
}

// ── Normalized fields ───────────────────────────────────────────────

/// Canonical fields extracted from one detail response, in response order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fields {
    source: &'static str,
    values: IndexMap<Field, KvValue>,
}

impl Fields {
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn get(&self, field: Field) -> Option<&KvValue> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &KvValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn insert(&mut self, field: Field, value: KvValue) {
        self.values.insert(field, value);
    }

    fn lookup(&self, field: Field, required: bool) -> Result<Option<&KvValue>, Error> {
        match self.values.get(&field) {
            Some(v) => Ok(Some(v)),
            None if required => Err(Error::missing_field(format_args!(
                "{}.{field}",
                self.source
            ))),
            None => Ok(None),
        }
    }

    // ── Text ─────────────────────────────────────────────────────────

    /// A required field read as text. Absent sentinels yield `None`.
    pub fn text(&self, field: Field) -> Result<Option<String>, Error> {
        Ok(self.lookup(field, true)?.and_then(value_text))
    }

    /// Like [`text`](Self::text), but a missing field is `None`.
    pub fn optional_text(&self, field: Field) -> Result<Option<String>, Error> {
        Ok(self.lookup(field, false)?.and_then(value_text))
    }

    // ── Flags ────────────────────────────────────────────────────────

    /// A required yes/no field.
    pub fn flag(&self, field: Field) -> Result<Option<bool>, Error> {
        self.lookup(field, true)?
            .map_or(Ok(None), |v| value_flag(field, v))
    }

    pub fn optional_flag(&self, field: Field) -> Result<Option<bool>, Error> {
        self.lookup(field, false)?
            .map_or(Ok(None), |v| value_flag(field, v))
    }

    // ── Numbers ──────────────────────────────────────────────────────

    /// A required numeric field.
    ///
    /// The dashboard renders units after the number ("40 MHz", "-61 dBm"),
    /// so only the leading token is parsed.
    pub fn number<T: FromStr>(&self, field: Field) -> Result<Option<T>, Error> {
        self.lookup(field, true)?
            .map_or(Ok(None), |v| value_number(field, v))
    }

    pub fn optional_number<T: FromStr>(&self, field: Field) -> Result<Option<T>, Error> {
        self.lookup(field, false)?
            .map_or(Ok(None), |v| value_number(field, v))
    }
}

fn value_text(value: &KvValue) -> Option<String> {
    match value {
        KvValue::Absent => None,
        other => Some(other.to_string()),
    }
}

fn value_flag(field: Field, value: &KvValue) -> Result<Option<bool>, Error> {
    match value {
        KvValue::Absent => Ok(None),
        KvValue::Flag(b) => Ok(Some(*b)),
        KvValue::Text(s) => Err(Error::invalid_field(field, s, "yes or no")),
    }
}

fn value_number<T: FromStr>(field: Field, value: &KvValue) -> Result<Option<T>, Error> {
    match value {
        KvValue::Absent => Ok(None),
        KvValue::Flag(b) => Err(Error::invalid_field(field, &b.to_string(), "a number")),
        KvValue::Text(s) => {
            let token = s.split_whitespace().next().unwrap_or_default();
            if token.is_empty() {
                return Ok(None);
            }
            token
                .parse()
                .map(Some)
                .map_err(|_| Error::invalid_field(field, s, "a number"))
        }
    }
}

// ── Normalize ───────────────────────────────────────────────────────

/// Map a raw key-value list onto canonical fields.
///
/// Labels missing from `map` are dropped. A missing or empty data
/// collection is `NoResults`, which callers use to tell "nothing matched
/// this filter" apart from a malformed response.
pub fn normalize(map: &FieldMap, pairs: Option<&[KvPair]>) -> Result<Fields, Error> {
    let pairs = match pairs {
        Some(p) if !p.is_empty() => p,
        _ => return Err(Error::no_results(map.name())),
    };

    let mut fields = Fields {
        source: map.name(),
        values: IndexMap::new(),
    };
    for pair in pairs {
        if let Some(field) = map.lookup(&pair.key) {
            fields.insert(field, KvValue::from_json(&pair.value));
        }
    }
    Ok(fields)
}
