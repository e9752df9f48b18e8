// Dashboard response types
//
// Wire shapes for the three endpoint families: grid listings `{ total, data }`,
// detail lists `{ data: [{ key, value }] }` and summary counters `{ total }`.
// Counters are sometimes rendered as strings, so numeric fields deserialize
// leniently. Fields use `#[serde(default)]` because the dashboard omits keys
// freely between firmware releases.

use serde::{Deserialize, Deserializer, Serialize};

// ── Envelopes ────────────────────────────────────────────────────────

/// Grid listing envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Grid<T> {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Summary counter envelope.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Summary {
    #[serde(deserialize_with = "lenient_u64")]
    pub total: u64,
}

/// Detail endpoint envelope. `data` is absent when a filter matched nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KvResponse {
    #[serde(default)]
    pub data: Option<Vec<KvPair>>,
}

/// One display-label/value row of a detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvPair {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

// ── Mobility ─────────────────────────────────────────────────────────

/// Mobility envelope. Records use the key `mobility`, not `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MobilityResponse {
    #[serde(default)]
    pub mobility: Option<Vec<MobilityRecord>>,
}

/// One mobility peer or anchor record. The dashboard does not document the
/// shape, so every attribute is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityRecord {
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

// ── Clients ──────────────────────────────────────────────────────────

/// Row of the client table grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "macaddr")]
    pub mac: String,
    #[serde(default, rename = "HN")]
    pub hostname: Option<String>,
    #[serde(default, rename = "IP")]
    pub ip: Option<String>,
    #[serde(default)]
    pub devtype: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Catch-all for columns we don't model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Applications ─────────────────────────────────────────────────────

/// Row of an application grid, network-wide or per client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    #[serde(default, rename = "icon_type")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub bytes_total: u64,
    /// Bytes seen in the last 90 seconds. Only the network-wide grid has it.
    #[serde(default, rename = "bytes_90s", deserialize_with = "lenient_opt_u64")]
    pub bytes_recent: Option<u64>,
}

// ── Lenient numbers ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    String(String),
}

fn parse_u64<E: serde::de::Error>(raw: NumberOrString) -> Result<u64, E> {
    match raw {
        NumberOrString::Number(n) => n
            .as_u64()
            .ok_or_else(|| E::custom(format!("expected a non-negative integer, got {n}"))),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("expected a non-negative integer, got {s:?}"))),
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    parse_u64(NumberOrString::deserialize(deserializer)?)
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(parse_u64)
        .transpose()
}
