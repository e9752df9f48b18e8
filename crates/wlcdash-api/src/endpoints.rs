// Dashboard endpoint paths and field maps
//
// Paths are relative to the controller base address. The field maps pair
// each detail endpoint with the display labels its dashboard pane shows.

/// Authenticated-only page used to trigger the Basic challenge.
pub const DASHBOARD: &str = "screens/dashboard.html";

// ── Clients ──────────────────────────────────────────────────────────

/// Summary counter: `{ total }`.
pub const CLIENT_COUNTS: &str = "screens/webui/resource/spartan/clientDetails.json";
/// Grid listing of associated stations.
pub const CLIENT_TABLE: &str = "data/client-table.html";

pub const CLIENT_RADIO: &str = "data/rfdashboard/clientview_details.html";
pub const CLIENT_APPS: &str = "data/rfdashboard/clientview_topapps.html";
pub const CLIENT_MOBILITY: &str = "data/rfdashboard/clientview_mobility_data.html";
pub const CLIENT_NETWORK: &str = "data/rfdashboard/clientview_details_network.html";
pub const CLIENT_SECURITY: &str = "data/rfdashboard/clientview_details_security.html";
pub const CLIENT_QOS: &str = "data/rfdashboard/clientview_details_qos.html";

// ── Widgets ──────────────────────────────────────────────────────────

/// Network-wide application counters backing the dashboard widget.
pub const APPS: &str = "data/apps.html";

// ── Field maps ───────────────────────────────────────────────────────

pub mod maps {
    use crate::kv::{Field, FieldMap};

    pub const NETWORK: FieldMap = FieldMap::new(
        "network",
        &[
            ("IP Address", Field::Ip4),
            ("IPv6 Address", Field::Ip6),
            ("VLAN", Field::Vlan),
            ("Fastlane Client", Field::Fastlane),
            ("Mobility Role", Field::MobilityRole),
        ],
    );

    pub const QOS: FieldMap = FieldMap::new(
        "qos",
        &[
            ("WMM", Field::Wmm),
            ("U-APSD", Field::Apsd),
            ("QoS Level", Field::QosLevel),
        ],
    );

    pub const RADIO: FieldMap = FieldMap::new(
        "radio",
        &[
            ("Channel", Field::Channel),
            ("Channel Width", Field::ChannelWidth),
            ("Max Channel Width", Field::ChannelWidthMax),
            ("Link Speed", Field::AssocRate),
            ("Spatial Streams", Field::SpatialStreams),
            ("Max Spatial Streams", Field::SpatialStreamsMax),
            ("Capabilities", Field::Capability),
            ("Signal Strength", Field::Rssi),
            ("Signal Quality", Field::Snr),
            ("Connection Score", Field::ConnectionScore),
            ("Host Name", Field::Hostname),
            ("Device Type", Field::DeviceType),
            ("Total Bytes", Field::BytesTotal),
            ("Association Time", Field::AssocTime),
        ],
    );

    pub const SECURITY: FieldMap = FieldMap::new(
        "security",
        &[
            ("Security Policy", Field::SecurityPolicy),
            ("Cipher", Field::Cipher),
            ("Key Management", Field::KeyManagement),
            ("EAP Type", Field::EapType),
            ("ACLs (IPv4/IPv6)", Field::Acls),
        ],
    );
}
