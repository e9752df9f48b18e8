// Controller and entity flows against a mock dashboard.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wlcdash_api::{Credentials, Session};
use wlcdash_core::entity::Application;
use wlcdash_core::{Controller, ErrorKind, MacAddress};

const MAC: &str = "aa:bb:cc:dd:ee:ff";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with_ttl(ttl: Duration) -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let creds = Credentials::new("admin", SecretString::from("secret".to_owned()));
    let session = Session::with_client(reqwest::Client::new(), &server.uri(), creds).unwrap();

    Mock::given(method("GET"))
        .and(path("/screens/dashboard.html"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    (server, Controller::with_session(session, ttl))
}

async fn setup() -> (MockServer, Controller) {
    setup_with_ttl(Duration::from_secs(60)).await
}

fn kv(pairs: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = pairs
        .iter()
        .map(|(k, v)| json!({ "key": k, "value": v }))
        .collect();
    json!({ "data": data })
}

fn radio_body() -> Value {
    kv(&[
        ("Channel", "36"),
        ("Channel Width", "40 MHz"),
        ("Max Channel Width", "80 MHz"),
        ("Link Speed", "300"),
        ("Spatial Streams", "2"),
        ("Max Spatial Streams", "3"),
        ("Capabilities", "802.11ac"),
        ("Signal Strength", "-61"),
        ("Signal Quality", "34"),
        ("Connection Score", "87"),
        ("Host Name", "laptop-01"),
        ("Device Type", "Windows"),
        ("Total Bytes", "1048576"),
        ("Association Time", "120"),
        ("AP Name", "ap-lobby"),
    ])
}

fn app_grid(names: &[&str]) -> Value {
    let data: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "name": name, "bytes_total": (i + 1) * 100 }))
        .collect();
    json!({ "total": names.len(), "data": data })
}

async fn mount_detail(server: &MockServer, endpoint: &str, body: Value, expect: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/data/rfdashboard/{endpoint}")))
        .and(query_param("deviceMacAddress", MAC))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expect)
        .mount(server)
        .await;
}

// ── Client listing ──────────────────────────────────────────────────

#[tokio::test]
async fn clients_reads_count_then_single_page() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/screens/webui/resource/spartan/clientDetails.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 2 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/client-table.html"))
        .and(query_param("take", "2"))
        .and(query_param("pageSize", "2"))
        .and(query_param("sort[0][field]", "macaddr"))
        .and(query_param("sort[0][dir]", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "data": [
                { "macaddr": "00:11:22:33:44:55", "HN": "printer", "IP": "10.0.0.4", "devtype": "Unknown" },
                { "macaddr": "AA:BB:CC:DD:EE:FF", "HN": "laptop-01", "IP": "10.0.0.5", "devtype": "Windows" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clients = controller.clients().await.unwrap();

    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].mac().as_str(), "00:11:22:33:44:55");
    assert_eq!(clients[0].device_type(), None);
    assert_eq!(clients[1].mac().as_str(), MAC);
    assert_eq!(clients[1].hostname(), Some("laptop-01"));
}

#[tokio::test]
async fn clients_with_zero_count_skips_listing() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/screens/webui/resource/spartan/clientDetails.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": "0" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/client-table.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(controller.clients().await.unwrap().is_empty());
}

// ── Top applications ────────────────────────────────────────────────

#[tokio::test]
async fn top_apps_fetches_remainder_page() {
    let (server, controller) = setup().await;

    let first: Vec<Value> = (0..150)
        .map(|i| json!({ "name": format!("app-{i}"), "bytes_total": 1000 - i, "bytes_90s": 10 }))
        .collect();
    let second: Vec<Value> = (150..200)
        .map(|i| json!({ "name": format!("app-{i}"), "bytes_total": 1000 - i }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/data/apps.html"))
        .and(query_param("take", "150"))
        .and(query_param("pageSize", "150"))
        .and(query_param("skip", "0"))
        .and(query_param("sort[0][field]", "bytes_90s"))
        .and(query_param("sort[1][field]", "bytes_total"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "total": 200, "data": first })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/apps.html"))
        .and(query_param("take", "50"))
        .and(query_param("pageSize", "150"))
        .and(query_param("skip", "150"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "total": 200, "data": second })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let apps = controller.top_apps().await.unwrap();

    assert_eq!(apps.len(), 200);
    assert_eq!(apps[0].name(), "app-0");
    assert_eq!(apps[149].name(), "app-149");
    assert_eq!(apps[150].name(), "app-150");
    assert_eq!(apps[199].name(), "app-199");
    assert_eq!(apps[0].bytes_recent(), Some(10));
    assert!(apps.iter().all(Application::is_network_wide));
}

#[tokio::test]
async fn top_apps_single_page_when_total_fits() {
    let (server, controller) = setup().await;

    let names: Vec<String> = (0..100).map(|i| format!("app-{i}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/data/apps.html"))
        .respond_with(ResponseTemplate::new(200).set_body_json(app_grid(&names)))
        .expect(1)
        .mount(&server)
        .await;

    let apps = controller.top_apps().await.unwrap();
    assert_eq!(apps.len(), 100);
}

// ── Applications ────────────────────────────────────────────────────

#[tokio::test]
async fn network_application_uses_server_side_filter() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/data/apps.html"))
        .and(query_param("filter[logic]", "and"))
        .and(query_param("filter[filters][0][field]", "name"))
        .and(query_param("filter[filters][0][operator]", "eq"))
        .and(query_param("filter[filters][0][value]", "YouTube"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "data": [{ "name": "YouTube", "icon_type": "video", "bytes_total": "4096", "bytes_90s": "512" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = controller.application("YouTube").await.unwrap();

    assert_eq!(app.bytes_total(), 4096);
    assert_eq!(app.bytes_recent(), Some(512));
    assert_eq!(app.icon(), Some("video"));
}

#[tokio::test]
async fn client_application_filters_by_exact_name() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/data/rfdashboard/clientview_topapps.html"))
        .and(query_param("deviceMacAddress", MAC))
        .and(query_param("take", "200"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(app_grid(&["Netflix", "Netflix", "YouTube"])),
        )
        .mount(&server)
        .await;

    let mac = MacAddress::parse(MAC).unwrap();
    let mut youtube = Application::for_client(
        controller.session().clone(),
        controller.cache().clone(),
        "YouTube",
        mac.clone(),
    );
    youtube.refresh().await.unwrap();
    assert_eq!(youtube.bytes_total(), 300);

    let mut netflix = Application::for_client(
        controller.session().clone(),
        controller.cache().clone(),
        "Netflix",
        mac,
    );
    let err = netflix.refresh().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AmbiguousMatch);
}

// ── Client lookup ───────────────────────────────────────────────────

#[tokio::test]
async fn client_lookup_populates_radio_group() {
    let (server, controller) = setup().await;
    mount_detail(&server, "clientview_details.html", radio_body(), 1).await;

    let mut client = controller.client("AA-BB-CC-DD-EE-FF").await.unwrap();

    let radio = client.radio().unwrap();
    assert_eq!(radio.channel, Some(36));
    assert_eq!(radio.channel_width_mhz, Some(40));
    assert_eq!(radio.rssi_dbm, Some(-61));
    assert_eq!(client.hostname(), Some("laptop-01"));
    assert_eq!(client.device_type(), Some("Windows"));

    // Derived accessors reuse the cached radio group.
    assert_eq!(client.bytes_total().await.unwrap(), 1_048_576);
    assert_eq!(client.uptime().await.unwrap(), Duration::from_secs(120));
    assert!(client.associated().await.unwrap());
}

#[tokio::test]
async fn unknown_client_is_not_present() {
    let (server, controller) = setup().await;
    mount_detail(&server, "clientview_details.html", json!({ "data": [] }), 1).await;

    let err = controller.client(MAC).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClientNotPresent);
}

#[tokio::test]
async fn malformed_mac_never_reaches_controller() {
    let (server, controller) = setup().await;

    let err = controller.client("not-a-mac").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Caching ─────────────────────────────────────────────────────────

#[tokio::test]
async fn groups_are_memoized_across_handles() {
    let (server, controller) = setup().await;
    mount_detail(
        &server,
        "clientview_details_qos.html",
        kv(&[("WMM", "Yes"), ("U-APSD", "no"), ("QoS Level", "Silver")]),
        1,
    )
    .await;

    let mac = MacAddress::parse(MAC).unwrap();
    let mut a = wlcdash_core::Client::new(controller.session().clone(), controller.cache().clone(), mac.clone());
    let mut b = wlcdash_core::Client::new(controller.session().clone(), controller.cache().clone(), mac);

    a.refresh_qos().await.unwrap();
    a.refresh_qos().await.unwrap();
    b.refresh_qos().await.unwrap();

    let qos = b.qos().unwrap();
    assert_eq!(qos.wmm, Some(true));
    assert_eq!(qos.apsd, Some(false));
    assert_eq!(qos.level.as_deref(), Some("Silver"));
}

#[tokio::test]
async fn expired_window_refetches() {
    let (server, controller) = setup_with_ttl(Duration::ZERO).await;
    mount_detail(&server, "clientview_details.html", radio_body(), 2).await;

    let mut client =
        wlcdash_core::Client::new(controller.session().clone(), controller.cache().clone(), MacAddress::parse(MAC).unwrap());
    client.refresh_radio().await.unwrap();
    client.refresh_radio().await.unwrap();
}

#[tokio::test]
async fn invalidate_drops_memoized_groups() {
    let (server, controller) = setup().await;
    mount_detail(&server, "clientview_details.html", radio_body(), 2).await;

    let mut client = controller.client(MAC).await.unwrap();
    controller.invalidate();
    client.refresh_radio().await.unwrap();
}

// ── Single groups ───────────────────────────────────────────────────

fn detached_client(controller: &Controller) -> wlcdash_core::Client {
    wlcdash_core::Client::new(
        controller.session().clone(),
        controller.cache().clone(),
        MacAddress::parse(MAC).unwrap(),
    )
}

#[tokio::test]
async fn network_refresh_writes_ipv4_back() {
    let (server, controller) = setup().await;
    mount_detail(
        &server,
        "clientview_details_network.html",
        kv(&[("IP Address", "10.0.0.20"), ("VLAN", "20"), ("Mobility Role", "Local")]),
        1,
    )
    .await;

    let mut client = detached_client(&controller);
    assert_eq!(client.ip(), None);
    client.refresh_network().await.unwrap();

    assert_eq!(client.ip(), Some("10.0.0.20".parse().unwrap()));
    let network = client.network().unwrap();
    assert_eq!(network.vlan, Some(20));
    assert_eq!(network.mobility_role.as_deref(), Some("Local"));
}

#[tokio::test]
async fn mobility_without_key_is_no_results() {
    let (server, controller) = setup().await;
    mount_detail(&server, "clientview_mobility_data.html", json!({}), 1).await;

    let mut client = detached_client(&controller);
    let err = client.refresh_mobility().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NoResults);
    assert!(client.mobility().is_none());
}

#[tokio::test]
async fn mobility_empty_list_is_accepted() {
    let (server, controller) = setup().await;
    mount_detail(&server, "clientview_mobility_data.html", json!({ "mobility": [] }), 1).await;

    let mut client = detached_client(&controller);
    client.refresh_mobility().await.unwrap();

    assert_eq!(client.mobility().map(<[_]>::len), Some(0));
}

// ── Composite refresh ───────────────────────────────────────────────

#[tokio::test]
async fn composite_refresh_is_best_effort() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/data/rfdashboard/clientview_details_network.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_detail(&server, "clientview_details.html", radio_body(), 1).await;
    mount_detail(
        &server,
        "clientview_details_qos.html",
        kv(&[("WMM", "Yes"), ("U-APSD", "Yes"), ("QoS Level", "Gold")]),
        1,
    )
    .await;
    mount_detail(
        &server,
        "clientview_details_security.html",
        kv(&[
            ("Security Policy", "WPA2"),
            ("Cipher", "CCMP (AES)"),
            ("Key Management", "802.1x"),
            ("EAP Type", "PEAP"),
            ("ACLs (IPv4/IPv6)", "none/none"),
        ]),
        1,
    )
    .await;
    mount_detail(
        &server,
        "clientview_mobility_data.html",
        json!({ "mobility": [{ "role": "Local", "peer": "10.0.0.3" }] }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data/rfdashboard/clientview_topapps.html"))
        .respond_with(ResponseTemplate::new(200).set_body_json(app_grid(&["DNS", "HTTPS"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = wlcdash_core::Client::new(
        controller.session().clone(),
        controller.cache().clone(),
        MacAddress::parse(MAC).unwrap(),
    );
    let err = client.refresh().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert!(client.network().is_none());
    assert!(client.radio().is_some());
    assert_eq!(client.qos().and_then(|q| q.level.clone()).as_deref(), Some("Gold"));
    assert_eq!(client.security().and_then(|s| s.eap_type.clone()).as_deref(), Some("PEAP"));
    assert_eq!(client.mobility().map(<[_]>::len), Some(1));

    let apps = client.apps().await.unwrap();
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].owner().map(MacAddress::as_str), Some(MAC));
}
