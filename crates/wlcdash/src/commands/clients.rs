//! Client command handlers.

use std::net::IpAddr;

use serde::Serialize;
use tabled::Tabled;
use tracing::warn;
use wlcdash_core::{
    Client, Controller, MacAddress, MobilityRecord, NetworkInfo, QosInfo, RadioInfo, SecurityInfo,
};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::{self, CliError};
use crate::output;

use super::apps;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ClientView {
    mac: MacAddress,
    hostname: Option<String>,
    ip: Option<IpAddr>,
    device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uptime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<NetworkInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qos: Option<QosInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radio: Option<RadioInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    security: Option<SecurityInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobility: Option<Vec<MobilityRecord>>,
}

impl From<&Client> for ClientView {
    fn from(c: &Client) -> Self {
        Self {
            mac: c.mac().clone(),
            hostname: c.hostname().map(str::to_owned),
            ip: c.ip(),
            device_type: c.device_type().map(str::to_owned),
            uptime: c
                .radio()
                .and_then(RadioInfo::uptime)
                .map(|d| humantime::format_duration(d).to_string()),
            network: c.network().cloned(),
            qos: c.qos().cloned(),
            radio: c.radio().cloned(),
            security: c.security().cloned(),
            mobility: c.mobility().map(<[MobilityRecord]>::to_vec),
        }
    }
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Type")]
    device_type: String,
}

impl From<&ClientView> for ClientRow {
    fn from(c: &ClientView) -> Self {
        Self {
            mac: c.mac.to_string(),
            hostname: output::or_dash(c.hostname.as_deref()),
            ip: output::or_dash(c.ip),
            device_type: output::or_dash(c.device_type.as_deref()),
        }
    }
}

fn detail(c: &ClientView) -> String {
    let mut lines = vec![
        format!("MAC:         {}", c.mac),
        format!("Hostname:    {}", output::or_dash(c.hostname.as_deref())),
        format!("IP:          {}", output::or_dash(c.ip)),
        format!("Type:        {}", output::or_dash(c.device_type.as_deref())),
    ];
    if let Some(ref uptime) = c.uptime {
        lines.push(format!("Uptime:      {uptime}"));
    }
    if let Some(ref r) = c.radio {
        lines.push(format!("Channel:     {}", output::or_dash(r.channel)));
        if let Some(width) = r.channel_width_mhz {
            lines.push(format!("Width:       {width} MHz"));
        }
        if let Some(rssi) = r.rssi_dbm {
            lines.push(format!("Signal:      {rssi} dBm"));
        }
        if let Some(snr) = r.snr_db {
            lines.push(format!("SNR:         {snr} dB"));
        }
        if let Some(rate) = r.assoc_rate_mbps {
            lines.push(format!("Link speed:  {rate} Mbps"));
        }
        if let Some(total) = r.bytes_total {
            lines.push(format!("Traffic:     {}", output::bytes(total)));
        }
    }
    if let Some(ref n) = c.network {
        lines.push(format!("VLAN:        {}", output::or_dash(n.vlan)));
        if let Some(ref ip6) = n.ip6 {
            lines.push(format!("IPv6:        {ip6}"));
        }
        if let Some(ref role) = n.mobility_role {
            lines.push(format!("Mobility:    {role}"));
        }
    }
    if let Some(ref q) = c.qos {
        lines.push(format!("QoS level:   {}", output::or_dash(q.level.as_deref())));
    }
    if let Some(ref s) = c.security {
        lines.push(format!("Security:    {}", output::or_dash(s.policy.as_deref())));
        if let Some(ref cipher) = s.cipher {
            lines.push(format!("Cipher:      {cipher}"));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List => {
            let clients = controller.clients().await?;
            let views: Vec<ClientView> = clients.iter().map(ClientView::from).collect();
            let out = output::render_list(&global.output, &views, |c| ClientRow::from(c), |c| {
                c.mac.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Show { mac, all } => {
            let mut client = controller
                .client(&mac)
                .await
                .map_err(|e| error::client_lookup(e, &mac))?;
            if all {
                // Groups that fail to normalize are left out of the view.
                match client.refresh().await {
                    Err(e) if e.is_normalization() => {
                        warn!(client = %client.mac(), error = %e, "some attribute groups unavailable");
                    }
                    other => other?,
                }
            }
            let view = ClientView::from(&client);
            let out =
                output::render_single(&global.output, &view, detail, |c| c.mac.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Apps { mac } => {
            let mut client = controller
                .client(&mac)
                .await
                .map_err(|e| error::client_lookup(e, &mac))?;
            let client_apps = client.apps().await?;
            apps::render(&client_apps, global)
        }
    }
}
