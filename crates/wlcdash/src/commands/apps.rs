//! Application command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;
use wlcdash_core::{Application, Controller, MacAddress};

use crate::cli::{AppsArgs, AppsCommand, GlobalOpts};
use crate::error::{self, CliError};
use crate::output;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct AppView {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<MacAddress>,
    icon: Option<String>,
    bytes_total: u64,
    bytes_recent: Option<u64>,
}

impl From<&Application> for AppView {
    fn from(app: &Application) -> Self {
        Self {
            name: app.name().to_owned(),
            owner: app.owner().cloned(),
            icon: app.icon().map(str::to_owned),
            bytes_total: app.bytes_total(),
            bytes_recent: app.bytes_recent(),
        }
    }
}

#[derive(Tabled)]
pub(crate) struct AppRow {
    #[tabled(rename = "Application")]
    name: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Last 90s")]
    recent: String,
}

impl From<&AppView> for AppRow {
    fn from(app: &AppView) -> Self {
        Self {
            name: app.name.clone(),
            total: output::bytes(app.bytes_total),
            recent: output::or_dash(app.bytes_recent.map(output::bytes)),
        }
    }
}

fn detail(app: &AppView) -> String {
    let mut lines = vec![format!("Name:      {}", app.name)];
    if let Some(ref owner) = app.owner {
        lines.push(format!("Client:    {owner}"));
    }
    lines.push(format!("Total:     {}", output::bytes(app.bytes_total)));
    lines.push(format!(
        "Last 90s:  {}",
        output::or_dash(app.bytes_recent.map(output::bytes))
    ));
    if let Some(ref icon) = app.icon {
        lines.push(format!("Icon:      {icon}"));
    }
    lines.join("\n")
}

/// Render a list of applications.
pub(crate) fn render(apps: &[Application], global: &GlobalOpts) -> Result<(), CliError> {
    let views: Vec<AppView> = apps.iter().map(AppView::from).collect();
    let out = output::render_list(&global.output, &views, |a| AppRow::from(a), |a| a.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: AppsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AppsCommand::Top { limit } => {
            let mut apps = controller.top_apps().await?;
            if let Some(limit) = limit {
                apps.truncate(limit);
            }
            render(&apps, global)
        }

        AppsCommand::Show { name, client } => {
            let app = match client {
                None => controller.application(&name).await?,
                Some(mac) => {
                    let client = controller
                        .client(&mac)
                        .await
                        .map_err(|e| error::client_lookup(e, &mac))?;
                    let mut app = Application::for_client(
                        Arc::clone(controller.session()),
                        Arc::clone(controller.cache()),
                        name,
                        client.mac().clone(),
                    );
                    app.refresh().await?;
                    app
                }
            };
            let view = AppView::from(&app);
            let out = output::render_single(&global.output, &view, detail, |a| a.name.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
