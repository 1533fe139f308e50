//! Inventory command handlers.

use tabled::Tabled;

use dnacly_core::Session;
use dnacly_core::models::{DeviceDetail, DeviceHealth, NetworkDevice};

use crate::cli::{GlobalOpts, InventoryArgs, InventoryCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Mgmt IP")]
    ip: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Reachability")]
    reachability: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn device_row(d: &NetworkDevice) -> DeviceRow {
    DeviceRow {
        hostname: or_dash(d.hostname.as_deref()),
        ip: or_dash(d.management_ip_address.as_deref()),
        platform: or_dash(d.platform_id.as_deref()),
        device_type: or_dash(d.device_type.as_deref()),
        version: or_dash(d.software_version.as_deref()),
        reachability: or_dash(d.reachability_status.as_deref()),
        id: d.id.clone(),
    }
}

#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Reachability")]
    reachability: String,
}

fn health_row(h: &DeviceHealth) -> HealthRow {
    HealthRow {
        name: or_dash(h.name.as_deref()),
        ip: or_dash(h.ip_address.as_deref()),
        model: or_dash(h.model.as_deref()),
        health: h
            .overall_health
            .map_or_else(|| "-".into(), |v| v.to_string()),
        reachability: or_dash(h.reachability_health.as_deref()),
    }
}

fn device_detail(d: &NetworkDevice) -> String {
    output::detail_lines(&[
        ("ID", d.id.clone()),
        ("Hostname", or_dash(d.hostname.as_deref())),
        ("Mgmt IP", or_dash(d.management_ip_address.as_deref())),
        ("Serial", or_dash(d.serial_number.as_deref())),
        ("Platform", or_dash(d.platform_id.as_deref())),
        ("Family", or_dash(d.family.as_deref())),
        ("Type", or_dash(d.device_type.as_deref())),
        ("Version", or_dash(d.software_version.as_deref())),
        ("Reachability", or_dash(d.reachability_status.as_deref())),
    ])
}

fn detail_view(d: &DeviceDetail) -> String {
    output::detail_lines(&[
        ("ID", d.nw_device_id.clone()),
        ("Name", or_dash(d.nw_device_name.as_deref())),
        ("Mgmt IP", or_dash(d.management_ip_addr.as_deref())),
        ("Platform", or_dash(d.platform_id.as_deref())),
        ("Location", or_dash(d.location.as_deref())),
    ])
}

fn print_devices(devices: &[NetworkDevice], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(&global.output, devices, device_row, |d| d.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: InventoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = session.client();
    match args.command {
        InventoryCommand::List => {
            let devices = client.list_network_devices().await?;
            print_devices(&devices, global)
        }

        InventoryCommand::Get { id } => {
            let device = client.get_network_device(&id).await?;
            let out = output::render_single(&global.output, &device, device_detail, |d| {
                d.id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InventoryCommand::Detail { hostname } => {
            let detail = client.device_detail_by_name(&hostname).await?;
            let out = output::render_single(&global.output, &detail, detail_view, |d| {
                d.nw_device_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InventoryCommand::Health { site } => {
            let health = client.list_device_health(&site).await?;
            let out = output::render_list(&global.output, &health, health_row, |h| {
                or_dash(h.name.as_deref())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InventoryCommand::ByPlatform { platform_id } => {
            let devices = client
                .network_devices_matching(&[("platformId", platform_id)])
                .await?;
            print_devices(&devices, global)
        }
    }
}
