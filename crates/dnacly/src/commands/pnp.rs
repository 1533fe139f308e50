//! PnP command handlers: portal listing, sheet-driven claims and resets.

use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;

use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;

use dnacly_core::Session;
use dnacly_core::inputs::read_device_rows;
use dnacly_core::models::{NetworkDevice, PnpDevice};
use dnacly_core::reports::write_unclaimable_report;
use dnacly_core::workflow::pnp_claim::{self, ClaimFailure};
use dnacly_core::workflow::pnp_reset::{self, Selection};

use crate::cli::{GlobalOpts, PnpArgs, PnpCommand};
use crate::console::ConsoleObserver;
use crate::error::CliError;
use crate::output::{self, Tone, or_dash, paint, should_color};

use super::util::{self, prompt_err};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PnpRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn pnp_row(d: &PnpDevice) -> PnpRow {
    let info = &d.device_info;
    PnpRow {
        serial: or_dash(info.serial_number.as_deref()),
        hostname: or_dash(info.hostname.as_deref()),
        state: or_dash(info.state.as_deref()),
        pid: or_dash(info.pid.as_deref()),
        id: d.id.clone(),
    }
}

/// `  3) sw-floor2-01   10.1.2.3   C9300-48P` lines for the reset picker.
fn numbered_listing(devices: &[NetworkDevice]) -> String {
    devices
        .iter()
        .enumerate()
        .map(|(i, d)| {
            format!(
                "{:>4}) {:<32} {:<16} {}",
                i + 1,
                or_dash(d.hostname.as_deref()),
                or_dash(d.management_ip_address.as_deref()),
                or_dash(d.platform_id.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Claim ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ClaimReport {
    provided: usize,
    claimed: Vec<String>,
    failed: Vec<ClaimFailure>,
    unclaimable: Vec<String>,
    unclaimable_report: Option<String>,
}

async fn claim(
    session: &Session,
    global: &GlobalOpts,
    devices: &Path,
    config_id: Option<String>,
    report_dir: &Path,
) -> Result<(), CliError> {
    let client = session.client();
    let rows = read_device_rows(devices)?;
    let config_id = config_id.unwrap_or_else(|| session.settings().claim_config_id.clone());

    let observer = ConsoleObserver::new(global);
    observer.line(&format!(
        "Step 1: Read {} rows from {}",
        rows.len(),
        devices.display()
    ));
    observer.line("Step 2: Matching serials against the PnP portal");
    let plan = pnp_claim::plan_claim(client, rows).await?;

    let unclaimable_report = if plan.unclaimable.is_empty() {
        None
    } else {
        let path = write_unclaimable_report(
            report_dir,
            chrono::Local::now().naive_local(),
            &plan.unclaimable,
        )?;
        observer.line(&format!(
            "  {} serial(s) not claimable, listed in {}",
            plan.unclaimable.len(),
            path.display()
        ));
        Some(path.display().to_string())
    };

    if !plan.ready.is_empty() {
        let prompt = format!(
            "Claim {} of {} device(s) with onboarding template {config_id}?",
            plan.ready.len(),
            plan.provided
        );
        let proceed = observer.suspend(|| util::confirm(&prompt, "pnp claim", global.yes))?;
        if !proceed {
            observer.finish();
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    observer.line(&format!(
        "Step 3: Claiming {} of {} device(s)",
        plan.ready.len(),
        plan.provided
    ));
    let outcome = pnp_claim::execute_claim(client, &plan, &config_id, &observer).await;
    observer.finish();
    let outcome = outcome?;

    let report = ClaimReport {
        provided: plan.provided,
        claimed: outcome.claimed,
        failed: outcome.failed,
        unclaimable: plan.unclaimable,
        unclaimable_report,
    };

    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let mut out = output::detail_lines(&[
                ("In sheet", r.provided.to_string()),
                ("Claimed", paint(&r.claimed.len().to_string(), Tone::Good, color)),
                ("Failed", r.failed.len().to_string()),
                ("Not in portal", r.unclaimable.len().to_string()),
                ("Report", or_dash(r.unclaimable_report.as_deref())),
            ]);
            for f in &r.failed {
                out.push_str(&format!(
                    "\n{} {} ({}): {}",
                    paint("failed", Tone::Bad, color),
                    f.hostname,
                    f.serial_number,
                    f.reason
                ));
            }
            out
        },
        |r| r.claimed.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Reset ───────────────────────────────────────────────────────────

fn read_selection(given: Option<String>, listing: &str) -> Result<Selection, CliError> {
    let raw = match given {
        Some(raw) => raw,
        None => {
            if !std::io::stdin().is_terminal() {
                return Err(CliError::Validation {
                    field: "select".into(),
                    reason: "no selection given and no terminal to ask for one; pass --select"
                        .into(),
                });
            }
            eprintln!("{listing}");
            Input::new()
                .with_prompt("Devices to reset (e.g. 1,3,7 or all)")
                .interact_text()
                .map_err(prompt_err)?
        }
    };
    Ok(Selection::from_str(&raw)?)
}

async fn reset(session: &Session, global: &GlobalOpts, select: Option<String>) -> Result<(), CliError> {
    let client = session.client();
    let devices = client.list_network_devices().await?;
    if devices.is_empty() {
        return Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: "(any)".into(),
            list_command: "inventory list".into(),
        });
    }

    let selection = read_selection(select, &numbered_listing(&devices))?;
    let picked = selection.pick(&devices)?;

    let names: Vec<String> = picked
        .iter()
        .map(|d| or_dash(d.hostname.as_deref()))
        .collect();
    let prompt = format!(
        "Reset {} device(s) to PnP and delete them from inventory ({})?",
        picked.len(),
        names.join(", ")
    );
    if !util::confirm(&prompt, "pnp reset", global.yes)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let observer = ConsoleObserver::new(global);
    let outcome = pnp_reset::reset_devices(client, &picked, session.settings(), &observer).await;
    observer.finish();
    let outcome = outcome?;

    let out = output::render_single(
        &global.output,
        &outcome,
        |o| {
            output::detail_lines(&[
                ("Deployments", o.deployment_ids.join(", ")),
                ("Removed", o.removed.to_string()),
            ])
        },
        |o| o.deployment_ids.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: PnpArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PnpCommand::List => {
            let devices = session.client().list_pnp_devices().await?;
            let out = output::render_list(&global.output, &devices, pnp_row, |d| d.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PnpCommand::Claim {
            devices,
            config_id,
            report_dir,
        } => claim(session, global, &devices, config_id, &report_dir).await,

        PnpCommand::Reset { select } => reset(session, global, select).await,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn device(id: &str, hostname: &str) -> NetworkDevice {
        serde_json::from_value(json!({
            "id": id,
            "hostname": hostname,
            "managementIpAddress": "10.0.0.1",
            "platformId": "C9300-48P",
        }))
        .expect("device")
    }

    #[test]
    fn listing_is_numbered_from_one() {
        let listing = numbered_listing(&[device("a", "sw-01"), device("b", "sw-02")]);
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("1) sw-01"));
        assert!(lines[1].trim_start().starts_with("2) sw-02"));
    }

    #[test]
    fn given_selection_is_parsed_without_prompting() {
        let selection = read_selection(Some("3, 1".into()), "").expect("valid");
        assert_eq!(selection, Selection::Positions(vec![3, 1]));
    }

    #[test]
    fn bad_selection_is_a_validation_error() {
        let err = read_selection(Some("x".into()), "").expect_err("invalid");
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
