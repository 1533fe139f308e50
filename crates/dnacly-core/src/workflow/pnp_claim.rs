// PnP site claim
//
// Serials from the device sheet are matched against the devices waiting
// in the PnP portal. Only serials present in both are claimed; the rest
// are reported as unclaimable. Each claim names a building or floor and
// fills the onboarding template with the row's VLAN and addresses.

use std::collections::HashMap;

use dnacly_api::DnacClient;
use dnacly_api::models::{ClaimConfigInfo, ClaimImageInfo, ConfigParameter, SiteClaimRequest};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::events::{WorkflowEvent, WorkflowObserver};
use crate::inputs::DeviceRow;
use crate::sites::{ClaimableSite, claimable_sites, resolve_site};
use crate::workflow::item_failure;

/// A sheet row whose serial is waiting in the PnP portal.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimCandidate {
    pub row: DeviceRow,
    pub pnp_device_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimPlan {
    /// Rows to claim, in sheet order.
    pub ready: Vec<ClaimCandidate>,
    /// Serials not found among unclaimed or planned devices.
    pub unclaimable: Vec<String>,
    pub sites: Vec<ClaimableSite>,
    /// Distinct serials in the sheet.
    pub provided: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimFailure {
    pub serial_number: String,
    pub hostname: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClaimOutcome {
    pub claimed: Vec<String>,
    pub failed: Vec<ClaimFailure>,
}

/// Fetch the PnP portal and site list and decide which rows can be claimed.
///
/// A serial repeated in the sheet keeps its last row.
pub async fn plan_claim(client: &DnacClient, rows: Vec<DeviceRow>) -> Result<ClaimPlan, CoreError> {
    let rows = dedup_by_serial(rows);

    let portal = client.list_claimable_pnp_devices().await?;
    let by_serial: HashMap<&str, &str> = portal
        .iter()
        .filter_map(|d| {
            d.device_info
                .serial_number
                .as_deref()
                .map(|sn| (sn, d.id.as_str()))
        })
        .collect();

    let provided = rows.len();
    let mut ready = Vec::new();
    let mut unclaimable = Vec::new();
    for row in rows {
        match by_serial.get(row.serial_number.as_str()) {
            Some(id) => ready.push(ClaimCandidate {
                pnp_device_id: (*id).to_owned(),
                row,
            }),
            None => unclaimable.push(row.serial_number),
        }
    }

    let sites = claimable_sites(&client.list_sites().await?);
    info!(
        ready = ready.len(),
        provided,
        sites = sites.len(),
        "claim plan built"
    );

    Ok(ClaimPlan {
        ready,
        unclaimable,
        sites,
        provided,
    })
}

/// Site-claim body for one device.
pub fn site_claim_request(
    candidate: &ClaimCandidate,
    site_id: &str,
    config_id: &str,
) -> SiteClaimRequest {
    let row = &candidate.row;
    let param = |key: &str, value: &str| ConfigParameter {
        key: key.into(),
        value: value.into(),
    };
    SiteClaimRequest {
        site_id: site_id.into(),
        device_id: candidate.pnp_device_id.clone(),
        hostname: row.hostname.clone(),
        claim_type: "Default".into(),
        image_info: ClaimImageInfo {
            image_id: String::new(),
            skip: false,
            remove_inactive: true,
        },
        config_info: ClaimConfigInfo {
            config_id: config_id.into(),
            config_parameters: vec![
                param("vlan", &row.vlan),
                param("name", &row.hostname),
                param("mgmt_ip", &row.mgmt_ip),
                param("vlan_ip", &row.vlan_ip),
            ],
        },
    }
}

/// Claim every ready device, one request each.
pub async fn execute_claim(
    client: &DnacClient,
    plan: &ClaimPlan,
    config_id: &str,
    observer: &dyn WorkflowObserver,
) -> Result<ClaimOutcome, CoreError> {
    let mut outcome = ClaimOutcome::default();

    for (index, candidate) in plan.ready.iter().enumerate() {
        let row = &candidate.row;
        let Some(site_id) = resolve_site(&plan.sites, &row.site) else {
            let reason = format!("site '{}' is not a known building or floor", row.site);
            fail(&mut outcome, observer, row, reason);
            continue;
        };

        let request = site_claim_request(candidate, site_id, config_id);
        match client.site_claim(&request).await {
            Ok(_) => {
                info!(serial = %row.serial_number, hostname = %row.hostname, "claimed");
                observer.notify(&WorkflowEvent::Submitted {
                    index,
                    count: 1,
                    id: &row.serial_number,
                });
                observer.notify(&WorkflowEvent::DeviceDone {
                    device: &row.hostname,
                });
                outcome.claimed.push(row.serial_number.clone());
            }
            Err(e) => {
                let reason = item_failure(e)?;
                fail(&mut outcome, observer, row, reason);
            }
        }
    }

    Ok(outcome)
}

fn fail(
    outcome: &mut ClaimOutcome,
    observer: &dyn WorkflowObserver,
    row: &DeviceRow,
    reason: String,
) {
    warn!(serial = %row.serial_number, "claim failed: {reason}");
    observer.notify(&WorkflowEvent::DeviceFailed {
        device: &row.hostname,
        reason: &reason,
    });
    outcome.failed.push(ClaimFailure {
        serial_number: row.serial_number.clone(),
        hostname: row.hostname.clone(),
        reason,
    });
}

fn dedup_by_serial(rows: Vec<DeviceRow>) -> Vec<DeviceRow> {
    let mut out: Vec<DeviceRow> = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(existing) = out
            .iter_mut()
            .find(|r| r.serial_number == row.serial_number)
        {
            *existing = row;
        } else {
            out.push(row);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(serial: &str, host: &str) -> DeviceRow {
        DeviceRow {
            serial_number: serial.into(),
            hostname: host.into(),
            vlan: "20".into(),
            mgmt_ip: "10.0.0.5".into(),
            vlan_ip: "10.20.0.5".into(),
            site: "Global/HQ/Floor 1".into(),
        }
    }

    #[test]
    fn claim_body_carries_template_parameters() {
        let candidate = ClaimCandidate {
            row: row("FOC1", "sw-01"),
            pnp_device_id: "pnp-1".into(),
        };

        let body = serde_json::to_value(site_claim_request(&candidate, "site-9", "cfg-1"))
            .expect("serializes");

        assert_eq!(
            body,
            json!({
                "siteId": "site-9",
                "deviceId": "pnp-1",
                "hostname": "sw-01",
                "type": "Default",
                "imageInfo": { "imageId": "", "skip": false, "removeInactive": true },
                "configInfo": {
                    "configId": "cfg-1",
                    "configParameters": [
                        { "key": "vlan", "value": "20" },
                        { "key": "name", "value": "sw-01" },
                        { "key": "mgmt_ip", "value": "10.0.0.5" },
                        { "key": "vlan_ip", "value": "10.20.0.5" }
                    ]
                }
            })
        );
    }

    #[test]
    fn repeated_serial_keeps_last_row_in_first_position() {
        let rows = dedup_by_serial(vec![row("A", "one"), row("B", "two"), row("A", "three")]);

        let hosts: Vec<&str> = rows.iter().map(|r| r.hostname.as_str()).collect();
        assert_eq!(hosts, vec!["three", "two"]);
    }
}
