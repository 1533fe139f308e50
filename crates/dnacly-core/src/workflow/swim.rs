// Software image distribution and activation
//
// Distribution: hostnames from a CSV are mapped to device UUIDs through the
// full inventory, submitted in batches, and each batch task is polled until
// quiescent. Devices that fail are reported and left out of activation;
// the rest are written to `UUIDS_to_Activate.csv`.
//
// Activation: one request per device with a pacing delay between requests,
// then each task is polled. When distribution did not run in the same
// invocation, the UUIDs come from `UUIDS_to_Activate.csv`.

use std::collections::HashMap;
use std::path::PathBuf;

use dnacly_api::DnacClient;
use dnacly_api::models::{DistributionTarget, ImageTaskEntry, NetworkDevice};
use serde::Serialize;
use tracing::{info, warn};

use crate::batch::BatchSize;
use crate::error::CoreError;
use crate::events::{WorkflowEvent, WorkflowObserver};
use crate::poll::{PollSettings, wait_for_task};
use crate::progress::TaskTally;
use crate::reports::SwimReports;
use crate::workflow::{core_item_failure, item_failure};

/// A device whose image task did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDevice {
    pub hostname: String,
    pub status: String,
    pub device_id: Option<String>,
}

impl From<ImageTaskEntry> for FailedDevice {
    fn from(entry: ImageTaskEntry) -> Self {
        Self {
            hostname: entry
                .host_name
                .or_else(|| entry.device_ip.clone())
                .unwrap_or_default(),
            status: entry.task_status,
            device_id: entry.device_id,
        }
    }
}

/// Distinct device types in inventory order.
pub fn device_types(devices: &[NetworkDevice]) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for t in devices.iter().filter_map(|d| d.device_type.as_ref()) {
        if !types.contains(t) {
            types.push(t.clone());
        }
    }
    types
}

/// Map hostnames to UUIDs. Returns the UUIDs found, in hostname order,
/// and the hostnames missing from inventory.
pub fn uuids_for_hostnames(
    devices: &[NetworkDevice],
    hostnames: &[String],
) -> (Vec<String>, Vec<String>) {
    let by_host: HashMap<&str, &str> = devices
        .iter()
        .filter_map(|d| d.hostname.as_deref().map(|h| (h, d.id.as_str())))
        .collect();

    let mut uuids = Vec::new();
    let mut unknown = Vec::new();
    for host in hostnames {
        match by_host.get(host.as_str()) {
            Some(id) => uuids.push((*id).to_owned()),
            None => unknown.push(host.clone()),
        }
    }
    (uuids, unknown)
}

// ── Distribution ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionOutcome {
    pub task_ids: Vec<String>,
    pub tally: TaskTally,
    pub failed: Vec<FailedDevice>,
    /// UUIDs that distributed cleanly, in submission order.
    pub ready: Vec<String>,
}

/// Distribute `image_uuid` to `uuids` in batches and wait for every batch.
pub async fn distribute(
    client: &DnacClient,
    uuids: &[String],
    image_uuid: &str,
    batch: BatchSize,
    poll: PollSettings,
    observer: &dyn WorkflowObserver,
) -> Result<DistributionOutcome, CoreError> {
    let mut outcome = DistributionOutcome::default();
    let mut submitted: Vec<(String, &[String])> = Vec::new();
    let mut excluded: Vec<String> = Vec::new();

    for (index, chunk) in batch.split(uuids).enumerate() {
        let targets: Vec<DistributionTarget> = chunk
            .iter()
            .map(|uuid| DistributionTarget {
                device_uuid: uuid.clone(),
                image_uuid: image_uuid.to_owned(),
            })
            .collect();

        match client.distribute_image(&targets).await {
            Ok(handle) => {
                observer.notify(&WorkflowEvent::Submitted {
                    index,
                    count: chunk.len(),
                    id: &handle.task_id,
                });
                outcome.task_ids.push(handle.task_id.clone());
                submitted.push((handle.task_id, chunk));
            }
            Err(e) => {
                let reason = item_failure(e)?;
                warn!(index, "distribution batch rejected: {reason}");
                fail_batch(&mut outcome.failed, &mut excluded, chunk, &reason, observer);
            }
        }
    }

    for (task_id, chunk) in &submitted {
        match wait_for_task(client, task_id, poll, observer).await {
            Ok(tally) => {
                outcome.tally += tally;
                if !tally.has_failures() {
                    continue;
                }
                match failed_devices(client, task_id).await {
                    Ok(devices) => {
                        for device in devices {
                            observer.notify(&WorkflowEvent::DeviceFailed {
                                device: &device.hostname,
                                reason: &device.status,
                            });
                            if let Some(id) = &device.device_id {
                                excluded.push(id.clone());
                            }
                            outcome.failed.push(device);
                        }
                    }
                    Err(e) => {
                        let reason =
                            format!("failure detail unavailable: {}", core_item_failure(e)?);
                        warn!(task_id, "{reason}");
                        fail_batch(&mut outcome.failed, &mut excluded, chunk, &reason, observer);
                    }
                }
            }
            Err(e) => {
                let reason = core_item_failure(e)?;
                warn!(task_id, "distribution task not followed: {reason}");
                fail_batch(&mut outcome.failed, &mut excluded, chunk, &reason, observer);
            }
        }
    }

    outcome.ready = uuids
        .iter()
        .filter(|u| !excluded.contains(u))
        .cloned()
        .collect();
    info!(
        ready = outcome.ready.len(),
        failed = outcome.failed.len(),
        "distribution finished"
    );
    Ok(outcome)
}

fn fail_batch(
    failed: &mut Vec<FailedDevice>,
    excluded: &mut Vec<String>,
    chunk: &[String],
    reason: &str,
    observer: &dyn WorkflowObserver,
) {
    for uuid in chunk {
        observer.notify(&WorkflowEvent::DeviceFailed {
            device: uuid,
            reason,
        });
        excluded.push(uuid.clone());
        failed.push(FailedDevice {
            hostname: uuid.clone(),
            status: reason.to_owned(),
            device_id: Some(uuid.clone()),
        });
    }
}

/// Per-device entries of `task_id` whose status is not `success`.
pub async fn failed_devices(
    client: &DnacClient,
    task_id: &str,
) -> Result<Vec<FailedDevice>, CoreError> {
    let entries = client.image_task_detail(task_id).await?;
    Ok(entries
        .into_iter()
        .filter(|e| !e.succeeded())
        .map(FailedDevice::from)
        .collect())
}

// ── Activation ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivationOutcome {
    pub task_ids: Vec<String>,
    pub tally: TaskTally,
    /// Hostnames, or UUIDs when the request failed or its task could not
    /// be followed.
    pub failed: Vec<String>,
}

/// Activate `image_uuid` on each device, pausing `pacing` between requests.
pub async fn activate(
    client: &DnacClient,
    uuids: &[String],
    image_uuid: &str,
    pacing: std::time::Duration,
    poll: PollSettings,
    observer: &dyn WorkflowObserver,
) -> Result<ActivationOutcome, CoreError> {
    let mut outcome = ActivationOutcome::default();
    let mut submitted: Vec<(String, &String)> = Vec::new();

    for (index, uuid) in uuids.iter().enumerate() {
        match client.activate_image(uuid, image_uuid).await {
            Ok(handle) => {
                observer.notify(&WorkflowEvent::Submitted {
                    index,
                    count: 1,
                    id: &handle.task_id,
                });
                outcome.task_ids.push(handle.task_id.clone());
                submitted.push((handle.task_id, uuid));
            }
            Err(e) => {
                let reason = item_failure(e)?;
                warn!(device = %uuid, "activation rejected: {reason}");
                observer.notify(&WorkflowEvent::DeviceFailed {
                    device: uuid,
                    reason: &reason,
                });
                outcome.failed.push(uuid.clone());
            }
        }
        if index + 1 < uuids.len() {
            tokio::time::sleep(pacing).await;
        }
    }

    for (task_id, uuid) in &submitted {
        match wait_for_task(client, task_id, poll, observer).await {
            Ok(tally) => {
                outcome.tally += tally;
                if !tally.has_failures() {
                    continue;
                }
                match failed_devices(client, task_id).await {
                    Ok(devices) => {
                        for device in devices {
                            observer.notify(&WorkflowEvent::DeviceFailed {
                                device: &device.hostname,
                                reason: &device.status,
                            });
                            outcome.failed.push(device.hostname);
                        }
                    }
                    Err(e) => {
                        let reason =
                            format!("failure detail unavailable: {}", core_item_failure(e)?);
                        warn!(task_id, device = %uuid, "{reason}");
                        observer.notify(&WorkflowEvent::DeviceFailed {
                            device: uuid,
                            reason: &reason,
                        });
                        outcome.failed.push((*uuid).clone());
                    }
                }
            }
            Err(e) => {
                let reason = core_item_failure(e)?;
                warn!(task_id, device = %uuid, "activation task not followed: {reason}");
                outcome.failed.push((*uuid).clone());
            }
        }
    }

    info!(
        activated = outcome.tally.success,
        failed = outcome.failed.len(),
        "activation finished"
    );
    Ok(outcome)
}

// ── Full run ─────────────────────────────────────────────────────────

/// What to do in one `swim run`.
#[derive(Debug, Clone)]
pub struct SwimRequest {
    /// Hostnames to distribute to (ignored unless `distribute`).
    pub hostnames: Vec<String>,
    pub image_uuid: String,
    pub distribute: bool,
    pub activate: bool,
    pub batch: BatchSize,
    pub poll: PollSettings,
    pub activation_pacing: std::time::Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SwimSummary {
    pub device_types: Vec<String>,
    pub unknown_hostnames: Vec<String>,
    pub distribution: Option<DistributionOutcome>,
    pub activation: Option<ActivationOutcome>,
    pub reports: Vec<PathBuf>,
}

/// Run distribution, activation, or both, writing reports as it goes.
pub async fn run(
    client: &DnacClient,
    request: &SwimRequest,
    reports: &SwimReports,
    observer: &dyn WorkflowObserver,
) -> Result<SwimSummary, CoreError> {
    if !request.distribute && !request.activate {
        return Err(CoreError::ValidationFailed {
            message: "choose distribution, activation, or both".into(),
        });
    }

    let mut summary = SwimSummary::default();
    let mut step = 1;
    let mut announce = |message: String| {
        step += 1;
        observer.notify(&WorkflowEvent::Step {
            number: step,
            message,
        });
    };

    let mut ready = None;
    if request.distribute {
        announce("Getting all devices in inventory".into());
        let devices = client.list_network_devices().await?;
        summary.device_types = device_types(&devices);
        announce(format!(
            "Mapping {} hostnames across device types: {}",
            request.hostnames.len(),
            summary.device_types.join(", ")
        ));

        let (uuids, unknown) = uuids_for_hostnames(&devices, &request.hostnames);
        for host in &unknown {
            warn!(hostname = %host, "not in inventory, skipping");
        }
        summary.unknown_hostnames = unknown;

        announce(format!(
            "Distributing image to {} devices in batches of {}",
            uuids.len(),
            request.batch
        ));
        let outcome = distribute(
            client,
            &uuids,
            &request.image_uuid,
            request.batch,
            request.poll,
            observer,
        )
        .await?;

        if !outcome.failed.is_empty() {
            let rows: Vec<(String, String)> = outcome
                .failed
                .iter()
                .map(|f| (f.hostname.clone(), f.status.clone()))
                .collect();
            summary
                .reports
                .push(reports.write_failed_distributions(&rows)?);
        }
        summary
            .reports
            .push(reports.write_uuids_to_activate(&outcome.ready)?);
        ready = Some(outcome.ready.clone());
        summary.distribution = Some(outcome);
    }

    if request.activate {
        let uuids = match ready {
            Some(uuids) => uuids,
            None => reports.read_uuids_to_activate()?,
        };
        announce(format!("Activating image on {} devices", uuids.len()));
        let outcome = activate(
            client,
            &uuids,
            &request.image_uuid,
            request.activation_pacing,
            request.poll,
            observer,
        )
        .await?;

        if !outcome.failed.is_empty() {
            summary
                .reports
                .push(reports.write_failed_activations(&outcome.failed)?);
        }
        summary.activation = Some(outcome);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn device(id: &str, host: &str, kind: &str) -> NetworkDevice {
        serde_json::from_value(json!({ "id": id, "hostname": host, "type": kind }))
            .expect("valid device")
    }

    #[test]
    fn hostnames_map_to_uuids_in_order() {
        let devices = vec![
            device("u1", "sw-01", "Switch"),
            device("u2", "sw-02", "Switch"),
            device("u3", "rtr-01", "Router"),
        ];
        let hosts = vec!["rtr-01".to_owned(), "ghost".to_owned(), "sw-01".to_owned()];

        let (uuids, unknown) = uuids_for_hostnames(&devices, &hosts);

        assert_eq!(uuids, vec!["u3", "u1"]);
        assert_eq!(unknown, vec!["ghost"]);
        assert_eq!(device_types(&devices), vec!["Switch", "Router"]);
    }

    #[test]
    fn failed_entry_falls_back_to_ip() {
        let entry: ImageTaskEntry = serde_json::from_value(json!({
            "taskStatus": "failure",
            "deviceIp": "10.0.0.9",
            "deviceId": "u9"
        }))
        .expect("valid entry");

        let failed = FailedDevice::from(entry);

        assert_eq!(failed.hostname, "10.0.0.9");
        assert_eq!(failed.device_id.as_deref(), Some("u9"));
    }
}
