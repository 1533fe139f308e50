// PnP reset
//
// Pushes the reset template to the chosen managed devices, waits for them
// to drop back into PnP mode, then removes them from inventory.

use std::str::FromStr;

use dnacly_api::DnacClient;
use dnacly_api::models::{InventoryDelete, NetworkDevice, TargetInfo};
use serde::Serialize;
use tracing::info;

use crate::batch::{BatchSize, MAX_TEMPLATE_BATCH};
use crate::config::WorkflowSettings;
use crate::error::CoreError;
use crate::events::{WorkflowEvent, WorkflowObserver};

/// Which listed devices to reset, by 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Positions(Vec<usize>),
}

impl FromStr for Selection {
    type Err = CoreError;

    /// Parses `all` or a comma-separated list such as `1,3,7`.
    /// `all` anywhere in the list selects everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.iter().any(|p| p.eq_ignore_ascii_case("all")) {
            return Ok(Self::All);
        }
        if parts.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "empty selection".into(),
            });
        }
        let positions = parts
            .iter()
            .map(|p| match p.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n),
                _ => Err(CoreError::ValidationFailed {
                    message: format!("'{p}' is not a device number"),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Positions(positions))
    }
}

impl Selection {
    /// The selected items, in selection order.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Result<Vec<&'a T>, CoreError> {
        match self {
            Self::All => Ok(items.iter().collect()),
            Self::Positions(positions) => positions
                .iter()
                .map(|&n| {
                    n.checked_sub(1)
                        .and_then(|i| items.get(i))
                        .ok_or_else(|| CoreError::ValidationFailed {
                            message: format!("device {n} is out of range 1-{}", items.len()),
                        })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetOutcome {
    pub deployment_ids: Vec<String>,
    pub removed: usize,
}

/// Reset `devices` to PnP and delete them from inventory.
pub async fn reset_devices(
    client: &DnacClient,
    devices: &[&NetworkDevice],
    settings: &WorkflowSettings,
    observer: &dyn WorkflowObserver,
) -> Result<ResetOutcome, CoreError> {
    if devices.is_empty() {
        return Err(CoreError::ValidationFailed {
            message: "no devices selected".into(),
        });
    }

    let targets: Vec<TargetInfo> = devices
        .iter()
        .map(|d| TargetInfo::managed_device(d.id.clone(), None))
        .collect();

    let batch = BatchSize::new(settings.template_batch_size, MAX_TEMPLATE_BATCH)?;
    let mut deployment_ids = Vec::with_capacity(batch.batch_count(targets.len()));
    for (index, chunk) in batch.split(&targets).enumerate() {
        let id = client
            .deploy_template(&settings.reset_template_id, chunk)
            .await?;
        observer.notify(&WorkflowEvent::Submitted {
            index,
            count: chunk.len(),
            id: &id,
        });
        deployment_ids.push(id);
    }
    info!(count = targets.len(), "reset template deployed");

    let wait = settings.reset_wait();
    observer.notify(&WorkflowEvent::Waiting {
        reason: "resetting PnP on devices",
        duration: wait,
    });
    tokio::time::sleep(wait).await;

    let deletes: Vec<InventoryDelete> = devices
        .iter()
        .map(|d| InventoryDelete {
            instance_uuid: d.id.clone(),
            clean_config: false,
        })
        .collect();
    client.delete_devices(&deletes).await?;
    info!(count = deletes.len(), "devices removed from inventory");

    Ok(ResetOutcome {
        deployment_ids,
        removed: deletes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positions() {
        assert_eq!(
            "1, 3,7".parse::<Selection>().ok(),
            Some(Selection::Positions(vec![1, 3, 7]))
        );
    }

    #[test]
    fn all_anywhere_selects_everything() {
        assert_eq!("2,all".parse::<Selection>().ok(), Some(Selection::All));
        assert_eq!("ALL".parse::<Selection>().ok(), Some(Selection::All));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!("0".parse::<Selection>().is_err());
        assert!("one".parse::<Selection>().is_err());
        assert!(" , ".parse::<Selection>().is_err());
    }

    #[test]
    fn pick_checks_range() {
        let items = ["a", "b", "c"];

        let picked = Selection::Positions(vec![3, 1]).pick(&items).expect("in range");
        assert_eq!(picked, vec![&"c", &"a"]);

        assert!(Selection::Positions(vec![4]).pick(&items).is_err());
        assert_eq!(Selection::All.pick(&items).expect("all").len(), 3);
    }
}
