// Template push
//
// Deploys a template to every device carrying a tag, in batches under the
// server's target ceiling, then files the deployment ids under a new job id.

use std::path::PathBuf;

use chrono::NaiveDate;
use dnacly_api::DnacClient;
use dnacly_api::models::{TargetInfo, Template};
use serde::Serialize;
use tracing::{info, warn};

use crate::batch::BatchSize;
use crate::config::WorkflowSettings;
use crate::error::CoreError;
use crate::events::{WorkflowEvent, WorkflowObserver};
use crate::jobs::{JobCounter, record_deploy_ids};
use crate::workflow::item_failure;

/// Deploy targets for every network device carrying `tag_id`.
pub async fn tag_targets(client: &DnacClient, tag_id: &str) -> Result<Vec<TargetInfo>, CoreError> {
    let members = client.tag_members(tag_id).await?;
    Ok(members
        .into_iter()
        .map(|m| TargetInfo::managed_device(m.instance_uuid, m.hostname))
        .collect())
}

/// Distinct project names, in first-seen order.
pub fn project_names(templates: &[Template]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for t in templates {
        if !names.contains(&t.project_name) {
            names.push(t.project_name.clone());
        }
    }
    names
}

pub fn templates_in_project<'a>(templates: &'a [Template], project: &str) -> Vec<&'a Template> {
    templates
        .iter()
        .filter(|t| t.project_name == project)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub index: usize,
    pub targets: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PushOutcome {
    pub deployment_ids: Vec<String>,
    pub failed_batches: Vec<BatchFailure>,
}

/// Deploy `template_id` to `targets`, one request per batch.
pub async fn push_template(
    client: &DnacClient,
    template_id: &str,
    targets: &[TargetInfo],
    batch: BatchSize,
    observer: &dyn WorkflowObserver,
) -> Result<PushOutcome, CoreError> {
    let mut outcome = PushOutcome::default();
    info!(
        template_id,
        targets = targets.len(),
        batches = batch.batch_count(targets.len()),
        "pushing template"
    );

    for (index, chunk) in batch.split(targets).enumerate() {
        match client.deploy_template(template_id, chunk).await {
            Ok(id) => {
                observer.notify(&WorkflowEvent::Submitted {
                    index,
                    count: chunk.len(),
                    id: &id,
                });
                outcome.deployment_ids.push(id);
            }
            Err(e) => {
                let reason = item_failure(e)?;
                warn!(index, "deploy batch failed: {reason}");
                outcome.failed_batches.push(BatchFailure {
                    index,
                    targets: chunk.len(),
                    reason,
                });
            }
        }
    }

    Ok(outcome)
}

/// Job id and file under which a push's deployment ids were recorded.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub job_id: u64,
    pub path: PathBuf,
}

/// Allocate a job id and append the deployment ids to its file.
///
/// Nothing is recorded, and no id consumed, when no batch was accepted.
pub fn record_push(
    settings: &WorkflowSettings,
    today: NaiveDate,
    outcome: &PushOutcome,
) -> Result<Option<JobRecord>, CoreError> {
    if outcome.deployment_ids.is_empty() {
        return Ok(None);
    }
    let job_id = JobCounter::new(&settings.job_id_file).next()?;
    let path = record_deploy_ids(
        &settings.deploy_id_dir,
        today,
        job_id,
        &outcome.deployment_ids,
    )?;
    info!(job_id, path = %path.display(), "deployment ids recorded");
    Ok(Some(JobRecord { job_id, path }))
}
