//! Template command handlers: listing, deploy-to-tag and deployment status.

use serde::Serialize;
use tabled::Tabled;

use dnacly_core::batch::MAX_TEMPLATE_BATCH;
use dnacly_core::models::{DeploymentDevice, DeploymentStatus, Tag, Template};
use dnacly_core::workflow::template_push::{
    self, JobRecord, PushOutcome, project_names, templates_in_project,
};
use dnacly_core::{BatchSize, Session};

use crate::cli::{GlobalOpts, TemplatesArgs, TemplatesCommand};
use crate::console::ConsoleObserver;
use crate::error::CliError;
use crate::output::{self, Tone, or_dash, paint, should_color};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn template_row(t: &Template) -> TemplateRow {
    TemplateRow {
        project: t.project_name.clone(),
        name: t.name.clone(),
        id: t.template_id.clone(),
    }
}

#[derive(Debug, Serialize)]
struct Project {
    name: String,
    templates: usize,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Project")]
    name: String,
    #[tabled(rename = "Templates")]
    templates: usize,
}

fn project_row(p: &Project) -> ProjectRow {
    ProjectRow {
        name: p.name.clone(),
        templates: p.templates,
    }
}

fn status_view(status: &DeploymentStatus) -> String {
    let mut out = output::detail_lines(&[
        ("Deployment", or_dash(status.deployment_id.as_deref())),
        ("Template", or_dash(status.template_name.as_deref())),
        ("Status", or_dash(status.status.as_deref())),
    ]);
    for DeploymentDevice {
        name,
        device_id,
        status: device_status,
        detailed_status_message,
    } in &status.devices
    {
        out.push_str(&format!(
            "\n  {}  {}  {}",
            or_dash(name.as_deref().or(device_id.as_deref())),
            or_dash(device_status.as_deref()),
            detailed_status_message.as_deref().unwrap_or_default()
        ));
    }
    out
}

// ── Deploy ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct DeployReport {
    template: String,
    tag: String,
    targets: usize,
    #[serde(flatten)]
    outcome: PushOutcome,
    job: Option<JobRecord>,
}

async fn pick_tag(session: &Session, name: Option<String>) -> Result<Tag, CliError> {
    let client = session.client();
    if let Some(name) = name {
        return client
            .find_tag(&name)
            .await?
            .ok_or_else(|| CliError::NotFound {
                resource_type: "tag".into(),
                identifier: name,
                list_command: "tags list".into(),
            });
    }
    let mut tags = client.list_tags().await?;
    let names: Vec<String> = tags.iter().map(|t| t.name.clone()).collect();
    let index = util::select("Tag to deploy to", "tag", &names)?;
    Ok(tags.swap_remove(index))
}

fn pick_template(
    templates: &[Template],
    project: Option<String>,
    template: Option<String>,
) -> Result<Template, CliError> {
    let project = match project {
        Some(p) => p,
        None => {
            let projects = project_names(templates);
            let index = util::select("Project", "project", &projects)?;
            projects[index].clone()
        }
    };

    let candidates = templates_in_project(templates, &project);
    if candidates.is_empty() {
        return Err(CliError::NotFound {
            resource_type: "project".into(),
            identifier: project,
            list_command: "templates projects".into(),
        });
    }

    let chosen = match template {
        Some(wanted) => candidates
            .into_iter()
            .find(|t| t.name == wanted || t.template_id == wanted)
            .ok_or_else(|| CliError::NotFound {
                resource_type: "template".into(),
                identifier: format!("{wanted} in project {project}"),
                list_command: format!("templates list --project '{project}'"),
            })?,
        None => {
            let names: Vec<String> = candidates.iter().map(|t| t.name.clone()).collect();
            let index = util::select("Template", "template", &names)?;
            candidates[index]
        }
    };
    Ok(chosen.clone())
}

async fn deploy(
    session: &Session,
    global: &GlobalOpts,
    tag: Option<String>,
    project: Option<String>,
    template: Option<String>,
    batch_size: Option<usize>,
) -> Result<(), CliError> {
    let client = session.client();
    let settings = session.settings();
    let batch = BatchSize::new(
        batch_size.unwrap_or(settings.template_batch_size),
        MAX_TEMPLATE_BATCH,
    )?;

    let tag = pick_tag(session, tag).await?;
    let targets = template_push::tag_targets(client, &tag.id).await?;
    if targets.is_empty() {
        return Err(CliError::Validation {
            field: "tag".into(),
            reason: format!("tag '{}' has no network devices", tag.name),
        });
    }

    let templates = client.list_templates().await?;
    let template = pick_template(&templates, project, template)?;

    let prompt = format!(
        "Deploy '{}' to {} device(s) tagged '{}'?",
        template.name,
        targets.len(),
        tag.name
    );
    if !util::confirm(&prompt, "template deploy", global.yes)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let observer = ConsoleObserver::new(global);
    observer.line(&format!(
        "Deploying '{}' to {} device(s) in batches of {batch}",
        template.name,
        targets.len()
    ));
    let outcome =
        template_push::push_template(client, &template.template_id, &targets, batch, &observer)
            .await;
    observer.finish();
    let outcome = outcome?;

    let job = template_push::record_push(settings, chrono::Local::now().date_naive(), &outcome)?;
    let all_failed = outcome.deployment_ids.is_empty();
    let report = DeployReport {
        template: template.name,
        tag: tag.name,
        targets: targets.len(),
        outcome,
        job,
    };

    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let mut lines = vec![
                ("Template", r.template.clone()),
                ("Tag", r.tag.clone()),
                ("Targets", r.targets.to_string()),
                ("Deployments", r.outcome.deployment_ids.join(", ")),
            ];
            if let Some(job) = &r.job {
                lines.push(("Job", job.job_id.to_string()));
                lines.push(("Deploy ids", job.path.display().to_string()));
            }
            let mut out = output::detail_lines(&lines);
            for f in &r.outcome.failed_batches {
                out.push_str(&format!(
                    "\n{} batch {} ({} targets): {}",
                    paint("failed", Tone::Bad, color),
                    f.index + 1,
                    f.targets,
                    f.reason
                ));
            }
            out
        },
        |r| r.outcome.deployment_ids.join("\n"),
    )?;
    output::print_output(&out, global.quiet);

    if all_failed {
        return Err(CliError::ApiError {
            status: "deploy".into(),
            message: "every deploy batch was rejected".into(),
        });
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: TemplatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = session.client();
    match args.command {
        TemplatesCommand::Projects => {
            let templates = client.list_templates().await?;
            let projects: Vec<Project> = project_names(&templates)
                .into_iter()
                .map(|name| Project {
                    templates: templates_in_project(&templates, &name).len(),
                    name,
                })
                .collect();
            let out = output::render_list(&global.output, &projects, project_row, |p| {
                p.name.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TemplatesCommand::List { project } => {
            let mut templates = client.list_templates().await?;
            if let Some(project) = project {
                templates.retain(|t| t.project_name == project);
            }
            let out = output::render_list(&global.output, &templates, template_row, |t| {
                t.template_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TemplatesCommand::Deploy {
            tag,
            project,
            template,
            batch_size,
        } => deploy(session, global, tag, project, template, batch_size).await,

        TemplatesCommand::Status { deployment_id } => {
            let status = client.deployment_status(&deployment_id).await?;
            let out = output::render_single(&global.output, &status, status_view, |s| {
                or_dash(s.status.as_deref())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
