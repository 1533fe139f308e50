//! `swim run`: image distribution and activation.

use std::path::PathBuf;

use dnacly_core::batch::MAX_DISTRIBUTION_BATCH;
use dnacly_core::inputs::read_first_column;
use dnacly_core::reports::SwimReports;
use dnacly_core::workflow::swim::{self, SwimRequest, SwimSummary};
use dnacly_core::{BatchSize, PollSettings, Session};

use crate::cli::{GlobalOpts, SwimArgs, SwimCommand};
use crate::console::ConsoleObserver;
use crate::error::CliError;
use crate::output::{self, Tone, paint, should_color};

/// Argument checks that need no appliance.
pub fn validate(args: &SwimArgs) -> Result<(), CliError> {
    match &args.command {
        SwimCommand::Run {
            devices,
            distribute,
            activate,
            ..
        } => {
            if !distribute && !activate {
                return Err(CliError::Validation {
                    field: "swim run".into(),
                    reason: "pass --distribute, --activate, or both".into(),
                });
            }
            if *distribute && devices.is_none() {
                return Err(CliError::Validation {
                    field: "devices".into(),
                    reason: "--distribute needs a hostname sheet (--devices)".into(),
                });
            }
            Ok(())
        }
    }
}

fn summary_view(summary: &SwimSummary, observer: &ConsoleObserver, color: bool) -> String {
    let mut lines = Vec::new();
    if !summary.device_types.is_empty() {
        lines.push(("Device types", summary.device_types.join(", ")));
    }
    if !summary.unknown_hostnames.is_empty() {
        lines.push(("Not in inventory", summary.unknown_hostnames.join(", ")));
    }
    if let Some(d) = &summary.distribution {
        lines.push(("Distribution", observer.tally(&d.tally)));
        lines.push(("Ready to activate", d.ready.len().to_string()));
        if !d.failed.is_empty() {
            let hosts: Vec<&str> = d.failed.iter().map(|f| f.hostname.as_str()).collect();
            lines.push((
                "Failed distribution",
                paint(&hosts.join(", "), Tone::Bad, color),
            ));
        }
    }
    if let Some(a) = &summary.activation {
        lines.push(("Activation", observer.tally(&a.tally)));
        if !a.failed.is_empty() {
            lines.push(("Failed activation", paint(&a.failed.join(", "), Tone::Bad, color)));
        }
    }
    for path in &summary.reports {
        lines.push(("Report", path.display().to_string()));
    }
    output::detail_lines(&lines)
}

pub async fn handle(session: &Session, args: SwimArgs, global: &GlobalOpts) -> Result<(), CliError> {
    validate(&args)?;
    match args.command {
        SwimCommand::Run {
            devices,
            image,
            distribute,
            activate,
            batch_size,
            log_dir,
        } => {
            let settings = session.settings();
            let hostnames = match devices.filter(|_| distribute) {
                Some(path) => read_first_column(&path)?,
                None => Vec::new(),
            };
            let request = SwimRequest {
                hostnames,
                image_uuid: image,
                distribute,
                activate,
                batch: BatchSize::new(
                    batch_size.unwrap_or(settings.distribution_batch_size),
                    MAX_DISTRIBUTION_BATCH,
                )?,
                poll: PollSettings::from(settings),
                activation_pacing: settings.activation_pacing(),
            };
            let log_dir: PathBuf = log_dir.unwrap_or_else(|| settings.swim_log_dir.clone());
            let reports = SwimReports::new(&log_dir, chrono::Local::now().naive_local());

            let observer = ConsoleObserver::new(global);
            observer.line(&format!(
                "Step 1: Image {} ({} hostname(s), reports in {})",
                request.image_uuid,
                request.hostnames.len(),
                reports.dir().display()
            ));
            let summary = swim::run(session.client(), &request, &reports, &observer).await;
            observer.finish();
            let summary = summary?;

            let color = should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &summary,
                |s| summary_view(s, &observer, color),
                |s| {
                    s.reports
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn swim_args(extra: &[&str]) -> SwimArgs {
        let mut argv = vec!["dnacly", "swim", "run", "--image", "img-1"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("valid args").command {
            Command::Swim(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn needs_an_action() {
        assert!(matches!(
            validate(&swim_args(&[])),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn distribution_needs_a_sheet() {
        assert!(validate(&swim_args(&["--distribute"])).is_err());
        assert!(validate(&swim_args(&["--distribute", "-d", "hosts.csv"])).is_ok());
    }

    #[test]
    fn activation_alone_needs_no_sheet() {
        assert!(validate(&swim_args(&["--activate"])).is_ok());
    }
}
