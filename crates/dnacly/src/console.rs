//! Stderr narration for long-running workflows.
//!
//! Numbered steps, per-batch submissions and tallies are printed as they
//! happen; poll heartbeats and idle waits drive a spinner instead of
//! scrolling the terminal.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use secrecy::SecretString;

use dnacly_core::{PollStatus, TaskTally, WorkflowEvent, WorkflowObserver};

use crate::cli::GlobalOpts;
use crate::output::{Tone, paint, should_color};

pub struct ConsoleObserver {
    spinner: ProgressBar,
    color: bool,
    quiet: bool,
}

impl ConsoleObserver {
    pub fn new(global: &GlobalOpts) -> Self {
        let spinner = if global.quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
                bar.set_style(style);
            }
            bar
        };
        Self {
            spinner,
            color: should_color(&global.color),
            quiet: global.quiet,
        }
    }

    /// Print a line above the spinner.
    pub fn line(&self, text: &str) {
        if self.quiet {
            return;
        }
        self.spinner.suspend(|| eprintln!("{text}"));
    }

    /// Run `f` (e.g. a prompt) with the spinner hidden.
    pub fn suspend<T>(&self, f: impl FnOnce() -> T) -> T {
        self.spinner.suspend(f)
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    fn spin(&self, message: String) {
        if self.quiet {
            return;
        }
        if self.spinner.is_finished() {
            return;
        }
        self.spinner.set_message(message);
        self.spinner.enable_steady_tick(Duration::from_millis(120));
    }

    fn idle(&self) {
        self.spinner.disable_steady_tick();
        self.spinner.set_message("");
    }

    pub fn tally(&self, tally: &TaskTally) -> String {
        let failure = format!("Failure={}", tally.failure);
        let tone = if tally.failure > 0 {
            Tone::Bad
        } else {
            Tone::Muted
        };
        format!(
            "{}, {}, Running={}, Pending={}, Total={}",
            paint(&format!("Success={}", tally.success), Tone::Good, self.color),
            paint(&failure, tone, self.color),
            tally.running,
            tally.pending,
            tally.total
        )
    }
}

impl WorkflowObserver for ConsoleObserver {
    fn notify(&self, event: &WorkflowEvent<'_>) {
        match event {
            WorkflowEvent::Step { number, message } => {
                self.idle();
                self.line(&format!("Step {number}: {message}"));
            }
            WorkflowEvent::Submitted { index, count, id } => {
                self.line(&format!(
                    "  batch {} ({count} devices) accepted: {}",
                    index + 1,
                    paint(id, Tone::Muted, self.color)
                ));
            }
            WorkflowEvent::Polling {
                task_id,
                poll,
                status,
            } => {
                let detail = match status {
                    PollStatus::Distributing { data } => format!(
                        "distribution starting{}",
                        data.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
                    ),
                    PollStatus::ActivationStarting => "activation starting".into(),
                    PollStatus::InProgress { tally } => self.tally(tally),
                };
                self.spin(format!("task {task_id} poll {poll}: {detail}"));
            }
            WorkflowEvent::TaskFinished { task_id, tally } => {
                self.idle();
                self.line(&format!("  task {task_id} finished: {}", self.tally(tally)));
            }
            WorkflowEvent::DeviceDone { device } => {
                self.line(&format!("  {} {device}", paint("ok", Tone::Good, self.color)));
            }
            WorkflowEvent::DeviceFailed { device, reason } => {
                self.line(&format!(
                    "  {} {device}: {reason}",
                    paint("failed", Tone::Bad, self.color)
                ));
            }
            WorkflowEvent::Waiting { reason, duration } => {
                self.spin(format!("{reason} (waiting {}s)", duration.as_secs()));
            }
        }
    }
}

/// Password prompt handed to `Session::connect`.
///
/// Attempt 0 is the initial prompt; later attempts follow a rejection.
/// An empty entry, or no terminal to ask on, gives up.
pub fn password_prompt(username: &str) -> impl FnMut(u32) -> Option<SecretString> + '_ {
    move |attempt| {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        let label = if attempt == 0 {
            format!("DNA Center password for {username}: ")
        } else {
            format!("Password rejected, try again ({attempt}): ")
        };
        match rpassword::prompt_password(label) {
            Ok(pw) if !pw.is_empty() => Some(SecretString::from(pw)),
            _ => None,
        }
    }
}

/// Password prompt for a token that expires mid-run after the session
/// started from the token cache. Declines without a terminal.
pub fn reauth_prompt(username: String) -> impl Fn() -> Option<SecretString> + Send + Sync + 'static {
    move || {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        match rpassword::prompt_password(format!(
            "Token expired, DNA Center password for {username}: "
        )) {
            Ok(pw) if !pw.is_empty() => Some(SecretString::from(pw)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn observer() -> ConsoleObserver {
        let cli = Cli::try_parse_from(["dnacly", "-q", "--color", "never", "auth", "test"])
            .expect("valid args");
        ConsoleObserver::new(&cli.global)
    }

    #[test]
    fn tally_line_lists_all_counters() {
        let tally: TaskTally = "Success=3,Failure=1,Running=0,Pending=2,Total=6"
            .parse()
            .expect("tally");

        assert_eq!(
            observer().tally(&tally),
            "Success=3, Failure=1, Running=0, Pending=2, Total=6"
        );
    }

    #[test]
    fn quiet_observer_swallows_events() {
        let obs = observer();
        obs.notify(&WorkflowEvent::Step {
            number: 2,
            message: "Getting all devices".into(),
        });
        obs.notify(&WorkflowEvent::Waiting {
            reason: "resetting",
            duration: Duration::from_secs(81),
        });
        assert_eq!(obs.spinner.message(), "");
        obs.finish();
    }
}
