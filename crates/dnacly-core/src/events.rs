// Workflow progress notifications
//
// Workflows run start to finish without returning control, so the CLI
// learns about milestones, poll heartbeats and per-device failures
// through an observer.

use std::time::Duration;

use crate::progress::TaskTally;

/// What a poll iteration observed about a still-running task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// Distribution accepted but not yet reporting counts.
    Distributing { data: Option<String> },
    /// Activation accepted but not yet reporting counts.
    ActivationStarting,
    /// Counts reported; some devices still running or pending.
    InProgress { tally: TaskTally },
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent<'a> {
    /// A numbered milestone.
    Step { number: u32, message: String },
    /// A batch (or single device request) was accepted.
    Submitted {
        index: usize,
        count: usize,
        id: &'a str,
    },
    /// Poll heartbeat for a task that has not finished.
    Polling {
        task_id: &'a str,
        poll: u32,
        status: &'a PollStatus,
    },
    /// A task reached zero running and zero pending.
    TaskFinished {
        task_id: &'a str,
        tally: &'a TaskTally,
    },
    /// One device was processed.
    DeviceDone { device: &'a str },
    /// One device failed; the run continues.
    DeviceFailed { device: &'a str, reason: &'a str },
    /// Idle wait between phases.
    Waiting { reason: &'a str, duration: Duration },
}

/// Receives [`WorkflowEvent`]s.
pub trait WorkflowObserver {
    fn notify(&self, event: &WorkflowEvent<'_>);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl WorkflowObserver for NoopObserver {
    fn notify(&self, _event: &WorkflowEvent<'_>) {}
}

impl<F> WorkflowObserver for F
where
    F: Fn(&WorkflowEvent<'_>),
{
    fn notify(&self, event: &WorkflowEvent<'_>) {
        self(event);
    }
}
