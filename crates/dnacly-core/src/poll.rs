// Task polling
//
// Image tasks are polled at a constant interval until their tally shows
// nothing running and nothing pending. Two progress strings precede the
// tally: one while a distribution is starting and one while an
// activation is starting; the latter waits longer between polls.

use std::future::Future;
use std::time::Duration;

use dnacly_api::DnacClient;
use dnacly_api::models::Task;
use tracing::debug;

use crate::config::WorkflowSettings;
use crate::error::CoreError;
use crate::events::{PollStatus, WorkflowEvent, WorkflowObserver};
use crate::progress::TaskTally;

/// Progress reported while a distribution has not produced counts yet.
pub const DISTRIBUTION_STARTING: &str = "Starting Distribution";

/// Progress reported while an activation has not produced counts yet.
pub const ACTIVATION_STARTING: &str = "image activation";

/// Anything that can fetch a task record by id.
pub trait TaskSource {
    fn fetch_task(&self, task_id: &str) -> impl Future<Output = Result<Task, dnacly_api::Error>>;
}

impl TaskSource for DnacClient {
    fn fetch_task(&self, task_id: &str) -> impl Future<Output = Result<Task, dnacly_api::Error>> {
        self.get_task(task_id)
    }
}

/// Poll pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub activation_interval: Duration,
    pub max_polls: u32,
}

impl From<&WorkflowSettings> for PollSettings {
    fn from(settings: &WorkflowSettings) -> Self {
        Self {
            interval: settings.poll_interval(),
            activation_interval: settings.activation_poll_interval(),
            max_polls: settings.max_polls,
        }
    }
}

/// Poll `task_id` until it is quiescent and return its final tally.
///
/// Fails with [`CoreError::PollTimeout`] once `max_polls` fetches have
/// been made without the task settling.
pub async fn wait_for_task<S>(
    source: &S,
    task_id: &str,
    settings: PollSettings,
    observer: &dyn WorkflowObserver,
) -> Result<TaskTally, CoreError>
where
    S: TaskSource + ?Sized,
{
    for poll in 1..=settings.max_polls {
        let task = source.fetch_task(task_id).await?;

        let (status, delay) = match task.progress.as_str() {
            DISTRIBUTION_STARTING => (
                PollStatus::Distributing { data: task.data },
                settings.interval,
            ),
            ACTIVATION_STARTING => (PollStatus::ActivationStarting, settings.activation_interval),
            progress => {
                let tally: TaskTally = progress.parse()?;
                if tally.is_quiescent() {
                    debug!(task_id, poll, %tally, "task finished");
                    observer.notify(&WorkflowEvent::TaskFinished {
                        task_id,
                        tally: &tally,
                    });
                    return Ok(tally);
                }
                (PollStatus::InProgress { tally }, settings.interval)
            }
        };

        debug!(task_id, poll, ?status, "task not finished");
        observer.notify(&WorkflowEvent::Polling {
            task_id,
            poll,
            status: &status,
        });
        tokio::time::sleep(delay).await;
    }

    Err(CoreError::PollTimeout {
        task_id: task_id.into(),
        polls: settings.max_polls,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use crate::events::NoopObserver;

    /// Serves a fixed sequence of progress strings.
    struct Scripted(Mutex<VecDeque<&'static str>>);

    impl Scripted {
        fn new(progress: &[&'static str]) -> Self {
            Self(Mutex::new(progress.iter().copied().collect()))
        }
    }

    impl TaskSource for Scripted {
        async fn fetch_task(&self, task_id: &str) -> Result<Task, dnacly_api::Error> {
            let progress = self
                .0
                .lock()
                .expect("script lock")
                .pop_front()
                .expect("script exhausted");
            Ok(Task {
                id: Some(task_id.into()),
                progress: progress.into(),
                data: Some("distribution".into()),
                is_error: false,
                failure_reason: None,
            })
        }
    }

    fn settings(max_polls: u32) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(20),
            activation_interval: Duration::from_secs(30),
            max_polls,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_running_and_pending_reach_zero() {
        let source = Scripted::new(&[
            DISTRIBUTION_STARTING,
            "Success=1,Failure=0,Running=2,Pending=1,Total=4",
            "Success=3,Failure=1,Running=0,Pending=0,Total=4",
        ]);
        let started = Instant::now();

        let tally = wait_for_task(&source, "t1", settings(10), &NoopObserver)
            .await
            .expect("task settles");

        assert_eq!(tally.success, 3);
        assert_eq!(tally.failure, 1);
        assert_eq!(started.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn activation_start_waits_longer() {
        let source = Scripted::new(&[
            ACTIVATION_STARTING,
            "Success=1,Failure=0,Running=0,Pending=0,Total=1",
        ]);
        let started = Instant::now();

        wait_for_task(&source, "t1", settings(10), &NoopObserver)
            .await
            .expect("task settles");

        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_polls() {
        let source = Scripted::new(&[DISTRIBUTION_STARTING, DISTRIBUTION_STARTING]);

        let err = wait_for_task(&source, "t1", settings(2), &NoopObserver)
            .await
            .expect_err("never settles");

        assert!(matches!(err, CoreError::PollTimeout { polls: 2, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_progress_is_an_error() {
        let source = Scripted::new(&["Waiting on device"]);

        let err = wait_for_task(&source, "t1", settings(5), &NoopObserver)
            .await
            .expect_err("cannot parse");

        assert!(matches!(err, CoreError::ProgressParse { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn observer_sees_each_heartbeat() {
        let source = Scripted::new(&[
            DISTRIBUTION_STARTING,
            "Success=0,Failure=0,Running=1,Pending=0,Total=1",
            "Success=1,Failure=0,Running=0,Pending=0,Total=1",
        ]);
        let seen = Mutex::new(Vec::new());
        let observer = |event: &WorkflowEvent<'_>| {
            if let WorkflowEvent::Polling { poll, .. } = event {
                seen.lock().expect("seen lock").push(*poll);
            }
        };

        wait_for_task(&source, "t1", settings(5), &observer)
            .await
            .expect("task settles");

        assert_eq!(*seen.lock().expect("seen lock"), vec![1, 2]);
    }
}
