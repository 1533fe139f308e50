// Task progress tallies
//
// A finished or running SWIM task reports progress as comma-separated
// `name=value` fields, e.g.
// `Success=3, Failure=1, Running=0, Pending=0, Total=4`. Fields are
// positional: success, failure, running, pending first and total last.

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

/// Counters of a task, parsed from its progress string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskTally {
    pub success: u64,
    pub failure: u64,
    pub running: u64,
    pub pending: u64,
    pub total: u64,
}

impl TaskTally {
    /// Nothing left running or queued.
    pub fn is_quiescent(&self) -> bool {
        self.running == 0 && self.pending == 0
    }

    pub fn has_failures(&self) -> bool {
        self.failure > 0
    }
}

impl AddAssign for TaskTally {
    fn add_assign(&mut self, rhs: Self) {
        self.success += rhs.success;
        self.failure += rhs.failure;
        self.running += rhs.running;
        self.pending += rhs.pending;
        self.total += rhs.total;
    }
}

impl fmt::Display for TaskTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "success {}, failure {}, running {}, pending {}, total {}",
            self.success, self.failure, self.running, self.pending, self.total
        )
    }
}

impl FromStr for TaskTally {
    type Err = CoreError;

    fn from_str(progress: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = progress.split(',').collect();
        if fields.len() < 5 {
            return Err(CoreError::ProgressParse {
                progress: progress.into(),
                reason: format!("expected at least 5 fields, found {}", fields.len()),
            });
        }

        let value = |field: &str| -> Result<u64, CoreError> {
            let raw = field.rsplit('=').next().unwrap_or(field).trim();
            raw.parse().map_err(|_| CoreError::ProgressParse {
                progress: progress.into(),
                reason: format!("'{raw}' is not a count"),
            })
        };

        Ok(Self {
            success: value(fields[0])?,
            failure: value(fields[1])?,
            running: value(fields[2])?,
            pending: value(fields[3])?,
            total: value(fields[fields.len() - 1])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_progress() {
        let tally: TaskTally = "Success=3, Failure=1, Running=0, Pending=0, Total=4"
            .parse()
            .expect("parses");
        assert_eq!(
            tally,
            TaskTally {
                success: 3,
                failure: 1,
                running: 0,
                pending: 0,
                total: 4
            }
        );
        assert!(tally.is_quiescent());
        assert!(tally.has_failures());
    }

    #[test]
    fn total_is_last_field_even_with_extras() {
        let tally: TaskTally = "Success=1,Failure=0,Running=2,Pending=1,Skipped=0,Total=4"
            .parse()
            .expect("parses");
        assert_eq!(tally.total, 4);
        assert!(!tally.is_quiescent());
    }

    #[test]
    fn value_is_text_after_last_equals() {
        let tally: TaskTally = "a=b=5,f=0,r=0,p=0,t=5".parse().expect("parses");
        assert_eq!(tally.success, 5);
    }

    #[test]
    fn too_few_fields_is_an_error() {
        let err = "Success=1,Failure=0"
            .parse::<TaskTally>()
            .expect_err("too few fields");
        assert!(matches!(err, CoreError::ProgressParse { .. }));
    }

    #[test]
    fn non_numeric_value_is_an_error() {
        assert!(
            "Success=x,Failure=0,Running=0,Pending=0,Total=1"
                .parse::<TaskTally>()
                .is_err()
        );
    }

    #[test]
    fn tallies_accumulate() {
        let mut sum = TaskTally::default();
        sum += TaskTally {
            success: 2,
            failure: 1,
            total: 3,
            ..TaskTally::default()
        };
        sum += TaskTally {
            success: 4,
            total: 4,
            ..TaskTally::default()
        };
        assert_eq!((sum.success, sum.failure, sum.total), (6, 1, 7));
    }
}
