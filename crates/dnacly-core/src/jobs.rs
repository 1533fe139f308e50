// Template push job bookkeeping
//
// Each template push run takes the next id from a plain-text counter and
// records its deployment ids in `deploy_ids_{MM-DD-YYYY}_job_{id}.csv`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::CoreError;
use crate::reports::{append_rows, report_date};

/// Value a fresh counter starts from; the first run gets this plus one.
pub const INITIAL_JOB_ID: u64 = 1000;

/// Monotonic job counter persisted as a single integer.
#[derive(Debug, Clone)]
pub struct JobCounter {
    path: PathBuf,
}

impl JobCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The last id handed out, or [`INITIAL_JOB_ID`] for a fresh counter.
    pub fn current(&self) -> Result<u64, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| CoreError::ValidationFailed {
                    message: format!(
                        "job counter {} holds '{}', not a number",
                        self.path.display(),
                        raw.trim()
                    ),
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(INITIAL_JOB_ID),
            Err(e) => Err(CoreError::io(&self.path, e)),
        }
    }

    /// Increment the counter, persist it and return the new id.
    pub fn next(&self) -> Result<u64, CoreError> {
        let id = self.current()? + 1;
        std::fs::write(&self.path, id.to_string()).map_err(|e| CoreError::io(&self.path, e))?;
        debug!(id, "job id allocated");
        Ok(id)
    }
}

/// Path of the deploy id file for `job_id` under `dir`.
pub fn deploy_id_file(dir: &Path, date: NaiveDate, job_id: u64) -> PathBuf {
    dir.join(format!("deploy_ids_{}_job_{job_id}.csv", report_date(date)))
}

/// Append deployment ids, one per row, creating `dir` on first use.
pub fn record_deploy_ids(
    dir: &Path,
    date: NaiveDate,
    job_id: u64,
    ids: &[String],
) -> Result<PathBuf, CoreError> {
    let path = deploy_id_file(dir, date, job_id);
    append_rows(&path, ids)?;
    Ok(path)
}
