// CSV reports and the SWIM job directory
//
// Every report is a single header cell followed by rows. Some rows carry
// two values (hostname and status) under that one header, so writers are
// flexible about record length.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::WriterBuilder;
use tracing::info;

use crate::error::CoreError;
use crate::inputs::read_first_column;

/// `MM-DD-YYYY-HH_MM_SS`, used to suffix report names.
pub fn report_timestamp(now: NaiveDateTime) -> String {
    now.format("%m-%d-%Y-%H_%M_%S").to_string()
}

/// `MM-DD-YYYY`, used in deploy id file names.
pub fn report_date(today: NaiveDate) -> String {
    today.format("%m-%d-%Y").to_string()
}

/// Write `header` then one record per row, replacing any existing file.
pub fn write_report<R, S>(path: &Path, header: &str, rows: R) -> Result<(), CoreError>
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    create_parent(path)?;
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| CoreError::csv(path, &e))?;
    writer
        .write_record([header])
        .map_err(|e| CoreError::csv(path, &e))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| CoreError::csv(path, &e))?;
    }
    writer.flush().map_err(|e| CoreError::io(path, e))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// Append one single-value record per item, creating the file if needed.
pub fn append_rows<S: AsRef<str>>(path: &Path, values: &[S]) -> Result<(), CoreError> {
    create_parent(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CoreError::io(path, e))?;
    let mut writer = WriterBuilder::new().from_writer(file);
    for value in values {
        writer
            .write_record([value.as_ref()])
            .map_err(|e| CoreError::csv(path, &e))?;
    }
    writer.flush().map_err(|e| CoreError::io(path, e))?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }
    Ok(())
}

// ── SWIM job reports ─────────────────────────────────────────────────

/// File of device UUIDs that distributed cleanly and await activation.
pub const UUIDS_TO_ACTIVATE: &str = "UUIDS_to_Activate.csv";

/// Report files under `{log_dir}/SWIM_Jobs/`.
#[derive(Debug, Clone)]
pub struct SwimReports {
    dir: PathBuf,
    timestamp: String,
}

impl SwimReports {
    pub fn new(log_dir: &Path, now: NaiveDateTime) -> Self {
        Self {
            dir: log_dir.join("SWIM_Jobs"),
            timestamp: report_timestamp(now),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn uuids_to_activate_path(&self) -> PathBuf {
        self.dir.join(UUIDS_TO_ACTIVATE)
    }

    /// `Failed_Distributions_{ts}.csv`: hostname and task status per row.
    pub fn write_failed_distributions(
        &self,
        failures: &[(String, String)],
    ) -> Result<PathBuf, CoreError> {
        let path = self
            .dir
            .join(format!("Failed_Distributions_{}.csv", self.timestamp));
        write_report(
            &path,
            "Failed Devices",
            failures.iter().map(|(host, status)| [host, status]),
        )?;
        Ok(path)
    }

    /// `UUIDS_to_Activate.csv`: one UUID per row.
    pub fn write_uuids_to_activate(&self, uuids: &[String]) -> Result<PathBuf, CoreError> {
        let path = self.uuids_to_activate_path();
        write_report(&path, "Device UUIDs", uuids.iter().map(|u| [u]))?;
        Ok(path)
    }

    /// UUIDs left by an earlier distribution run.
    pub fn read_uuids_to_activate(&self) -> Result<Vec<String>, CoreError> {
        read_first_column(&self.uuids_to_activate_path())
    }

    /// `Failed_Activations_{ts}.csv`: one hostname per row.
    pub fn write_failed_activations(&self, hosts: &[String]) -> Result<PathBuf, CoreError> {
        let path = self
            .dir
            .join(format!("Failed_Activations_{}.csv", self.timestamp));
        write_report(&path, "Failed Activations", hosts.iter().map(|h| [h]))?;
        Ok(path)
    }
}

/// `PnP_Unclaimable_{ts}.csv` in `dir`: serials absent from the PnP portal.
pub fn write_unclaimable_report(
    dir: &Path,
    now: NaiveDateTime,
    serials: &[String],
) -> Result<PathBuf, CoreError> {
    let path = dir.join(format!("PnP_Unclaimable_{}.csv", report_timestamp(now)));
    write_report(&path, "Serial Number", serials.iter().map(|s| [s]))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 1))
            .expect("valid timestamp")
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(report_timestamp(at()), "03-07-2024-09_05_01");
        assert_eq!(report_date(at().date()), "03-07-2024");
    }

    #[test]
    fn failed_distributions_have_one_header_cell() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reports = SwimReports::new(dir.path(), at());

        let path = reports
            .write_failed_distributions(&[("sw-01".into(), "failure".into())])
            .expect("written");

        assert!(path.ends_with("SWIM_Jobs/Failed_Distributions_03-07-2024-09_05_01.csv"));
        let contents = std::fs::read_to_string(path).expect("read back");
        assert_eq!(contents, "Failed Devices\nsw-01,failure\n");
    }

    #[test]
    fn uuids_round_trip_without_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reports = SwimReports::new(dir.path(), at());
        let uuids = vec!["u-1".to_owned(), "u-2".to_owned()];

        reports.write_uuids_to_activate(&uuids).expect("written");

        assert_eq!(reports.read_uuids_to_activate().expect("read"), uuids);
    }

    #[test]
    fn unclaimable_report_lists_serials() {
        let dir = tempfile::tempdir().expect("tempdir");

        let path =
            write_unclaimable_report(dir.path(), at(), &["FOC1".into(), "FOC2".into()]).expect("ok");

        let contents = std::fs::read_to_string(path).expect("read back");
        assert_eq!(contents, "Serial Number\nFOC1\nFOC2\n");
    }

    #[test]
    fn append_accumulates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ids.csv");

        append_rows(&path, &["a"]).expect("first");
        append_rows(&path, &["b", "c"]).expect("second");

        assert_eq!(std::fs::read_to_string(path).expect("read"), "a\nb\nc\n");
    }
}
