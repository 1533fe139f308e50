// CSV inputs
//
// Two shapes are read: the PnP device sheet (named columns) and a
// single-column hostname or UUID list whose first row is a header.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;

/// Columns the PnP device sheet must carry.
pub const DEVICE_COLUMNS: [&str; 6] = [
    "Serial Number",
    "Hostname",
    "VLAN",
    "MGMT IP",
    "VLAN IP",
    "Site",
];

/// One row of the PnP device sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRow {
    pub serial_number: String,
    pub hostname: String,
    pub vlan: String,
    pub mgmt_ip: String,
    pub vlan_ip: String,
    /// Site hierarchy (e.g. `Global/US/HQ/Floor 1`) or site id.
    pub site: String,
}

/// Read the PnP device sheet.
///
/// Extra columns are ignored, values are trimmed and blank rows skipped.
/// A missing required column is an error naming it; a row too short to
/// reach every required column is an error naming its line.
pub fn read_device_rows(path: &Path) -> Result<Vec<DeviceRow>, CoreError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CoreError::csv(path, &e))?;

    let headers = reader
        .headers()
        .map_err(|e| CoreError::csv(path, &e))?
        .clone();
    let mut columns = [0usize; DEVICE_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(DEVICE_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CoreError::Csv {
                path: path.into(),
                message: format!("missing required column '{name}'"),
            })?;
    }

    let needed = columns.iter().max().map_or(0, |last| last + 1);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CoreError::csv(path, &e))?;
        if is_blank(&record) {
            continue;
        }
        if record.len() < needed {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(CoreError::Csv {
                path: path.into(),
                message: format!(
                    "line {line}: expected at least {needed} fields, found {}",
                    record.len()
                ),
            });
        }
        let field = |i: usize| record.get(columns[i]).unwrap_or_default().to_owned();
        rows.push(DeviceRow {
            serial_number: field(0),
            hostname: field(1),
            vlan: field(2),
            mgmt_ip: field(3),
            vlan_ip: field(4),
            site: field(5),
        });
    }

    debug!(path = %path.display(), rows = rows.len(), "read device sheet");
    Ok(rows)
}

/// Read the first column of every row after the header, skipping blanks.
pub fn read_first_column(path: &Path) -> Result<Vec<String>, CoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CoreError::csv(path, &e))?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CoreError::csv(path, &e))?;
        match record.get(0) {
            Some(value) if !value.is_empty() => values.push(value.to_owned()),
            _ => {}
        }
    }

    debug!(path = %path.display(), rows = values.len(), "read list");
    Ok(values)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn reads_required_columns_in_any_order() {
        let file = write_csv(
            "Site,Notes,Serial Number,Hostname,VLAN,MGMT IP,VLAN IP\n\
             Global/HQ/Floor 1, spare ,FOC1234X, sw-01 ,20,10.0.0.5,10.20.0.5\n",
        );

        let rows = read_device_rows(file.path()).expect("reads");

        assert_eq!(
            rows,
            vec![DeviceRow {
                serial_number: "FOC1234X".into(),
                hostname: "sw-01".into(),
                vlan: "20".into(),
                mgmt_ip: "10.0.0.5".into(),
                vlan_ip: "10.20.0.5".into(),
                site: "Global/HQ/Floor 1".into(),
            }]
        );
    }

    #[test]
    fn missing_column_is_named() {
        let file = write_csv("Serial Number,Hostname,VLAN,MGMT IP,Site\nA,b,1,2,3\n");

        let err = read_device_rows(file.path()).expect_err("missing VLAN IP");

        assert!(err.to_string().contains("'VLAN IP'"), "got: {err}");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let file = write_csv(
            "Serial Number,Hostname,VLAN,MGMT IP,VLAN IP,Site\n\
             A,a,1,1.1.1.1,2.2.2.2,s\n\
             ,,,,,\n\
             B,b,1,1.1.1.2,2.2.2.3,s\n",
        );

        let rows = read_device_rows(file.path()).expect("reads");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].serial_number, "B");
    }

    #[test]
    fn short_row_is_rejected_with_its_line() {
        let file = write_csv(
            "Serial Number,Hostname,VLAN,MGMT IP,VLAN IP,Site\n\
             A,a,1,1.1.1.1,2.2.2.2,s\n\
             C,c,1,1.1.1.3\n",
        );

        let err = read_device_rows(file.path()).expect_err("short row");

        assert!(matches!(err, CoreError::Csv { .. }));
        assert!(err.to_string().contains("line 3"), "got: {err}");
    }

    #[test]
    fn first_column_skips_header_and_blanks() {
        let file = write_csv("Hostname\nsw-01\n\n  sw-02  \nsw-03,extra\n");

        let hosts = read_first_column(file.path()).expect("reads");

        assert_eq!(hosts, vec!["sw-01", "sw-02", "sw-03"]);
    }

    #[test]
    fn missing_file_is_csv_error() {
        let err = read_first_column(Path::new("/nonexistent/devices.csv")).expect_err("absent");
        assert!(matches!(err, CoreError::Csv { .. }));
    }
}
