use super::summary::{format_hms, Summary};
use crate::domain::{Category, TimeEntry};
use crate::persistence::{atomic_write, report_file_name, StoreError, StoreResult, EXPORT_JSON_FILE};
use chrono::NaiveDate;
use std::path::PathBuf;

/// What an export should produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Also produce the raw JSON entry list
    pub as_json: bool,
    /// Write the outputs to the data directory
    pub write_to_disk: bool,
}

/// Rendered export, plus where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub report: String,
    pub json: Option<String>,
    pub report_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

/// Turns a materialized entry list into report/JSON files
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    categories: &'static [Category],
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, categories: &'static [Category]) -> Self {
        Self {
            dir: dir.into(),
            categories,
        }
    }

    /// Path of the text report for `day`
    pub fn report_path(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(report_file_name(day))
    }

    /// Path of the JSON export
    pub fn json_path(&self) -> PathBuf {
        self.dir.join(EXPORT_JSON_FILE)
    }

    /// Export `entries` as the report for `day`.
    ///
    /// Pure with respect to tracking state: a live session must already be
    /// present in `entries` as a synthetic entry ending "now".
    pub fn export(&self, entries: &[TimeEntry], day: NaiveDate, options: ExportOptions) -> StoreResult<ExportOutput> {
        let summary = Summary::from_entries(entries, self.categories);
        let report = render_report(day, &summary);
        let json = if options.as_json {
            Some(render_json(entries)?)
        } else {
            None
        };

        let mut output = ExportOutput {
            report,
            json,
            report_path: None,
            json_path: None,
        };

        if options.write_to_disk {
            let report_path = self.report_path(day);
            atomic_write(&report_path, &output.report)?;
            output.report_path = Some(report_path);

            if let Some(json) = &output.json {
                let json_path = self.json_path();
                atomic_write(&json_path, json)?;
                output.json_path = Some(json_path);
            }
        }

        Ok(output)
    }
}

/// Serialize entries verbatim as a JSON array
pub fn render_json(entries: &[TimeEntry]) -> StoreResult<String> {
    serde_json::to_string_pretty(entries).map_err(|e| StoreError::json(EXPORT_JSON_FILE, e))
}

/// Render the plain-text daily report
pub fn render_report(day: NaiveDate, summary: &Summary) -> String {
    let mut report = String::new();

    let title = format!("Time Tracking Summary - {}", day.format("%Y-%m-%d"));
    report.push_str(&format!("{}\n", title));
    report.push_str(&format!("{}\n\n", "=".repeat(title.len())));

    if summary.is_empty() {
        report.push_str("No time tracked.\n\n");
    } else {
        let width = summary
            .totals
            .iter()
            .map(|t| t.name.chars().count())
            .max()
            .unwrap_or(0);

        for total in &summary.totals {
            report.push_str(&format!(
                "{:<width$}  {}\n",
                total.name,
                format_hms(total.seconds),
                width = width
            ));
        }
        report.push('\n');
    }

    report.push_str(&format!(
        "Total active time: {}\n",
        format_hms(summary.total_active_seconds)
    ));

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::local;
    use crate::domain::category;
    use crate::persistence::read_file;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn sample_entries() -> Vec<TimeEntry> {
        let nine = local(2024, 3, 15, 9, 0, 0);
        vec![
            TimeEntry::new("Work", nine, nine + Duration::hours(1)),
            TimeEntry::new("Break", nine + Duration::hours(1), nine + Duration::minutes(90)),
        ]
    }

    #[test]
    fn test_render_report() {
        let summary = Summary::from_entries(&sample_entries(), category::all());

        let expected = "\
Time Tracking Summary - 2024-03-15
==================================

Work   01:00:00
Break  00:30:00

Total active time: 01:00:00
";
        assert_eq!(render_report(day(), &summary), expected);
    }

    #[test]
    fn test_render_empty_report() {
        let report = render_report(day(), &Summary::default());
        assert!(report.contains("No time tracked."));
        assert!(report.ends_with("Total active time: 00:00:00\n"));
    }

    #[test]
    fn test_export_without_disk_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let exporter = Exporter::new(temp_dir.path(), category::all());

        let output = exporter
            .export(&sample_entries(), day(), ExportOptions { as_json: true, write_to_disk: false })
            .unwrap();

        assert!(output.json.is_some());
        assert!(output.report_path.is_none());
        assert!(!exporter.report_path(day()).exists());
        assert!(!exporter.json_path().exists());
    }

    #[test]
    fn test_export_report_only_to_disk() {
        let temp_dir = tempdir().unwrap();
        let exporter = Exporter::new(temp_dir.path(), category::all());

        let output = exporter
            .export(&sample_entries(), day(), ExportOptions { as_json: false, write_to_disk: true })
            .unwrap();

        let report_path = temp_dir.path().join("time-tracking-2024-03-15.txt");
        assert_eq!(output.report_path.as_deref(), Some(report_path.as_path()));
        assert_eq!(read_file(&report_path).unwrap(), Some(output.report));
        assert!(output.json_path.is_none());
        assert!(!exporter.json_path().exists());
    }

    #[test]
    fn test_export_json_is_verbatim_and_overwrites() {
        let temp_dir = tempdir().unwrap();
        let exporter = Exporter::new(temp_dir.path(), category::all());
        let options = ExportOptions { as_json: true, write_to_disk: true };

        exporter.export(&sample_entries(), day(), options).unwrap();
        let output = exporter.export(&sample_entries()[..1], day(), options).unwrap();

        let written = read_file(exporter.json_path()).unwrap().unwrap();
        let entries: Vec<TimeEntry> = serde_json::from_str(&written).unwrap();
        assert_eq!(entries, sample_entries()[..1].to_vec());
        assert_eq!(output.json, Some(written));
    }
}
