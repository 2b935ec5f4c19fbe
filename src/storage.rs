//! Flat-file persistence for collection reports.
//!
//! One JSON file per run date in the output directory. This is the only
//! persistence the system has; the listing endpoints are thin views over it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::report::CollectionReport;

/// Report files are recognized by this prefix and a `.json` suffix.
pub const REPORT_FILE_PREFIX: &str = "dod_awardees_";

/// Deterministic file name for a run on the given date.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("{}{}.json", REPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Metadata for one persisted report file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    pub name: String,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// A loaded report together with the file it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReport {
    pub file_name: String,
    pub modified: DateTime<Utc>,
    pub report: serde_json::Value,
}

/// Write a report into `dir`, creating the directory if missing.
///
/// A rerun on the same date overwrites that date's file.
pub fn write_report(dir: &Path, report: &CollectionReport) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(Utc::now().date_naive()));
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// List persisted report files, newest first. A missing directory is an
/// empty listing, not an error.
pub fn list_reports(dir: &Path) -> Result<Vec<ReportFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(REPORT_FILE_PREFIX) || !name.ends_with(".json") {
            continue;
        }
        let metadata = entry.metadata()?;
        let modified = DateTime::<Utc>::from(metadata.modified()?);
        // birthtime is not available on every platform/filesystem
        let created = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified);
        files.push(ReportFile {
            name,
            size: metadata.len(),
            created,
            modified,
        });
    }

    files.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(files)
}

/// Load the most recently modified report, or `None` if there is none.
pub fn latest_report(dir: &Path) -> Result<Option<LatestReport>> {
    let files = list_reports(dir)?;
    let Some(newest) = files.into_iter().next() else {
        return Ok(None);
    };

    let raw = fs::read_to_string(dir.join(&newest.name))?;
    Ok(Some(LatestReport {
        file_name: newest.name,
        modified: newest.modified,
        report: serde_json::from_str(&raw)?,
    }))
}
