//! Export functionality for run reports.

use crate::core::comparator::FileRecord;
use crate::core::hasher::HashAlgorithmKind;
use crate::core::pipeline::{PipelineConfig, PipelineResult};
use crate::core::summary::RunSummary;
use crate::error::ReportError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// The serialized report
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(rename = "_meta")]
    pub meta: ReportMeta<'a>,
    pub summary: &'a RunSummary,
    pub analysis: Analysis<'a>,
}

/// When, how and over what the run was made
#[derive(Debug, Serialize)]
pub struct ReportMeta<'a> {
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub algorithm: HashAlgorithmKind,
    pub locations: Vec<String>,
    pub config: &'a PipelineConfig,
}

/// Per-file detail
#[derive(Debug, Serialize)]
pub struct Analysis<'a> {
    pub fails: Vec<FailEntry<'a>>,
    pub empty: &'a [FileRecord],
    pub dupes: Vec<DupeEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FailEntry<'a> {
    pub filename: &'a str,
    pub error: &'a str,
}

/// A representative followed by its duplicates
#[derive(Debug, Serialize)]
pub struct DupeEntry<'a> {
    #[serde(flatten)]
    pub root: &'a FileRecord,
    pub duplicates: &'a [FileRecord],
}

/// Assemble a report borrowing from the run result
pub fn build_report<'a>(
    result: &'a PipelineResult,
    config: &'a PipelineConfig,
    locations: Vec<String>,
) -> Report<'a> {
    let fails = result
        .failures
        .iter()
        .map(|(filename, error)| FailEntry { filename, error })
        .collect();

    let mut dupes: Vec<DupeEntry<'a>> = result
        .duplicates
        .values()
        .filter_map(|group| {
            group.representative().map(|root| DupeEntry {
                root,
                duplicates: group.duplicates(),
            })
        })
        .collect();
    // Largest first, like the top list
    dupes.sort_by(|a, b| b.root.size.cmp(&a.root.size).then(a.root.digest.cmp(&b.root.digest)));

    Report {
        meta: ReportMeta {
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            algorithm: config.algorithm,
            locations,
            config,
        },
        summary: &result.summary,
        analysis: Analysis {
            fails,
            empty: &result.empty_files,
            dupes,
        },
    }
}

/// Export a report as pretty-printed JSON
pub fn export_json<W: Write>(report: &Report<'_>, writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Export duplicates to CSV format
///
/// CSV columns: Digest, Path, Is Representative, Size (bytes), Fully Hashed
pub fn export_csv<W: Write>(result: &PipelineResult, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "Digest,Path,Is Representative,Size (bytes),Fully Hashed")?;

    for group in result.duplicates.values() {
        for (i, file) in group.files.iter().enumerate() {
            writeln!(
                writer,
                "{},{},{},{},{}",
                group.digest,
                csv_field(&file.full_name.display().to_string()),
                i == 0,
                file.size,
                file.fully_hashed
            )?;
        }
    }

    Ok(())
}

/// Quote a field if it contains a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write a report to `path`, or to a timestamped file in the current
/// directory when no path is given. Returns the path written.
pub fn export_to_file(
    result: &PipelineResult,
    config: &PipelineConfig,
    locations: Vec<String>,
    path: Option<&Path>,
    format: ExportFormat,
) -> Result<PathBuf, ReportError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!(
            "report-{}.{}",
            Utc::now().format("%Y%m%d-%H%M%S"),
            format.extension()
        )),
    };
    let io_error = |source| ReportError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    match format {
        ExportFormat::Json => export_json(&build_report(result, config, locations), &mut writer)?,
        ExportFormat::Csv => export_csv(result, &mut writer).map_err(io_error)?,
    }
    writer.flush().map_err(io_error)?;
    Ok(path)
}
