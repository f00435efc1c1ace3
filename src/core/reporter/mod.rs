//! # Reporter Module
//!
//! Writes the results of a run to disk for scripting and archiving.
//!
//! ## Formats
//! - **JSON** - `_meta`, `summary` and the full `analysis` (failures,
//!   empty files and every duplicate group)
//! - **CSV** - one row per duplicate file, representative marked

mod export;

pub use export::{
    build_report, export_csv, export_json, export_to_file, Analysis, DupeEntry, ExportFormat,
    FailEntry, Report, ReportMeta,
};
