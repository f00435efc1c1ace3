//! # CLI Module
//!
//! Command-line interface for the duplicate file finder.
//!
//! ## Usage
//! ```bash
//! # Smash the current directory
//! smash
//!
//! # Several locations, recursively, with a cryptographic hash
//! smash ~/Photos /mnt/backup/Photos -r --algorithm sha256
//!
//! # Full duplicate listing plus a JSON report
//! smash ~/Downloads --show-duplicates -o report.json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use smash::core::hasher::HashAlgorithmKind;
use smash::core::pipeline::{
    default_workers, Pipeline, PipelineConfig, PipelineResult, DEFAULT_TOP_COUNT,
};
use smash::core::reporter::{export_to_file, ExportFormat};
use smash::core::slicer::{DEFAULT_SLICES, DEFAULT_SLICE_SIZE, DEFAULT_THRESHOLD};
use smash::error::{ConfigError, Result};
use smash::events::{Event, EventChannel, IndexEvent, PipelineEvent, SmashEvent};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// smash - find duplicate files fast
#[derive(Parser, Debug)]
#[command(name = "smash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Locations to smash (defaults to the current directory)
    locations: Vec<PathBuf>,

    /// Extra base locations, comma separated
    #[arg(long, value_delimiter = ',')]
    base: Vec<PathBuf>,

    /// Hash algorithm: xxhash, fnv128, fnv128a, xxh3, xxh128, md5, sha256, sha512, blake3
    #[arg(long, default_value = "xxhash")]
    algorithm: HashAlgorithmKind,

    /// Directory name regular expressions to exclude, comma separated
    #[arg(long, value_delimiter = ',')]
    exclude_dir: Vec<String>,

    /// File name regular expressions to exclude, comma separated
    #[arg(long, value_delimiter = ',')]
    exclude_file: Vec<String>,

    /// Maximum workers hashing files
    #[arg(short = 'w', long, default_value_t = default_workers())]
    max_workers: usize,

    /// Minimum file size to consider (bytes)
    #[arg(short = 'G', long, default_value_t = 0)]
    min_size: u64,

    /// Maximum file size to consider (bytes, 0 = no limit)
    #[arg(short = 'L', long, default_value_t = 0)]
    max_size: u64,

    /// Number of slices sampled from large files
    #[arg(long, default_value_t = DEFAULT_SLICES)]
    slices: usize,

    /// Size of each slice (bytes)
    #[arg(long, default_value_t = DEFAULT_SLICE_SIZE)]
    slice_size: u64,

    /// Files smaller than this are hashed in full (bytes)
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    slice_threshold: u64,

    /// Hash every file in full
    #[arg(long)]
    disable_slicing: bool,

    /// Do not mix the file size into the digest
    #[arg(long)]
    disable_meta: bool,

    /// Do not detect text files (text files are otherwise hashed in full)
    #[arg(long)]
    disable_autotext: bool,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Include system files and directories
    #[arg(long)]
    include_system: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    recurse: bool,

    /// Number of entries in the top duplicates list
    #[arg(long, default_value_t = DEFAULT_TOP_COUNT)]
    show_top: usize,

    /// Hide the top duplicates list
    #[arg(long)]
    no_top_list: bool,

    /// Print every duplicate group
    #[arg(long)]
    show_duplicates: bool,

    /// Print empty files
    #[arg(long)]
    show_empty: bool,

    /// Seconds between progress updates
    #[arg(long, default_value_t = 5)]
    progress_update: u64,

    /// Disable progress updates
    #[arg(long)]
    no_progress: bool,

    /// Write a report to this file (use "-" for an auto-named file)
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "json")]
    output_format: ReportFormat,

    /// Only print errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    silent: bool,

    /// Verbose output
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// Full analysis as JSON
    Json,
    /// One row per grouped file
    Csv,
}

impl From<ReportFormat> for ExportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => ExportFormat::Json,
            ReportFormat::Csv => ExportFormat::Csv,
        }
    }
}

impl Cli {
    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            algorithm: self.algorithm,
            workers: self.max_workers,
            slices: self.slices,
            slice_size: self.slice_size,
            threshold: self.slice_threshold,
            min_size: self.min_size,
            max_size: self.max_size,
            exclude_dirs: self.exclude_dir.clone(),
            exclude_files: self.exclude_file.clone(),
            ignore_hidden: !self.include_hidden,
            ignore_system: !self.include_system,
            recurse: self.recurse,
            disable_slicing: self.disable_slicing,
            disable_meta: self.disable_meta,
            disable_auto_text: self.disable_autotext,
            top_count: self.show_top,
            progress_interval: self
                .show_progress()
                .then(|| Duration::from_secs(self.progress_update)),
        }
    }

    fn show_progress(&self) -> bool {
        !self.silent && !self.no_progress
    }

    fn requested_locations(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .locations
            .iter()
            .chain(self.base.iter())
            .cloned()
            .collect();
        if paths.is_empty() {
            paths.push(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        }
        paths
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    smash::init_tracing(cli.verbose);

    let term = Term::stdout();
    let locations = verify_locations(&cli.requested_locations(), cli.silent);
    if locations.is_empty() {
        return Err(ConfigError::NoLocations.into());
    }

    let config = cli.config();
    let pipeline = Pipeline::builder()
        .config(config.clone())
        .paths(locations.clone())
        .build()?;

    if !cli.silent {
        print_banner(&term, &config, &locations);
    }

    let (sender, receiver) = EventChannel::new();

    let progress = cli.show_progress().then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message("Smashing...");
        pb
    });

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}...", phase));
                    }
                }
                Event::Smash(SmashEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("Smashing {} files...", p.files_seen));
                    }
                }
                Event::Index(IndexEvent::Error { location, message }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!("{} {}: {}", style("!").red(), location, message));
                    }
                }
                Event::Smash(SmashEvent::Failed { path, message }) if verbose => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!("{} {}: {}", style("!").yellow(), path.display(), message));
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let result = result?;

    if !cli.silent {
        print_results(&term, &cli, &result);
    }

    if let Some(ref output) = cli.output_file {
        let target = (output.as_os_str() != "-").then_some(output.as_path());
        let names = locations.iter().map(|p| p.display().to_string()).collect();
        let written = export_to_file(&result, &config, names, target, cli.output_format.into())?;
        if !cli.silent {
            term.write_line(&format!(
                "{} Report written to {}",
                style("✓").green(),
                style(written.display()).cyan()
            ))
            .ok();
        }
    }

    Ok(())
}

/// Keep only locations that exist, warning about the rest
fn verify_locations(paths: &[PathBuf], silent: bool) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                warn!(path = %path.display(), "Ignoring invalid location");
                if !silent {
                    Term::stderr()
                        .write_line(&format!(
                            "{} Ignoring invalid location {}",
                            style("!").yellow(),
                            style(path.display()).cyan()
                        ))
                        .ok();
                }
            }
            exists
        })
        .cloned()
        .collect()
}

fn print_banner(term: &Term, config: &PipelineConfig, locations: &[PathBuf]) {
    term.write_line(&format!(
        "{} {}",
        style("smash").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();

    for location in locations {
        term.write_line(&format!("  {} {}", style("Location:").dim(), location.display()))
            .ok();
    }

    let slicing = if config.disable_slicing {
        style("disabled".to_string()).yellow()
    } else {
        style(format!(
            "{} x {} above {}",
            config.slices,
            format_bytes(config.slice_size),
            format_bytes(config.threshold)
        ))
        .green()
    };

    term.write_line(&format!(
        "  {} {}  {} {}  {} {}",
        style("Algorithm:").dim(),
        style(config.algorithm).cyan(),
        style("Workers:").dim(),
        config.workers,
        style("Slicing:").dim(),
        slicing
    ))
    .ok();

    if config.min_size > 0 || config.max_size > 0 {
        let max = if config.max_size == 0 {
            "unbounded".to_string()
        } else {
            format_bytes(config.max_size)
        };
        term.write_line(&format!(
            "  {} {} - {}",
            style("Sizes:").dim(),
            format_bytes(config.min_size),
            max
        ))
        .ok();
    }

    term.write_line("").ok();
}

fn print_results(term: &Term, cli: &Cli, result: &PipelineResult) {
    let summary = &result.summary;

    if !cli.no_top_list && !summary.top.is_empty() {
        term.write_line(&format!(
            "{}",
            style(format!("Top {} Duplicates:", summary.top.len())).bold().underlined()
        ))
        .ok();
        term.write_line("").ok();

        for (i, item) in summary.top.iter().enumerate() {
            let Some(group) = result.duplicates.get(&item.digest) else {
                continue;
            };
            let Some(root) = group.representative() else {
                continue;
            };
            term.write_line(&format!(
                "  {} {} ({} copies, {})",
                style(format!("{:>2}.", i + 1)).bold(),
                root.full_name.display(),
                group.duplicate_count(),
                style(format_bytes(item.size)).yellow()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    if cli.show_duplicates && !result.duplicates.is_empty() {
        term.write_line(&format!("{}", style("Duplicates:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for group in result.duplicates.values() {
            let Some(root) = group.representative() else {
                continue;
            };
            term.write_line(&format!(
                "  {} {} {}",
                style("★").green(),
                root.full_name.display(),
                style(format!("({}, {})", format_bytes(root.size), group.digest)).dim()
            ))
            .ok();
            for file in group.duplicates() {
                term.write_line(&format!("    {} {}", style("○").dim(), file.full_name.display()))
                    .ok();
            }
        }
        term.write_line("").ok();
    }

    if cli.show_empty && !result.empty_files.is_empty() {
        term.write_line(&format!("{}", style("Empty Files:").bold().underlined()))
            .ok();
        term.write_line("").ok();
        for file in &result.empty_files {
            term.write_line(&format!("  {} {}", style("∅").dim(), file.full_name.display()))
                .ok();
        }
        term.write_line("").ok();
    }

    if cli.verbose && !result.failures.is_empty() {
        term.write_line(&format!("{}", style("Failures:").bold().underlined()))
            .ok();
        term.write_line("").ok();
        for (name, error) in &result.failures {
            term.write_line(&format!("  {} {}: {}", style("!").red(), name, error))
                .ok();
        }
        term.write_line("").ok();
    }

    term.write_line(&format!(
        "{} Smash Complete in {:.1}s",
        style("✓").green().bold(),
        summary.elapsed_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line("").ok();

    let rows = [
        ("Total files", summary.total_files),
        ("Unique files", summary.unique_files),
        ("Duplicate groups", summary.duplicate_groups),
        ("Duplicate files", summary.duplicate_files),
        ("Empty files", summary.empty_files),
        ("Ignored files", summary.ignored_files),
        ("Failed files", summary.failed_files),
        ("Failed locations", summary.failed_locations),
    ];
    for (label, value) in rows {
        term.write_line(&format!("  {:<18} {}", label, style(value).cyan()))
            .ok();
    }
    term.write_line(&format!(
        "  {:<18} {}",
        "Reclaimable space",
        style(format_bytes(summary.reclaimable_bytes)).yellow()
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "{}",
        style("No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
