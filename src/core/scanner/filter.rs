//! Exclusion rules applied while indexing.

use crate::error::ConfigError;
use regex::Regex;
use std::path::Path;

/// Directories created by operating systems that never hold user data
pub const SYSTEM_DIRS: &[&str] = &[
    "System Volume Information",
    "$RECYCLE.BIN",
    "$MFT",
    ".Trash",
    ".Trash-1000",
    ".Trashes",
];

/// Files created by operating systems that never hold user data
pub const SYSTEM_FILES: &[&str] = &["thumbs.db", "desktop.ini", ".ds_store"];

/// Decides which directories are pruned and which files are skipped
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    dirs: Option<Regex>,
    files: Option<Regex>,
    ignore_hidden: bool,
    ignore_system: bool,
}

impl ExclusionFilter {
    /// Hidden and system items excluded, no patterns
    pub fn new() -> Self {
        Self {
            dirs: None,
            files: None,
            ignore_hidden: true,
            ignore_system: true,
        }
    }

    /// Skip names starting with a dot
    pub fn with_hidden(mut self, ignore: bool) -> Self {
        self.ignore_hidden = ignore;
        self
    }

    /// Skip well-known operating system files and directories
    pub fn with_system(mut self, ignore: bool) -> Self {
        self.ignore_system = ignore;
        self
    }

    /// Prune directories whose path (relative to the location) matches any pattern
    pub fn with_dir_patterns(mut self, patterns: &[String]) -> Result<Self, ConfigError> {
        self.dirs = compile(patterns)?;
        Ok(self)
    }

    /// Skip files whose name matches any pattern
    pub fn with_file_patterns(mut self, patterns: &[String]) -> Result<Self, ConfigError> {
        self.files = compile(patterns)?;
        Ok(self)
    }

    /// Check if a directory should be pruned
    pub fn excludes_dir(&self, name: &str, relative: &Path) -> bool {
        if self.ignore_hidden && is_hidden(name) {
            return true;
        }
        if self.ignore_system && is_listed(SYSTEM_DIRS, name) {
            return true;
        }
        self.dirs
            .as_ref()
            .is_some_and(|re| re.is_match(&relative.to_string_lossy()))
    }

    /// Check if a file should be skipped
    pub fn excludes_file(&self, name: &str) -> bool {
        if self.ignore_hidden && is_hidden(name) {
            return true;
        }
        if self.ignore_system && is_listed(SYSTEM_FILES, name) {
            return true;
        }
        self.files.as_ref().is_some_and(|re| re.is_match(name))
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hidden(name: &str) -> bool {
    name.len() > 1 && name.starts_with('.')
}

fn is_listed(list: &[&str], name: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(name))
}

/// Validate each pattern, then join them into one alternation
fn compile(patterns: &[String]) -> Result<Option<Regex>, ConfigError> {
    let patterns: Vec<&str> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return Ok(None);
    }

    for pattern in &patterns {
        Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
    }

    let joined = patterns
        .iter()
        .map(|p| format!("(?:{p})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&joined)
        .map(Some)
        .map_err(|e| ConfigError::InvalidPattern {
            pattern: joined.clone(),
            reason: e.to_string(),
        })
}
