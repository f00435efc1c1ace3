//! Event type definitions for progress reporting.

use crate::core::summary::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate finder pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory walking events
    Index(IndexEvent),
    /// Hashing events
    Smash(SmashEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while walking locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexEvent {
    /// Started walking a location
    Started { location: String },
    /// Finished walking a location
    Completed { location: String, files: usize },
    /// A location could not be walked; the run continues without it
    Error { location: String, message: String },
}

/// Events while hashing files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SmashEvent {
    /// Periodic progress update
    Progress(SmashProgress),
    /// A file could not be hashed; the run continues
    Failed { path: PathBuf, message: String },
    /// All workers have drained the queue
    Completed { files_seen: u64 },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmashProgress {
    /// Files taken off the queue so far
    pub files_seen: u64,
    /// Time since hashing started
    pub elapsed_ms: u64,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: RunSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Smashing,
    Summarising,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Smashing => write!(f, "Smashing"),
            PipelinePhase::Summarising => write!(f, "Summarising"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Smash(SmashEvent::Progress(SmashProgress {
            files_seen: 50,
            elapsed_ms: 1200,
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Smash(SmashEvent::Progress(p)) => {
                assert_eq!(p.files_seen, 50);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn completed_event_carries_summary() {
        let event = Event::Pipeline(PipelineEvent::Completed {
            summary: RunSummary {
                duplicate_files: 150,
                reclaimable_bytes: 500_000_000,
                ..Default::default()
            },
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("500000000"));
    }

    #[test]
    fn phase_display() {
        assert_eq!(PipelinePhase::Smashing.to_string(), "Smashing");
        assert_eq!(PipelinePhase::Summarising.to_string(), "Summarising");
    }
}
