//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Derivative generation events
    Derive(DeriveEvent),
}

/// Events while generating the default derivative set of one source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeriveEvent {
    /// Generation started for `source` with `total` profiles
    Started { source: PathBuf, total: usize },
    /// The derivative already existed and was reused
    Skipped { profile: String, path: PathBuf },
    /// A derivative was written
    Generated { profile: String, path: PathBuf },
    /// One profile failed; the remaining profiles continue
    Failed { profile: String, message: String },
    Completed {
        generated: usize,
        skipped: usize,
        failed: usize,
    },
}

impl DeriveEvent {
    /// Whether this event finishes one profile
    pub fn is_profile_done(&self) -> bool {
        matches!(
            self,
            DeriveEvent::Skipped { .. } | DeriveEvent::Generated { .. } | DeriveEvent::Failed { .. }
        )
    }
}

impl From<DeriveEvent> for Event {
    fn from(event: DeriveEvent) -> Self {
        Event::Derive(event)
    }
}
