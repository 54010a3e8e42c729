use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-batch tally, used for reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub drops_found: usize,
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted={} succeeded={} failed={} drops={}",
            self.attempted, self.succeeded, self.failed, self.drops_found
        )
    }
}

/// How a call to `run_batch` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRun {
    Completed(BatchResult),
    /// The item list had no entries; nothing was touched.
    Empty,
    /// Another batch was already in flight.
    Skipped,
}
