//! Per-batch success and failure counts.

use std::fmt;

/// Outcome counts for one batch command.
///
/// Item failures are absorbed here instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    verb: &'static str,
    /// Items applied
    pub succeeded: usize,
    /// Items that failed (lookup, transfer, or conflict)
    pub failed: usize,
    /// Items the user declined
    pub rejected: usize,
    /// Items with nothing to change
    pub unchanged: usize,
}

impl BatchReport {
    /// `verb` describes a success in the summary, e.g. "added".
    pub fn new(verb: &'static str) -> Self {
        Self {
            verb,
            succeeded: 0,
            failed: 0,
            rejected: 0,
            unchanged: 0,
        }
    }

    /// Total items accounted for.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.rejected + self.unchanged
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {} failed", self.succeeded, self.verb, self.failed)?;
        if self.rejected > 0 {
            write!(f, ", {} rejected", self.rejected)?;
        }
        if self.unchanged > 0 {
            write!(f, ", {} unchanged", self.unchanged)?;
        }
        Ok(())
    }
}
