//! Reporting utilities: failure-mode tallies and formatted terminal output.

use crate::domain::{FailureMode, WallPrediction};

pub mod format;

pub use format::*;

/// Number of walls predicted in each failure mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeCounts {
    counts: [usize; 4],
}

impl ModeCounts {
    pub fn tally(predictions: &[WallPrediction]) -> Self {
        let mut out = Self::default();
        for p in predictions {
            out.counts[usize::from(p.failure_mode.code()) - 1] += 1;
        }
        out
    }

    pub fn get(&self, mode: FailureMode) -> usize {
        self.counts[usize::from(mode.code()) - 1]
    }

    /// Counts in classifier-code order, zero entries included.
    pub fn iter(&self) -> impl Iterator<Item = (FailureMode, usize)> + '_ {
        FailureMode::ALL.into_iter().map(|mode| (mode, self.get(mode)))
    }
}
