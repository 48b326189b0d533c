//! Vote tally — reduces recorded votes into per-side counts and
//! percentages.

use serde::{Deserialize, Serialize};

use crate::clash::{Side, Vote};

/// A per-side breakdown; used for both raw counts and rounded percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideCounts {
  pub for_side: u64,
  pub against:  u64,
  pub neutral:  u64,
}

impl SideCounts {
  pub fn get(&self, side: Side) -> u64 {
    match side {
      Side::For => self.for_side,
      Side::Against => self.against,
      Side::Neutral => self.neutral,
    }
  }
}

/// The computed vote distribution for one clash.
///
/// Percentages are rounded independently per side and are therefore not
/// guaranteed to sum to exactly 100. That is an accepted approximation;
/// callers must not renormalise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
  pub counts:      SideCounts,
  pub percentages: SideCounts,
}

/// Reduce a vote list into counts and rounded percentages.
///
/// An empty list yields all-zero percentages; no division by zero occurs.
pub fn tally(votes: &[Vote]) -> VoteTally {
  let mut counts = SideCounts::default();
  for vote in votes {
    match vote.side {
      Side::For => counts.for_side += 1,
      Side::Against => counts.against += 1,
      Side::Neutral => counts.neutral += 1,
    }
  }

  let total = counts.for_side + counts.against + counts.neutral;
  let percent = |count: u64| -> u64 {
    if total == 0 {
      0
    } else {
      (count as f64 / total as f64 * 100.0).round() as u64
    }
  };

  VoteTally {
    counts,
    percentages: SideCounts {
      for_side: percent(counts.for_side),
      against:  percent(counts.against),
      neutral:  percent(counts.neutral),
    },
  }
}
