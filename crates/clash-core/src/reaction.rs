//! Reaction ledger types and the tally reducer.
//!
//! A reaction is a single engagement signal keyed by `(clash, user)` — at
//! most one row per pair at any time. Upserting replaces the prior kind;
//! removing deletes the row entirely, so a removed reaction contributes
//! nothing to the tally (no phantom "neutral" row is left behind).
//!
//! Totals are always recomputed from the full record set rather than kept
//! as running counters. Two concurrent upserts from different users each
//! resolve to a full aggregate, so neither can observe or produce a stale
//! increment. A future cache in front of this must invalidate on every
//! reaction write for the clash; it must never trust a counter without
//! that invalidation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── ReactionKind ────────────────────────────────────────────────────────────

/// The fixed, closed set of reaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
  NailedIt,
  FairPoint,
  Neutral,
  Really,
  TryAgain,
}

impl ReactionKind {
  pub const ALL: [ReactionKind; 5] = [
    Self::NailedIt,
    Self::FairPoint,
    Self::Neutral,
    Self::Really,
    Self::TryAgain,
  ];

  /// The string stored in the database and accepted on the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::NailedIt => "nailed_it",
      Self::FairPoint => "fair_point",
      Self::Neutral => "neutral",
      Self::Really => "really",
      Self::TryAgain => "try_again",
    }
  }

  /// Parse a caller-supplied kind string against the fixed set.
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "nailed_it" => Ok(Self::NailedIt),
      "fair_point" => Ok(Self::FairPoint),
      "neutral" => Ok(Self::Neutral),
      "really" => Ok(Self::Really),
      "try_again" => Ok(Self::TryAgain),
      other => Err(Error::InvalidKind(other.to_owned())),
    }
  }
}

// ─── Reaction ────────────────────────────────────────────────────────────────

/// One reaction row. The `(clash_id, user_id)` pair is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
  pub clash_id:   Uuid,
  pub user_id:    Uuid,
  pub kind:       ReactionKind,
  pub reacted_at: DateTime<Utc>,
  /// Bumped when an upsert replaces the kind.
  pub updated_at: DateTime<Utc>,
}

// ─── Totals ──────────────────────────────────────────────────────────────────

/// A dense per-kind count. Every kind is always present, zeros included,
/// so a clash with no engagement reads as all-zero rather than as an
/// empty mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTotals {
  pub nailed_it:  u64,
  pub fair_point: u64,
  pub neutral:    u64,
  pub really:     u64,
  pub try_again:  u64,
}

impl ReactionTotals {
  pub fn count(&self, kind: ReactionKind) -> u64 {
    match kind {
      ReactionKind::NailedIt => self.nailed_it,
      ReactionKind::FairPoint => self.fair_point,
      ReactionKind::Neutral => self.neutral,
      ReactionKind::Really => self.really,
      ReactionKind::TryAgain => self.try_again,
    }
  }

  pub fn total(&self) -> u64 {
    self.nailed_it + self.fair_point + self.neutral + self.really + self.try_again
  }
}

/// Reduce the full record set for one clash into per-kind counts.
///
/// This is the single source of truth for reaction counts; write paths
/// call it after every store mutation instead of adjusting a counter.
pub fn tally(reactions: &[Reaction]) -> ReactionTotals {
  let mut totals = ReactionTotals::default();
  for r in reactions {
    match r.kind {
      ReactionKind::NailedIt => totals.nailed_it += 1,
      ReactionKind::FairPoint => totals.fair_point += 1,
      ReactionKind::Neutral => totals.neutral += 1,
      ReactionKind::Really => totals.really += 1,
      ReactionKind::TryAgain => totals.try_again += 1,
    }
  }
  totals
}
