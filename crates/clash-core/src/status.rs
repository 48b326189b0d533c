//! Lifecycle classification of a clash.
//!
//! Status is never stored. It is recomputed on every read from current
//! facts (timestamps + engagement flags), which eliminates drift between
//! a stored status column and reality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The lifecycle label of a clash at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClashStatus {
  /// Not yet expired, no engagement.
  New,
  /// Not yet expired, has at least one argument or reaction.
  Hot,
  /// Past its expiry. Terminal; expiry wins over engagement.
  Finished,
}

/// Classify a clash. Rules apply in priority order: expiry first, then
/// engagement, then the default.
pub fn classify(
  _created_at: DateTime<Utc>,
  expires_at: DateTime<Utc>,
  has_arguments: bool,
  has_reactions: bool,
  now: DateTime<Utc>,
) -> ClashStatus {
  if now > expires_at {
    ClashStatus::Finished
  } else if has_arguments || has_reactions {
    ClashStatus::Hot
  } else {
    ClashStatus::New
  }
}
