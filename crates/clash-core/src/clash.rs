//! Clash — the debate unit that arguments, reactions and votes attach to.
//!
//! A clash holds its own embedded votes; arguments and reactions are
//! persisted independently and looked up by clash id. Internal code works
//! only with the [`Side`] enum; the `{value, label}` pair shape exists
//! solely at the read boundary (see [`SideLabel`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Side ────────────────────────────────────────────────────────────────────

/// One of the three mutually exclusive positions on a clash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  For,
  Against,
  Neutral,
}

impl Side {
  /// The string stored in the database and accepted on the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::For => "for",
      Self::Against => "against",
      Self::Neutral => "neutral",
    }
  }

  /// Parse a wire/database string. Returns `None` for anything outside the
  /// fixed set; callers decide whether that is [`Error::MissingSide`] or a
  /// storage corruption error.
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "for" => Some(Self::For),
      "against" => Some(Self::Against),
      "neutral" => Some(Self::Neutral),
      _ => None,
    }
  }
}

/// A side paired with its display label — produced once at the read
/// boundary, never consumed by internal components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLabel {
  pub value: Side,
  pub label: String,
}

/// Display labels for all three side slots. Making this a struct (rather
/// than a partial map) means an incomplete label set is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLabels {
  pub for_label:     String,
  pub against_label: String,
  pub neutral_label: String,
}

impl SideLabels {
  /// Resolve into the three `{value, label}` pairs the boundary serialises.
  pub fn resolve(&self) -> [SideLabel; 3] {
    [
      SideLabel { value: Side::For, label: self.for_label.clone() },
      SideLabel { value: Side::Against, label: self.against_label.clone() },
      SideLabel { value: Side::Neutral, label: self.neutral_label.clone() },
    ]
  }

  /// The default labels used when a clash defines none of its own.
  pub fn default_labels() -> Self {
    Self {
      for_label:     "For".into(),
      against_label: "Against".into(),
      neutral_label: "Neutral".into(),
    }
  }
}

// ─── Vote ────────────────────────────────────────────────────────────────────

/// A side selection recorded against a clash. One logical vote per
/// `(clash, voter)` is enforced by the store via upsert, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub voter_id: Uuid,
  pub side:     Side,
  pub cast_at:  DateTime<Utc>,
}

// ─── Clash ───────────────────────────────────────────────────────────────────

/// A debate unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clash {
  pub clash_id:    Uuid,
  pub title:       String,
  pub statement:   String,
  pub creator_id:  Option<Uuid>,
  /// Small set of case-preserved tags; order is irrelevant.
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  pub expires_at:  DateTime<Utc>,
  pub side_labels: Option<SideLabels>,
  pub votes:       Vec<Vote>,
}

/// Input to [`crate::store::ClashStore::create_clash`].
/// `created_at` is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewClash {
  pub title:       String,
  pub statement:   String,
  pub creator_id:  Option<Uuid>,
  pub tags:        Vec<String>,
  pub expires_at:  DateTime<Utc>,
  pub side_labels: Option<SideLabels>,
}

impl NewClash {
  /// Validate the creation invariants against the moment of creation.
  ///
  /// `now` is what the store will assign as `created_at`, so the
  /// `expires_at > created_at` invariant is checked here once.
  pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.statement.trim().is_empty() {
      return Err(Error::MissingField("statement"));
    }
    if self.expires_at <= now {
      return Err(Error::ExpiresBeforeCreation);
    }
    Ok(())
  }
}
