//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Tags and side labels are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings. Sides and reaction kinds are stored as their wire strings.

use chrono::{DateTime, Utc};
use clash_core::{
  argument::Argument,
  clash::{Clash, Side, SideLabels, Vote},
  reaction::{Reaction, ReactionKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Side / ReactionKind ──────────────────────────────────────────────────────

pub fn decode_side(s: &str) -> Result<Side> {
  Side::parse(s).ok_or_else(|| Error::Decode(format!("unknown side: {s:?}")))
}

pub fn decode_kind(s: &str) -> Result<ReactionKind> {
  ReactionKind::parse(s)
    .map_err(|_| Error::Decode(format!("unknown reaction kind: {s:?}")))
}

// ─── Tags / SideLabels ────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_side_labels(labels: &SideLabels) -> Result<String> {
  Ok(serde_json::to_string(labels)?)
}

pub fn decode_side_labels(s: &str) -> Result<SideLabels> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `clashes` row. Votes are read from
/// their own table and attached afterwards.
pub struct RawClash {
  pub clash_id:    String,
  pub title:       String,
  pub statement:   String,
  pub creator_id:  Option<String>,
  pub tags:        String,
  pub created_at:  String,
  pub expires_at:  String,
  pub side_labels: Option<String>,
}

impl RawClash {
  pub fn into_clash(self, votes: Vec<Vote>) -> Result<Clash> {
    Ok(Clash {
      clash_id:    decode_uuid(&self.clash_id)?,
      title:       self.title,
      statement:   self.statement,
      creator_id:  self.creator_id.as_deref().map(decode_uuid).transpose()?,
      tags:        decode_tags(&self.tags)?,
      created_at:  decode_dt(&self.created_at)?,
      expires_at:  decode_dt(&self.expires_at)?,
      side_labels: self
        .side_labels
        .as_deref()
        .map(decode_side_labels)
        .transpose()?,
      votes,
    })
  }
}

/// Raw strings read directly from a `votes` row.
pub struct RawVote {
  pub voter_id: String,
  pub side:     String,
  pub cast_at:  String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      voter_id: decode_uuid(&self.voter_id)?,
      side:     decode_side(&self.side)?,
      cast_at:  decode_dt(&self.cast_at)?,
    })
  }
}

/// Raw strings read directly from an `arguments` row.
pub struct RawArgument {
  pub argument_id: String,
  pub clash_id:    String,
  pub author_id:   String,
  pub body:        String,
  pub side:        String,
  pub parent_id:   Option<String>,
  pub created_at:  String,
}

impl RawArgument {
  pub fn into_argument(self) -> Result<Argument> {
    Ok(Argument {
      argument_id: decode_uuid(&self.argument_id)?,
      clash_id:    decode_uuid(&self.clash_id)?,
      author_id:   decode_uuid(&self.author_id)?,
      body:        self.body,
      side:        decode_side(&self.side)?,
      parent_id:   self.parent_id.as_deref().map(decode_uuid).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `reactions` row.
pub struct RawReaction {
  pub clash_id:   String,
  pub user_id:    String,
  pub kind:       String,
  pub reacted_at: String,
  pub updated_at: String,
}

impl RawReaction {
  pub fn into_reaction(self) -> Result<Reaction> {
    Ok(Reaction {
      clash_id:   decode_uuid(&self.clash_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      kind:       decode_kind(&self.kind)?,
      reacted_at: decode_dt(&self.reacted_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
