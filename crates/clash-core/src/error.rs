//! Error types for `clash-core`.
//!
//! Every variant is a rejected-input error surfaced synchronously to the
//! boundary layer. Nothing here is retried or silently corrected.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The reaction kind is not a member of the fixed kind set.
  #[error("unknown reaction kind: {0:?}")]
  InvalidKind(String),

  /// A required field was absent or blank.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  /// A top-level argument was posted without a valid side.
  #[error("a top-level argument requires a side (for, against or neutral)")]
  MissingSide,

  /// The parent argument referenced by a reply does not exist.
  #[error("parent argument not found: {0}")]
  ParentNotFound(Uuid),

  /// The parent argument belongs to a different clash than the reply.
  #[error("parent argument {parent} belongs to clash {actual}, not {expected}")]
  CrossItemParent {
    parent:   Uuid,
    expected: Uuid,
    actual:   Uuid,
  },

  #[error("not found: {0}")]
  NotFound(Uuid),

  /// The requester is not the author of the argument they tried to delete.
  #[error("user {0} is not the author of this argument")]
  NotAuthorized(Uuid),

  /// A clash was created with `expires_at` at or before `created_at`.
  #[error("a clash must expire after it is created")]
  ExpiresBeforeCreation,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
