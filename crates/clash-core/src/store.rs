//! The `ClashStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `clash-store-sqlite`)
//! and covers both the record store and the free-text search primitive.
//! The aggregation facade is the only core component that calls it; the
//! HTTP layer never touches a backend directly.
//!
//! The store is the single shared mutable resource in the system. It is
//! expected to serialise conflicting writes to the same reaction row or
//! argument id (unique-key upsert semantics); the core's side of that
//! contract is to re-read and recompute derived values after every write
//! instead of trusting an in-memory cache.

use std::future::Future;

use uuid::Uuid;

use crate::{
  argument::Argument,
  clash::{Clash, NewClash, Vote},
  reaction::{Reaction, ReactionKind},
};

// ─── Query/result types ──────────────────────────────────────────────────────

/// Pagination window for the feed.
#[derive(Debug, Clone, Copy)]
pub struct FeedQuery {
  pub limit:  usize,
  pub offset: usize,
}

impl Default for FeedQuery {
  fn default() -> Self { Self { limit: 20, offset: 0 } }
}

/// One free-text search match. `text_score` is normalised to `[0, 1]` by
/// the backend and treated as opaque by the ranking component.
#[derive(Debug, Clone)]
pub struct SearchHit {
  pub clash:      Clash,
  pub text_score: f64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a clash store backend plus its search primitive.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with `axum`).
pub trait ClashStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Clashes ───────────────────────────────────────────────────────────

  /// Persist a new clash. `created_at` is assigned by the store.
  fn create_clash(
    &self,
    input: NewClash,
  ) -> impl Future<Output = Result<Clash, Self::Error>> + Send + '_;

  /// Retrieve a clash with its embedded votes. `None` if not found.
  fn get_clash(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Clash>, Self::Error>> + Send + '_;

  /// List clashes newest-first for the feed.
  fn list_clashes(
    &self,
    query: FeedQuery,
  ) -> impl Future<Output = Result<Vec<Clash>, Self::Error>> + Send + '_;

  /// Find clashes carrying at least one of `tags`, excluding `exclude`.
  /// Candidate pool for similar-clash ranking.
  fn find_tagged<'a>(
    &'a self,
    tags: &'a [String],
    exclude: Uuid,
  ) -> impl Future<Output = Result<Vec<Clash>, Self::Error>> + Send + 'a;

  /// Delete a clash and everything attached to it (arguments, reactions,
  /// votes). Returns `false` if the clash did not exist.
  fn delete_clash(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Record (or replace) a voter's side on a clash and return the updated
  /// vote list. Returns `None` if the clash does not exist.
  fn cast_vote(
    &self,
    clash_id: Uuid,
    vote: Vote,
  ) -> impl Future<Output = Result<Option<Vec<Vote>>, Self::Error>> + Send + '_;

  // ── Arguments ─────────────────────────────────────────────────────────

  /// Persist a fully-validated argument. Validation (side forcing, parent
  /// checks) happens in the facade before this call.
  fn create_argument(
    &self,
    argument: Argument,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_argument(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Argument>, Self::Error>> + Send + '_;

  /// All arguments for a clash, oldest first. The thread builder preserves
  /// this order.
  fn list_arguments(
    &self,
    clash_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Argument>, Self::Error>> + Send + '_;

  /// Delete a single argument row. Cascading to replies is orchestrated by
  /// the facade via [`ClashStore::delete_replies_of`].
  fn delete_argument(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every argument whose parent is `parent_id`; returns how many
  /// rows went away.
  fn delete_replies_of(
    &self,
    parent_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Insert or replace the reaction for `(clash_id, user_id)`.
  fn upsert_reaction(
    &self,
    clash_id: Uuid,
    user_id: Uuid,
    kind: ReactionKind,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the reaction row for `(clash_id, user_id)` if present.
  /// Returns whether a row was deleted; absence is not an error.
  fn remove_reaction(
    &self,
    clash_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_reaction(
    &self,
    clash_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Reaction>, Self::Error>> + Send + '_;

  /// All current reaction rows for a clash — the input to the tally.
  fn list_reactions(
    &self,
    clash_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Reaction>, Self::Error>> + Send + '_;

  // ── Search ────────────────────────────────────────────────────────────

  /// Free-text search over clash titles and statements, returning
  /// relevance-scored matches. Scoring internals are backend-specific.
  fn search_clashes<'a>(
    &'a self,
    query: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + 'a;
}
