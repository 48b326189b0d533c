//! The aggregation facade — the single entry point the boundary layer
//! talks to, and the only component that touches the store/search
//! collaborators.
//!
//! Every write is a store mutation followed by a re-read and recompute of
//! the affected derived values. Nothing here caches; concurrent writers
//! each resolve against the store's serialisation of the row, so derived
//! tallies can never drift from the record set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  argument::{self, Argument, NewArgument, ThreadNode},
  clash::{Clash, NewClash, Side, SideLabel, SideLabels, Vote},
  error::Error as DomainError,
  ranking::{self, RankedClash, SimilarClash},
  reaction::{self, ReactionKind, ReactionTotals},
  status::{self, ClashStatus},
  store::{ClashStore, FeedQuery, SearchHit},
  vote::{self, VoteTally},
};

/// Cap on raw hits requested from the search collaborator per query.
const SEARCH_LIMIT: usize = 50;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Either a typed rejected-input error or a collaborator failure passed
/// through unchanged for the boundary layer to translate.
#[derive(Debug, Error)]
pub enum FacadeError<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  #[error(transparent)]
  Domain(#[from] DomainError),

  #[error("store error: {0}")]
  Store(#[source] E),
}

pub type FacadeResult<T, E> = Result<T, FacadeError<E>>;

// ─── Read models ─────────────────────────────────────────────────────────────

/// The full read model for a single clash page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClashView {
  pub clash:       Clash,
  pub status:      ClashStatus,
  /// Always all three slots, falling back to the default labels when the
  /// clash defines none.
  pub side_labels: [SideLabel; 3],
  pub votes:       VoteTally,
  pub reactions:   ReactionTotals,
  pub thread:      Vec<ThreadNode>,
}

/// One entry of a feed page — the clash plus its derived summary values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
  pub clash:          Clash,
  pub status:         ClashStatus,
  pub votes:          VoteTally,
  pub reactions:      ReactionTotals,
  pub argument_count: usize,
}

/// Result of a reaction write: fresh totals plus the caller's own kind
/// (`None` after removal — there is no phantom "neutral" row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionOutcome {
  pub totals: ReactionTotals,
  pub own:    Option<ReactionKind>,
}

// ─── Facade ──────────────────────────────────────────────────────────────────

/// Stateless composition of the core components over one store backend.
///
/// Holds no mutable state of its own and needs no locks; the store
/// serialises conflicting writes, and every derived value is recomputed
/// from a fresh read.
#[derive(Clone)]
pub struct Engagement<S> {
  store: S,
}

impl<S: ClashStore> Engagement<S> {
  pub fn new(store: S) -> Self { Self { store } }

  fn store_err<T>(r: Result<T, S::Error>) -> FacadeResult<T, S::Error> {
    r.map_err(FacadeError::Store)
  }

  // ── Clashes ───────────────────────────────────────────────────────────

  /// Validate and persist a new clash.
  pub async fn create_clash(
    &self,
    input: NewClash,
  ) -> FacadeResult<Clash, S::Error> {
    input.validate(Utc::now())?;
    Self::store_err(self.store.create_clash(input).await)
  }

  /// Delete a clash and everything attached to it.
  pub async fn delete_clash(&self, id: Uuid) -> FacadeResult<(), S::Error> {
    let deleted = Self::store_err(self.store.delete_clash(id).await)?;
    if !deleted {
      return Err(DomainError::NotFound(id).into());
    }
    Ok(())
  }

  /// Assemble the full read model for one clash, or `None` if it does not
  /// exist.
  pub async fn clash_view(
    &self,
    id: Uuid,
    now: DateTime<Utc>,
  ) -> FacadeResult<Option<ClashView>, S::Error> {
    let Some(clash) = Self::store_err(self.store.get_clash(id).await)? else {
      return Ok(None);
    };

    let arguments = Self::store_err(self.store.list_arguments(id).await)?;
    let reactions = Self::store_err(self.store.list_reactions(id).await)?;

    let status = status::classify(
      clash.created_at,
      clash.expires_at,
      !arguments.is_empty(),
      !reactions.is_empty(),
      now,
    );

    let side_labels = clash
      .side_labels
      .clone()
      .unwrap_or_else(SideLabels::default_labels)
      .resolve();

    Ok(Some(ClashView {
      status,
      side_labels,
      votes: vote::tally(&clash.votes),
      reactions: reaction::tally(&reactions),
      thread: argument::build_thread(&arguments),
      clash,
    }))
  }

  /// One feed page, newest clash first, each entry with its derived
  /// summary values.
  pub async fn feed(
    &self,
    query: FeedQuery,
    now: DateTime<Utc>,
  ) -> FacadeResult<Vec<FeedItem>, S::Error> {
    let clashes = Self::store_err(self.store.list_clashes(query).await)?;

    let mut page = Vec::with_capacity(clashes.len());
    for clash in clashes {
      let arguments =
        Self::store_err(self.store.list_arguments(clash.clash_id).await)?;
      let reactions =
        Self::store_err(self.store.list_reactions(clash.clash_id).await)?;

      page.push(FeedItem {
        status: status::classify(
          clash.created_at,
          clash.expires_at,
          !arguments.is_empty(),
          !reactions.is_empty(),
          now,
        ),
        votes: vote::tally(&clash.votes),
        reactions: reaction::tally(&reactions),
        argument_count: arguments.len(),
        clash,
      });
    }
    Ok(page)
  }

  // ── Search & similarity ───────────────────────────────────────────────

  /// Free-text search blended with tag overlap, best match first.
  pub async fn search(
    &self,
    query: &str,
  ) -> FacadeResult<Vec<RankedClash>, S::Error> {
    let hits: Vec<SearchHit> =
      Self::store_err(self.store.search_clashes(query, SEARCH_LIMIT).await)?;
    Ok(ranking::rank(query, hits))
  }

  /// Up to five clashes sharing tags with the given one.
  pub async fn similar(
    &self,
    clash_id: Uuid,
  ) -> FacadeResult<Vec<SimilarClash>, S::Error> {
    let clash = Self::store_err(self.store.get_clash(clash_id).await)?
      .ok_or(DomainError::NotFound(clash_id))?;

    // No tags means no candidates can intersect; skip the store round-trip.
    if clash.tags.is_empty() {
      return Ok(Vec::new());
    }

    let candidates =
      Self::store_err(self.store.find_tagged(&clash.tags, clash_id).await)?;
    Ok(ranking::similar_to(clash_id, &clash.tags, candidates))
  }

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Upsert the caller's reaction and return totals recomputed over all
  /// current rows for the clash.
  pub async fn react(
    &self,
    clash_id: Uuid,
    user_id: Uuid,
    kind: &str,
  ) -> FacadeResult<ReactionOutcome, S::Error> {
    let kind = ReactionKind::parse(kind)?;

    if Self::store_err(self.store.get_clash(clash_id).await)?.is_none() {
      return Err(DomainError::NotFound(clash_id).into());
    }

    Self::store_err(self.store.upsert_reaction(clash_id, user_id, kind).await)?;
    let totals = self.reaction_totals(clash_id).await?;
    Ok(ReactionOutcome { totals, own: Some(kind) })
  }

  /// Remove the caller's reaction (a no-op if none exists) and return the
  /// recomputed totals.
  pub async fn unreact(
    &self,
    clash_id: Uuid,
    user_id: Uuid,
  ) -> FacadeResult<ReactionOutcome, S::Error> {
    Self::store_err(self.store.remove_reaction(clash_id, user_id).await)?;
    let totals = self.reaction_totals(clash_id).await?;
    Ok(ReactionOutcome { totals, own: None })
  }

  /// Dense per-kind totals for a clash, recomputed from the record set.
  pub async fn reaction_totals(
    &self,
    clash_id: Uuid,
  ) -> FacadeResult<ReactionTotals, S::Error> {
    let rows = Self::store_err(self.store.list_reactions(clash_id).await)?;
    Ok(reaction::tally(&rows))
  }

  // ── Arguments ─────────────────────────────────────────────────────────

  /// Validate and persist a new argument. Either the argument lands fully
  /// formed (correct side, checked parent) or nothing is written.
  pub async fn post_argument(
    &self,
    input: NewArgument,
  ) -> FacadeResult<Argument, S::Error> {
    if input.body.trim().is_empty() {
      return Err(DomainError::MissingField("text").into());
    }

    if Self::store_err(self.store.get_clash(input.clash_id).await)?.is_none() {
      return Err(DomainError::NotFound(input.clash_id).into());
    }

    let parent = match input.parent_id {
      Some(parent_id) => Some(
        Self::store_err(self.store.get_argument(parent_id).await)?
          .ok_or(DomainError::ParentNotFound(parent_id))?,
      ),
      None => None,
    };

    let side =
      argument::resolve_side(input.clash_id, parent.as_ref(), input.side)?;

    let argument = Argument {
      argument_id: Uuid::new_v4(),
      clash_id: input.clash_id,
      author_id: input.author_id,
      body: input.body,
      side,
      parent_id: input.parent_id,
      created_at: Utc::now(),
    };

    Self::store_err(self.store.create_argument(argument.clone()).await)?;
    Ok(argument)
  }

  /// Delete an argument on behalf of `requester_id`. Deleting a top-level
  /// argument takes its direct replies with it; deleting a reply removes
  /// only itself. Returns how many arguments went away.
  pub async fn delete_argument(
    &self,
    argument_id: Uuid,
    requester_id: Uuid,
  ) -> FacadeResult<usize, S::Error> {
    let argument = Self::store_err(self.store.get_argument(argument_id).await)?
      .ok_or(DomainError::NotFound(argument_id))?;

    if argument.author_id != requester_id {
      return Err(DomainError::NotAuthorized(requester_id).into());
    }

    let mut removed = 0;
    if argument.is_top_level() {
      removed += Self::store_err(self.store.delete_replies_of(argument_id).await)?;
    }
    Self::store_err(self.store.delete_argument(argument_id).await)?;
    Ok(removed + 1)
  }

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Record the caller's side and return the recomputed distribution.
  pub async fn cast_vote(
    &self,
    clash_id: Uuid,
    voter_id: Uuid,
    side: &str,
  ) -> FacadeResult<VoteTally, S::Error> {
    let side = Side::parse(side).ok_or(DomainError::MissingSide)?;
    let vote = Vote { voter_id, side, cast_at: Utc::now() };

    let votes = Self::store_err(self.store.cast_vote(clash_id, vote).await)?
      .ok_or(DomainError::NotFound(clash_id))?;
    Ok(vote::tally(&votes))
  }
}
