//! Handlers for reaction endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/clashes/:id/reactions` | Dense per-kind totals |
//! | `PUT`    | `/clashes/:id/reactions/:user_id` | Body: `{"kind":"..."}`; upsert |
//! | `DELETE` | `/clashes/:id/reactions/:user_id` | Removes the row; no-op if absent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use clash_core::{
  facade::{Engagement, ReactionOutcome},
  reaction::ReactionTotals,
  store::ClashStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /clashes/:id/reactions` — totals recomputed from the record set.
/// A clash with no reactions reads as all-zero, never as an empty object.
pub async fn totals<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path(clash_id): Path<Uuid>,
) -> Result<Json<ReactionTotals>, ApiError>
where
  S: ClashStore,
{
  Ok(Json(engagement.reaction_totals(clash_id).await?))
}

/// JSON body accepted by `PUT /clashes/:id/reactions/:user_id`.
///
/// `kind` is a plain string; membership in the fixed set is checked by the
/// core so an unknown kind surfaces as a typed `InvalidKind` rejection.
#[derive(Debug, Deserialize)]
pub struct ReactBody {
  pub kind: String,
}

/// `PUT /clashes/:id/reactions/:user_id` — upsert the caller's reaction.
pub async fn put_one<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path((clash_id, user_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<ReactBody>,
) -> Result<Json<ReactionOutcome>, ApiError>
where
  S: ClashStore,
{
  let outcome = engagement.react(clash_id, user_id, &body.kind).await?;
  Ok(Json(outcome))
}

/// `DELETE /clashes/:id/reactions/:user_id` — remove the caller's
/// reaction. Absence is a no-op, not an error.
pub async fn delete_one<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path((clash_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ReactionOutcome>, ApiError>
where
  S: ClashStore,
{
  let outcome = engagement.unreact(clash_id, user_id).await?;
  Ok(Json(outcome))
}
