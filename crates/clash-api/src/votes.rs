//! Handler for `POST /clashes/:id/votes`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use clash_core::{facade::Engagement, store::ClashStore, vote::VoteTally};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body accepted by `POST /clashes/:id/votes`.
///
/// `side` is a plain string so an unrecognised value surfaces as the typed
/// `MissingSide` rejection rather than a deserialiser error.
#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub voter_id: Uuid,
  pub side:     String,
}

/// `POST /clashes/:id/votes` — records (or replaces) the voter's side and
/// returns the recomputed distribution.
pub async fn cast<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path(clash_id): Path<Uuid>,
  Json(body): Json<VoteBody>,
) -> Result<Json<VoteTally>, ApiError>
where
  S: ClashStore,
{
  let tally = engagement
    .cast_vote(clash_id, body.voter_id, &body.side)
    .await?;
  Ok(Json(tally))
}
