//! Handlers for argument endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/clashes/:id/arguments` | Body: [`NewArgumentBody`]; returns 201 |
//! | `DELETE` | `/arguments/:id` | `?requester_id` required; cascades replies |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use clash_core::{
  argument::{Argument, NewArgument},
  clash::Side,
  facade::Engagement,
  store::ClashStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /clashes/:id/arguments`.
///
/// `side` is a plain string so that an absent or unrecognised value flows
/// through the typed validation path (`MissingSide`) instead of being
/// rejected by the deserialiser. Replies ignore it entirely.
#[derive(Debug, Deserialize)]
pub struct NewArgumentBody {
  pub author_id: Uuid,
  pub text:      String,
  pub side:      Option<String>,
  pub parent_id: Option<Uuid>,
}

/// `POST /clashes/:id/arguments` — returns 201 + the stored [`Argument`].
pub async fn create<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path(clash_id): Path<Uuid>,
  Json(body): Json<NewArgumentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClashStore,
{
  let input = NewArgument {
    clash_id,
    author_id: body.author_id,
    body: body.text,
    side: body.side.as_deref().and_then(Side::parse),
    parent_id: body.parent_id,
  };
  let argument = engagement.post_argument(input).await?;
  Ok((StatusCode::CREATED, Json(argument)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  /// The user asking for the deletion; must be the argument's author.
  pub requester_id: Uuid,
}

/// `DELETE /arguments/:id?requester_id=<uuid>`
///
/// Responds with how many arguments were removed (the argument itself plus
/// any cascaded replies).
pub async fn delete_one<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClashStore,
{
  let removed = engagement.delete_argument(id, params.requester_id).await?;
  Ok(Json(json!({ "removed": removed })))
}
