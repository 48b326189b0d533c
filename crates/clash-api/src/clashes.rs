//! Handlers for `/clashes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/clashes` | Feed page; optional `limit`, `offset` |
//! | `POST`   | `/clashes` | Body: [`NewClashBody`]; returns 201 + stored clash |
//! | `GET`    | `/clashes/:id` | Full read model (thread, tallies, status) |
//! | `DELETE` | `/clashes/:id` | Removes the clash and everything attached |
//! | `GET`    | `/clashes/:id/similar` | Up to 5 clashes sharing tags |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use clash_core::{
  clash::{Clash, NewClash, SideLabels},
  facade::{ClashView, Engagement, FeedItem},
  ranking::SimilarClash,
  store::{ClashStore, FeedQuery},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Feed ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct FeedParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /clashes[?limit=...][&offset=...]`
pub async fn feed<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Query(params): Query<FeedParams>,
) -> Result<Json<Vec<FeedItem>>, ApiError>
where
  S: ClashStore,
{
  let defaults = FeedQuery::default();
  let query = FeedQuery {
    limit:  params.limit.unwrap_or(defaults.limit),
    offset: params.offset.unwrap_or(defaults.offset),
  };
  let page = engagement.feed(query, Utc::now()).await?;
  Ok(Json(page))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /clashes`.
#[derive(Debug, Deserialize)]
pub struct NewClashBody {
  pub title:       String,
  pub statement:   String,
  pub creator_id:  Option<Uuid>,
  #[serde(default)]
  pub tags:        Vec<String>,
  pub expires_at:  DateTime<Utc>,
  pub side_labels: Option<SideLabels>,
}

impl From<NewClashBody> for NewClash {
  fn from(b: NewClashBody) -> Self {
    NewClash {
      title:       b.title,
      statement:   b.statement,
      creator_id:  b.creator_id,
      tags:        b.tags,
      expires_at:  b.expires_at,
      side_labels: b.side_labels,
    }
  }
}

/// `POST /clashes` — returns 201 + the stored [`Clash`].
pub async fn create<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Json(body): Json<NewClashBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ClashStore,
{
  let clash: Clash = engagement.create_clash(NewClash::from(body)).await?;
  Ok((StatusCode::CREATED, Json(clash)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /clashes/:id`
pub async fn get_one<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ClashView>, ApiError>
where
  S: ClashStore,
{
  let view = engagement
    .clash_view(id, Utc::now())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("clash {id} not found")))?;
  Ok(Json(view))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /clashes/:id`
pub async fn delete_one<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ClashStore,
{
  engagement.delete_clash(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Similar ──────────────────────────────────────────────────────────────────

/// `GET /clashes/:id/similar`
pub async fn similar<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<SimilarClash>>, ApiError>
where
  S: ClashStore,
{
  Ok(Json(engagement.similar(id).await?))
}
