//! Handler for `GET /search`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use clash_core::{facade::Engagement, ranking::RankedClash, store::ClashStore};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  /// Free-text query; tokenised by whitespace downstream.
  pub q: String,
}

/// `GET /search?q=...` — text relevance blended with tag overlap, best
/// match first. Repeated calls with the same query return the same order.
pub async fn handler<S>(
  State(engagement): State<Arc<Engagement<S>>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<RankedClash>>, ApiError>
where
  S: ClashStore,
{
  Ok(Json(engagement.search(&params.q).await?))
}
