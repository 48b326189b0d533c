//! JSON REST API for the Clash debate feed.
//!
//! Exposes an axum [`Router`] backed by any [`clash_core::store::ClashStore`]
//! through the aggregation facade. Auth, TLS, and transport concerns are the
//! caller's responsibility; handlers take caller ids as explicit parameters
//! the way a session layer would inject them.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", clash_api::api_router(engagement.clone()))
//! ```

pub mod arguments;
pub mod clashes;
pub mod error;
pub mod reactions;
pub mod search;
pub mod votes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use clash_core::{facade::Engagement, store::ClashStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `engagement`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engagement: Arc<Engagement<S>>) -> Router<()>
where
  S: ClashStore + 'static,
{
  Router::new()
    // Clashes & feed
    .route("/clashes", get(clashes::feed::<S>).post(clashes::create::<S>))
    .route(
      "/clashes/{id}",
      get(clashes::get_one::<S>).delete(clashes::delete_one::<S>),
    )
    .route("/clashes/{id}/similar", get(clashes::similar::<S>))
    // Arguments
    .route("/clashes/{id}/arguments", post(arguments::create::<S>))
    .route("/arguments/{id}", delete(arguments::delete_one::<S>))
    // Reactions
    .route("/clashes/{id}/reactions", get(reactions::totals::<S>))
    .route(
      "/clashes/{id}/reactions/{user_id}",
      put(reactions::put_one::<S>).delete(reactions::delete_one::<S>),
    )
    // Votes
    .route("/clashes/{id}/votes", post(votes::cast::<S>))
    // Search
    .route("/search", get(search::handler::<S>))
    .with_state(engagement)
}
