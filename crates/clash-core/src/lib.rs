//! Core types and engagement-aggregation logic for the Clash debate feed.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! The five components — reaction ledger, argument thread builder, vote
//! tally, status classifier, relevance ranker — are pure functions over
//! plain data. The [`facade::Engagement`] facade composes them over a
//! [`store::ClashStore`] backend.

pub mod argument;
pub mod clash;
pub mod error;
pub mod facade;
pub mod ranking;
pub mod reaction;
pub mod status;
pub mod store;
pub mod vote;

pub use error::{Error, Result};
