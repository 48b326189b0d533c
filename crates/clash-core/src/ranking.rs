//! Relevance ranking — blends text-search relevance with tag overlap, and
//! ranks "similar clashes" by tag-intersection size.
//!
//! The text score is produced by the search collaborator and treated as an
//! opaque value in `[0, 1]`; it is never recomputed here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{clash::Clash, store::SearchHit};

/// Weight of the collaborator-supplied text score in the blended score.
/// These constants are behavioural compatibility requirements; do not
/// retune them without a product decision.
pub const TEXT_WEIGHT: f64 = 0.7;
/// Weight of the tag-overlap score in the blended score.
pub const TAG_WEIGHT: f64 = 0.3;

/// Query tokens this short are ignored when matching tags.
const MIN_TOKEN_LEN: usize = 2;

/// Maximum number of similar clashes returned by [`similar_to`].
const SIMILAR_LIMIT: usize = 5;

// ─── Blended ranking ─────────────────────────────────────────────────────────

/// A search hit with its final blended score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedClash {
  pub clash:            Clash,
  pub text_score:       f64,
  pub similarity_score: f64,
}

/// Fraction of the candidate's tags matched by at least one query token
/// (case-insensitive substring match, tokens longer than two characters).
/// Zero tags yield zero, never a division by zero.
fn tag_match_score(query: &str, tags: &[String]) -> f64 {
  let tokens: Vec<String> = query
    .split_whitespace()
    .filter(|t| t.len() > MIN_TOKEN_LEN)
    .map(str::to_lowercase)
    .collect();
  if tokens.is_empty() || tags.is_empty() {
    return 0.0;
  }

  let matched = tags
    .iter()
    .filter(|tag| {
      let tag = tag.to_lowercase();
      tokens.iter().any(|token| tag.contains(token))
    })
    .count();

  matched as f64 / tags.len().max(1) as f64
}

/// Order search hits by blended relevance, best first.
///
/// `similarity_score = 0.7 * text_score + 0.3 * tag_match_score`. The sort
/// is stable: hits with equal scores keep the collaborator's original
/// relative order, so identical inputs always produce identical output.
pub fn rank(query: &str, hits: Vec<SearchHit>) -> Vec<RankedClash> {
  let mut ranked: Vec<RankedClash> = hits
    .into_iter()
    .map(|hit| {
      let tag_score = tag_match_score(query, &hit.clash.tags);
      RankedClash {
        text_score:       hit.text_score,
        similarity_score: TEXT_WEIGHT * hit.text_score + TAG_WEIGHT * tag_score,
        clash:            hit.clash,
      }
    })
    .collect();

  ranked.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
  ranked
}

// ─── Similar clashes ─────────────────────────────────────────────────────────

/// A clash related to the source clash by shared tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarClash {
  pub clash:         Clash,
  /// Size of the tag intersection with the source clash. Always >= 1.
  pub matching_tags: usize,
}

/// Rank candidates by tag-intersection size with the source clash.
///
/// Returns at most five results. The source clash itself and candidates
/// sharing no tags are excluded — the result is never padded with
/// unrelated clashes. Empty `current_tags` short-circuits to an empty
/// list. Ties keep candidate input order (stable sort).
pub fn similar_to(
  clash_id: Uuid,
  current_tags: &[String],
  candidates: Vec<Clash>,
) -> Vec<SimilarClash> {
  if current_tags.is_empty() {
    return Vec::new();
  }

  let mut similar: Vec<SimilarClash> = candidates
    .into_iter()
    .filter(|c| c.clash_id != clash_id)
    .filter_map(|clash| {
      let matching_tags = clash
        .tags
        .iter()
        .filter(|tag| current_tags.contains(tag))
        .count();
      (matching_tags > 0).then_some(SimilarClash { clash, matching_tags })
    })
    .collect();

  similar.sort_by(|a, b| b.matching_tags.cmp(&a.matching_tags));
  similar.truncate(SIMILAR_LIMIT);
  similar
}
