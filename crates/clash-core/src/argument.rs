//! Argument types, creation validation and thread reconstruction.
//!
//! A top-level argument carries a position (`for`/`against`/`neutral`); a
//! reply is always neutral no matter what the client sent. Only one level
//! of nesting is modelled — replies to replies do not exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  clash::Side,
  error::{Error, Result},
};

// ─── Argument ────────────────────────────────────────────────────────────────

/// A positioned statement on a clash, or a neutral reply to another
/// argument. `author_id` is required; authorless arguments are invalid and
/// are excluded at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
  pub argument_id: Uuid,
  pub clash_id:    Uuid,
  pub author_id:   Uuid,
  pub body:        String,
  pub side:        Side,
  /// Present on replies; always references a top-level argument of the
  /// same clash.
  pub parent_id:   Option<Uuid>,
  pub created_at:  DateTime<Utc>,
}

impl Argument {
  pub fn is_top_level(&self) -> bool { self.parent_id.is_none() }
}

/// Input to argument creation, before validation.
#[derive(Debug, Clone)]
pub struct NewArgument {
  pub clash_id:  Uuid,
  pub author_id: Uuid,
  pub body:      String,
  /// Requested side; ignored (forced to neutral) for replies, required
  /// for top-level arguments.
  pub side:      Option<Side>,
  pub parent_id: Option<Uuid>,
}

/// Decide the stored side for a new argument.
///
/// - Replies (`parent` present) are forced to [`Side::Neutral`]
///   unconditionally, after checking the parent belongs to `clash_id`.
/// - Top-level arguments must carry a side of their own.
///
/// The caller resolves `parent_id` to `parent` first; a dangling id is
/// [`Error::ParentNotFound`] and never reaches this function.
pub fn resolve_side(
  clash_id: Uuid,
  parent: Option<&Argument>,
  requested: Option<Side>,
) -> Result<Side> {
  match parent {
    Some(parent) => {
      if parent.clash_id != clash_id {
        return Err(Error::CrossItemParent {
          parent:   parent.argument_id,
          expected: clash_id,
          actual:   parent.clash_id,
        });
      }
      Ok(Side::Neutral)
    }
    None => requested.ok_or(Error::MissingSide),
  }
}

// ─── Thread reconstruction ───────────────────────────────────────────────────

/// One top-level argument with its direct replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadNode {
  pub argument: Argument,
  /// Direct replies in input order; never nested further.
  pub replies:  Vec<Argument>,
}

/// Rebuild the one-level thread view from a flat argument list.
///
/// Two passes: seed a node per top-level argument, then attach each reply
/// to its parent's node in input order. A reply whose parent is absent
/// from the input (e.g. left behind by an incomplete cascade delete) is
/// silently dropped — the view must degrade gracefully, not crash.
///
/// Top-level nodes come back in input order; no re-sorting happens here.
/// Callers wanting newest-first supply the list in that order.
pub fn build_thread(arguments: &[Argument]) -> Vec<ThreadNode> {
  let mut nodes: Vec<ThreadNode> = Vec::new();
  let mut index_of: std::collections::HashMap<Uuid, usize> =
    std::collections::HashMap::new();

  for argument in arguments.iter().filter(|a| a.is_top_level()) {
    index_of.insert(argument.argument_id, nodes.len());
    nodes.push(ThreadNode { argument: argument.clone(), replies: Vec::new() });
  }

  for argument in arguments {
    let Some(parent_id) = argument.parent_id else { continue };
    if let Some(&i) = index_of.get(&parent_id) {
      nodes[i].replies.push(argument.clone());
    }
    // Orphaned reply: parent missing from the input. Dropped.
  }

  nodes
}

#[cfg(test)]
mod tests {
  use super::*;

  fn argument(clash_id: Uuid, parent_id: Option<Uuid>, side: Side) -> Argument {
    Argument {
      argument_id: Uuid::new_v4(),
      clash_id,
      author_id: Uuid::new_v4(),
      body: "well actually".into(),
      side,
      parent_id,
      created_at: Utc::now(),
    }
  }

  // ── resolve_side ──────────────────────────────────────────────────────

  #[test]
  fn top_level_requires_a_side() {
    let clash_id = Uuid::new_v4();
    assert!(matches!(
      resolve_side(clash_id, None, None),
      Err(Error::MissingSide)
    ));
    assert_eq!(
      resolve_side(clash_id, None, Some(Side::Against)).unwrap(),
      Side::Against
    );
  }

  #[test]
  fn reply_side_is_forced_neutral() {
    let clash_id = Uuid::new_v4();
    let parent = argument(clash_id, None, Side::For);
    // Even an explicit request for a positioned side is overridden.
    let side =
      resolve_side(clash_id, Some(&parent), Some(Side::Against)).unwrap();
    assert_eq!(side, Side::Neutral);
  }

  #[test]
  fn cross_clash_parent_is_rejected() {
    let clash_id = Uuid::new_v4();
    let other_clash = Uuid::new_v4();
    let parent = argument(other_clash, None, Side::For);
    let err = resolve_side(clash_id, Some(&parent), None).unwrap_err();
    assert!(matches!(
      err,
      Error::CrossItemParent { expected, actual, .. }
        if expected == clash_id && actual == other_clash
    ));
  }

  // ── build_thread ──────────────────────────────────────────────────────

  #[test]
  fn empty_input_builds_empty_thread() {
    assert!(build_thread(&[]).is_empty());
  }

  #[test]
  fn replies_attach_to_their_parent_in_input_order() {
    let clash_id = Uuid::new_v4();
    let top_a = argument(clash_id, None, Side::For);
    let top_b = argument(clash_id, None, Side::Against);
    let reply_1 = argument(clash_id, Some(top_a.argument_id), Side::Neutral);
    let reply_2 = argument(clash_id, Some(top_a.argument_id), Side::Neutral);

    let thread = build_thread(&[
      top_a.clone(),
      reply_1.clone(),
      top_b.clone(),
      reply_2.clone(),
    ]);

    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].argument.argument_id, top_a.argument_id);
    assert_eq!(thread[1].argument.argument_id, top_b.argument_id);
    assert_eq!(
      thread[0]
        .replies
        .iter()
        .map(|r| r.argument_id)
        .collect::<Vec<_>>(),
      vec![reply_1.argument_id, reply_2.argument_id]
    );
    assert!(thread[1].replies.is_empty());
  }

  #[test]
  fn orphaned_replies_are_dropped_silently() {
    let clash_id = Uuid::new_v4();
    let top = argument(clash_id, None, Side::For);
    let orphan = argument(clash_id, Some(Uuid::new_v4()), Side::Neutral);

    let thread = build_thread(&[top.clone(), orphan]);
    assert_eq!(thread.len(), 1);
    assert!(thread[0].replies.is_empty());
  }

  #[test]
  fn replies_are_never_expanded_recursively() {
    // A reply is attached to its parent, but never becomes a node itself.
    let clash_id = Uuid::new_v4();
    let top = argument(clash_id, None, Side::For);
    let reply = argument(clash_id, Some(top.argument_id), Side::Neutral);

    let thread = build_thread(&[top, reply.clone()]);
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].argument_id, reply.argument_id);
  }
}
