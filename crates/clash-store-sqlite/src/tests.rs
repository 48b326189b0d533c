//! Integration tests for `SqliteStore` — and the engagement facade on top
//! of it — against an in-memory database.

use chrono::{Duration, Utc};
use clash_core::{
  argument::NewArgument,
  clash::{NewClash, Side, SideLabels},
  error::Error as DomainError,
  facade::{Engagement, FacadeError},
  reaction::ReactionKind,
  store::{ClashStore, FeedQuery},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A facade plus a second handle onto the same in-memory database, for
/// tests that inspect raw rows behind the facade's back.
async fn engagement() -> (SqliteStore, Engagement<SqliteStore>) {
  let s = store().await;
  (s.clone(), Engagement::new(s))
}

fn new_clash(title: &str, tags: &[&str]) -> NewClash {
  NewClash {
    title:       title.into(),
    statement:   format!("{title} — discuss."),
    creator_id:  Some(Uuid::new_v4()),
    tags:        tags.iter().map(|t| t.to_string()).collect(),
    expires_at:  Utc::now() + Duration::hours(24),
    side_labels: None,
  }
}

fn top_level(clash_id: Uuid, side: Side) -> NewArgument {
  NewArgument {
    clash_id,
    author_id: Uuid::new_v4(),
    body: "a compelling point".into(),
    side: Some(side),
    parent_id: None,
  }
}

// ─── Clashes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_clash_roundtrip() {
  let s = store().await;

  let mut input = new_clash("Tabs or spaces", &["code", "style"]);
  input.side_labels = Some(SideLabels {
    for_label:     "Tabs".into(),
    against_label: "Spaces".into(),
    neutral_label: "Whatever lints".into(),
  });

  let clash = s.create_clash(input).await.unwrap();
  let fetched = s.get_clash(clash.clash_id).await.unwrap().unwrap();

  assert_eq!(fetched.clash_id, clash.clash_id);
  assert_eq!(fetched.title, "Tabs or spaces");
  assert_eq!(fetched.tags, &["code", "style"]);
  assert_eq!(fetched.side_labels.unwrap().for_label, "Tabs");
  assert!(fetched.votes.is_empty());
}

#[tokio::test]
async fn get_clash_missing_returns_none() {
  let s = store().await;
  assert!(s.get_clash(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_clashes_paginates_newest_first() {
  let s = store().await;
  for i in 0..3 {
    s.create_clash(new_clash(&format!("clash-{i}"), &[]))
      .await
      .unwrap();
    // created_at is the sort key; keep the timestamps distinct.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  }

  let page = s
    .list_clashes(FeedQuery { limit: 2, offset: 0 })
    .await
    .unwrap();
  assert_eq!(page.len(), 2);
  assert_eq!(page[0].title, "clash-2");

  let rest = s
    .list_clashes(FeedQuery { limit: 2, offset: 2 })
    .await
    .unwrap();
  assert_eq!(rest.len(), 1);
  assert_eq!(rest[0].title, "clash-0");
}

#[tokio::test]
async fn delete_clash_cascades_to_attachments() {
  let (s, e) = engagement().await;
  let clash = e.create_clash(new_clash("doomed", &[])).await.unwrap();

  let arg = e
    .post_argument(top_level(clash.clash_id, Side::For))
    .await
    .unwrap();
  e.react(clash.clash_id, Uuid::new_v4(), "really")
    .await
    .unwrap();
  e.cast_vote(clash.clash_id, Uuid::new_v4(), "for")
    .await
    .unwrap();

  e.delete_clash(clash.clash_id).await.unwrap();

  assert!(s.get_clash(clash.clash_id).await.unwrap().is_none());
  assert!(s.get_argument(arg.argument_id).await.unwrap().is_none());
  assert!(s.list_reactions(clash.clash_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_clash_is_not_found() {
  let (_, e) = engagement().await;
  let err = e.delete_clash(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::NotFound(_))
  ));
}

#[tokio::test]
async fn expiry_before_creation_is_rejected() {
  let (_, e) = engagement().await;
  let mut input = new_clash("late", &[]);
  input.expires_at = Utc::now() - Duration::hours(1);

  let err = e.create_clash(input).await.unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::ExpiresBeforeCreation)
  ));
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn casting_again_replaces_the_voters_side() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("one voter", &[])).await.unwrap();
  let voter = Uuid::new_v4();

  e.cast_vote(clash.clash_id, voter, "for").await.unwrap();
  let tally = e.cast_vote(clash.clash_id, voter, "against").await.unwrap();

  assert_eq!(tally.counts.for_side, 0);
  assert_eq!(tally.counts.against, 1);
  assert_eq!(tally.percentages.against, 100);
}

#[tokio::test]
async fn vote_on_missing_clash_is_not_found() {
  let (_, e) = engagement().await;
  let err = e
    .cast_vote(Uuid::new_v4(), Uuid::new_v4(), "for")
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::NotFound(_))
  ));
}

#[tokio::test]
async fn invalid_side_is_rejected_before_any_write() {
  let (s, e) = engagement().await;
  let clash = e.create_clash(new_clash("sides", &[])).await.unwrap();

  let err = e
    .cast_vote(clash.clash_id, Uuid::new_v4(), "sideways")
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::MissingSide)
  ));

  let fetched = s.get_clash(clash.clash_id).await.unwrap().unwrap();
  assert!(fetched.votes.is_empty());
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_replaces_a_users_prior_reaction() {
  // u1 "really", u2 "really", then u1 switches to "nailed_it" — totals
  // must show one of each and nothing else.
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("reactions", &[])).await.unwrap();
  let u1 = Uuid::new_v4();
  let u2 = Uuid::new_v4();

  e.react(clash.clash_id, u1, "really").await.unwrap();
  e.react(clash.clash_id, u2, "really").await.unwrap();
  let outcome = e.react(clash.clash_id, u1, "nailed_it").await.unwrap();

  assert_eq!(outcome.own, Some(ReactionKind::NailedIt));
  assert_eq!(outcome.totals.nailed_it, 1);
  assert_eq!(outcome.totals.really, 1);
  assert_eq!(outcome.totals.fair_point, 0);
  assert_eq!(outcome.totals.neutral, 0);
  assert_eq!(outcome.totals.try_again, 0);
}

#[tokio::test]
async fn totals_agree_with_a_from_scratch_aggregation() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("consistency", &[])).await.unwrap();
  let u1 = Uuid::new_v4();
  let u2 = Uuid::new_v4();

  e.react(clash.clash_id, u1, "try_again").await.unwrap();
  e.react(clash.clash_id, u2, "fair_point").await.unwrap();
  e.unreact(clash.clash_id, u1).await.unwrap();
  let last = e.react(clash.clash_id, u1, "neutral").await.unwrap();

  // Recomputing over the final record set must match the totals the last
  // write returned.
  let recomputed = e.reaction_totals(clash.clash_id).await.unwrap();
  assert_eq!(last.totals, recomputed);
  assert_eq!(recomputed.total(), 2);
}

#[tokio::test]
async fn removing_a_reaction_deletes_the_row_entirely() {
  let (s, e) = engagement().await;
  let clash = e.create_clash(new_clash("gone", &[])).await.unwrap();
  let user = Uuid::new_v4();

  e.react(clash.clash_id, user, "neutral").await.unwrap();
  let outcome = e.unreact(clash.clash_id, user).await.unwrap();

  assert_eq!(outcome.own, None);
  assert_eq!(outcome.totals.total(), 0);
  // No phantom row left behind.
  assert!(s
    .get_reaction(clash.clash_id, user)
    .await
    .unwrap()
    .is_none());
}

#[tokio::test]
async fn unreact_without_prior_reaction_is_a_no_op() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("nothing", &[])).await.unwrap();

  let outcome = e.unreact(clash.clash_id, Uuid::new_v4()).await.unwrap();
  assert_eq!(outcome.totals.total(), 0);
}

#[tokio::test]
async fn unknown_reaction_kind_is_rejected() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("strict", &[])).await.unwrap();

  let err = e
    .react(clash.clash_id, Uuid::new_v4(), "thumbs_up")
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::InvalidKind(k)) if k == "thumbs_up"
  ));
}

// ─── Arguments ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reply_side_is_forced_neutral_in_the_stored_row() {
  let (s, e) = engagement().await;
  let clash = e.create_clash(new_clash("threading", &[])).await.unwrap();
  let parent = e
    .post_argument(top_level(clash.clash_id, Side::For))
    .await
    .unwrap();

  let reply = e
    .post_argument(NewArgument {
      clash_id:  clash.clash_id,
      author_id: Uuid::new_v4(),
      body:      "strong disagree".into(),
      // The client asked for a positioned reply; it must not stick.
      side:      Some(Side::Against),
      parent_id: Some(parent.argument_id),
    })
    .await
    .unwrap();

  assert_eq!(reply.side, Side::Neutral);
  let stored = s
    .get_argument(reply.argument_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.side, Side::Neutral);
}

#[tokio::test]
async fn cross_clash_parent_is_rejected_with_no_record() {
  let (s, e) = engagement().await;
  let clash_a = e.create_clash(new_clash("a", &[])).await.unwrap();
  let clash_b = e.create_clash(new_clash("b", &[])).await.unwrap();
  let parent = e
    .post_argument(top_level(clash_a.clash_id, Side::For))
    .await
    .unwrap();

  let err = e
    .post_argument(NewArgument {
      clash_id:  clash_b.clash_id,
      author_id: Uuid::new_v4(),
      body:      "wrong thread".into(),
      side:      None,
      parent_id: Some(parent.argument_id),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::CrossItemParent { .. })
  ));

  let arguments = s.list_arguments(clash_b.clash_id).await.unwrap();
  assert!(arguments.is_empty());
}

#[tokio::test]
async fn missing_parent_and_missing_side_are_typed_errors() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("validation", &[])).await.unwrap();

  let err = e
    .post_argument(NewArgument {
      clash_id:  clash.clash_id,
      author_id: Uuid::new_v4(),
      body:      "reply to nothing".into(),
      side:      None,
      parent_id: Some(Uuid::new_v4()),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::ParentNotFound(_))
  ));

  let err = e
    .post_argument(NewArgument {
      clash_id:  clash.clash_id,
      author_id: Uuid::new_v4(),
      body:      "no side given".into(),
      side:      None,
      parent_id: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::MissingSide)
  ));
}

#[tokio::test]
async fn blank_text_is_rejected() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("empty", &[])).await.unwrap();

  let err = e
    .post_argument(NewArgument {
      clash_id:  clash.clash_id,
      author_id: Uuid::new_v4(),
      body:      "   ".into(),
      side:      Some(Side::Neutral),
      parent_id: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::MissingField("text"))
  ));
}

#[tokio::test]
async fn deleting_a_parent_takes_its_replies_with_it() {
  let (s, e) = engagement().await;
  let clash = e.create_clash(new_clash("cascade", &[])).await.unwrap();

  let author = Uuid::new_v4();
  let parent = e
    .post_argument(NewArgument {
      clash_id:  clash.clash_id,
      author_id: author,
      body:      "parent".into(),
      side:      Some(Side::For),
      parent_id: None,
    })
    .await
    .unwrap();
  for i in 0..2 {
    e.post_argument(NewArgument {
      clash_id:  clash.clash_id,
      author_id: Uuid::new_v4(),
      body:      format!("reply {i}"),
      side:      None,
      parent_id: Some(parent.argument_id),
    })
    .await
    .unwrap();
  }

  let removed = e.delete_argument(parent.argument_id, author).await.unwrap();
  assert_eq!(removed, 3);
  assert!(s.list_arguments(clash.clash_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_reply_removes_exactly_one_row() {
  let (s, e) = engagement().await;
  let clash = e.create_clash(new_clash("single", &[])).await.unwrap();
  let parent = e
    .post_argument(top_level(clash.clash_id, Side::Against))
    .await
    .unwrap();

  let author = Uuid::new_v4();
  let reply = e
    .post_argument(NewArgument {
      clash_id:  clash.clash_id,
      author_id: author,
      body:      "reply".into(),
      side:      None,
      parent_id: Some(parent.argument_id),
    })
    .await
    .unwrap();

  let removed = e.delete_argument(reply.argument_id, author).await.unwrap();
  assert_eq!(removed, 1);
  let remaining = s.list_arguments(clash.clash_id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].argument_id, parent.argument_id);
}

#[tokio::test]
async fn only_the_author_may_delete() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("ownership", &[])).await.unwrap();
  let argument = e
    .post_argument(top_level(clash.clash_id, Side::For))
    .await
    .unwrap();

  let stranger = Uuid::new_v4();
  let err = e
    .delete_argument(argument.argument_id, stranger)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    FacadeError::Domain(DomainError::NotAuthorized(id)) if id == stranger
  ));
}

// ─── Read models ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn clash_view_assembles_thread_status_and_tallies() {
  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("view", &[])).await.unwrap();

  let parent = e
    .post_argument(top_level(clash.clash_id, Side::For))
    .await
    .unwrap();
  e.post_argument(NewArgument {
    clash_id:  clash.clash_id,
    author_id: Uuid::new_v4(),
    body:      "reply".into(),
    side:      None,
    parent_id: Some(parent.argument_id),
  })
  .await
  .unwrap();
  e.cast_vote(clash.clash_id, Uuid::new_v4(), "for")
    .await
    .unwrap();
  e.react(clash.clash_id, Uuid::new_v4(), "fair_point")
    .await
    .unwrap();

  let view = e
    .clash_view(clash.clash_id, Utc::now())
    .await
    .unwrap()
    .unwrap();

  assert_eq!(view.thread.len(), 1);
  assert_eq!(view.thread[0].replies.len(), 1);
  assert_eq!(view.votes.counts.for_side, 1);
  assert_eq!(view.votes.percentages.for_side, 100);
  assert_eq!(view.reactions.fair_point, 1);
  // Default labels fill in when the clash defines none.
  assert_eq!(view.side_labels[0].label, "For");
}

#[tokio::test]
async fn status_progresses_new_hot_finished() {
  use clash_core::status::ClashStatus;

  let (_, e) = engagement().await;
  let clash = e.create_clash(new_clash("lifecycle", &[])).await.unwrap();

  let t1 = clash.created_at + Duration::hours(1);
  let view = e.clash_view(clash.clash_id, t1).await.unwrap().unwrap();
  assert_eq!(view.status, ClashStatus::New);

  e.post_argument(top_level(clash.clash_id, Side::Neutral))
    .await
    .unwrap();
  let t2 = clash.created_at + Duration::hours(2);
  let view = e.clash_view(clash.clash_id, t2).await.unwrap().unwrap();
  assert_eq!(view.status, ClashStatus::Hot);

  let t25 = clash.created_at + Duration::hours(25);
  let view = e.clash_view(clash.clash_id, t25).await.unwrap().unwrap();
  assert_eq!(view.status, ClashStatus::Finished);
}

#[tokio::test]
async fn feed_carries_summary_values_per_entry() {
  let (_, e) = engagement().await;
  let quiet = e.create_clash(new_clash("quiet", &[])).await.unwrap();
  let busy = e.create_clash(new_clash("busy", &[])).await.unwrap();

  e.post_argument(top_level(busy.clash_id, Side::For))
    .await
    .unwrap();
  e.react(busy.clash_id, Uuid::new_v4(), "really")
    .await
    .unwrap();

  let page = e.feed(FeedQuery::default(), Utc::now()).await.unwrap();
  assert_eq!(page.len(), 2);

  let busy_entry = page
    .iter()
    .find(|i| i.clash.clash_id == busy.clash_id)
    .unwrap();
  assert_eq!(busy_entry.argument_count, 1);
  assert_eq!(busy_entry.reactions.really, 1);

  let quiet_entry = page
    .iter()
    .find(|i| i.clash.clash_id == quiet.clash_id)
    .unwrap();
  assert_eq!(quiet_entry.argument_count, 0);
  assert_eq!(quiet_entry.reactions.total(), 0);
}

// ─── Search & similarity ─────────────────────────────────────────────────────

#[tokio::test]
async fn search_blends_text_and_tag_scores() {
  let (_, e) = engagement().await;
  e.create_clash(new_clash("Pineapple on pizza", &["food"]))
    .await
    .unwrap();
  e.create_clash(new_clash("Pizza toppings ranked", &["pizza"]))
    .await
    .unwrap();
  e.create_clash(new_clash("Crypto regulation", &["finance"]))
    .await
    .unwrap();

  let results = e.search("pizza").await.unwrap();
  assert_eq!(results.len(), 2);
  // Both match on text; only one also matches on tags, so it ranks first.
  assert_eq!(results[0].clash.title, "Pizza toppings ranked");
  assert!(results[0].similarity_score > results[1].similarity_score);
}

#[tokio::test]
async fn search_with_no_match_is_empty() {
  let (_, e) = engagement().await;
  e.create_clash(new_clash("Tabs or spaces", &[]))
    .await
    .unwrap();
  assert!(e.search("quantum").await.unwrap().is_empty());
}

#[tokio::test]
async fn similar_ranks_by_tag_overlap_and_caps_at_five() {
  let (_, e) = engagement().await;
  let source = e
    .create_clash(new_clash("source", &["a", "b", "c"]))
    .await
    .unwrap();

  e.create_clash(new_clash("two-tags", &["a", "b"]))
    .await
    .unwrap();
  for i in 0..6 {
    e.create_clash(new_clash(&format!("one-tag-{i}"), &["a"]))
      .await
      .unwrap();
  }
  e.create_clash(new_clash("unrelated", &["z"]))
    .await
    .unwrap();

  let similar = e.similar(source.clash_id).await.unwrap();
  assert_eq!(similar.len(), 5);
  assert_eq!(similar[0].clash.title, "two-tags");
  assert_eq!(similar[0].matching_tags, 2);
  assert!(similar.iter().all(|s| s.clash.clash_id != source.clash_id));
  assert!(similar.iter().all(|s| s.matching_tags > 0));
}

#[tokio::test]
async fn similar_with_no_tags_short_circuits() {
  let (_, e) = engagement().await;
  let source = e.create_clash(new_clash("untagged", &[])).await.unwrap();
  e.create_clash(new_clash("other", &["a"])).await.unwrap();

  assert!(e.similar(source.clash_id).await.unwrap().is_empty());
}
