//! [`SqliteStore`] — the SQLite implementation of [`ClashStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use clash_core::{
  argument::Argument,
  clash::{Clash, NewClash, Vote},
  reaction::{Reaction, ReactionKind},
  store::{ClashStore, FeedQuery, SearchHit},
};

use crate::{
  encode::{
    encode_dt, encode_side_labels, encode_tags, encode_uuid, RawArgument,
    RawClash, RawReaction, RawVote,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn clash_row(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawClash>> {
  conn
    .query_row(
      "SELECT clash_id, title, statement, creator_id, tags,
              created_at, expires_at, side_labels
       FROM clashes WHERE clash_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawClash {
          clash_id:    row.get(0)?,
          title:       row.get(1)?,
          statement:   row.get(2)?,
          creator_id:  row.get(3)?,
          tags:        row.get(4)?,
          created_at:  row.get(5)?,
          expires_at:  row.get(6)?,
          side_labels: row.get(7)?,
        })
      },
    )
    .optional()
}

fn votes_for(
  conn: &rusqlite::Connection,
  clash_id_str: &str,
) -> rusqlite::Result<Vec<RawVote>> {
  let mut stmt = conn.prepare(
    "SELECT voter_id, side, cast_at FROM votes
     WHERE clash_id = ?1 ORDER BY cast_at",
  )?;
  stmt
    .query_map(rusqlite::params![clash_id_str], |row| {
      Ok(RawVote {
        voter_id: row.get(0)?,
        side:     row.get(1)?,
        cast_at:  row.get(2)?,
      })
    })?
    .collect()
}

fn assemble(raw: RawClash, raw_votes: Vec<RawVote>) -> Result<Clash> {
  let votes = raw_votes
    .into_iter()
    .map(RawVote::into_vote)
    .collect::<Result<Vec<Vote>>>()?;
  raw.into_clash(votes)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Clash store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Writes to
/// the same reaction or vote row are serialised by SQLite's unique-key
/// upserts, which is the serialisation the core's recompute-on-write
/// contract relies on.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ClashStore impl ─────────────────────────────────────────────────────────

impl ClashStore for SqliteStore {
  type Error = Error;

  // ── Clashes ───────────────────────────────────────────────────────────

  async fn create_clash(&self, input: NewClash) -> Result<Clash> {
    let clash = Clash {
      clash_id:    Uuid::new_v4(),
      title:       input.title,
      statement:   input.statement,
      creator_id:  input.creator_id,
      tags:        input.tags,
      created_at:  Utc::now(),
      expires_at:  input.expires_at,
      side_labels: input.side_labels,
      votes:       Vec::new(),
    };

    let id_str          = encode_uuid(clash.clash_id);
    let title           = clash.title.clone();
    let statement       = clash.statement.clone();
    let creator_str     = clash.creator_id.map(encode_uuid);
    let tags_str        = encode_tags(&clash.tags)?;
    let created_str     = encode_dt(clash.created_at);
    let expires_str     = encode_dt(clash.expires_at);
    let side_labels_str = clash
      .side_labels
      .as_ref()
      .map(encode_side_labels)
      .transpose()?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO clashes (
             clash_id, title, statement, creator_id, tags,
             created_at, expires_at, side_labels
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            title,
            statement,
            creator_str,
            tags_str,
            created_str,
            expires_str,
            side_labels_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(clash)
  }

  async fn get_clash(&self, id: Uuid) -> Result<Option<Clash>> {
    let id_str = encode_uuid(id);

    let raw: Option<(RawClash, Vec<RawVote>)> = self
      .conn
      .call(move |conn| {
        let Some(clash) = clash_row(conn, &id_str)? else {
          return Ok(None);
        };
        let votes = votes_for(conn, &id_str)?;
        Ok(Some((clash, votes)))
      })
      .await?;

    raw.map(|(c, v)| assemble(c, v)).transpose()
  }

  async fn list_clashes(&self, query: FeedQuery) -> Result<Vec<Clash>> {
    let limit  = query.limit as i64;
    let offset = query.offset as i64;

    let raws: Vec<(RawClash, Vec<RawVote>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT clash_id, title, statement, creator_id, tags,
                  created_at, expires_at, side_labels
           FROM clashes ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
        )?;
        let clashes = stmt
          .query_map(rusqlite::params![limit, offset], |row| {
            Ok(RawClash {
              clash_id:    row.get(0)?,
              title:       row.get(1)?,
              statement:   row.get(2)?,
              creator_id:  row.get(3)?,
              tags:        row.get(4)?,
              created_at:  row.get(5)?,
              expires_at:  row.get(6)?,
              side_labels: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(clashes.len());
        for clash in clashes {
          let votes = votes_for(conn, &clash.clash_id)?;
          out.push((clash, votes));
        }
        Ok(out)
      })
      .await?;

    raws.into_iter().map(|(c, v)| assemble(c, v)).collect()
  }

  async fn find_tagged(&self, tags: &[String], exclude: Uuid) -> Result<Vec<Clash>> {
    if tags.is_empty() {
      return Ok(Vec::new());
    }

    // LIKE over the JSON tags column is only a prefilter; the exact
    // set-membership check happens below after decoding.
    let exclude_str = encode_uuid(exclude);
    let patterns: Vec<String> =
      tags.iter().map(|t| format!("%\"{t}\"%")).collect();
    let wanted: Vec<String> = tags.to_vec();

    let raws: Vec<(RawClash, Vec<RawVote>)> = self
      .conn
      .call(move |conn| {
        let conds = vec!["tags LIKE ?"; patterns.len()].join(" OR ");
        let sql = format!(
          "SELECT clash_id, title, statement, creator_id, tags,
                  created_at, expires_at, side_labels
           FROM clashes
           WHERE clash_id != ? AND ({conds})
           ORDER BY created_at DESC"
        );

        let mut params: Vec<String> = Vec::with_capacity(patterns.len() + 1);
        params.push(exclude_str);
        params.extend(patterns);

        let mut stmt = conn.prepare(&sql)?;
        let clashes = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawClash {
              clash_id:    row.get(0)?,
              title:       row.get(1)?,
              statement:   row.get(2)?,
              creator_id:  row.get(3)?,
              tags:        row.get(4)?,
              created_at:  row.get(5)?,
              expires_at:  row.get(6)?,
              side_labels: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(clashes.len());
        for clash in clashes {
          let votes = votes_for(conn, &clash.clash_id)?;
          out.push((clash, votes));
        }
        Ok(out)
      })
      .await?;

    let mut found = Vec::with_capacity(raws.len());
    for (raw, votes) in raws {
      let clash = assemble(raw, votes)?;
      // Exact tag membership; the SQL LIKE above is only a prefilter.
      if clash.tags.iter().any(|t| wanted.contains(t)) {
        found.push(clash);
      }
    }
    Ok(found)
  }

  async fn delete_clash(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        // Arguments, reactions and votes go with it via ON DELETE CASCADE.
        Ok(conn.execute(
          "DELETE FROM clashes WHERE clash_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Votes ─────────────────────────────────────────────────────────────

  async fn cast_vote(&self, clash_id: Uuid, vote: Vote) -> Result<Option<Vec<Vote>>> {
    let clash_str = encode_uuid(clash_id);
    let voter_str = encode_uuid(vote.voter_id);
    let side_str  = vote.side.as_str().to_owned();
    let cast_str  = encode_dt(vote.cast_at);

    let raws: Option<Vec<RawVote>> = self
      .conn
      .call(move |conn| {
        if clash_row(conn, &clash_str)?.is_none() {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO votes (clash_id, voter_id, side, cast_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (clash_id, voter_id)
           DO UPDATE SET side = excluded.side, cast_at = excluded.cast_at",
          rusqlite::params![clash_str, voter_str, side_str, cast_str],
        )?;

        Ok(Some(votes_for(conn, &clash_str)?))
      })
      .await?;

    raws
      .map(|v| v.into_iter().map(RawVote::into_vote).collect())
      .transpose()
  }

  // ── Arguments ─────────────────────────────────────────────────────────

  async fn create_argument(&self, argument: Argument) -> Result<()> {
    let id_str      = encode_uuid(argument.argument_id);
    let clash_str   = encode_uuid(argument.clash_id);
    let author_str  = encode_uuid(argument.author_id);
    let body        = argument.body;
    let side_str    = argument.side.as_str().to_owned();
    let parent_str  = argument.parent_id.map(encode_uuid);
    let created_str = encode_dt(argument.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO arguments (
             argument_id, clash_id, author_id, body, side, parent_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            clash_str,
            author_str,
            body,
            side_str,
            parent_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_argument(&self, id: Uuid) -> Result<Option<Argument>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawArgument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT argument_id, clash_id, author_id, body, side,
                      parent_id, created_at
               FROM arguments WHERE argument_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawArgument {
                  argument_id: row.get(0)?,
                  clash_id:    row.get(1)?,
                  author_id:   row.get(2)?,
                  body:        row.get(3)?,
                  side:        row.get(4)?,
                  parent_id:   row.get(5)?,
                  created_at:  row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawArgument::into_argument).transpose()
  }

  async fn list_arguments(&self, clash_id: Uuid) -> Result<Vec<Argument>> {
    let clash_str = encode_uuid(clash_id);

    let raws: Vec<RawArgument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT argument_id, clash_id, author_id, body, side,
                  parent_id, created_at
           FROM arguments WHERE clash_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![clash_str], |row| {
            Ok(RawArgument {
              argument_id: row.get(0)?,
              clash_id:    row.get(1)?,
              author_id:   row.get(2)?,
              body:        row.get(3)?,
              side:        row.get(4)?,
              parent_id:   row.get(5)?,
              created_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArgument::into_argument).collect()
  }

  async fn delete_argument(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM arguments WHERE argument_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_replies_of(&self, parent_id: Uuid) -> Result<usize> {
    let parent_str = encode_uuid(parent_id);
    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM arguments WHERE parent_id = ?1",
          rusqlite::params![parent_str],
        )?)
      })
      .await?;
    Ok(removed)
  }

  // ── Reactions ─────────────────────────────────────────────────────────

  async fn upsert_reaction(
    &self,
    clash_id: Uuid,
    user_id: Uuid,
    kind: ReactionKind,
  ) -> Result<()> {
    let clash_str = encode_uuid(clash_id);
    let user_str  = encode_uuid(user_id);
    let kind_str  = kind.as_str().to_owned();
    let now_str   = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reactions (clash_id, user_id, kind, reacted_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT (clash_id, user_id)
           DO UPDATE SET kind = excluded.kind, updated_at = excluded.updated_at",
          rusqlite::params![clash_str, user_str, kind_str, now_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_reaction(&self, clash_id: Uuid, user_id: Uuid) -> Result<bool> {
    let clash_str = encode_uuid(clash_id);
    let user_str  = encode_uuid(user_id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM reactions WHERE clash_id = ?1 AND user_id = ?2",
          rusqlite::params![clash_str, user_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn get_reaction(
    &self,
    clash_id: Uuid,
    user_id: Uuid,
  ) -> Result<Option<Reaction>> {
    let clash_str = encode_uuid(clash_id);
    let user_str  = encode_uuid(user_id);

    let raw: Option<RawReaction> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT clash_id, user_id, kind, reacted_at, updated_at
               FROM reactions WHERE clash_id = ?1 AND user_id = ?2",
              rusqlite::params![clash_str, user_str],
              |row| {
                Ok(RawReaction {
                  clash_id:   row.get(0)?,
                  user_id:    row.get(1)?,
                  kind:       row.get(2)?,
                  reacted_at: row.get(3)?,
                  updated_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReaction::into_reaction).transpose()
  }

  async fn list_reactions(&self, clash_id: Uuid) -> Result<Vec<Reaction>> {
    let clash_str = encode_uuid(clash_id);

    let raws: Vec<RawReaction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT clash_id, user_id, kind, reacted_at, updated_at
           FROM reactions WHERE clash_id = ?1 ORDER BY reacted_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![clash_str], |row| {
            Ok(RawReaction {
              clash_id:   row.get(0)?,
              user_id:    row.get(1)?,
              kind:       row.get(2)?,
              reacted_at: row.get(3)?,
              updated_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReaction::into_reaction).collect()
  }

  // ── Search ────────────────────────────────────────────────────────────

  async fn search_clashes(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
    // Token-hit scoring: the fraction of query tokens found in the
    // lowercased title+statement. LIKE narrows the candidate set; scoring
    // happens here so `text_score` stays in [0, 1].
    let tokens: Vec<String> = query
      .split_whitespace()
      .map(str::to_lowercase)
      .filter(|t| !t.is_empty())
      .collect();
    if tokens.is_empty() {
      return Ok(Vec::new());
    }

    let patterns: Vec<String> =
      tokens.iter().map(|t| format!("%{t}%")).collect();

    let raws: Vec<(RawClash, Vec<RawVote>)> = self
      .conn
      .call(move |conn| {
        let conds =
          vec!["lower(title || ' ' || statement) LIKE ?"; patterns.len()]
            .join(" OR ");
        let sql = format!(
          "SELECT clash_id, title, statement, creator_id, tags,
                  created_at, expires_at, side_labels
           FROM clashes WHERE {conds}
           ORDER BY created_at DESC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let clashes = stmt
          .query_map(rusqlite::params_from_iter(patterns), |row| {
            Ok(RawClash {
              clash_id:    row.get(0)?,
              title:       row.get(1)?,
              statement:   row.get(2)?,
              creator_id:  row.get(3)?,
              tags:        row.get(4)?,
              created_at:  row.get(5)?,
              expires_at:  row.get(6)?,
              side_labels: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(clashes.len());
        for clash in clashes {
          let votes = votes_for(conn, &clash.clash_id)?;
          out.push((clash, votes));
        }
        Ok(out)
      })
      .await?;

    let mut hits = Vec::with_capacity(raws.len());
    for (raw, votes) in raws {
      let clash = assemble(raw, votes)?;
      let haystack =
        format!("{} {}", clash.title, clash.statement).to_lowercase();
      let matched = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
      if matched == 0 {
        continue;
      }
      hits.push(SearchHit {
        text_score: matched as f64 / tokens.len() as f64,
        clash,
      });
    }

    // Stable: equal scores keep the newest-first order from the query.
    hits.sort_by(|a, b| b.text_score.total_cmp(&a.text_score));
    hits.truncate(limit);
    Ok(hits)
  }
}
