//! SQL schema for the Clash SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS clashes (
    clash_id    TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    statement   TEXT NOT NULL,
    creator_id  TEXT,
    tags        TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    created_at  TEXT NOT NULL,               -- ISO 8601 UTC; server-assigned
    expires_at  TEXT NOT NULL,
    side_labels TEXT                         -- JSON SideLabels or NULL
);

-- One row per (clash, voter); casting again replaces the side.
CREATE TABLE IF NOT EXISTS votes (
    clash_id TEXT NOT NULL REFERENCES clashes(clash_id) ON DELETE CASCADE,
    voter_id TEXT NOT NULL,
    side     TEXT NOT NULL,    -- 'for' | 'against' | 'neutral'
    cast_at  TEXT NOT NULL,
    PRIMARY KEY (clash_id, voter_id)
);

-- parent_id carries no FK on purpose: a reply whose parent is gone is
-- tolerated on the read side (dropped from the thread), not rejected here.
CREATE TABLE IF NOT EXISTS arguments (
    argument_id TEXT PRIMARY KEY,
    clash_id    TEXT NOT NULL REFERENCES clashes(clash_id) ON DELETE CASCADE,
    author_id   TEXT NOT NULL,
    body        TEXT NOT NULL,
    side        TEXT NOT NULL,
    parent_id   TEXT,
    created_at  TEXT NOT NULL
);

-- The at-most-one-reaction-per-(clash, user) invariant lives here, in the
-- primary key; upserts replace the kind in place.
CREATE TABLE IF NOT EXISTS reactions (
    clash_id   TEXT NOT NULL REFERENCES clashes(clash_id) ON DELETE CASCADE,
    user_id    TEXT NOT NULL,
    kind       TEXT NOT NULL,
    reacted_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (clash_id, user_id)
);

CREATE INDEX IF NOT EXISTS arguments_clash_idx  ON arguments(clash_id);
CREATE INDEX IF NOT EXISTS arguments_parent_idx ON arguments(parent_id);
CREATE INDEX IF NOT EXISTS clashes_created_idx  ON clashes(created_at);

PRAGMA user_version = 1;
";
