//! Scene store database schema.

/// SQL to create the scenes table. Mirrors `migrations/0001_create_scenes.sql`.
///
/// `channel_id` is the primary key, so the store holds at most one document
/// per channel.
pub const CREATE_SCENES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS scenes (
    channel_id      BIGINT PRIMARY KEY,
    schema_version  BIGINT NOT NULL,
    document        JSONB NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_scenes_schema_version
    ON scenes (schema_version);
";
