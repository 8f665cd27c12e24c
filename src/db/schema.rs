//! Database schema for Verba

pub const MIGRATIONS: &str = r#"
-- Client-side key-value storage (history, language preferences)
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;
