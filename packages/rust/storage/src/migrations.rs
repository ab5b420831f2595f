//! SQL migration definitions for the registry database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: swift_codes with prefix and country indexes",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per SWIFT/BIC code; id is the record identity
CREATE TABLE IF NOT EXISTS swift_codes (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    swift_code         TEXT NOT NULL UNIQUE,
    institution_prefix TEXT NOT NULL,
    bank_name          TEXT NOT NULL,
    address            TEXT NOT NULL,
    country_iso2       TEXT NOT NULL,
    country_name       TEXT NOT NULL,
    is_headquarter     INTEGER NOT NULL,
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_swift_codes_prefix ON swift_codes(institution_prefix);
CREATE INDEX IF NOT EXISTS idx_swift_codes_country ON swift_codes(country_iso2);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
