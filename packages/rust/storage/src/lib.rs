//! libSQL storage layer for the SWIFT code registry.
//!
//! The [`Storage`] struct wraps a local libSQL database holding one row per
//! code. It is the persistence collaborator behind the registry: it offers
//! insert-if-absent, exact-match lookups, delete and count, and knows nothing
//! about locking or seeding policy.
//!
//! **Access rules:**
//! - Server and seeding: read-write via [`Storage::open`]
//! - Operator lookups: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use swiftcodes_shared::{Result, SwiftCode, SwiftCodesError};

/// Columns selected for every record query, in [`row_to_stored`] order.
const RECORD_COLUMNS: &str =
    "id, swift_code, bank_name, address, country_iso2, country_name, is_headquarter";

/// A persisted record together with its row identity.
///
/// Two records can carry identical field values and still be distinct
/// entities; `id` is what tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSwiftCode {
    /// Row identity, increasing with insertion order.
    pub id: i64,
    /// The record fields.
    pub record: SwiftCode,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

fn db_err(e: libsql::Error) -> SwiftCodesError {
    SwiftCodesError::Storage(e.to_string())
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SwiftCodesError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;

        let conn = db.connect().map_err(db_err)?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SwiftCodesError::Storage(format!(
                "database not found at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;

        let conn = db.connect().map_err(db_err)?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        SwiftCodesError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(SwiftCodesError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert `record` unless its code is already present.
    ///
    /// Returns `true` when a row was written, `false` when the code existed.
    pub async fn insert_if_absent(&self, record: &SwiftCode) -> Result<bool> {
        self.check_writable()?;
        let prefix = record.institution_prefix().ok_or_else(|| {
            SwiftCodesError::validation(format!(
                "swift code '{}' is shorter than the institution prefix",
                record.swift_code
            ))
        })?;
        let now = Utc::now().to_rfc3339();

        let written = self
            .conn
            .execute(
                "INSERT INTO swift_codes
                   (swift_code, institution_prefix, bank_name, address, country_iso2,
                    country_name, is_headquarter, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(swift_code) DO NOTHING",
                params![
                    record.swift_code.as_str(),
                    prefix,
                    record.bank_name.as_str(),
                    record.address.as_str(),
                    record.country_iso2.as_str(),
                    record.country_name.as_str(),
                    i64::from(record.is_headquarter),
                    now.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(written > 0)
    }

    /// Delete the record with exactly this code. Returns the number of rows removed.
    pub async fn delete_by_code(&self, code: &str) -> Result<u64> {
        self.check_writable()?;
        self.conn
            .execute("DELETE FROM swift_codes WHERE swift_code = ?1", params![code])
            .await
            .map_err(db_err)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Number of stored records.
    pub async fn count(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM swift_codes", params![])
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(db_err)?.max(0) as u64),
            None => Ok(0),
        }
    }

    /// Get the record with exactly this code.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<StoredSwiftCode>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {RECORD_COLUMNS} FROM swift_codes WHERE swift_code = ?1"),
                params![code],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(row_to_stored(&row)?)),
            None => Ok(None),
        }
    }

    /// List records sharing `prefix`, excluding the row `exclude_id`, in insertion order.
    pub async fn list_by_prefix_excluding(
        &self,
        prefix: &str,
        exclude_id: i64,
    ) -> Result<Vec<StoredSwiftCode>> {
        let rows = self
            .conn
            .query(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM swift_codes
                     WHERE institution_prefix = ?1 AND id <> ?2
                     ORDER BY id"
                ),
                params![prefix, exclude_id],
            )
            .await
            .map_err(db_err)?;
        collect_rows(rows).await
    }

    /// List records for an exact (already normalized) country code, in insertion order.
    pub async fn list_by_country(&self, country_iso2: &str) -> Result<Vec<StoredSwiftCode>> {
        let rows = self
            .conn
            .query(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM swift_codes
                     WHERE country_iso2 = ?1
                     ORDER BY id"
                ),
                params![country_iso2],
            )
            .await
            .map_err(db_err)?;
        collect_rows(rows).await
    }
}

async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<StoredSwiftCode>> {
    let mut results = Vec::new();
    while let Some(row) = rows.next().await.map_err(db_err)? {
        results.push(row_to_stored(&row)?);
    }
    Ok(results)
}

/// Convert a database row selected with [`RECORD_COLUMNS`] to a [`StoredSwiftCode`].
fn row_to_stored(row: &libsql::Row) -> Result<StoredSwiftCode> {
    Ok(StoredSwiftCode {
        id: row.get::<i64>(0).map_err(db_err)?,
        record: SwiftCode {
            swift_code: row.get::<String>(1).map_err(db_err)?,
            bank_name: row.get::<String>(2).map_err(db_err)?,
            address: row.get::<String>(3).map_err(db_err)?,
            country_iso2: row.get::<String>(4).map_err(db_err)?,
            country_name: row.get::<String>(5).map_err(db_err)?,
            is_headquarter: row.get::<i64>(6).map_err(db_err)? != 0,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("swiftcodes_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn record(code: &str, country: &str, hq: bool) -> SwiftCode {
        SwiftCode {
            swift_code: code.into(),
            bank_name: "TEST BANK".into(),
            address: "MAIN STREET 1, TOWN".into(),
            country_iso2: country.into(),
            country_name: "TESTLAND".into(),
            is_headquarter: hq,
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        assert_eq!(storage.get_schema_version().await, 1);
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("swiftcodes_test_{}.db", Uuid::now_v7()));
        let s1 = Storage::open(&tmp).await.expect("first open");
        s1.insert_if_absent(&record("AAISALTRXXX", "AL", true))
            .await
            .unwrap();
        drop(s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
        assert_eq!(s2.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_if_absent_rejects_existing_code() {
        let storage = test_storage().await;
        let hq = record("AAISALTRXXX", "AL", true);

        assert!(storage.insert_if_absent(&hq).await.unwrap());
        let mut changed = hq.clone();
        changed.bank_name = "SOMEONE ELSE".into();
        assert!(!storage.insert_if_absent(&changed).await.unwrap());

        let stored = storage.get_by_code("AAISALTRXXX").await.unwrap().unwrap();
        assert_eq!(stored.record, hq);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookup_is_exact_match() {
        let storage = test_storage().await;
        storage
            .insert_if_absent(&record("AAISALTRXXX", "AL", true))
            .await
            .unwrap();

        assert!(storage.get_by_code("AAISALTR").await.unwrap().is_none());
        assert!(storage.get_by_code("aaisaltrxxx").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prefix_listing_excludes_by_id_in_insertion_order() {
        let storage = test_storage().await;
        for r in [
            record("AAISALTR002", "AL", false),
            record("AAISALTRXXX", "AL", true),
            record("AAISALTR001", "AL", false),
            record("BBBBALTRXXX", "AL", true),
        ] {
            storage.insert_if_absent(&r).await.unwrap();
        }

        let hq = storage.get_by_code("AAISALTRXXX").await.unwrap().unwrap();
        let branches = storage
            .list_by_prefix_excluding("AAISALTR", hq.id)
            .await
            .unwrap();
        let codes: Vec<_> = branches.iter().map(|b| b.record.swift_code.as_str()).collect();
        assert_eq!(codes, ["AAISALTR002", "AAISALTR001"]);
    }

    #[tokio::test]
    async fn country_listing_and_delete() {
        let storage = test_storage().await;
        storage
            .insert_if_absent(&record("AAISALTRXXX", "AL", true))
            .await
            .unwrap();
        storage
            .insert_if_absent(&record("BCHICLRMXXX", "CL", true))
            .await
            .unwrap();

        let al = storage.list_by_country("AL").await.unwrap();
        assert_eq!(al.len(), 1);
        assert_eq!(al[0].record.swift_code, "AAISALTRXXX");

        assert_eq!(storage.delete_by_code("AAISALTRXXX").await.unwrap(), 1);
        assert_eq!(storage.delete_by_code("AAISALTRXXX").await.unwrap(), 0);
        assert!(storage.list_by_country("AL").await.unwrap().is_empty());
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn short_code_is_rejected() {
        let storage = test_storage().await;
        let err = storage
            .insert_if_absent(&record("AAIS", "AL", true))
            .await
            .unwrap_err();
        assert!(matches!(err, SwiftCodesError::Validation { .. }));
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let tmp = std::env::temp_dir().join(format!("swiftcodes_test_{}.db", Uuid::now_v7()));
        let rw = Storage::open(&tmp).await.unwrap();
        rw.insert_if_absent(&record("AAISALTRXXX", "AL", true))
            .await
            .unwrap();
        drop(rw);

        let ro = Storage::open_readonly(&tmp).await.unwrap();
        assert!(ro.get_by_code("AAISALTRXXX").await.unwrap().is_some());
        let result = ro.delete_by_code("AAISALTRXXX").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("read-only"));
    }

    #[tokio::test]
    async fn readonly_requires_existing_file() {
        let tmp = std::env::temp_dir().join(format!("swiftcodes_missing_{}.db", Uuid::now_v7()));
        assert!(Storage::open_readonly(&tmp).await.is_err());
    }
}
