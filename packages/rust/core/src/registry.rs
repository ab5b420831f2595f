//! The code registry: uniqueness, seeding, and hierarchical lookups.
//!
//! All access goes through one [`tokio::sync::RwLock`] around the
//! [`Storage`] handle. Writers (insert, seed, delete) hold the write lock for
//! the whole operation, so a headquarters lookup and its branch expansion
//! always observe the same record set.

use swiftcodes_shared::{
    CountrySwiftCodes, Result, SwiftCode, SwiftCodeDetail, SwiftCodesError, institution_prefix,
    is_valid_code,
};
use swiftcodes_storage::Storage;
use tokio::sync::RwLock;

/// What a call to [`Registry::seed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The registry was empty and the batch was loaded.
    Seeded {
        inserted: usize,
        /// Batch entries whose code had already been inserted earlier in the batch.
        duplicates: usize,
    },
    /// The registry already held records; nothing was inserted.
    AlreadyPopulated { existing: u64 },
}

/// Shared, lock-protected record set.
pub struct Registry {
    store: RwLock<Storage>,
}

impl Registry {
    pub fn new(storage: Storage) -> Self {
        Self {
            store: RwLock::new(storage),
        }
    }

    /// Number of records currently held.
    pub async fn count(&self) -> Result<u64> {
        self.store.read().await.count().await
    }

    /// Insert a single record.
    ///
    /// The headquarters flag is stored exactly as supplied; only the code
    /// itself is checked here.
    pub async fn insert(&self, record: &SwiftCode) -> Result<()> {
        check_record(record)?;

        let store = self.store.write().await;
        if !store.insert_if_absent(record).await? {
            return Err(SwiftCodesError::DuplicateCode {
                code: record.swift_code.clone(),
            });
        }
        tracing::info!(code = %record.swift_code, "swift code created");
        Ok(())
    }

    /// Load `records` if and only if the registry is empty.
    ///
    /// Duplicate codes within the batch are skipped. An invalid code or a
    /// storage failure stops the load and leaves already-inserted records in
    /// place.
    pub async fn seed(&self, records: &[SwiftCode]) -> Result<SeedOutcome> {
        let store = self.store.write().await;

        let existing = store.count().await?;
        if existing > 0 {
            tracing::info!(existing, "registry already populated, skipping seed");
            return Ok(SeedOutcome::AlreadyPopulated { existing });
        }

        let mut inserted = 0;
        let mut duplicates = 0;
        for record in records {
            check_record(record)?;
            if store.insert_if_absent(record).await? {
                inserted += 1;
            } else {
                tracing::warn!(code = %record.swift_code, "duplicate code in seed batch, skipping");
                duplicates += 1;
            }
        }

        tracing::info!(inserted, duplicates, "registry seeded");
        Ok(SeedOutcome::Seeded {
            inserted,
            duplicates,
        })
    }

    /// Look up one code. Headquarters records come back with their branch set.
    pub async fn get_by_code(&self, code: &str) -> Result<SwiftCodeDetail> {
        let store = self.store.read().await;

        let found = store
            .get_by_code(code)
            .await?
            .ok_or_else(|| SwiftCodesError::not_found(format!("swift code '{code}'")))?;

        if !found.record.is_headquarter {
            return Ok(SwiftCodeDetail {
                record: found.record,
                branches: None,
            });
        }

        let branches = match institution_prefix(&found.record.swift_code) {
            Some(prefix) => store
                .list_by_prefix_excluding(prefix, found.id)
                .await?
                .into_iter()
                .map(|b| b.record)
                .collect(),
            None => Vec::new(),
        };
        tracing::debug!(code, branches = branches.len(), "expanded headquarters");

        Ok(SwiftCodeDetail {
            record: found.record,
            branches: Some(branches),
        })
    }

    /// All records for a country code, matched case-insensitively.
    pub async fn get_by_country(&self, country_iso2: &str) -> Result<CountrySwiftCodes> {
        let key = country_iso2.trim().to_uppercase();
        let rows = self.store.read().await.list_by_country(&key).await?;

        let Some(first) = rows.first() else {
            return Err(SwiftCodesError::not_found(format!("country '{key}'")));
        };
        let country_name = first.record.country_name.clone();

        if rows.iter().any(|r| r.record.country_name != country_name) {
            tracing::warn!(
                country = %key,
                %country_name,
                "records disagree on country name; reporting the first inserted"
            );
        }

        Ok(CountrySwiftCodes {
            country_iso2: key,
            country_name,
            swift_codes: rows.into_iter().map(|r| r.record).collect(),
        })
    }

    /// Remove the record with exactly this code.
    pub async fn delete(&self, code: &str) -> Result<()> {
        let removed = self.store.write().await.delete_by_code(code).await?;
        if removed == 0 {
            return Err(SwiftCodesError::not_found(format!("swift code '{code}'")));
        }
        tracing::info!(code, "swift code deleted");
        Ok(())
    }
}

/// Reject codes of the wrong shape and log flag/classification mismatches.
fn check_record(record: &SwiftCode) -> Result<()> {
    if !is_valid_code(&record.swift_code) {
        return Err(SwiftCodesError::validation(format!(
            "invalid swift code '{}': must be 8 or 11 ASCII alphanumeric characters",
            record.swift_code
        )));
    }
    if !record.flag_matches_code() {
        tracing::warn!(
            code = %record.swift_code,
            is_headquarter = record.is_headquarter,
            "headquarters flag disagrees with code classification; storing as supplied"
        );
    }
    Ok(())
}
