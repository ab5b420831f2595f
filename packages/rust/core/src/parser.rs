//! Canonical CSV parser.
//!
//! The source has a header row followed by rows of exactly eight columns:
//!
//! ```text
//! COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE
//! ```
//!
//! `CODE TYPE` and `TIME ZONE` are read but not kept. By default the first
//! malformed row aborts the whole batch; see [`ParseMode`].

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use swiftcodes_shared::{Result, SwiftCode, SwiftCodesError, is_headquarters_code, is_valid_code};

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

const COLUMN_COUNT: usize = 8;

const COL_COUNTRY_ISO2: usize = 0;
const COL_SWIFT_CODE: usize = 1;
// 2: code type (unused)
const COL_BANK_NAME: usize = 3;
const COL_ADDRESS: usize = 4;
const COL_TOWN_NAME: usize = 5;
const COL_COUNTRY_NAME: usize = 6;
// 7: time zone (unused)

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How malformed data rows are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// The first malformed row fails the whole batch; nothing is returned.
    #[default]
    FailFast,
    /// Malformed rows are skipped and reported in [`ParseOutcome::skipped`].
    SkipInvalid,
}

/// A data row rejected in [`ParseMode::SkipInvalid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1-based line number in the source.
    pub line: u64,
    pub message: String,
}

/// Result of a successful parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Valid records in source order.
    pub records: Vec<SwiftCode>,
    /// Rows skipped in [`ParseMode::SkipInvalid`]; always empty in fail-fast mode.
    pub skipped: Vec<RowIssue>,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse the CSV file at `path`.
pub fn parse_csv(path: &Path, mode: ParseMode) -> Result<ParseOutcome> {
    let file = std::fs::File::open(path).map_err(|e| SwiftCodesError::io(path, e))?;
    let outcome = parse_reader(file, mode)?;
    tracing::debug!(
        path = %path.display(),
        records = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "parsed swift code source"
    );
    Ok(outcome)
}

/// Parse CSV content from any reader. The first row is always treated as
/// the header and discarded.
pub fn parse_reader<R: Read>(reader: R, mode: ParseMode) -> Result<ParseOutcome> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut outcome = ParseOutcome::default();

    for result in csv_reader.records() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            SwiftCodesError::parse(line, e.to_string())
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        match parse_row(&row) {
            Ok(record) => outcome.records.push(record),
            Err(message) => match mode {
                ParseMode::FailFast => return Err(SwiftCodesError::parse(line, message)),
                ParseMode::SkipInvalid => {
                    tracing::warn!(line, %message, "skipping invalid row");
                    outcome.skipped.push(RowIssue { line, message });
                }
            },
        }
    }

    Ok(outcome)
}

/// Validate and classify a single data row.
fn parse_row(row: &StringRecord) -> std::result::Result<SwiftCode, String> {
    if row.len() != COLUMN_COUNT {
        return Err(format!(
            "expected {COLUMN_COUNT} columns, found {}",
            row.len()
        ));
    }
    let field = |idx: usize| row.get(idx).unwrap_or("").trim();

    let swift_code = field(COL_SWIFT_CODE);
    if !is_valid_code(swift_code) {
        return Err(format!(
            "invalid swift code '{swift_code}': must be 8 or 11 ASCII alphanumeric characters"
        ));
    }

    Ok(SwiftCode {
        swift_code: swift_code.to_string(),
        bank_name: field(COL_BANK_NAME).to_string(),
        address: join_address(field(COL_ADDRESS), field(COL_TOWN_NAME)),
        country_iso2: field(COL_COUNTRY_ISO2).to_uppercase(),
        country_name: field(COL_COUNTRY_NAME).to_uppercase(),
        is_headquarter: is_headquarters_code(swift_code),
    })
}

/// Street plus `", "` plus town, leaving out the separator when the town is empty.
pub(crate) fn join_address(street: &str, town: &str) -> String {
    if town.is_empty() {
        street.to_string()
    } else {
        format!("{street}, {town}")
    }
}
