//! Record parsing and the code registry.
//!
//! [`parser`] turns rows of the canonical CSV into classified [`SwiftCode`]
//! records; [`registry`] holds them behind a single read/write lock and
//! answers point, country, and headquarters-branch lookups.
//!
//! [`SwiftCode`]: swiftcodes_shared::SwiftCode

pub mod parser;
pub mod registry;

pub use parser::{ParseMode, ParseOutcome, RowIssue, parse_csv, parse_reader};
pub use registry::{Registry, SeedOutcome};
