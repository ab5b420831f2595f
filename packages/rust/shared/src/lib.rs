//! Shared types, error model, and configuration for the SWIFT code registry.
//!
//! This crate is the foundation depended on by all other swiftcodes crates.
//! It provides:
//! - [`SwiftCodesError`], the unified error type
//! - Domain types ([`SwiftCode`], [`SwiftCodeDetail`], [`CountrySwiftCodes`])
//!   and the headquarters/branch classification rules
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, SeedConfig, ServerConfig, StorageConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{Result, SwiftCodesError};
pub use types::{
    BRANCH_CODE_LEN, BRANCH_SUFFIX_HQ, CountrySwiftCodes, HQ_CODE_LEN, INSTITUTION_PREFIX_LEN,
    SwiftCode, SwiftCodeDetail, institution_prefix, is_headquarters_code, is_valid_code,
    is_well_formed_code,
};
