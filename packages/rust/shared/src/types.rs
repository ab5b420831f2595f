//! Core domain types for the SWIFT code registry.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Length of a headquarters-only code (institution + country + location).
pub const HQ_CODE_LEN: usize = 8;

/// Length of a code carrying a branch suffix.
pub const BRANCH_CODE_LEN: usize = 11;

/// Number of leading characters identifying the institution within a country.
pub const INSTITUTION_PREFIX_LEN: usize = 8;

/// Branch suffix that marks an 11-character code as the headquarters.
pub const BRANCH_SUFFIX_HQ: &str = "XXX";

/// Uppercase alphanumeric, 8 or 11 characters.
static CODE_FORMAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{8}(?:[A-Z0-9]{3})?$").expect("code format regex")
});

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Whether `code` is 8 or 11 ASCII alphanumeric characters.
///
/// Casing is not checked here; stored codes keep the casing they arrived with.
pub fn is_valid_code(code: &str) -> bool {
    matches!(code.len(), HQ_CODE_LEN | BRANCH_CODE_LEN)
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Whether `code` is strictly uppercase alphanumeric with a valid length.
pub fn is_well_formed_code(code: &str) -> bool {
    CODE_FORMAT_RE.is_match(code)
}

/// Classify a code: 8 characters, or 11 ending in `XXX`, is a headquarters.
///
/// Any other code (including invalid lengths) is not a headquarters; callers
/// validate the length separately.
pub fn is_headquarters_code(code: &str) -> bool {
    match code.chars().count() {
        HQ_CODE_LEN => true,
        BRANCH_CODE_LEN => code.ends_with(BRANCH_SUFFIX_HQ),
        _ => false,
    }
}

/// The first eight characters of `code`, shared by every record of one
/// institution group. Returns `None` for codes shorter than the prefix.
pub fn institution_prefix(code: &str) -> Option<&str> {
    code.char_indices()
        .nth(INSTITUTION_PREFIX_LEN)
        .map(|(idx, _)| &code[..idx])
        .or_else(|| (code.chars().count() == INSTITUTION_PREFIX_LEN).then_some(code))
}

// ---------------------------------------------------------------------------
// SwiftCode
// ---------------------------------------------------------------------------

/// A single bank identifier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCode {
    /// The 8- or 11-character identifier.
    pub swift_code: String,
    /// Institution display name.
    pub bank_name: String,
    /// Street address joined with the town name.
    pub address: String,
    /// Two-letter uppercase country code.
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    /// Uppercase country name.
    pub country_name: String,
    /// Headquarters flag as stored.
    pub is_headquarter: bool,
}

impl SwiftCode {
    /// The institution prefix of this record's code.
    pub fn institution_prefix(&self) -> Option<&str> {
        institution_prefix(&self.swift_code)
    }

    /// Whether the stored flag agrees with the code's classification.
    pub fn flag_matches_code(&self) -> bool {
        self.is_headquarter == is_headquarters_code(&self.swift_code)
    }
}

/// Response shape for a point lookup: the record, plus its branches when it
/// is a headquarters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeDetail {
    #[serde(flatten)]
    pub record: SwiftCode,
    /// Other records of the institution group, in insertion order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<SwiftCode>>,
}

/// Response shape for a country lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySwiftCodes {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    /// Name taken from the first matching record.
    pub country_name: String,
    pub swift_codes: Vec<SwiftCode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, hq: bool) -> SwiftCode {
        SwiftCode {
            swift_code: code.into(),
            bank_name: "UNITED BANK OF ALBANIA SH.A".into(),
            address: "HYRJA 3 RR. DRITAN HOXHA ND. 11 TIRANA, TIRANA".into(),
            country_iso2: "AL".into(),
            country_name: "ALBANIA".into(),
            is_headquarter: hq,
        }
    }

    #[test]
    fn eight_character_codes_are_headquarters() {
        assert!(is_headquarters_code("AAISALTR"));
        assert!(is_headquarters_code("BCHICLRM"));
    }

    #[test]
    fn eleven_character_codes_depend_on_suffix() {
        assert!(is_headquarters_code("AAISALTRXXX"));
        assert!(!is_headquarters_code("AAISALTR123"));
        assert!(!is_headquarters_code("TGAFMTM1001"));
        assert!(!is_headquarters_code("AAISALTRXXY"));
    }

    #[test]
    fn other_lengths_are_invalid() {
        for code in ["", "ABC", "AAISALT", "AAISALTRX", "AAISALTRXX", "AAISALTRXXXX"] {
            assert!(!is_valid_code(code), "{code} should be invalid");
            assert!(!is_headquarters_code(code));
        }
        assert!(is_valid_code("AAISALTR"));
        assert!(is_valid_code("AAISALTR123"));
        assert!(is_valid_code("aaisaltr123"));
    }

    #[test]
    fn non_ascii_codes_are_invalid() {
        // eleven characters, twelve bytes
        assert!(!is_valid_code("ÄAISALTRXXX"));
        // eight bytes, seven characters
        assert!(!is_valid_code("ÄAISALT"));
        assert!(!is_valid_code("AAIS-LTRXXX"));
        assert!(!is_valid_code("AAIS LTR"));
    }

    #[test]
    fn well_formed_codes() {
        assert!(is_well_formed_code("AAISALTRXXX"));
        assert!(is_well_formed_code("AAISALTR"));
        assert!(!is_well_formed_code("aaisaltrxxx"));
        assert!(!is_well_formed_code("AAIS-LTRXXX"));
        assert!(!is_well_formed_code("NEWTEST33XXX"));
    }

    #[test]
    fn prefix_is_first_eight_characters() {
        assert_eq!(institution_prefix("AAISALTRXXX"), Some("AAISALTR"));
        assert_eq!(institution_prefix("AAISALTR123"), Some("AAISALTR"));
        assert_eq!(institution_prefix("AAISALTR"), Some("AAISALTR"));
        assert_eq!(institution_prefix("AAIS"), None);
    }

    #[test]
    fn flag_consistency() {
        assert!(record("AAISALTRXXX", true).flag_matches_code());
        assert!(!record("AAISALTRXXX", false).flag_matches_code());
        assert!(record("AAISALTR123", false).flag_matches_code());
    }

    #[test]
    fn swift_code_json_field_names() {
        let json = serde_json::to_value(record("AAISALTRXXX", true)).expect("serialize");
        assert_eq!(json["swiftCode"], "AAISALTRXXX");
        assert_eq!(json["countryISO2"], "AL");
        assert_eq!(json["countryName"], "ALBANIA");
        assert_eq!(json["isHeadquarter"], true);
        assert!(json.get("bankName").is_some());
    }

    #[test]
    fn detail_omits_branches_for_branch_records() {
        let detail = SwiftCodeDetail {
            record: record("AAISALTR123", false),
            branches: None,
        };
        let json = serde_json::to_value(&detail).expect("serialize");
        assert_eq!(json["swiftCode"], "AAISALTR123");
        assert!(json.get("branches").is_none());

        let detail = SwiftCodeDetail {
            record: record("AAISALTRXXX", true),
            branches: Some(vec![record("AAISALTR123", false)]),
        };
        let json = serde_json::to_value(&detail).expect("serialize");
        assert_eq!(json["branches"][0]["swiftCode"], "AAISALTR123");
    }
}
