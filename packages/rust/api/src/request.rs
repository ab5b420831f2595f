//! Request payloads and their validation.

use serde::Deserialize;
use swiftcodes_shared::{
    Result, SwiftCode, SwiftCodesError, is_headquarters_code, is_well_formed_code,
};

/// JSON body of `POST /v1/swift-codes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwiftCodeRequest {
    pub swift_code: String,
    pub bank_name: String,
    pub address: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
}

impl CreateSwiftCodeRequest {
    /// Validate the payload and normalize it into a record.
    ///
    /// Country fields are trimmed and uppercased. The headquarters flag is
    /// checked against the code and rejected on disagreement rather than
    /// silently rewritten.
    pub fn into_record(self) -> Result<SwiftCode> {
        let swift_code = self.swift_code.trim().to_string();
        if !is_well_formed_code(&swift_code) {
            return Err(SwiftCodesError::validation(format!(
                "invalid swift code '{swift_code}': \
                 must be 8 or 11 uppercase alphanumeric characters"
            )));
        }

        let country_iso2 = self.country_iso2.trim().to_uppercase();
        if country_iso2.len() != 2 || !country_iso2.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SwiftCodesError::validation(format!(
                "invalid countryISO2 '{country_iso2}': must be two letters"
            )));
        }

        let country_name = self.country_name.trim().to_uppercase();
        if country_name.is_empty() {
            return Err(SwiftCodesError::validation("countryName must not be empty"));
        }

        let expected = is_headquarters_code(&swift_code);
        if self.is_headquarter != expected {
            return Err(SwiftCodesError::validation(format!(
                "isHeadquarter is {} but code '{swift_code}' classifies as {}",
                self.is_headquarter,
                if expected { "headquarters" } else { "branch" }
            )));
        }

        Ok(SwiftCode {
            swift_code,
            bank_name: self.bank_name.trim().to_string(),
            address: self.address.trim().to_string(),
            country_iso2,
            country_name,
            is_headquarter: self.is_headquarter,
        })
    }
}
