use core::str::FromStr;

use serde::{Deserialize, Serialize};

use agrocat_core::{DomainError, DomainResult, ValueObject};

/// Number of digits in a legal-entity tax identifier.
pub const TAX_ID_LEN: usize = 9;

/// Legal-entity tax identifier: exactly nine ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxId(String);

impl TaxId {
    /// Validate and wrap a raw identifier. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::validation("tax id is required"));
        }
        if !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation("tax id must contain only digits"));
        }
        if value.len() != TAX_ID_LEN {
            return Err(DomainError::validation(format!(
                "tax id must be exactly {TAX_ID_LEN} digits"
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form safe for logs: first and last two digits only.
    pub fn masked(&self) -> String {
        format!("{}*****{}", &self.0[..2], &self.0[TAX_ID_LEN - 2..])
    }
}

impl ValueObject for TaxId {}

impl core::fmt::Display for TaxId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaxId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaxId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaxId> for String {
    fn from(value: TaxId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nine_digits_and_trims() {
        let id = TaxId::parse(" 123456789 ").unwrap();
        assert_eq!(id.as_str(), "123456789");
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        for raw in ["", "12345678", "1234567890", "12345678a", "１２３４５６７８９"] {
            assert!(
                matches!(TaxId::parse(raw), Err(DomainError::Validation(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn masked_hides_middle_digits() {
        assert_eq!(TaxId::parse("123456789").unwrap().masked(), "12*****89");
    }

    #[test]
    fn deserialization_validates() {
        let ok: TaxId = serde_json::from_str("\"987654321\"").unwrap();
        assert_eq!(ok.as_str(), "987654321");
        assert!(serde_json::from_str::<TaxId>("\"98765\"").is_err());
    }
}
