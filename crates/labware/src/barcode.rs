use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// A scanned labware identifier, e.g. `STAN-611`.
///
/// Barcodes are never empty and never have leading or trailing whitespace; scanners commonly
/// append a newline, so parsing trims the input first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Barcode(String);

impl Barcode {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Barcode {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BarcodeError::Empty);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(BarcodeError::InvalidBarcode(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for Barcode {
    type Error = BarcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl Display for Barcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("Barcode is required")]
    Empty,
    #[error("Invalid barcode: '{0}'")]
    InvalidBarcode(String),
}

#[cfg(test)]
mod barcode_tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("STAN-611", Ok("STAN-611"))]
    #[case("  STAN-611\n", Ok("STAN-611"))]
    #[case("", Err(BarcodeError::Empty))]
    #[case(" \t", Err(BarcodeError::Empty))]
    #[case("STAN 611", Err(BarcodeError::InvalidBarcode("STAN 611".to_string())))]
    fn parse(#[case] input: &str, #[case] expected: Result<&str, BarcodeError>) {
        let result = Barcode::from_str(input).map(|barcode| barcode.to_string());
        assert_eq!(result, expected.map(str::to_string));
    }

    #[test]
    fn serializes_as_plain_string() {
        let barcode = Barcode::from_str("STAN-611").unwrap();
        assert_eq!(serde_json::to_string(&barcode).unwrap(), "\"STAN-611\"");

        let result: Result<Barcode, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
