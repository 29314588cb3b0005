use std::ffi::OsStr;
use std::str::FromStr;

use clap::builder::TypedValueParser;
use clap::error::ErrorKind;
use clap::{Arg, Command, Error};
use labware::{Barcode, WorkNumber};

use crate::args::MaxLabware;

fn to_str(value: &OsStr) -> Result<&str, Error> {
    value
        .to_str()
        .ok_or_else(|| Error::raw(ErrorKind::InvalidValue, "Invalid argument encoding"))
}

#[derive(Clone, Default)]
pub struct BarcodeParser {}

impl TypedValueParser for BarcodeParser {
    type Value = Barcode;

    /// Parses a labware barcode, e.g. 'STAN-611'. Surrounding whitespace is ignored.
    fn parse_ref(&self, _cmd: &Command, _arg: Option<&Arg>, value: &OsStr) -> Result<Self::Value, Error> {
        let value = to_str(value)?;

        Barcode::from_str(value).map_err(|e| {
            Error::raw(
                ErrorKind::InvalidValue,
                format!("Invalid barcode. value: '{}', cause: {}\n", value, e),
            )
        })
    }
}

#[derive(Clone, Default)]
pub struct WorkNumberParser {}

impl TypedValueParser for WorkNumberParser {
    type Value = WorkNumber;

    /// Parses an SGP number. Presence is checked by the form, not here.
    fn parse_ref(&self, _cmd: &Command, _arg: Option<&Arg>, value: &OsStr) -> Result<Self::Value, Error> {
        Ok(WorkNumber::from(to_str(value)?))
    }
}

pub fn max_labware_parser(value: &str) -> Result<MaxLabware, String> {
    let count = value
        .parse::<usize>()
        .map_err(|e| format!("{}", e))?;

    match count {
        0 => Err("must be at least 1".to_string()),
        count => Ok(MaxLabware(count)),
    }
}

#[cfg(test)]
mod parsers_tests {
    use std::ffi::OsString;

    use rstest::rstest;

    use super::*;

    #[test]
    fn barcode_is_trimmed() {
        let cmd = Command::new("test");
        let barcode = BarcodeParser::default()
            .parse_ref(&cmd, None, &OsString::from(" STAN-611 "))
            .unwrap();

        assert_eq!(barcode.as_str(), "STAN-611");
    }

    #[test]
    fn blank_barcode() {
        let cmd = Command::new("test");
        let result = BarcodeParser::default().parse_ref(&cmd, None, &OsString::from("  "));

        assert!(result.is_err());
    }

    #[rstest]
    #[case("3", Ok(MaxLabware(3)))]
    #[case("0", Err("must be at least 1".to_string()))]
    fn max_labware(#[case] value: &str, #[case] expected: Result<MaxLabware, String>) {
        assert_eq!(max_labware_parser(value), expected);
    }
}
