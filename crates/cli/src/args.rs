use clap::ValueEnum;

/// Args decouple of CLI arg handling requirements from the internal data structures

/// The admin lookup tables that can be managed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum EntityArg {
    DestructionReason,
    Species,
    ReleaseDestination,
    Comment,
    Equipment,
}

/// How many labware the scanner accepts before it locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLabware(pub usize);

impl MaxLabware {
    pub fn is_reached(&self, count: usize) -> bool {
        count >= self.0
    }
}

#[cfg(test)]
mod args_tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("destruction-reason", EntityArg::DestructionReason)]
    #[case("release-destination", EntityArg::ReleaseDestination)]
    #[case("equipment", EntityArg::Equipment)]
    fn entity_arg_names(#[case] value: &str, #[case] expected: EntityArg) {
        assert_eq!(EntityArg::from_str(value, false).unwrap(), expected);
    }

    #[test]
    fn max_labware() {
        assert!(!MaxLabware(2).is_reached(1));
        assert!(MaxLabware(2).is_reached(2));
    }
}
