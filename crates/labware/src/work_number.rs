use std::fmt::{Display, Formatter};

/// An SGP number, used to tag operations for billing and tracking, e.g. `SGP1008`.
///
/// The only client-side rule is presence; stan-core checks the number exists and is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct WorkNumber(pub String);

impl WorkNumber {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_present(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl From<&str> for WorkNumber {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl Display for WorkNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}
