use itertools::Itertools;
use thiserror::Error;

/// An error reported by stan-core, or by the transport used to reach it.
///
/// The message is what the user sees in the warning banner; `problems` is the optional list of
/// specific issues the server found with the request.
#[derive(Debug, Error, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[error("{message}{}", format_problems(.problems))]
pub struct ServerError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            problems: vec![],
        }
    }

    pub fn with_problems(message: impl Into<String>, problems: Vec<String>) -> Self {
        Self {
            message: message.into(),
            problems,
        }
    }
}

fn format_problems(problems: &[String]) -> String {
    if problems.is_empty() {
        return String::new();
    }

    format!(" problems: [{}]", problems.iter().join(", "))
}
