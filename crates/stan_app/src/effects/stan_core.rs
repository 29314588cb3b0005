use std::future::Future;

use crux_core::capability::Operation;
use crux_core::command::RequestBuilder;
use crux_core::{Command, Request};
use labware::ServerError;
use serde::de::DeserializeOwned;

/// A single GraphQL request to stan-core.
///
/// The shell owns the client that executes these, the machines only describe them.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StanCoreOperation {
    pub operation_name: String,
    pub query: String,
    pub variables: serde_json::Value,
    /// The field of `data` holding the result, e.g. `labware` for `FindLabware`.
    pub root_field: String,
}

impl StanCoreOperation {
    pub fn new(operation_name: &str, query: &str, root_field: &str, variables: serde_json::Value) -> Self {
        Self {
            operation_name: operation_name.to_string(),
            query: query.to_string(),
            variables,
            root_field: root_field.to_string(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub enum StanCoreResult {
    Ok { data: serde_json::Value },
    Err { error: ServerError },
}

impl StanCoreResult {
    /// Extract `data[root_field]` as `T`.
    ///
    /// A response that does not have the expected shape is reported like any other server error.
    pub fn decode<T: DeserializeOwned>(self, root_field: &str) -> Result<T, ServerError> {
        match self {
            StanCoreResult::Err {
                error,
            } => Err(error),
            StanCoreResult::Ok {
                mut data,
            } => {
                let value = data
                    .get_mut(root_field)
                    .map(serde_json::Value::take)
                    .ok_or_else(|| ServerError::new(format!("Response is missing field '{}'", root_field)))?;

                serde_json::from_value(value)
                    .map_err(|e| ServerError::new(format!("Unexpected response for '{}'. cause: {}", root_field, e)))
            }
        }
    }
}

impl Operation for StanCoreOperation {
    type Output = StanCoreResult;
}

pub fn request_builder<Effect, Event>(
    operation: StanCoreOperation,
) -> RequestBuilder<Effect, Event, impl Future<Output = StanCoreResult>>
where
    Effect: From<Request<StanCoreOperation>> + Send + 'static,
    Event: Send + 'static,
{
    Command::request_from_shell(operation)
}

/// Issue `operation` and send `make_event` with the decoded `root_field` of the response.
pub fn request<Effect, Event, T, F>(operation: StanCoreOperation, make_event: F) -> Command<Effect, Event>
where
    Effect: From<Request<StanCoreOperation>> + Send + 'static,
    Event: Send + 'static,
    T: DeserializeOwned,
    F: FnOnce(Result<T, ServerError>) -> Event + Send + 'static,
{
    let root_field = operation.root_field.clone();
    request_builder(operation).then_send(move |result: StanCoreResult| make_event(result.decode(&root_field)))
}
