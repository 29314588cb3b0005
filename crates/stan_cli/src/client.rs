//! Executes stan-core operations over HTTP.

use async_trait::async_trait;
use labware::ServerError;
use serde::Deserialize;
use serde_json::json;
use stan_app::effects::stan_core::{StanCoreOperation, StanCoreResult};
use thiserror::Error;
use tracing::{debug, trace};

#[async_trait]
pub trait StanCoreClient: Send + Sync {
    async fn execute(&self, operation: &StanCoreOperation) -> StanCoreResult;
}

#[derive(Error, Debug)]
enum ClientError {
    #[error("Unable to reach stan-core. cause: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected response from stan-core. status: {0}")]
    UnexpectedResponse(u16),
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorExtensions {
    #[serde(default)]
    problems: Vec<String>,
}

/// The first error wins; stan-core reports one error per request.
fn into_result(response: GraphQlResponse) -> StanCoreResult {
    match response.errors.into_iter().next() {
        Some(error) => StanCoreResult::Err {
            error: ServerError::with_problems(
                error.message,
                error
                    .extensions
                    .map(|extensions| extensions.problems)
                    .unwrap_or_default(),
            ),
        },
        None => StanCoreResult::Ok {
            data: response
                .data
                .unwrap_or(serde_json::Value::Null),
        },
    }
}

pub struct HttpStanCoreClient {
    client: reqwest::Client,
    url: String,
}

impl HttpStanCoreClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    async fn post(&self, operation: &StanCoreOperation) -> Result<GraphQlResponse, ClientError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "operationName": operation.operation_name,
                "query": operation.query,
                "variables": operation.variables,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        trace!("stan-core response. status: {}, body: {}", status, body);

        serde_json::from_str(&body).map_err(|_| ClientError::UnexpectedResponse(status.as_u16()))
    }
}

#[async_trait]
impl StanCoreClient for HttpStanCoreClient {
    async fn execute(&self, operation: &StanCoreOperation) -> StanCoreResult {
        debug!("stan-core request. operation: {}, url: {}", operation.operation_name, self.url);

        match self.post(operation).await {
            Ok(response) => into_result(response),
            Err(e) => StanCoreResult::Err {
                error: ServerError::new(e.to_string()),
            },
        }
    }
}
