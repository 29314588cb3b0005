use crux_core::capability::Operation;
use crux_core::{Command, Request};

/// Transient key/value storage that lives as long as the user's session.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum SessionStorageOperation {
    Get { key: String },
    Set { key: String, value: String },
    Remove { key: String },
}

/// `value` is the stored value for `Get`, and always `None` for `Set` and `Remove`.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStorageResult {
    pub value: Option<String>,
}

impl Operation for SessionStorageOperation {
    type Output = SessionStorageResult;
}

pub fn get<Effect, Event, F>(key: &str, make_event: F) -> Command<Effect, Event>
where
    Effect: From<Request<SessionStorageOperation>> + Send + 'static,
    Event: Send + 'static,
    F: FnOnce(Option<String>) -> Event + Send + 'static,
{
    Command::request_from_shell(SessionStorageOperation::Get {
        key: key.to_string(),
    })
    .then_send(move |result: SessionStorageResult| make_event(result.value))
}

pub fn set<Effect, Event>(key: &str, value: String) -> Command<Effect, Event>
where
    Effect: From<Request<SessionStorageOperation>> + Send + 'static,
    Event: Send + 'static,
{
    let operation = SessionStorageOperation::Set {
        key: key.to_string(),
        value,
    };
    Command::new(|ctx| async move {
        ctx.request_from_shell(operation).await;
    })
}

pub fn remove<Effect, Event>(key: &str) -> Command<Effect, Event>
where
    Effect: From<Request<SessionStorageOperation>> + Send + 'static,
    Event: Send + 'static,
{
    let operation = SessionStorageOperation::Remove {
        key: key.to_string(),
    };
    Command::new(|ctx| async move {
        ctx.request_from_shell(operation).await;
    })
}
