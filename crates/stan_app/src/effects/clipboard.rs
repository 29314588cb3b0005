use crux_core::capability::Operation;
use crux_core::{Command, Request};

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ClipboardOperation {
    Read,
}

/// Reading the clipboard needs the user's permission, denial is an expected outcome.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ClipboardResult {
    Text { text: String },
    PermissionDenied,
}

impl Operation for ClipboardOperation {
    type Output = ClipboardResult;
}

pub fn read<Effect, Event, F>(make_event: F) -> Command<Effect, Event>
where
    Effect: From<Request<ClipboardOperation>> + Send + 'static,
    Event: Send + 'static,
    F: FnOnce(ClipboardResult) -> Event + Send + 'static,
{
    Command::request_from_shell(ClipboardOperation::Read).then_send(make_event)
}
