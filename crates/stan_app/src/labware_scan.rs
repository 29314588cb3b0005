//! Scanning labware into a list by barcode.
//!
//! States: `idle` (with transient `success`/`error` notices), `fetching` while a barcode is
//! being looked up, and `locked` while the caller does not accept further scans.
//!
//! The list never holds two labware with the same barcode.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crux_core::{render, App, Command};
use labware::awaiting_storage::{AwaitingStorage, AwaitingStorageError, AWAITING_STORAGE_KEY};
use labware::{Barcode, Labware, ServerError};
use serde_with::SerializeDisplay;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::effects::clipboard::{self, ClipboardResult};
use crate::effects::{session_storage, stan_core};
use crate::{graphql, rejected_event, Effect, RejectedEvent};

#[derive(Default)]
pub struct LabwareScan;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Notice {
    #[default]
    None,
    Success,
    Error,
}

/// Serialized as its dotted name, e.g. `idle.error`.
#[derive(SerializeDisplay, Clone, Debug, PartialEq, Eq)]
pub enum ScanState {
    Idle(Notice),
    Fetching(Barcode),
    Locked,
}

impl Default for ScanState {
    fn default() -> Self {
        ScanState::Idle(Notice::None)
    }
}

impl ScanState {
    /// Matches a dotted state name, e.g. `idle` matches every idle state, `idle.error` only one.
    pub fn matches(&self, name: &str) -> bool {
        let full_name = self.to_string();
        full_name == name || full_name.starts_with(&format!("{}.", name))
    }
}

impl Display for ScanState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanState::Idle(Notice::None) => f.write_str("idle"),
            ScanState::Idle(Notice::Success) => f.write_str("idle.success"),
            ScanState::Idle(Notice::Error) => f.write_str("idle.error"),
            ScanState::Fetching(_) => f.write_str("fetching"),
            ScanState::Locked => f.write_str("locked"),
        }
    }
}

#[derive(Default)]
pub struct Model {
    state: ScanState,
    labwares: Vec<Labware>,
    current_barcode: String,
    success_message: Option<String>,
    error_message: Option<String>,
    server_error: Option<ServerError>,
    /// Set once the clipboard could not be read; the user types barcodes instead.
    manual_entry_only: bool,
    /// A lock requested while a lookup was in flight, applied once it settles.
    lock_requested: bool,
    queued: VecDeque<Barcode>,

    error: Option<RejectedEvent>,
}

impl Model {
    fn contains(&self, barcode: &Barcode) -> bool {
        self.labwares
            .iter()
            .any(|labware| labware.barcode.eq(barcode))
    }

    fn notify_success(&mut self, message: String) {
        self.error_message = None;
        self.server_error = None;
        self.success_message = Some(message);
        if let ScanState::Idle(_) = self.state {
            self.state = ScanState::Idle(Notice::Success);
        }
    }

    fn notify_error(&mut self, message: String, server_error: Option<ServerError>) {
        self.success_message = None;
        self.error_message = Some(message);
        self.server_error = server_error;
        if let ScanState::Idle(_) = self.state {
            self.state = ScanState::Idle(Notice::Error);
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub enum Event {
    UpdateCurrentBarcode(String),
    /// Look up the current barcode and add the labware to the list.
    SubmitBarcode,
    RemoveLabware(Barcode),
    Lock,
    Unlock,
    /// Fill the current barcode from the clipboard.
    PasteBarcode,
    /// Scan every labware another workflow left awaiting storage.
    LoadAwaitingStorage,

    //
    // Internal
    //
    LabwareFound {
        barcode: Barcode,
        result: Result<Labware, ServerError>,
    },
    ClipboardRead(ClipboardResult),
    AwaitingStorageRead(Option<String>),
}

#[derive(serde::Serialize, Clone, Debug, Default, PartialEq)]
pub struct LabwareScanViewModel {
    pub state: ScanState,
    pub labwares: Vec<Labware>,
    pub current_barcode: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub server_error: Option<ServerError>,
    pub manual_entry_only: bool,
    pub queued: Vec<Barcode>,
    pub error: Option<RejectedEvent>,
}

#[derive(Error, Debug)]
enum ScanError {
    #[error("Labware is not in the list. barcode: {0}")]
    UnknownLabware(Barcode),
    #[error(transparent)]
    AwaitingStorage(#[from] AwaitingStorageError),
}

impl App for LabwareScan {
    type Event = Event;
    type Model = Model;
    type ViewModel = LabwareScanViewModel;
    type Capabilities = ();
    type Effect = Effect;

    fn update(
        &self,
        event: Self::Event,
        model: &mut Self::Model,
        _caps: &Self::Capabilities,
    ) -> Command<Self::Effect, Self::Event> {
        match Self::update_inner(event, model) {
            Err(e) => {
                warn!("labware scan event rejected. cause: {}", e);
                model.error.replace(rejected_event(&e));
                render::render()
            }
            Ok(command) => {
                model.error.take();
                command
            }
        }
    }

    fn view(&self, model: &Self::Model) -> Self::ViewModel {
        let view_model = LabwareScanViewModel {
            state: model.state.clone(),
            labwares: model.labwares.clone(),
            current_barcode: model.current_barcode.clone(),
            success_message: model.success_message.clone(),
            error_message: model.error_message.clone(),
            server_error: model.server_error.clone(),
            manual_entry_only: model.manual_entry_only,
            queued: model.queued.iter().cloned().collect(),
            error: model.error.clone(),
        };

        trace!("view model: {:?}", view_model);

        view_model
    }
}

impl LabwareScan {
    fn update_inner(event: Event, model: &mut Model) -> Result<Command<Effect, Event>, ScanError> {
        match event {
            Event::UpdateCurrentBarcode(text) => {
                model.current_barcode = text;
                Ok(render::render())
            }
            Event::SubmitBarcode => {
                let ScanState::Idle(_) = model.state else {
                    debug!("Ignoring barcode submission. state: {}", model.state);
                    return Ok(Command::done());
                };

                let barcode = match Barcode::from_str(&model.current_barcode) {
                    Ok(barcode) => barcode,
                    Err(e) => {
                        model.notify_error(e.to_string(), None);
                        return Ok(render::render());
                    }
                };

                if model.contains(&barcode) {
                    info!("Labware already scanned. barcode: {}", barcode);
                    model.notify_error(format!("\"{}\" has already been scanned", barcode), None);
                    return Ok(render::render());
                }

                Ok(Self::start_lookup(model, barcode))
            }
            Event::LabwareFound {
                barcode,
                result,
            } => {
                if model.state != ScanState::Fetching(barcode.clone()) {
                    warn!("Ignoring lookup result. barcode: {}, state: {}", barcode, model.state);
                    return Ok(Command::done());
                }

                model.state = match model.lock_requested {
                    true => ScanState::Locked,
                    false => ScanState::Idle(Notice::None),
                };
                model.lock_requested = false;

                match result {
                    Ok(labware) if model.contains(&labware.barcode) => {
                        model.notify_error(format!("\"{}\" has already been scanned", labware.barcode), None);
                    }
                    Ok(labware) => {
                        info!("Labware found. barcode: {}", labware.barcode);
                        if model.current_barcode.trim() == barcode.as_str() {
                            model.current_barcode.clear();
                        }
                        let message = format!("\"{}\" added", labware.barcode);
                        model.labwares.push(labware);
                        model.notify_success(message);
                    }
                    Err(error) => {
                        info!("Labware lookup failed. barcode: {}, error: {}", barcode, error);
                        model.notify_error(error.message.clone(), Some(error));
                    }
                }

                Ok(Command::all([render::render(), Self::next_queued(model)]))
            }
            Event::RemoveLabware(barcode) => {
                let index = model
                    .labwares
                    .iter()
                    .position(|labware| labware.barcode.eq(&barcode))
                    .ok_or_else(|| ScanError::UnknownLabware(barcode.clone()))?;

                model.labwares.remove(index);
                info!("Labware removed. barcode: {}", barcode);
                model.notify_success(format!("\"{}\" removed", barcode));

                Ok(render::render())
            }
            Event::Lock => {
                match model.state {
                    ScanState::Idle(_) => model.state = ScanState::Locked,
                    ScanState::Fetching(_) => model.lock_requested = true,
                    ScanState::Locked => {}
                }
                Ok(render::render())
            }
            Event::Unlock => match model.state {
                ScanState::Locked => {
                    model.state = ScanState::Idle(Notice::None);
                    Ok(Command::all([render::render(), Self::next_queued(model)]))
                }
                ScanState::Fetching(_) => {
                    model.lock_requested = false;
                    Ok(Command::done())
                }
                ScanState::Idle(_) => Ok(Command::done()),
            },
            Event::PasteBarcode => Ok(clipboard::read(Event::ClipboardRead)),
            Event::ClipboardRead(result) => {
                match result {
                    ClipboardResult::Text {
                        text,
                    } => {
                        model.current_barcode = text.trim().to_string();
                    }
                    ClipboardResult::PermissionDenied => {
                        debug!("Clipboard permission denied, falling back to manual entry.");
                        model.manual_entry_only = true;
                    }
                }
                Ok(render::render())
            }
            Event::LoadAwaitingStorage => Ok(session_storage::get(AWAITING_STORAGE_KEY, Event::AwaitingStorageRead)),
            Event::AwaitingStorageRead(value) => {
                let awaiting = AwaitingStorage::decode(value.as_deref())?;
                info!("Labware awaiting storage: {:?}", awaiting.0);

                for barcode in awaiting.0 {
                    if !model.contains(&barcode) && !model.queued.contains(&barcode) {
                        model.queued.push_back(barcode);
                    }
                }

                Ok(Command::all([
                    session_storage::remove(AWAITING_STORAGE_KEY),
                    render::render(),
                    Self::next_queued(model),
                ]))
            }
        }
    }

    fn start_lookup(model: &mut Model, barcode: Barcode) -> Command<Effect, Event> {
        info!("Looking up labware. barcode: {}", barcode);
        model.state = ScanState::Fetching(barcode.clone());

        let operation = graphql::find_labware(&barcode);
        Command::all([
            render::render(),
            stan_core::request(operation, move |result| Event::LabwareFound {
                barcode,
                result,
            }),
        ])
    }

    /// Look up the next queued barcode, when idle.
    fn next_queued(model: &mut Model) -> Command<Effect, Event> {
        let ScanState::Idle(_) = model.state else {
            return Command::done();
        };

        while let Some(barcode) = model.queued.pop_front() {
            if !model.contains(&barcode) {
                return Self::start_lookup(model, barcode);
            }
        }
        Command::done()
    }
}
