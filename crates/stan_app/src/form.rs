//! The generic form submission machine.
//!
//! ```text
//! fillingOutForm --SubmitForm--> submitting --(resolved)--> submitted --Reset--> fillingOutForm
//!                                           --(rejected)--> fillingOutForm
//! ```
//!
//! Exactly one stan-core request is issued per accepted `SubmitForm`; the machine stays in
//! `submitting` until it settles, so a second submission cannot be made in the meantime.

use std::fmt::Debug;
use std::marker::PhantomData;

use crux_core::{render, App, Command};
use labware::awaiting_storage::{AwaitingStorage, AwaitingStorageError, AWAITING_STORAGE_KEY};
use labware::{Barcode, ServerError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use validator::Validate;

use crate::effects::session_storage;
use crate::effects::stan_core::{self, StanCoreOperation};
use crate::validation::{field_errors, FieldError};
use crate::{rejected_event, Effect, RejectedEvent};

/// A stan-core mutation that a form submits.
pub trait Mutation: 'static {
    type Request: Validate + Serialize + Clone + Debug + Send + Unpin + 'static;
    type Response: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Unpin + 'static;

    fn operation(request: &Self::Request) -> StanCoreOperation;

    /// Labware produced by the operation that the user may send on to the storage workflow.
    fn labware_for_storage(_response: &Self::Response) -> Vec<Barcode> {
        vec![]
    }
}

pub struct FormMachine<M> {
    _mutation: PhantomData<M>,
}

impl<M> Default for FormMachine<M> {
    fn default() -> Self {
        Self {
            _mutation: PhantomData,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "camelCase")]
pub enum FormState {
    #[default]
    FillingOutForm,
    Submitting,
    Submitted,
}

pub struct FormModel<Req, Res> {
    state: FormState,
    request: Option<Req>,
    result: Option<Res>,
    server_error: Option<ServerError>,
    validation_errors: Vec<FieldError>,
    error: Option<RejectedEvent>,
}

impl<Req, Res> Default for FormModel<Req, Res> {
    fn default() -> Self {
        Self {
            state: FormState::default(),
            request: None,
            result: None,
            server_error: None,
            validation_errors: vec![],
            error: None,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub enum FormEvent<Req, Res> {
    SubmitForm(Req),
    Reset,
    /// Hand the labware produced by the submission to the storage workflow.
    AwaitStorage,

    //
    // Internal
    //
    SubmissionResolved(Result<Res, ServerError>),
    AwaitingStorageRead(Option<String>),
}

#[skip_serializing_none]
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct FormViewModel<Req, Res> {
    pub state: FormState,
    pub request: Option<Req>,
    pub result: Option<Res>,
    pub server_error: Option<ServerError>,
    pub validation_errors: Vec<FieldError>,
    pub error: Option<RejectedEvent>,
}

#[derive(Error, Debug)]
enum FormError {
    #[error("Only a submitted form can send labware to storage. state: {0}")]
    NotSubmitted(FormState),
    #[error(transparent)]
    AwaitingStorage(#[from] AwaitingStorageError),
}

type FormCommand<M> = Command<Effect, FormEvent<<M as Mutation>::Request, <M as Mutation>::Response>>;

impl<M: Mutation> App for FormMachine<M> {
    type Event = FormEvent<M::Request, M::Response>;
    type Model = FormModel<M::Request, M::Response>;
    type ViewModel = FormViewModel<M::Request, M::Response>;
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
                warn!("form event rejected. cause: {}", e);
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
        let view_model = FormViewModel {
            state: model.state,
            request: model.request.clone(),
            result: model.result.clone(),
            server_error: model.server_error.clone(),
            validation_errors: model.validation_errors.clone(),
            error: model.error.clone(),
        };

        trace!("view model: {:?}", view_model);

        view_model
    }
}

impl<M: Mutation> FormMachine<M> {
    fn update_inner(
        event: FormEvent<M::Request, M::Response>,
        model: &mut FormModel<M::Request, M::Response>,
    ) -> Result<FormCommand<M>, FormError> {
        match event {
            FormEvent::SubmitForm(request) => {
                if model.state != FormState::FillingOutForm {
                    debug!("Ignoring submission. state: {}", model.state);
                    return Ok(Command::done());
                }

                if let Err(errors) = request.validate() {
                    model.validation_errors = field_errors(&errors);
                    info!("Form is invalid. errors: {:?}", model.validation_errors);
                    return Ok(render::render());
                }

                let operation = M::operation(&request);
                info!("Submitting form. operation: {}", operation.operation_name);

                model.validation_errors.clear();
                model.server_error = None;
                model.request = Some(request);
                model.state = FormState::Submitting;

                Ok(Command::all([
                    render::render(),
                    stan_core::request(operation, FormEvent::SubmissionResolved),
                ]))
            }
            FormEvent::SubmissionResolved(result) => {
                if model.state != FormState::Submitting {
                    warn!("Ignoring submission result. state: {}", model.state);
                    return Ok(Command::done());
                }

                match result {
                    Ok(response) => {
                        info!("Submission succeeded.");
                        model.result = Some(response);
                        model.state = FormState::Submitted;
                    }
                    Err(error) => {
                        info!("Submission failed. error: {}", error);
                        model.server_error = Some(error);
                        model.state = FormState::FillingOutForm;
                    }
                }
                Ok(render::render())
            }
            FormEvent::Reset => {
                if model.state != FormState::Submitted {
                    debug!("Ignoring reset. state: {}", model.state);
                    return Ok(Command::done());
                }

                model.state = FormState::FillingOutForm;
                model.request = None;
                model.result = None;
                model.server_error = None;
                model.validation_errors.clear();
                Ok(render::render())
            }
            FormEvent::AwaitStorage => {
                let Some(result) = model
                    .result
                    .as_ref()
                    .filter(|_| model.state == FormState::Submitted)
                else {
                    return Err(FormError::NotSubmitted(model.state));
                };

                if M::labware_for_storage(result).is_empty() {
                    debug!("No labware to store.");
                    return Ok(Command::done());
                }

                Ok(session_storage::get(AWAITING_STORAGE_KEY, FormEvent::AwaitingStorageRead))
            }
            FormEvent::AwaitingStorageRead(existing) => {
                let Some(result) = model.result.as_ref() else {
                    return Err(FormError::NotSubmitted(model.state));
                };

                let mut awaiting = AwaitingStorage::decode(existing.as_deref())?;
                for barcode in M::labware_for_storage(result) {
                    awaiting.push(barcode);
                }
                info!("Labware awaiting storage: {:?}", awaiting.0);

                Ok(Command::all([
                    session_storage::set(AWAITING_STORAGE_KEY, awaiting.encode()?),
                    render::render(),
                ]))
            }
        }
    }
}

#[cfg(test)]
mod form_tests {
    use std::str::FromStr;

    use crux_core::App;
    use labware::{Barcode, ServerError, WorkNumber};
    use serde_json::json;

    use super::*;
    use crate::effects::session_storage::{SessionStorageOperation, SessionStorageResult};
    use crate::effects::stan_core::StanCoreResult;
    use crate::mutations::{Destroy, DestroyRequest, DestroyResult, Extract, ExtractRequest};
    use crate::testing::{effects, events};

    fn destroy_request() -> DestroyRequest {
        DestroyRequest {
            barcodes: vec![Barcode::from_str("STAN-611").unwrap()],
            reason_id: 2,
            work_number: Some(WorkNumber::from("SGP1008")),
        }
    }

    fn destroy_response() -> serde_json::Value {
        json!({ "destroy": { "destructions": [ { "labware": { "barcode": "STAN-611" } } ] } })
    }

    #[test]
    fn resolved_submission_is_submitted() {
        // given
        let app = FormMachine::<Destroy>::default();
        let mut model = FormModel::default();

        // when
        let mut command = app.update(FormEvent::SubmitForm(destroy_request()), &mut model, &());

        // then
        let mut effects = effects(&mut command);
        assert_eq!(effects.stan_core.len(), 1);
        assert_eq!(app.view(&model).state, FormState::Submitting);

        let request = &mut effects.stan_core[0];
        assert_eq!(request.operation.operation_name, "Destroy");
        assert_eq!(request.operation.variables["request"]["reasonId"], json!(2));
        request
            .resolve(StanCoreResult::Ok {
                data: destroy_response(),
            })
            .unwrap();

        let resolved = events(&mut command);
        assert_eq!(resolved.len(), 1);
        for event in resolved {
            let _ = app.update(event, &mut model, &());
        }

        // and
        let view = app.view(&model);
        assert_eq!(view.state, FormState::Submitted);
        let expected_result: DestroyResult = serde_json::from_value(destroy_response()["destroy"].clone()).unwrap();
        assert_eq!(view.result, Some(expected_result));
        assert_eq!(view.server_error, None);
    }

    #[test]
    fn rejected_submission_returns_to_filling_out_form() {
        // given
        let app = FormMachine::<Destroy>::default();
        let mut model = FormModel::default();
        let mut command = app.update(FormEvent::SubmitForm(destroy_request()), &mut model, &());
        let mut effects = effects(&mut command);

        // when
        let error = ServerError::with_problems("The request could not be validated.", vec![
            "Labware already destroyed: [STAN-611]".to_string(),
        ]);
        effects.stan_core[0]
            .resolve(StanCoreResult::Err {
                error: error.clone(),
            })
            .unwrap();
        for event in events(&mut command) {
            let _ = app.update(event, &mut model, &());
        }

        // then
        let view = app.view(&model);
        assert_eq!(view.state, FormState::FillingOutForm);
        assert_eq!(view.server_error, Some(error));
        assert_eq!(view.result, None);
    }

    #[test]
    fn submit_while_submitting_issues_no_second_request() {
        // given
        let app = FormMachine::<Destroy>::default();
        let mut model = FormModel::default();
        let mut first = app.update(FormEvent::SubmitForm(destroy_request()), &mut model, &());
        assert_eq!(effects(&mut first).stan_core.len(), 1);

        // when
        let mut second = app.update(FormEvent::SubmitForm(destroy_request()), &mut model, &());

        // then
        let effects = effects(&mut second);
        assert!(effects.stan_core.is_empty());
        assert_eq!(app.view(&model).state, FormState::Submitting);
    }

    #[test]
    fn invalid_request_is_never_sent() {
        // given
        let app = FormMachine::<Destroy>::default();
        let mut model = FormModel::default();
        let request = DestroyRequest {
            barcodes: vec![],
            reason_id: 2,
            work_number: None,
        };

        // when
        let mut command = app.update(FormEvent::SubmitForm(request), &mut model, &());

        // then
        let effects = effects(&mut command);
        assert!(effects.stan_core.is_empty());
        let view = app.view(&model);
        assert_eq!(view.state, FormState::FillingOutForm);
        assert_eq!(view.validation_errors, vec![FieldError::new(
            "barcodes",
            "At least one labware is required"
        )]);
    }

    #[test]
    fn reset_clears_result() {
        // given
        let app = FormMachine::<Destroy>::default();
        let mut model = FormModel::default();
        let mut command = app.update(FormEvent::SubmitForm(destroy_request()), &mut model, &());
        effects(&mut command).stan_core[0]
            .resolve(StanCoreResult::Ok {
                data: destroy_response(),
            })
            .unwrap();
        for event in events(&mut command) {
            let _ = app.update(event, &mut model, &());
        }
        assert_eq!(app.view(&model).state, FormState::Submitted);

        // when
        let _ = app.update(FormEvent::Reset, &mut model, &());

        // then
        let view = app.view(&model);
        assert_eq!(view.state, FormState::FillingOutForm);
        assert_eq!(view.result, None);
        assert_eq!(view.request, None);
    }

    #[test]
    fn await_storage_merges_into_session_storage() {
        // given
        let app = FormMachine::<Extract>::default();
        let mut model = FormModel::default();
        let request = ExtractRequest {
            barcodes: vec![Barcode::from_str("STAN-1").unwrap()],
            labware_type: "Tube".to_string(),
            work_number: WorkNumber::from("SGP1"),
        };
        let mut command = app.update(FormEvent::SubmitForm(request), &mut model, &());
        effects(&mut command).stan_core[0]
            .resolve(StanCoreResult::Ok {
                data: json!({ "extract": { "labware": [ {
                    "id": 2,
                    "barcode": "STAN-2",
                    "labwareType": { "name": "Tube", "numRows": 1, "numColumns": 1 },
                    "slots": []
                } ] } }),
            })
            .unwrap();
        for event in events(&mut command) {
            let _ = app.update(event, &mut model, &());
        }

        // when
        let mut command = app.update(FormEvent::AwaitStorage, &mut model, &());

        // then
        let mut storage = effects(&mut command).session_storage;
        assert_eq!(storage.len(), 1);
        assert_eq!(storage[0].operation, SessionStorageOperation::Get {
            key: "awaitingStorage".to_string()
        });
        storage[0]
            .resolve(SessionStorageResult {
                value: Some(r#"["STAN-9"]"#.to_string()),
            })
            .unwrap();

        let read = events(&mut command);
        assert_eq!(read.len(), 1);
        let mut command = app.update(read.into_iter().next().unwrap(), &mut model, &());
        let storage = effects(&mut command).session_storage;
        assert_eq!(storage[0].operation, SessionStorageOperation::Set {
            key: "awaitingStorage".to_string(),
            value: r#"["STAN-9","STAN-2"]"#.to_string(),
        });
    }

    #[test]
    fn await_storage_before_submission_is_rejected() {
        let app = FormMachine::<Extract>::default();
        let mut model = FormModel::default();

        let mut command = app.update(FormEvent::AwaitStorage, &mut model, &());

        assert_eq!(effects(&mut command).renders, 1);
        assert!(app.view(&model).error.is_some());
    }
}
