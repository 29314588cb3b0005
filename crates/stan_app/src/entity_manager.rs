//! Maintains a small admin lookup table (destruction reasons, species, ...).
//!
//! ```text
//! ready --DraftNewEntity--> draftCreation --CreateNewEntity--> loading.creatingEntity --> ready
//! ready --ValueChanged--> loading.valueChanged --> ready
//! ready --ExtraPropertyChanged--> loading.updatingExtraProperty --> ready
//! ```
//!
//! Changes are only applied once stan-core confirms them, so a failure leaves the list untouched.

use std::fmt::Debug;
use std::marker::PhantomData;

use crux_core::{render, App, Command};
use labware::ServerError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::effects::stan_core::{self, StanCoreOperation};
use crate::validation::FieldError;
use crate::{rejected_event, Effect, RejectedEvent};

/// An entry of an admin lookup table, identified by a key field.
pub trait ManagedEntity: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Unpin + 'static {
    /// Used in messages, e.g. `Destruction reason`.
    const ENTITY_NAME: &'static str;
    /// Name of the required extra property, if the entity has one.
    const EXTRA_PROPERTY: Option<&'static str> = None;

    /// The text the user sees and types, e.g. the reason or the species name.
    fn value(&self) -> &str;

    /// Identifies the entity in events and when merging results. Defaults to the value.
    fn key(&self) -> String {
        self.value().to_string()
    }

    fn enabled(&self) -> bool;

    fn extra_property(&self) -> Option<&str> {
        None
    }

    /// Lists every entity, including disabled ones.
    fn list() -> StanCoreOperation;

    fn create(value: &str, extra_property: Option<&str>) -> StanCoreOperation;

    fn set_enabled(&self, enabled: bool) -> StanCoreOperation;

    /// `None` for entities without an extra property.
    fn set_extra_property(&self, _value: &str) -> Option<StanCoreOperation> {
        None
    }
}

pub struct EntityManager<E> {
    _entity: PhantomData<E>,
}

impl<E> Default for EntityManager<E> {
    fn default() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "camelCase")]
pub enum LoadingOperation {
    ValueChanged,
    CreatingEntity,
    UpdatingExtraProperty,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntityManagerState {
    #[default]
    Ready,
    DraftCreation,
    Loading(LoadingOperation),
}

impl std::fmt::Display for EntityManagerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityManagerState::Ready => f.write_str("ready"),
            EntityManagerState::DraftCreation => f.write_str("draftCreation"),
            EntityManagerState::Loading(operation) => write!(f, "loading.{}", operation),
        }
    }
}

pub struct EntityManagerModel<E> {
    state: EntityManagerState,
    entities: Vec<E>,
    success_message: Option<String>,
    server_error: Option<ServerError>,
    validation_errors: Vec<FieldError>,
    error: Option<RejectedEvent>,
}

impl<E> Default for EntityManagerModel<E> {
    fn default() -> Self {
        Self {
            state: EntityManagerState::default(),
            entities: vec![],
            success_message: None,
            server_error: None,
            validation_errors: vec![],
            error: None,
        }
    }
}

impl<E: ManagedEntity> EntityManagerModel<E> {
    /// Replace the entity with the same key, or append a new one.
    fn merge(&mut self, entity: E) {
        let key = entity.key();
        match self
            .entities
            .iter_mut()
            .find(|existing| existing.key() == key)
        {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }

    /// An entity with the same value and extra property, e.g. the same comment text in the same category.
    fn find_duplicate(&self, value: &str, extra_property: Option<&str>) -> Option<&E> {
        self.entities
            .iter()
            .find(|entity| entity.value() == value && entity.extra_property() == extra_property)
    }

    fn find(&self, key: &str) -> Option<&E> {
        self.entities
            .iter()
            .find(|entity| entity.key() == key)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub enum EntityManagerEvent<E> {
    SetEntities(Vec<E>),
    DraftNewEntity,
    DiscardDraft,
    CreateNewEntity {
        value: String,
        extra_property: Option<String>,
    },
    ValueChanged {
        key: String,
        enabled: bool,
    },
    ExtraPropertyChanged {
        key: String,
        value: Option<String>,
    },

    //
    // Internal
    //
    EntityResolved {
        operation: LoadingOperation,
        result: Result<E, ServerError>,
    },
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct EntityManagerViewModel<E> {
    pub state: EntityManagerState,
    pub entities: Vec<E>,
    pub success_message: Option<String>,
    pub server_error: Option<ServerError>,
    pub validation_errors: Vec<FieldError>,
    pub error: Option<RejectedEvent>,
}

#[derive(Error, Debug)]
enum EntityManagerError {
    #[error("Event not allowed. state: {0}, event: {1}")]
    NotAllowed(EntityManagerState, &'static str),
    #[error("Unknown {0}. key: '{1}'")]
    UnknownEntity(&'static str, String),
    #[error("{0} has no extra property")]
    NoExtraProperty(&'static str),
}

impl<E: ManagedEntity> App for EntityManager<E> {
    type Event = EntityManagerEvent<E>;
    type Model = EntityManagerModel<E>;
    type ViewModel = EntityManagerViewModel<E>;
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
                warn!("entity manager event rejected. cause: {}", e);
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
        let view_model = EntityManagerViewModel {
            state: model.state,
            entities: model.entities.clone(),
            success_message: model.success_message.clone(),
            server_error: model.server_error.clone(),
            validation_errors: model.validation_errors.clone(),
            error: model.error.clone(),
        };

        trace!("view model: {:?}", view_model);

        view_model
    }
}

impl<E: ManagedEntity> EntityManager<E> {
    fn update_inner(
        event: EntityManagerEvent<E>,
        model: &mut EntityManagerModel<E>,
    ) -> Result<Command<Effect, EntityManagerEvent<E>>, EntityManagerError> {
        match event {
            EntityManagerEvent::SetEntities(entities) => {
                info!("{} entities loaded. count: {}", E::ENTITY_NAME, entities.len());
                model.entities = entities;
                Ok(render::render())
            }
            EntityManagerEvent::DraftNewEntity => {
                Self::require_state(model, EntityManagerState::Ready, "DraftNewEntity")?;
                model.state = EntityManagerState::DraftCreation;
                model.success_message = None;
                model.server_error = None;
                Ok(render::render())
            }
            EntityManagerEvent::DiscardDraft => {
                Self::require_state(model, EntityManagerState::DraftCreation, "DiscardDraft")?;
                model.state = EntityManagerState::Ready;
                model.validation_errors.clear();
                Ok(render::render())
            }
            EntityManagerEvent::CreateNewEntity {
                value,
                extra_property,
            } => {
                Self::require_state(model, EntityManagerState::DraftCreation, "CreateNewEntity")?;

                let value = value.trim();
                let extra_property = extra_property
                    .as_deref()
                    .map(str::trim)
                    .filter(|extra| !extra.is_empty());

                let mut validation_errors = vec![];
                if value.is_empty() {
                    validation_errors.push(FieldError::new("value", "A value is required"));
                } else if model
                    .find_duplicate(value, extra_property)
                    .is_some()
                {
                    validation_errors.push(FieldError::new(
                        "value",
                        &format!("{} \"{}\" already exists", E::ENTITY_NAME, value),
                    ));
                }
                if let (Some(name), None) = (E::EXTRA_PROPERTY, extra_property) {
                    validation_errors.push(FieldError::new("extra_property", &format!("A {} is required", name)));
                }
                model.validation_errors = validation_errors;
                if !model.validation_errors.is_empty() {
                    return Ok(render::render());
                }

                Ok(Self::start(
                    model,
                    LoadingOperation::CreatingEntity,
                    E::create(value, extra_property),
                ))
            }
            EntityManagerEvent::ValueChanged {
                key,
                enabled,
            } => {
                Self::require_state(model, EntityManagerState::Ready, "ValueChanged")?;
                let entity = model
                    .find(&key)
                    .ok_or(EntityManagerError::UnknownEntity(E::ENTITY_NAME, key.clone()))?;
                let operation = entity.set_enabled(enabled);

                Ok(Self::start(model, LoadingOperation::ValueChanged, operation))
            }
            EntityManagerEvent::ExtraPropertyChanged {
                key,
                value,
            } => {
                Self::require_state(model, EntityManagerState::Ready, "ExtraPropertyChanged")?;
                let name = E::EXTRA_PROPERTY.ok_or(EntityManagerError::NoExtraProperty(E::ENTITY_NAME))?;
                let entity = model
                    .find(&key)
                    .ok_or(EntityManagerError::UnknownEntity(E::ENTITY_NAME, key.clone()))?;

                let value = value.as_deref().map(str::trim).unwrap_or_default();
                if value.is_empty() {
                    model.validation_errors = vec![FieldError::new("extra_property", &format!("A {} is required", name))];
                    return Ok(render::render());
                }
                let operation = entity
                    .set_extra_property(value)
                    .ok_or(EntityManagerError::NoExtraProperty(E::ENTITY_NAME))?;
                model.validation_errors.clear();

                Ok(Self::start(model, LoadingOperation::UpdatingExtraProperty, operation))
            }
            EntityManagerEvent::EntityResolved {
                operation,
                result,
            } => {
                if model.state != EntityManagerState::Loading(operation) {
                    warn!("Ignoring result. operation: {}, state: {}", operation, model.state);
                    return Ok(Command::done());
                }
                model.state = EntityManagerState::Ready;

                match result {
                    Ok(entity) => {
                        let message = match operation {
                            LoadingOperation::CreatingEntity => {
                                format!("{} \"{}\" created", E::ENTITY_NAME, entity.value())
                            }
                            LoadingOperation::ValueChanged | LoadingOperation::UpdatingExtraProperty => {
                                format!("{} \"{}\" updated", E::ENTITY_NAME, entity.value())
                            }
                        };
                        info!("{}", message);
                        model.merge(entity);
                        model.success_message = Some(message);
                    }
                    Err(error) => {
                        info!("{} operation failed. operation: {}, error: {}", E::ENTITY_NAME, operation, error);
                        model.server_error = Some(error);
                    }
                }
                Ok(render::render())
            }
        }
    }

    fn require_state(
        model: &EntityManagerModel<E>,
        expected: EntityManagerState,
        event: &'static str,
    ) -> Result<(), EntityManagerError> {
        match model.state == expected {
            true => Ok(()),
            false => Err(EntityManagerError::NotAllowed(model.state, event)),
        }
    }

    fn start(
        model: &mut EntityManagerModel<E>,
        operation: LoadingOperation,
        request: StanCoreOperation,
    ) -> Command<Effect, EntityManagerEvent<E>> {
        debug!("{} {}. operation: {}", E::ENTITY_NAME, operation, request.operation_name);
        model.state = EntityManagerState::Loading(operation);
        model.success_message = None;
        model.server_error = None;

        Command::all([
            render::render(),
            stan_core::request(request, move |result| EntityManagerEvent::EntityResolved {
                operation,
                result,
            }),
        ])
    }
}

#[cfg(test)]
mod entity_manager_tests {
    use crux_core::Core;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::effects::stan_core::StanCoreResult;
    use crate::entities::{Comment, DestructionReason};
    use crate::testing::{effects, events};

    fn reasons() -> Vec<DestructionReason> {
        vec![
            DestructionReason {
                text: "Contaminated".to_string(),
                enabled: true,
            },
            DestructionReason {
                text: "Damaged".to_string(),
                enabled: false,
            },
        ]
    }

    fn resolve_with<E: ManagedEntity>(
        app: &EntityManager<E>,
        model: &mut EntityManagerModel<E>,
        mut command: Command<Effect, EntityManagerEvent<E>>,
        result: StanCoreResult,
    ) {
        let mut requests = effects(&mut command).stan_core;
        assert_eq!(requests.len(), 1);
        requests[0]
            .resolve(result)
            .unwrap();
        for event in events(&mut command) {
            let _ = app.update(event, model, &());
        }
    }

    #[test]
    fn create_new_entity() {
        // given
        let app = EntityManager::<DestructionReason>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::SetEntities(reasons()), &mut model, &());

        // when
        let _ = app.update(EntityManagerEvent::DraftNewEntity, &mut model, &());
        assert_eq!(app.view(&model).state, EntityManagerState::DraftCreation);
        let command = app.update(
            EntityManagerEvent::CreateNewEntity {
                value: "Expired".to_string(),
                extra_property: None,
            },
            &mut model,
            &(),
        );
        assert_eq!(
            app.view(&model).state,
            EntityManagerState::Loading(LoadingOperation::CreatingEntity)
        );
        resolve_with(&app, &mut model, command, StanCoreResult::Ok {
            data: json!({ "addDestructionReason": { "text": "Expired", "enabled": true } }),
        });

        // then
        let view = app.view(&model);
        assert_eq!(view.state, EntityManagerState::Ready);
        assert_eq!(view.entities.len(), 3);
        assert_eq!(view.entities[2].text, "Expired");
        assert_eq!(
            view.success_message,
            Some("Destruction reason \"Expired\" created".to_string())
        );
    }

    #[test]
    fn value_changed_merges_by_key() {
        // given
        let app = EntityManager::<DestructionReason>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::SetEntities(reasons()), &mut model, &());

        // when
        let command = app.update(
            EntityManagerEvent::ValueChanged {
                key: "Damaged".to_string(),
                enabled: true,
            },
            &mut model,
            &(),
        );
        resolve_with(&app, &mut model, command, StanCoreResult::Ok {
            data: json!({ "setDestructionReasonEnabled": { "text": "Damaged", "enabled": true } }),
        });

        // then
        let view = app.view(&model);
        assert_eq!(view.entities.len(), 2);
        assert!(view.entities[1].enabled);
        assert_eq!(view.state, EntityManagerState::Ready);
    }

    #[test]
    fn failure_leaves_entities_untouched() {
        // given
        let app = EntityManager::<DestructionReason>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::SetEntities(reasons()), &mut model, &());

        // when
        let command = app.update(
            EntityManagerEvent::ValueChanged {
                key: "Contaminated".to_string(),
                enabled: false,
            },
            &mut model,
            &(),
        );
        let error = ServerError::new("Permission denied");
        resolve_with(&app, &mut model, command, StanCoreResult::Err {
            error: error.clone(),
        });

        // then
        let view = app.view(&model);
        assert_eq!(view.entities, reasons());
        assert_eq!(view.server_error, Some(error));
        assert_eq!(view.state, EntityManagerState::Ready);
    }

    #[test]
    fn empty_value_issues_no_request() {
        let app = EntityManager::<DestructionReason>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::DraftNewEntity, &mut model, &());

        let mut command = app.update(
            EntityManagerEvent::CreateNewEntity {
                value: "   ".to_string(),
                extra_property: None,
            },
            &mut model,
            &(),
        );

        assert!(effects(&mut command).stan_core.is_empty());
        let view = app.view(&model);
        assert_eq!(view.state, EntityManagerState::DraftCreation);
        assert_eq!(view.validation_errors, vec![FieldError::new("value", "A value is required")]);
    }

    #[test]
    fn extra_property_requires_support() {
        let app = EntityManager::<DestructionReason>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::SetEntities(reasons()), &mut model, &());

        let mut command = app.update(
            EntityManagerEvent::ExtraPropertyChanged {
                key: "Damaged".to_string(),
                value: Some("Anything".to_string()),
            },
            &mut model,
            &(),
        );

        assert!(effects(&mut command).stan_core.is_empty());
        assert!(app.view(&model).error.is_some());
    }

    #[test]
    fn update_extra_property() {
        // given
        let app = EntityManager::<Comment>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(
            EntityManagerEvent::SetEntities(vec![Comment {
                id: 4,
                text: "Poor section".to_string(),
                category: "section".to_string(),
                enabled: true,
            }]),
            &mut model,
            &(),
        );

        // when
        let command = app.update(
            EntityManagerEvent::ExtraPropertyChanged {
                key: "4".to_string(),
                value: Some("Stain QC".to_string()),
            },
            &mut model,
            &(),
        );
        assert!(app
            .view(&model)
            .state
            .to_string()
            .eq("loading.updatingExtraProperty"));
        resolve_with(&app, &mut model, command, StanCoreResult::Ok {
            data: json!({ "setCommentCategory": { "id": 4, "text": "Poor section", "category": "Stain QC", "enabled": true } }),
        });

        // then
        let view = app.view(&model);
        assert_eq!(view.entities[0].category, "Stain QC");
        assert_eq!(view.success_message, Some("Comment \"Poor section\" updated".to_string()));
    }

    fn poor_quality_comments() -> Vec<Comment> {
        vec![
            Comment {
                id: 1,
                text: "Poor quality".to_string(),
                category: "section".to_string(),
                enabled: true,
            },
            Comment {
                id: 2,
                text: "Poor quality".to_string(),
                category: "stain".to_string(),
                enabled: true,
            },
        ]
    }

    #[test]
    fn comments_sharing_text_are_merged_by_id() {
        // given
        let app = EntityManager::<Comment>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::SetEntities(poor_quality_comments()), &mut model, &());

        // when
        let command = app.update(
            EntityManagerEvent::ValueChanged {
                key: "2".to_string(),
                enabled: false,
            },
            &mut model,
            &(),
        );
        resolve_with(&app, &mut model, command, StanCoreResult::Ok {
            data: json!({ "setCommentEnabled": { "id": 2, "text": "Poor quality", "category": "stain", "enabled": false } }),
        });

        // then
        let view = app.view(&model);
        let mut expected = poor_quality_comments();
        expected[1].enabled = false;
        assert_eq!(view.entities, expected);
        assert_eq!(view.success_message, Some("Comment \"Poor quality\" updated".to_string()));
    }

    #[rstest]
    #[case::new_category("RNA", true)]
    #[case::existing_category("section", false)]
    fn comment_duplicates_compare_text_and_category(#[case] category: &str, #[case] allowed: bool) {
        // given
        let app = EntityManager::<Comment>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::SetEntities(poor_quality_comments()), &mut model, &());
        let _ = app.update(EntityManagerEvent::DraftNewEntity, &mut model, &());

        // when
        let mut command = app.update(
            EntityManagerEvent::CreateNewEntity {
                value: "Poor quality".to_string(),
                extra_property: Some(category.to_string()),
            },
            &mut model,
            &(),
        );

        // then
        let view = app.view(&model);
        assert_eq!(effects(&mut command).stan_core.len(), usize::from(allowed));
        if allowed {
            assert!(view.validation_errors.is_empty());
            assert_eq!(view.state, EntityManagerState::Loading(LoadingOperation::CreatingEntity));
        } else {
            assert_eq!(view.validation_errors, vec![FieldError::new(
                "value",
                "Comment \"Poor quality\" already exists"
            )]);
            assert_eq!(view.state, EntityManagerState::DraftCreation);
        }
    }

    #[test]
    fn runs_inside_a_core() {
        let core = Core::<EntityManager<Comment>>::new();

        let effects = core.process_event(EntityManagerEvent::SetEntities(poor_quality_comments()));

        assert!(matches!(effects.as_slice(), [Effect::Render(_)]));
        assert_eq!(core.view().entities.len(), 2);
    }

    #[test]
    fn category_required_for_new_comment() {
        let app = EntityManager::<Comment>::default();
        let mut model = EntityManagerModel::default();
        let _ = app.update(EntityManagerEvent::DraftNewEntity, &mut model, &());

        let mut command = app.update(
            EntityManagerEvent::CreateNewEntity {
                value: "Folded".to_string(),
                extra_property: Some(" ".to_string()),
            },
            &mut model,
            &(),
        );

        assert!(effects(&mut command).stan_core.is_empty());
        assert_eq!(
            app.view(&model).validation_errors,
            vec![FieldError::new("extra_property", "A category is required")]
        );
    }

    #[test]
    fn events_outside_their_state_are_rejected() {
        let app = EntityManager::<DestructionReason>::default();
        let mut model = EntityManagerModel::default();

        let _ = app.update(
            EntityManagerEvent::CreateNewEntity {
                value: "Expired".to_string(),
                extra_property: None,
            },
            &mut model,
            &(),
        );

        let view = app.view(&model);
        assert_eq!(view.state, EntityManagerState::Ready);
        assert!(view.error.is_some());
    }
}
