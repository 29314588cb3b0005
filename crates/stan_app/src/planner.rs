//! Planning new labware layouts from a set of source labware.
//!
//! A pure reducer: the only effect is `Render`. Confirming a plan's contents is left to the
//! caller, which reports the finished plan back with `PlanComplete`.
//!
//! While any plan exists, completed or not, the source labware is locked so plans are never
//! built against a source list that later changes.

use crux_core::{render, App, Command};
use indexmap::IndexMap;
use labware::{Labware, LabwarePlan, LabwareType, PlanId};
use thiserror::Error;
use tracing::{info, trace, warn};

use crate::{rejected_event, Effect, RejectedEvent};

#[derive(Default)]
pub struct Planner;

/// A placeholder for a plan the user is still building.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlannedLabware {
    pub id: PlanId,
    pub labware_type: LabwareType,
}

#[derive(Default)]
pub struct Model {
    source_labware: Vec<Labware>,
    layout_plans: IndexMap<PlanId, PlannedLabware>,
    completed_plans: IndexMap<PlanId, LabwarePlan>,
    next_id: u64,

    error: Option<RejectedEvent>,
}

impl Model {
    fn add_labware_enabled(&self) -> bool {
        !self.source_labware.is_empty()
    }

    fn source_locked(&self) -> bool {
        !(self.layout_plans.is_empty() && self.completed_plans.is_empty())
    }

    fn generate_id(&mut self) -> PlanId {
        self.next_id += 1;
        PlanId(self.next_id)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub enum Event {
    SetSourceLabware(Vec<Labware>),
    AddLabwarePlan {
        labware_type: LabwareType,
        number_of_labware: usize,
    },
    RemoveLabwarePlan(PlanId),
    PlanComplete {
        id: PlanId,
        plan: LabwarePlan,
    },
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PlannerViewModel {
    pub source_labware: Vec<Labware>,
    pub layout_plans: Vec<PlannedLabware>,
    pub completed_plans: Vec<(PlanId, LabwarePlan)>,
    pub add_labware_enabled: bool,
    pub source_locked: bool,
    pub error: Option<RejectedEvent>,
}

#[derive(Error, Debug)]
enum PlannerError {
    #[error("Source labware cannot change while plans exist")]
    SourceLocked,
    #[error("Scan source labware before adding plans")]
    NoSourceLabware,
    #[error("At least one labware must be planned")]
    NothingToAdd,
    #[error("Unknown plan. id: {0}")]
    UnknownPlan(PlanId),
    #[error("Plan is already complete. id: {0}")]
    PlanAlreadyComplete(PlanId),
}

impl App for Planner {
    type Event = Event;
    type Model = Model;
    type ViewModel = PlannerViewModel;
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
                warn!("planner event rejected. cause: {}", e);
                model.error.replace(rejected_event(&e));
            }
            Ok(()) => {
                model.error.take();
            }
        }
        render::render()
    }

    fn view(&self, model: &Self::Model) -> Self::ViewModel {
        let view_model = PlannerViewModel {
            source_labware: model.source_labware.clone(),
            layout_plans: model
                .layout_plans
                .values()
                .cloned()
                .collect(),
            completed_plans: model
                .completed_plans
                .iter()
                .map(|(id, plan)| (*id, plan.clone()))
                .collect(),
            add_labware_enabled: model.add_labware_enabled(),
            source_locked: model.source_locked(),
            error: model.error.clone(),
        };

        trace!("view model: {:?}", view_model);

        view_model
    }
}

impl Planner {
    fn update_inner(event: Event, model: &mut Model) -> Result<(), PlannerError> {
        match event {
            Event::SetSourceLabware(labware) => {
                if model.source_locked() {
                    return Err(PlannerError::SourceLocked);
                }
                info!("Source labware set. count: {}", labware.len());
                model.source_labware = labware;
            }
            Event::AddLabwarePlan {
                labware_type,
                number_of_labware,
            } => {
                if !model.add_labware_enabled() {
                    return Err(PlannerError::NoSourceLabware);
                }
                if number_of_labware == 0 {
                    return Err(PlannerError::NothingToAdd);
                }

                for _ in 0..number_of_labware {
                    let id = model.generate_id();
                    model
                        .layout_plans
                        .insert(id, PlannedLabware {
                            id,
                            labware_type: labware_type.clone(),
                        });
                }
                info!(
                    "Added labware plans. labware_type: {}, count: {}",
                    labware_type.name, number_of_labware
                );
            }
            Event::RemoveLabwarePlan(id) => {
                if model.completed_plans.contains_key(&id) {
                    return Err(PlannerError::PlanAlreadyComplete(id));
                }
                model
                    .layout_plans
                    .shift_remove(&id)
                    .ok_or(PlannerError::UnknownPlan(id))?;
                info!("Removed labware plan. id: {}", id);
            }
            Event::PlanComplete {
                id,
                plan,
            } => {
                if !model.layout_plans.contains_key(&id) {
                    return Err(PlannerError::UnknownPlan(id));
                }
                if model.completed_plans.contains_key(&id) {
                    return Err(PlannerError::PlanAlreadyComplete(id));
                }
                info!("Plan complete. id: {}, actions: {}", id, plan.actions.len());
                model.completed_plans.insert(id, plan);
            }
        }

        Ok(())
    }
}
