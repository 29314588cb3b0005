use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde_with::skip_serializing_none;

use crate::address::Address;
use crate::barcode::Barcode;
use crate::labware::LabwareType;

/// Correlates a not-yet-persisted plan between the planner and the component building it.
///
/// Ids are generated by the planner and are only unique within one planner instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub u64);

impl Display for PlanId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "plan-{}", self.0)
    }
}

/// Moves one sample from a source slot into a slot of the planned labware.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAction {
    pub source_barcode: Barcode,
    pub source_address: Address,
    pub destination_address: Address,
    pub sample_id: i64,
}

/// A proposed labware layout, as confirmed by the user.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwarePlan {
    pub labware_type: LabwareType,
    /// Only set for pre-barcoded destination labware, e.g. Visium slides.
    pub barcode: Option<Barcode>,
    pub actions: Vec<PlanAction>,
}

impl LabwarePlan {
    pub fn new(labware_type: LabwareType) -> Self {
        Self {
            labware_type,
            barcode: None,
            actions: vec![],
        }
    }

    pub fn source_barcodes(&self) -> impl Iterator<Item = &Barcode> {
        self.actions
            .iter()
            .map(|action| &action.source_barcode)
            .unique()
    }

    /// Actions whose destination lies outside the labware grid.
    pub fn invalid_actions(&self) -> impl Iterator<Item = &PlanAction> {
        self.actions
            .iter()
            .filter(|action| !self.labware_type.contains(&action.destination_address))
    }
}
