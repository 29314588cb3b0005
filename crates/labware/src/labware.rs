use serde_with::skip_serializing_none;

use crate::address::{Address, MAX_ROWS};
use crate::barcode::Barcode;
use crate::sample::Sample;

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareType {
    pub name: String,
    pub num_rows: u32,
    pub num_columns: u32,
}

impl LabwareType {
    pub fn new(name: &str, num_rows: u32, num_columns: u32) -> Self {
        Self {
            name: name.to_string(),
            num_rows: num_rows.min(MAX_ROWS),
            num_columns,
        }
    }

    /// All addresses of the grid, in row-major order.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        (1..=self.num_rows).flat_map(move |row| (1..=self.num_columns).map(move |column| Address::new(row, column)))
    }

    pub fn contains(&self, address: &Address) -> bool {
        (1..=self.num_rows).contains(&address.row) && (1..=self.num_columns).contains(&address.column)
    }
}

/// The server-maintained lifecycle state of a piece of labware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabwareState {
    #[default]
    Empty,
    Active,
    Discarded,
    Released,
    Destroyed,
    Used,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub address: Address,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

/// A physical container (tube, slide, plate) as last reported by stan-core.
///
/// The flags are owned by the server, the client only reads them.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Labware {
    pub id: i64,
    pub barcode: Barcode,
    #[serde(default)]
    pub external_barcode: Option<String>,
    pub labware_type: LabwareType,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub discarded: bool,
    #[serde(default)]
    pub released: bool,
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub state: LabwareState,
}

impl Labware {
    /// Labware that has left the lab, or no longer exists, cannot take part in new operations.
    pub fn is_usable(&self) -> bool {
        !(self.destroyed || self.discarded || self.released)
    }

    pub fn slot(&self, address: &Address) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|slot| slot.address.eq(address))
    }

    pub fn samples(&self) -> impl Iterator<Item = (&Address, &Sample)> {
        self.slots
            .iter()
            .flat_map(|slot| {
                slot.samples
                    .iter()
                    .map(move |sample| (&slot.address, sample))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.samples().next().is_none()
    }
}

#[cfg(test)]
mod labware_tests {
    use indoc::indoc;

    use super::*;

    const LABWARE_JSON: &str = indoc! {r#"
        {
            "id": 611,
            "barcode": "STAN-611",
            "labwareType": { "name": "Slide", "numRows": 4, "numColumns": 1 },
            "slots": [
                { "address": "A1", "samples": [
                    {
                        "id": 10,
                        "section": 3,
                        "bioState": { "name": "Tissue" },
                        "tissue": {
                            "externalName": "EXT1",
                            "replicate": "1",
                            "donor": { "donorName": "DONOR1" },
                            "spatialLocation": { "code": 1, "name": "Cortex", "tissueType": { "name": "Brain" } },
                            "fixative": { "name": "None" },
                            "medium": { "name": "OCT" }
                        }
                    }
                ]},
                { "address": "B1", "samples": [] }
            ],
            "destroyed": false,
            "discarded": false,
            "released": true,
            "state": "released"
        }
    "#};

    #[test]
    fn deserialize_labware() {
        let labware: Labware = serde_json::from_str(LABWARE_JSON).unwrap();

        assert_eq!(labware.barcode.as_str(), "STAN-611");
        assert_eq!(labware.state, LabwareState::Released);
        assert!(!labware.is_usable());
        assert!(!labware.is_empty());

        let samples = labware.samples().collect::<Vec<_>>();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].0, &Address::new(1, 1));
        assert_eq!(samples[0].1.tissue.donor.donor_name, "DONOR1");

        assert!(labware
            .slot(&Address::new(2, 1))
            .is_some());
    }

    #[test]
    fn labware_type_grid() {
        let labware_type = LabwareType::new("Plate", 2, 3);

        let addresses = labware_type
            .addresses()
            .map(|address| address.to_string())
            .collect::<Vec<_>>();

        assert_eq!(addresses, vec!["A1", "A2", "A3", "B1", "B2", "B3"]);
        assert!(labware_type.contains(&Address::new(2, 3)));
        assert!(!labware_type.contains(&Address::new(3, 1)));
    }
}
