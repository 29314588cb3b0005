pub mod address;
pub mod awaiting_storage;
pub mod barcode;
pub mod error;
pub mod labware;
pub mod plan;
pub mod sample;
pub mod work_number;

pub use address::Address;
pub use barcode::Barcode;
pub use error::ServerError;
pub use labware::{Labware, LabwareState, LabwareType, Slot};
pub use plan::{LabwarePlan, PlanAction, PlanId};
pub use work_number::WorkNumber;
