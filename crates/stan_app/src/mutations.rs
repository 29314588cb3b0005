use labware::{Barcode, Labware, WorkNumber};
use serde_json::json;
use validator::Validate;

use crate::effects::stan_core::StanCoreOperation;
use crate::form::Mutation;
use crate::graphql;
use crate::validation::CommonValidation;

//
// Destroy
//

pub struct Destroy;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DestroyRequest {
    #[validate(
        length(min = 1, message = "At least one labware is required"),
        custom(function = "CommonValidation::validate_unique_barcodes")
    )]
    pub barcodes: Vec<Barcode>,
    pub reason_id: i64,
    pub work_number: Option<WorkNumber>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct LabwareBarcode {
    pub barcode: Barcode,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct Destruction {
    pub labware: LabwareBarcode,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct DestroyResult {
    pub destructions: Vec<Destruction>,
}

impl Mutation for Destroy {
    type Request = DestroyRequest;
    type Response = DestroyResult;

    fn operation(request: &Self::Request) -> StanCoreOperation {
        graphql::mutation(
            "Destroy",
            graphql::DESTROY,
            "destroy",
            json!({
                "barcodes": request.barcodes,
                "reasonId": request.reason_id,
                "workNumber": graphql::optional_work_number(&request.work_number),
            }),
        )
    }
}

//
// Release
//

pub struct Release;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    #[validate(
        length(min = 1, message = "At least one labware is required"),
        custom(function = "CommonValidation::validate_unique_barcodes")
    )]
    pub barcodes: Vec<Barcode>,
    #[validate(custom(function = "CommonValidation::validate_required_text"))]
    pub destination: String,
    #[validate(custom(function = "CommonValidation::validate_required_text"))]
    pub recipient: String,
    #[validate(custom(function = "CommonValidation::validate_work_number"))]
    pub work_number: WorkNumber,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ReleaseRecord {
    pub id: i64,
    pub labware: LabwareBarcode,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ReleaseResult {
    pub releases: Vec<ReleaseRecord>,
}

impl Mutation for Release {
    type Request = ReleaseRequest;
    type Response = ReleaseResult;

    fn operation(request: &Self::Request) -> StanCoreOperation {
        graphql::mutation(
            "Release",
            graphql::RELEASE,
            "release",
            json!({
                "barcodes": request.barcodes,
                "destination": request.destination.trim(),
                "recipient": request.recipient.trim(),
                "workNumber": request.work_number,
            }),
        )
    }
}

//
// Extract
//

pub struct Extract;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    #[validate(
        length(min = 1, message = "At least one labware is required"),
        custom(function = "CommonValidation::validate_unique_barcodes")
    )]
    pub barcodes: Vec<Barcode>,
    #[validate(custom(function = "CommonValidation::validate_required_text"))]
    pub labware_type: String,
    #[validate(custom(function = "CommonValidation::validate_work_number"))]
    pub work_number: WorkNumber,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ExtractResult {
    pub labware: Vec<Labware>,
}

impl Mutation for Extract {
    type Request = ExtractRequest;
    type Response = ExtractResult;

    fn operation(request: &Self::Request) -> StanCoreOperation {
        graphql::mutation(
            "Extract",
            graphql::EXTRACT,
            "extract",
            json!({
                "barcodes": request.barcodes,
                "labwareType": request.labware_type.trim(),
                "workNumber": request.work_number,
            }),
        )
    }

    fn labware_for_storage(response: &Self::Response) -> Vec<Barcode> {
        response
            .labware
            .iter()
            .map(|labware| labware.barcode.clone())
            .collect()
    }
}
