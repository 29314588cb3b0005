//! GraphQL documents sent to stan-core, and builders for the operations that carry them.

use indoc::indoc;
use labware::{Barcode, WorkNumber};
use serde_json::json;

use crate::effects::stan_core::StanCoreOperation;

pub const LABWARE_FIELDS: &str = indoc! {"
    fragment LabwareFields on Labware {
        id
        barcode
        externalBarcode
        destroyed
        discarded
        released
        used
        state
        labwareType { name numRows numColumns }
        slots {
            address
            samples {
                id
                section
                bioState { name }
                tissue {
                    externalName
                    replicate
                    donor { donorName }
                    spatialLocation { code name tissueType { name } }
                    fixative { name }
                    medium { name }
                }
            }
        }
    }
"};

pub const FIND_LABWARE: &str = indoc! {"
    query FindLabware($barcode: String!) {
        labware(barcode: $barcode) { ...LabwareFields }
    }
"};

pub const DESTROY: &str = indoc! {"
    mutation Destroy($request: DestroyRequest!) {
        destroy(request: $request) {
            destructions { labware { barcode } }
        }
    }
"};

pub const RELEASE: &str = indoc! {"
    mutation Release($request: ReleaseRequest!) {
        release(request: $request) {
            releases { id labware { barcode } }
        }
    }
"};

pub const EXTRACT: &str = indoc! {"
    mutation Extract($request: ExtractRequest!) {
        extract(request: $request) {
            labware { ...LabwareFields }
        }
    }
"};

/// Append the fragment definitions for documents that spread them.
fn with_fragments(document: &str) -> String {
    if document.contains("...LabwareFields") {
        format!("{}{}", document, LABWARE_FIELDS)
    } else {
        document.to_string()
    }
}

pub fn find_labware(barcode: &Barcode) -> StanCoreOperation {
    StanCoreOperation::new(
        "FindLabware",
        &with_fragments(FIND_LABWARE),
        "labware",
        json!({ "barcode": barcode }),
    )
}

pub fn mutation(operation_name: &str, document: &str, root_field: &str, request: serde_json::Value) -> StanCoreOperation {
    StanCoreOperation::new(
        operation_name,
        &with_fragments(document),
        root_field,
        json!({ "request": request }),
    )
}

pub fn optional_work_number(work_number: &Option<WorkNumber>) -> serde_json::Value {
    match work_number {
        Some(work_number) if work_number.is_present() => json!(work_number),
        _ => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod graphql_tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn find_labware_includes_fragment() {
        let operation = find_labware(&Barcode::from_str("STAN-611").unwrap());

        assert_eq!(operation.operation_name, "FindLabware");
        assert_eq!(operation.root_field, "labware");
        assert!(operation
            .query
            .contains("fragment LabwareFields on Labware"));
        assert_eq!(operation.variables, json!({ "barcode": "STAN-611" }));
    }

    #[test]
    fn mutation_without_fragment() {
        let operation = mutation("Destroy", DESTROY, "destroy", json!({ "barcodes": ["STAN-1"] }));

        assert!(!operation.query.contains("fragment"));
        assert_eq!(operation.variables, json!({ "request": { "barcodes": ["STAN-1"] } }));
    }
}
