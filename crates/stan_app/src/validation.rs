use std::borrow::Cow;

use labware::{Barcode, WorkNumber};
use validator::{ValidationError, ValidationErrors};

/// A client-side validation failure, shown next to the offending field.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Flatten validation errors, ordered by field name then message.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            let field = field.to_string();
            errors.iter().map(move |error| FieldError {
                field: field.clone(),
                message: error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string()),
            })
        })
        .collect::<Vec<_>>();

    field_errors.sort_by(|a, b| {
        a.field
            .cmp(&b.field)
            .then(a.message.cmp(&b.message))
    });
    field_errors
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub struct CommonValidation {}
impl CommonValidation {
    pub fn validate_work_number(work_number: &WorkNumber) -> Result<(), ValidationError> {
        match work_number.is_present() {
            true => Ok(()),
            false => Err(error("work-number-required", "SGP number is required")),
        }
    }

    pub fn validate_unique_barcodes(barcodes: &Vec<Barcode>) -> Result<(), ValidationError> {
        let mut seen = Vec::with_capacity(barcodes.len());
        for barcode in barcodes {
            if seen.contains(&barcode) {
                return Err(error("barcode-duplicated", "Each labware may only be listed once"));
            }
            seen.push(barcode);
        }
        Ok(())
    }

    pub fn validate_required_text(value: &String) -> Result<(), ValidationError> {
        match value.trim().is_empty() {
            true => Err(error("required", "A value is required")),
            false => Ok(()),
        }
    }
}
