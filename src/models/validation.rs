//! Field validation errors.
//!
//! Rules are declared with `validator` derives on the models. This module
//! flattens `validator::ValidationErrors` into the first failure per field.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;
use validator::ValidationErrors;

/// Key `validator` files struct-level (schema) errors under.
const STRUCT_LEVEL: &str = "__all__";

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors found on one entity, sorted by field name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}.", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }
}

/// Only the first failed rule of each field is kept. Struct-level errors
/// are reported under their code, which names the offending field.
impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                let first = errs.first()?;
                let field = if field == STRUCT_LEVEL {
                    first.code.to_string()
                } else {
                    field.to_string()
                };
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());

                Some(FieldError { field, message })
            })
            .collect();

        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError(fields)
    }
}

/// A `validator` error with a readable message.
pub fn field_error(
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> validator::ValidationError {
    let mut error = validator::ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// `Err` when any field error was collected.
pub fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
