//! Policy instances and their validation

use crate::error::InstanceError;
use crate::schema::{PropertyType, ValidSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub type InstanceId = String;

/// Instance payload, iterated in the order the caller sent it.
pub type PolicyPayload = Map<String, Value>;

/// Runtime type of a JSON value, as reported in mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-number literal that did not fit `i64`/`u64` and was parsed as a float.
fn is_out_of_range_integer(value: &Value) -> bool {
    const U64_END: f64 = 18_446_744_073_709_551_616.0;
    const I64_MIN: f64 = -9_223_372_036_854_775_808.0;
    value
        .as_f64()
        .is_some_and(|f| f.is_finite() && f.fract() == 0.0 && (f >= U64_END || f < I64_MIN))
}

/// Check a payload against a schema, stopping at the first bad field.
///
/// Declared properties missing from the payload are allowed: there is no
/// required-field enforcement. Undeclared keys are always rejected,
/// independent of the schema's `additionalProperties` flag. Integers are
/// limited to the `i64`/`u64` range.
pub fn validate_instance(
    schema: &ValidSchema,
    payload: &PolicyPayload,
) -> Result<(), InstanceError> {
    for (field, value) in payload {
        let expected = schema
            .property_type(field)
            .ok_or_else(|| InstanceError::UnknownField(field.clone()))?;

        if !expected.matches(value) {
            if expected == PropertyType::Integer && is_out_of_range_integer(value) {
                return Err(InstanceError::IntegerOutOfRange(field.clone()));
            }
            return Err(InstanceError::TypeMismatch {
                field: field.clone(),
                expected,
                actual: ValueKind::of(value),
            });
        }
    }
    Ok(())
}
