//! Error types for the A1 mediator

use crate::instance::ValueKind;
use crate::policy::PolicyTypeId;
use crate::schema::PropertyType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, A1Error>;

/// Failure classification, stable across transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidSchema,
    ValidationFailure,
    StoreError,
    DispatchError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::InvalidSchema => "INVALID_SCHEMA",
            ErrorKind::ValidationFailure => "VALIDATION_FAILURE",
            ErrorKind::StoreError => "STORE_ERROR",
            ErrorKind::DispatchError => "DISPATCH_ERROR",
        }
    }
}

/// A policy-type schema that cannot be accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error(
        "Invalid property type for '{property}': found {}, only 'integer' and 'boolean' are allowed",
        .found.as_deref().unwrap_or("no type")
    )]
    InvalidPropertyType {
        property: String,
        found: Option<String>,
    },
}

/// A policy-instance payload that does not conform to its schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    #[error("Field '{0}' is not allowed")]
    UnknownField(String),

    #[error("Field '{field}' must be {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: PropertyType,
        actual: ValueKind,
    },

    #[error("Field '{0}' is an integer outside the 64-bit range")]
    IntegerOutOfRange(String),
}

impl InstanceError {
    /// Name of the offending payload field.
    pub fn field(&self) -> &str {
        match self {
            InstanceError::UnknownField(field) => field,
            InstanceError::TypeMismatch { field, .. } => field,
            InstanceError::IntegerOutOfRange(field) => field,
        }
    }
}

/// A lifecycle call that did not reach the xApp manager or was refused by it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Lifecycle request for '{app_name}' failed: {reason}")]
    Transport { app_name: String, reason: String },

    #[error("Lifecycle endpoint rejected '{app_name}' with status {status}: {body}")]
    Rejected {
        app_name: String,
        status: u16,
        body: String,
    },
}

#[derive(Error, Debug)]
pub enum A1Error {
    #[error("Policy type not found: {policy_type_id}")]
    PolicyTypeNotFound { policy_type_id: PolicyTypeId },

    #[error("Policy instance not found: {policy_type_id}/{instance_id}")]
    PolicyInstanceNotFound {
        policy_type_id: PolicyTypeId,
        instance_id: String,
    },

    #[error("No xApp bound to policy type {policy_type_id}")]
    NoBindingFound { policy_type_id: PolicyTypeId },

    #[error("Policy type already exists: {policy_type_id}")]
    PolicyTypeConflict { policy_type_id: PolicyTypeId },

    #[error("Invalid policy type id: {policy_type_id} (must be positive)")]
    InvalidPolicyTypeId { policy_type_id: PolicyTypeId },

    #[error("Invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),

    #[error("Malformed policy type definition: {reason}")]
    MalformedDefinition { reason: String },

    #[error("Malformed policy instance: {reason}")]
    MalformedPayload { reason: String },

    #[error("Invalid request path: {reason}")]
    InvalidPath { reason: String },

    #[error("Policy instance rejected: {0}")]
    Validation(#[from] InstanceError),

    #[error("Policy store operation failed: {reason}")]
    Store { reason: String },

    #[error("xApp dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl A1Error {
    pub fn store(reason: impl Into<String>) -> Self {
        A1Error::Store {
            reason: reason.into(),
        }
    }

    /// Map to the transport-independent failure classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            A1Error::PolicyTypeNotFound { .. }
            | A1Error::PolicyInstanceNotFound { .. }
            | A1Error::NoBindingFound { .. } => ErrorKind::NotFound,
            A1Error::PolicyTypeConflict { .. } => ErrorKind::Conflict,
            A1Error::InvalidSchema(_) | A1Error::MalformedDefinition { .. } => {
                ErrorKind::InvalidSchema
            }
            A1Error::InvalidPolicyTypeId { .. }
            | A1Error::Validation(_)
            | A1Error::MalformedPayload { .. }
            | A1Error::InvalidPath { .. } => ErrorKind::ValidationFailure,
            A1Error::Store { .. } | A1Error::Serialization { .. } => ErrorKind::StoreError,
            A1Error::Dispatch(_) => ErrorKind::DispatchError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let not_found = A1Error::PolicyTypeNotFound { policy_type_id: 99 };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.kind().as_str(), "NOT_FOUND");

        let conflict = A1Error::PolicyTypeConflict { policy_type_id: 7 };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let mismatch = A1Error::from(InstanceError::TypeMismatch {
            field: "threshold".to_string(),
            expected: PropertyType::Integer,
            actual: ValueKind::Boolean,
        });
        assert_eq!(mismatch.kind(), ErrorKind::ValidationFailure);
        assert!(mismatch.to_string().contains("threshold"));
    }

    #[test]
    fn malformed_requests_are_client_errors() {
        let definition = A1Error::MalformedDefinition {
            reason: "create_schema.properties: invalid type: sequence, expected a map".to_string(),
        };
        assert_eq!(definition.kind(), ErrorKind::InvalidSchema);

        let payload = A1Error::MalformedPayload {
            reason: "expected a map".to_string(),
        };
        assert_eq!(payload.kind(), ErrorKind::ValidationFailure);

        let path = A1Error::InvalidPath {
            reason: "cannot parse `abc`".to_string(),
        };
        assert_eq!(path.kind(), ErrorKind::ValidationFailure);
        assert!(path.to_string().starts_with("Invalid request path"));
    }

    #[test]
    fn missing_property_type_is_described() {
        let err = SchemaError::InvalidPropertyType {
            property: "ratio".to_string(),
            found: None,
        };
        assert!(err.to_string().contains("'ratio'"));
        assert!(err.to_string().contains("no type"));
    }
}
