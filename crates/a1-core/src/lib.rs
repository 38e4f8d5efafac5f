//! # A1 Core
//!
//! Core types and traits for the A1 policy mediator.
//!
//! ## Policy contracts
//! - Policy types carry a schema restricted to `integer` and `boolean` properties
//! - Policy instances are validated field by field against that schema
//! - Validation is all-or-nothing: the first failing field aborts
//!
//! ## Downstream applications
//! - Each policy type is bound to at most one active xApp
//! - Instance changes start or stop that xApp through the lifecycle API

pub mod binding;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod policy;
pub mod schema;

pub use binding::{AppBinding, AppName, BindingStore};
pub use dispatch::{DispatchOutcome, DispatchReport, LifecycleAction};
pub use error::{A1Error, DispatchError, ErrorKind, InstanceError, Result, SchemaError};
pub use instance::{validate_instance, InstanceId, PolicyPayload, ValueKind};
pub use policy::{PolicyType, PolicyTypeDefinition, PolicyTypeId, PolicyTypeStore};
pub use schema::{validate_schema_definition, PropertyType, SchemaDefinition, ValidSchema};

/// Current A1 mediator version for compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build information for telemetry and debugging
pub const BUILD_INFO: &str = concat!(
    "A1 Mediator ",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_NAME"),
    ")"
);

/// Standard API endpoints for the A1 mediator
pub mod endpoints {
    pub const HEALTH: &str = "/a1-p/healthcheck";
    pub const STATS: &str = "/a1-p/stats";
    pub const POLICY_TYPES: &str = "/a1-p/policytypes";
    pub const POLICY_TYPE: &str = "/a1-p/policytypes/{policy_type_id}";
    pub const POLICY_INSTANCES: &str = "/a1-p/policytypes/{policy_type_id}/policies";
    pub const POLICY_INSTANCE: &str =
        "/a1-p/policytypes/{policy_type_id}/policies/{policy_instance_id}";
    pub const LOOKUP: &str = "/lookup/{policy_type_id}";
    pub const TRIGGER_XAPP: &str = "/trigger_xapp/{policy_type_id}";
    pub const STOP_XAPP: &str = "/stop_xapp/{policy_type_id}";

    /// Downstream lifecycle API paths, relative to the xApp manager base URL
    pub const XAPP_RUN: &str = "run";
    pub const XAPP_STOP: &str = "stop";
}
