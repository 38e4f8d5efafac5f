pub use a1_core;

mod binding;
mod dispatcher;
mod instance_store;
mod mediator;
mod type_store;

pub use binding::{AppBindingResolver, MemoryBindingStore};
pub use dispatcher::{HttpLifecycleDispatcher, LifecycleDispatcher};
pub use instance_store::PolicyInstanceStore;
pub use mediator::{InstanceCreated, InstanceDeleted, MediatorStats, PolicyMediator};
pub use type_store::{FilePolicyTypeStore, MemoryPolicyTypeStore};

// Re-export core types for convenience
pub use a1_core::{
    validate_instance, validate_schema_definition, A1Error, AppBinding, BindingStore,
    DispatchError, DispatchOutcome, DispatchReport, ErrorKind, LifecycleAction, PolicyPayload,
    PolicyType, PolicyTypeDefinition, PolicyTypeId, PolicyTypeStore, Result, SchemaDefinition,
};
