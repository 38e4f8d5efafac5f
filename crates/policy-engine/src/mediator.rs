//! Policy Mediator
//!
//! Orchestrates policy-type definition, instance validation and storage, and
//! the xApp lifecycle calls that follow instance changes.
//!
//! Instance mutations commit before the downstream call is made. A failed
//! dispatch is logged and reported back to the caller, but the instance
//! stays stored (or removed).

use crate::binding::AppBindingResolver;
use crate::dispatcher::LifecycleDispatcher;
use crate::instance_store::PolicyInstanceStore;
use a1_core::{
    validate_instance, validate_schema_definition, A1Error, AppName, BindingStore,
    DispatchOutcome, DispatchReport, InstanceId, LifecycleAction, PolicyPayload, PolicyType,
    PolicyTypeDefinition, PolicyTypeId, PolicyTypeStore, Result,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of storing a policy instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceCreated {
    pub policy_type_id: PolicyTypeId,
    pub policy_instance_id: InstanceId,
    pub data: PolicyPayload,
    pub replaced: bool,
    pub dispatch: DispatchReport,
}

/// Result of removing a policy instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDeleted {
    pub policy_type_id: PolicyTypeId,
    pub policy_instance_id: InstanceId,
    pub dispatch: DispatchReport,
}

/// Mediator statistics for monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorStats {
    pub policy_types: usize,
    pub policy_instances: usize,
    pub dispatches_succeeded: u64,
    pub dispatches_failed: u64,
}

#[derive(Debug, Default)]
struct DispatchCounters {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Entry point for every policy operation.
///
/// Cheap to clone; clones share stores and locks.
#[derive(Clone)]
pub struct PolicyMediator {
    types: Arc<dyn PolicyTypeStore>,
    instances: Arc<PolicyInstanceStore>,
    resolver: AppBindingResolver,
    dispatcher: Arc<dyn LifecycleDispatcher>,
    /// Serializes instance mutations against type deletion, per type.
    type_locks: Arc<DashMap<PolicyTypeId, Arc<Mutex<()>>>>,
    counters: Arc<DispatchCounters>,
}

impl std::fmt::Debug for PolicyMediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyMediator")
            .field("instances", &self.instances.instance_count())
            .field("type_locks", &self.type_locks.len())
            .finish()
    }
}

impl PolicyMediator {
    /// Build a mediator, tracking every policy type already in the store.
    pub fn new(
        types: Arc<dyn PolicyTypeStore>,
        bindings: Arc<dyn BindingStore>,
        dispatcher: Arc<dyn LifecycleDispatcher>,
    ) -> Result<Self> {
        let instances = Arc::new(PolicyInstanceStore::new());
        let known = types.get_type_ids()?;
        for policy_type_id in &known {
            instances.track(*policy_type_id);
        }
        info!(policy_types = known.len(), "Initializing A1 policy mediator");

        Ok(Self {
            types,
            instances,
            resolver: AppBindingResolver::new(bindings),
            dispatcher,
            type_locks: Arc::new(DashMap::new()),
            counters: Arc::new(DispatchCounters::default()),
        })
    }

    fn type_lock(&self, policy_type_id: PolicyTypeId) -> Arc<Mutex<()>> {
        self.type_locks
            .entry(policy_type_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn list_types(&self) -> Result<BTreeSet<PolicyTypeId>> {
        self.types.get_type_ids()
    }

    pub fn get_type(&self, policy_type_id: PolicyTypeId) -> Result<PolicyType> {
        self.types
            .get(policy_type_id)?
            .ok_or(A1Error::PolicyTypeNotFound { policy_type_id })
    }

    /// Define a new policy type. Types are never updated in place.
    #[instrument(skip(self, definition), fields(name = %definition.name))]
    pub fn create_type(
        &self,
        policy_type_id: PolicyTypeId,
        definition: PolicyTypeDefinition,
    ) -> Result<PolicyType> {
        if policy_type_id == 0 {
            return Err(A1Error::InvalidPolicyTypeId { policy_type_id });
        }
        let create_schema = validate_schema_definition(definition.create_schema)?;
        let policy_type = PolicyType {
            policy_type_id,
            name: definition.name,
            description: definition.description,
            create_schema,
        };

        let lock = self.type_lock(policy_type_id);
        let _guard = lock.lock();
        self.types.insert(policy_type.clone())?;
        self.instances.track(policy_type_id);

        info!(
            properties = policy_type.create_schema.len(),
            "Policy type {} created", policy_type_id
        );
        Ok(policy_type)
    }

    /// Delete a type and every instance of it. Deleting an unknown type succeeds.
    #[instrument(skip(self))]
    pub fn delete_type(&self, policy_type_id: PolicyTypeId) -> Result<()> {
        let lock = self.type_lock(policy_type_id);
        let _guard = lock.lock();

        self.types.delete(policy_type_id)?;
        let removed = self.instances.delete_all_for_type(policy_type_id);

        info!(removed_instances = removed, "Policy type {} deleted", policy_type_id);
        Ok(())
    }

    /// Validate and store an instance, then start the bound xApp.
    #[instrument(skip(self, payload), fields(fields = payload.len()))]
    pub async fn create_instance(
        &self,
        policy_type_id: PolicyTypeId,
        policy_instance_id: InstanceId,
        payload: PolicyPayload,
    ) -> Result<InstanceCreated> {
        let replaced = {
            let lock = self.type_lock(policy_type_id);
            let _guard = lock.lock();

            let policy_type = self.get_type(policy_type_id)?;
            validate_instance(&policy_type.create_schema, &payload)?;
            self.instances
                .put(policy_type_id, policy_instance_id.clone(), payload.clone())
                .is_some()
        };
        info!(replaced, "Policy instance {}/{} stored", policy_type_id, policy_instance_id);

        let dispatch = self.notify(policy_type_id, LifecycleAction::Start).await;
        Ok(InstanceCreated {
            policy_type_id,
            policy_instance_id,
            data: payload,
            replaced,
            dispatch,
        })
    }

    pub fn get_instance(
        &self,
        policy_type_id: PolicyTypeId,
        policy_instance_id: &str,
    ) -> Result<PolicyPayload> {
        if !self.types.exists(policy_type_id)? {
            return Err(A1Error::PolicyTypeNotFound { policy_type_id });
        }
        self.instances.get(policy_type_id, policy_instance_id)
    }

    pub fn list_instances(&self, policy_type_id: PolicyTypeId) -> Result<BTreeSet<InstanceId>> {
        let lock = self.type_lock(policy_type_id);
        let _guard = lock.lock();

        if !self.types.exists(policy_type_id)? {
            return Err(A1Error::PolicyTypeNotFound { policy_type_id });
        }
        // types inserted behind the mediator's back are picked up here
        self.instances.track(policy_type_id);
        self.instances.get_all_ids(policy_type_id)
    }

    /// Remove an instance, then stop the bound xApp.
    #[instrument(skip(self))]
    pub async fn delete_instance(
        &self,
        policy_type_id: PolicyTypeId,
        policy_instance_id: InstanceId,
    ) -> Result<InstanceDeleted> {
        {
            let lock = self.type_lock(policy_type_id);
            let _guard = lock.lock();
            self.instances.delete(policy_type_id, &policy_instance_id)?;
        }
        info!("Policy instance {}/{} deleted", policy_type_id, policy_instance_id);

        let dispatch = self.notify(policy_type_id, LifecycleAction::Stop).await;
        Ok(InstanceDeleted {
            policy_type_id,
            policy_instance_id,
            dispatch,
        })
    }

    /// Name of the xApp currently active for the type.
    pub fn lookup(&self, policy_type_id: PolicyTypeId) -> Result<AppName> {
        self.resolver
            .resolve_active_app(policy_type_id)?
            .ok_or(A1Error::NoBindingFound { policy_type_id })
    }

    /// Start the bound xApp directly, bypassing instance state.
    #[instrument(skip(self))]
    pub async fn trigger(&self, policy_type_id: PolicyTypeId) -> Result<DispatchOutcome> {
        self.dispatch_direct(policy_type_id, LifecycleAction::Start)
            .await
    }

    /// Stop the bound xApp directly, bypassing instance state.
    #[instrument(skip(self))]
    pub async fn stop(&self, policy_type_id: PolicyTypeId) -> Result<DispatchOutcome> {
        self.dispatch_direct(policy_type_id, LifecycleAction::Stop)
            .await
    }

    async fn dispatch_direct(
        &self,
        policy_type_id: PolicyTypeId,
        action: LifecycleAction,
    ) -> Result<DispatchOutcome> {
        let app_name = self.lookup(policy_type_id)?;
        let result = self.dispatcher.dispatch(&app_name, action).await;
        self.record(result.is_ok());
        Ok(result?)
    }

    /// Best-effort lifecycle call after a committed instance change.
    async fn notify(&self, policy_type_id: PolicyTypeId, action: LifecycleAction) -> DispatchReport {
        let app_name = match self.resolver.resolve_active_app(policy_type_id) {
            Ok(Some(app_name)) => app_name,
            Ok(None) => return DispatchReport::NotBound,
            Err(e) => {
                warn!(policy_type_id, error = %e, "Binding lookup failed, xApp not notified");
                self.record(false);
                return DispatchReport::Failed {
                    app_name: None,
                    error: e.to_string(),
                };
            }
        };

        match self.dispatcher.dispatch(&app_name, action).await {
            Ok(outcome) => {
                self.record(true);
                outcome.into()
            }
            Err(e) => {
                warn!(
                    policy_type_id,
                    app = %app_name,
                    ?action,
                    error = %e,
                    "xApp dispatch failed; instance change is kept"
                );
                self.record(false);
                DispatchReport::Failed {
                    app_name: Some(app_name),
                    error: e.to_string(),
                }
            }
        }
    }

    fn record(&self, succeeded: bool) {
        let counter = if succeeded {
            &self.counters.succeeded
        } else {
            &self.counters.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> Result<MediatorStats> {
        Ok(MediatorStats {
            policy_types: self.types.get_type_ids()?.len(),
            policy_instances: self.instances.instance_count(),
            dispatches_succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            dispatches_failed: self.counters.failed.load(Ordering::Relaxed),
        })
    }
}
