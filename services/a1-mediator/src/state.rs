//! Shared application state.

use std::sync::Arc;

use a1_core::{AppBinding, PolicyTypeStore, Result};
use policy_engine::{
    FilePolicyTypeStore, HttpLifecycleDispatcher, MemoryBindingStore, MemoryPolicyTypeStore,
    PolicyMediator,
};
use tracing::info;

use crate::config::MediatorConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub mediator: PolicyMediator,
}

impl AppState {
    pub fn new(mediator: PolicyMediator) -> Self {
        Self { mediator }
    }

    /// Wire stores and the HTTP lifecycle client from configuration.
    pub fn from_config(cfg: &MediatorConfig) -> Result<Self> {
        let types: Arc<dyn PolicyTypeStore> = match &cfg.store.path {
            Some(path) => Arc::new(FilePolicyTypeStore::open(path)?),
            None => {
                info!("No store path configured, policy types are kept in memory");
                Arc::new(MemoryPolicyTypeStore::new())
            }
        };
        let bindings = MemoryBindingStore::with_bindings(
            cfg.bindings.iter().cloned().map(AppBinding::from),
        );
        let dispatcher = HttpLifecycleDispatcher::new(cfg.xapp_api.clone());
        info!(
            xapp_api = %dispatcher.base_url(),
            bindings = cfg.bindings.len(),
            "Lifecycle dispatcher configured"
        );

        let mediator = PolicyMediator::new(types, Arc::new(bindings), Arc::new(dispatcher))?;
        Ok(Self::new(mediator))
    }
}
