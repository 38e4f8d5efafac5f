//! xApp binding lookup

use a1_core::{AppBinding, AppName, BindingStore, PolicyTypeId, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;

/// In-memory binding store, seeded from configuration.
#[derive(Debug, Default)]
pub struct MemoryBindingStore {
    bindings: RwLock<Vec<AppBinding>>,
}

impl MemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: impl IntoIterator<Item = AppBinding>) -> Self {
        let store = Self::new();
        for binding in bindings {
            store.bind(binding);
        }
        store
    }

    /// Add a binding, replacing any existing binding of the same app to the same type.
    /// An active binding deactivates the others for its type.
    pub fn bind(&self, binding: AppBinding) {
        let mut bindings = self.bindings.write();
        bindings.retain(|b| {
            !(b.policy_type_id == binding.policy_type_id && b.app_name == binding.app_name)
        });
        if binding.active {
            for other in bindings
                .iter_mut()
                .filter(|b| b.policy_type_id == binding.policy_type_id)
            {
                other.active = false;
            }
        }
        bindings.push(binding);
    }
}

impl BindingStore for MemoryBindingStore {
    fn bindings_for(&self, policy_type_id: PolicyTypeId) -> Result<Vec<AppBinding>> {
        Ok(self
            .bindings
            .read()
            .iter()
            .filter(|b| b.policy_type_id == policy_type_id)
            .cloned()
            .collect())
    }
}

/// Resolves the active xApp for a policy type.
#[derive(Clone)]
pub struct AppBindingResolver {
    store: Arc<dyn BindingStore>,
}

impl AppBindingResolver {
    pub fn new(store: Arc<dyn BindingStore>) -> Self {
        Self { store }
    }

    /// The app flagged active for the type, if any.
    ///
    /// Several active bindings violate the store's invariant; the first one
    /// reported wins and a warning is logged.
    pub fn resolve_active_app(&self, policy_type_id: PolicyTypeId) -> Result<Option<AppName>> {
        let mut active = self
            .store
            .bindings_for(policy_type_id)?
            .into_iter()
            .filter(|binding| binding.active);

        let Some(chosen) = active.next() else {
            return Ok(None);
        };

        let ignored: Vec<AppName> = active.map(|binding| binding.app_name).collect();
        if !ignored.is_empty() {
            warn!(
                policy_type_id,
                chosen = %chosen.app_name,
                ?ignored,
                "Multiple active xApp bindings for policy type"
            );
        }
        Ok(Some(chosen.app_name))
    }
}

impl std::fmt::Debug for AppBindingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBindingResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(policy_type_id: PolicyTypeId, app_name: &str, active: bool) -> AppBinding {
        AppBinding {
            policy_type_id,
            app_name: app_name.to_string(),
            active,
        }
    }

    #[test]
    fn test_resolves_active_binding_only() {
        let store = Arc::new(MemoryBindingStore::with_bindings([
            binding(7, "standby-xapp", false),
            binding(7, "qos-xapp", true),
            binding(8, "other-xapp", true),
        ]));
        let resolver = AppBindingResolver::new(store);

        assert_eq!(
            resolver.resolve_active_app(7).unwrap(),
            Some("qos-xapp".to_string())
        );
        assert_eq!(resolver.resolve_active_app(99).unwrap(), None);
    }

    #[test]
    fn test_inactive_only_resolves_to_none() {
        let store = Arc::new(MemoryBindingStore::with_bindings([binding(7, "qos-xapp", false)]));
        assert_eq!(AppBindingResolver::new(store).resolve_active_app(7).unwrap(), None);
    }

    #[test]
    fn test_bind_keeps_one_active_per_type() {
        let store = MemoryBindingStore::new();
        store.bind(binding(7, "first", true));
        store.bind(binding(7, "second", true));

        let active: Vec<_> = store
            .bindings_for(7)
            .unwrap()
            .into_iter()
            .filter(|b| b.active)
            .collect();
        assert_eq!(active, vec![binding(7, "second", true)]);
    }

    struct DuplicateActive;

    impl BindingStore for DuplicateActive {
        fn bindings_for(&self, policy_type_id: PolicyTypeId) -> Result<Vec<AppBinding>> {
            Ok(vec![
                binding(policy_type_id, "a", true),
                binding(policy_type_id, "b", true),
            ])
        }
    }

    #[test]
    fn test_first_of_several_active_wins() {
        let resolver = AppBindingResolver::new(Arc::new(DuplicateActive));
        assert_eq!(resolver.resolve_active_app(1).unwrap(), Some("a".to_string()));
    }
}
