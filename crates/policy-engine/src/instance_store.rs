//! Volatile policy-instance storage
//!
//! Instances live only in process memory and are lost on restart. Known
//! policy types are tracked explicitly, so a defined type with no instances
//! lists as empty rather than unknown.

use a1_core::{A1Error, InstanceId, PolicyPayload, PolicyTypeId, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct PolicyInstanceStore {
    instances: RwLock<HashMap<PolicyTypeId, BTreeMap<InstanceId, PolicyPayload>>>,
}

impl PolicyInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a policy type. No-op if already tracked.
    pub fn track(&self, policy_type_id: PolicyTypeId) {
        self.instances.write().entry(policy_type_id).or_default();
    }

    pub fn is_tracked(&self, policy_type_id: PolicyTypeId) -> bool {
        self.instances.read().contains_key(&policy_type_id)
    }

    /// Store an instance, returning the payload it replaced.
    pub fn put(
        &self,
        policy_type_id: PolicyTypeId,
        instance_id: InstanceId,
        payload: PolicyPayload,
    ) -> Option<PolicyPayload> {
        self.instances
            .write()
            .entry(policy_type_id)
            .or_default()
            .insert(instance_id, payload)
    }

    pub fn get(&self, policy_type_id: PolicyTypeId, instance_id: &str) -> Result<PolicyPayload> {
        self.instances
            .read()
            .get(&policy_type_id)
            .and_then(|instances| instances.get(instance_id))
            .cloned()
            .ok_or_else(|| A1Error::PolicyInstanceNotFound {
                policy_type_id,
                instance_id: instance_id.to_string(),
            })
    }

    /// Instance ids of a tracked type, sorted.
    pub fn get_all_ids(&self, policy_type_id: PolicyTypeId) -> Result<BTreeSet<InstanceId>> {
        self.instances
            .read()
            .get(&policy_type_id)
            .map(|instances| instances.keys().cloned().collect())
            .ok_or(A1Error::PolicyTypeNotFound { policy_type_id })
    }

    pub fn delete(&self, policy_type_id: PolicyTypeId, instance_id: &str) -> Result<PolicyPayload> {
        self.instances
            .write()
            .get_mut(&policy_type_id)
            .and_then(|instances| instances.remove(instance_id))
            .ok_or_else(|| A1Error::PolicyInstanceNotFound {
                policy_type_id,
                instance_id: instance_id.to_string(),
            })
    }

    /// Drop every instance of a type and stop tracking it. Returns how many were removed.
    pub fn delete_all_for_type(&self, policy_type_id: PolicyTypeId) -> usize {
        self.instances
            .write()
            .remove(&policy_type_id)
            .map_or(0, |instances| instances.len())
    }

    pub fn instance_count(&self) -> usize {
        self.instances.read().values().map(BTreeMap::len).sum()
    }
}
