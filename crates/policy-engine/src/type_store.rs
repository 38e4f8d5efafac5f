//! Policy-type store implementations

use a1_core::{A1Error, PolicyType, PolicyTypeId, PolicyTypeStore, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Non-durable store, for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryPolicyTypeStore {
    types: DashMap<PolicyTypeId, PolicyType>,
}

impl MemoryPolicyTypeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyTypeStore for MemoryPolicyTypeStore {
    fn get_type_ids(&self) -> Result<BTreeSet<PolicyTypeId>> {
        Ok(self.types.iter().map(|entry| *entry.key()).collect())
    }

    fn get(&self, policy_type_id: PolicyTypeId) -> Result<Option<PolicyType>> {
        Ok(self
            .types
            .get(&policy_type_id)
            .map(|entry| entry.value().clone()))
    }

    fn exists(&self, policy_type_id: PolicyTypeId) -> Result<bool> {
        Ok(self.types.contains_key(&policy_type_id))
    }

    fn insert(&self, policy_type: PolicyType) -> Result<()> {
        match self.types.entry(policy_type.policy_type_id) {
            Entry::Occupied(entry) => Err(A1Error::PolicyTypeConflict {
                policy_type_id: *entry.key(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(policy_type);
                Ok(())
            }
        }
    }

    fn delete(&self, policy_type_id: PolicyTypeId) -> Result<()> {
        self.types.remove(&policy_type_id);
        Ok(())
    }
}

/// Store backed by a JSON document on disk.
///
/// The whole document is rewritten on every change through a temporary file
/// and a rename, so a crash leaves either the old or the new contents.
/// `insert` and `delete` block on file I/O; async callers run them on the
/// blocking pool.
#[derive(Debug)]
pub struct FilePolicyTypeStore {
    path: PathBuf,
    types: RwLock<BTreeMap<PolicyTypeId, PolicyType>>,
}

impl FilePolicyTypeStore {
    /// Open the store at `path`, loading existing types. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let types = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| A1Error::store(format!("read {} failed: {e}", path.display())))?;
            let stored: Vec<PolicyType> = serde_json::from_str(&raw)?;
            stored
                .into_iter()
                .map(|policy_type| (policy_type.policy_type_id, policy_type))
                .collect()
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), count = types.len(), "Opened policy type store");
        Ok(Self {
            path,
            types: RwLock::new(types),
        })
    }

    fn persist(&self, types: &BTreeMap<PolicyTypeId, PolicyType>) -> Result<()> {
        let document = serde_json::to_string_pretty(&types.values().collect::<Vec<_>>())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                A1Error::store(format!("create {} failed: {e}", parent.display()))
            })?;
        }

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, document)
            .map_err(|e| A1Error::store(format!("write {} failed: {e}", staging.display())))?;
        fs::rename(&staging, &self.path)
            .map_err(|e| A1Error::store(format!("replace {} failed: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), count = types.len(), "Persisted policy types");
        Ok(())
    }
}

impl PolicyTypeStore for FilePolicyTypeStore {
    fn get_type_ids(&self) -> Result<BTreeSet<PolicyTypeId>> {
        Ok(self.types.read().keys().copied().collect())
    }

    fn get(&self, policy_type_id: PolicyTypeId) -> Result<Option<PolicyType>> {
        Ok(self.types.read().get(&policy_type_id).cloned())
    }

    fn insert(&self, policy_type: PolicyType) -> Result<()> {
        let policy_type_id = policy_type.policy_type_id;
        let mut types = self.types.write();
        if types.contains_key(&policy_type_id) {
            return Err(A1Error::PolicyTypeConflict { policy_type_id });
        }

        types.insert(policy_type_id, policy_type);
        if let Err(e) = self.persist(&types) {
            types.remove(&policy_type_id);
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, policy_type_id: PolicyTypeId) -> Result<()> {
        let mut types = self.types.write();
        let Some(removed) = types.remove(&policy_type_id) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&types) {
            types.insert(policy_type_id, removed);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a1_core::{validate_schema_definition, PropertyType, SchemaDefinition};

    fn policy_type(id: PolicyTypeId, name: &str) -> PolicyType {
        PolicyType {
            policy_type_id: id,
            name: name.to_string(),
            description: format!("{name} policy"),
            create_schema: validate_schema_definition(SchemaDefinition::with_properties([(
                "threshold",
                PropertyType::Integer,
            )]))
            .unwrap(),
        }
    }

    fn assert_store_contract(store: &dyn PolicyTypeStore) {
        store.insert(policy_type(7, "first")).unwrap();
        let conflict = store.insert(policy_type(7, "replacement")).unwrap_err();
        assert!(matches!(
            conflict,
            A1Error::PolicyTypeConflict { policy_type_id: 7 }
        ));
        assert_eq!(store.get(7).unwrap().unwrap().name, "first");

        store.insert(policy_type(3, "other")).unwrap();
        assert_eq!(
            store.get_type_ids().unwrap().into_iter().collect::<Vec<_>>(),
            vec![3, 7]
        );
        assert!(store.exists(3).unwrap());

        store.delete(7).unwrap();
        assert!(!store.exists(7).unwrap());
        // idempotent
        store.delete(7).unwrap();
        assert!(store.get(7).unwrap().is_none());
    }

    #[test]
    fn test_memory_store_contract() {
        assert_store_contract(&MemoryPolicyTypeStore::new());
    }

    #[test]
    fn test_file_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePolicyTypeStore::open(dir.path().join("types.json")).unwrap();
        assert_store_contract(&store);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("types.json");

        let store = FilePolicyTypeStore::open(&path).unwrap();
        store.insert(policy_type(20008, "traffic-steering")).unwrap();
        drop(store);

        let reopened = FilePolicyTypeStore::open(&path).unwrap();
        let restored = reopened.get(20008).unwrap().unwrap();
        assert_eq!(restored, policy_type(20008, "traffic-steering"));
        assert_eq!(
            restored.create_schema.property_type("threshold"),
            Some(PropertyType::Integer)
        );
    }

    #[test]
    fn test_file_store_rejects_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("types.json");
        fs::write(
            &path,
            r#"[{"policy_type_id": 1, "name": "n", "description": "d",
                "create_schema": {"properties": {"x": {"type": "string"}}}}]"#,
        )
        .unwrap();

        let err = FilePolicyTypeStore::open(&path).unwrap_err();
        assert_eq!(err.kind(), a1_core::ErrorKind::StoreError);
    }
}
