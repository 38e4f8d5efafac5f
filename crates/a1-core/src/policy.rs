//! Policy types and the store that persists them

use crate::error::Result;
use crate::schema::{SchemaDefinition, ValidSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Caller-supplied, positive.
pub type PolicyTypeId = u64;

/// A stored policy type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyType {
    pub policy_type_id: PolicyTypeId,
    pub name: String,
    pub description: String,
    pub create_schema: ValidSchema,
}

/// Body of a create-type request. The schema is not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTypeDefinition {
    pub name: String,
    pub description: String,

    /// Ignored on create; the id in the request path is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_type_id: Option<PolicyTypeId>,

    #[serde(default)]
    pub create_schema: SchemaDefinition,
}

/// Durable mapping of policy-type id to definition.
///
/// `insert` must fail with [`A1Error::PolicyTypeConflict`](crate::A1Error::PolicyTypeConflict)
/// when the id is taken; `delete` of an unknown id is not an error.
pub trait PolicyTypeStore: Send + Sync {
    fn get_type_ids(&self) -> Result<BTreeSet<PolicyTypeId>>;

    fn get(&self, policy_type_id: PolicyTypeId) -> Result<Option<PolicyType>>;

    fn exists(&self, policy_type_id: PolicyTypeId) -> Result<bool> {
        Ok(self.get(policy_type_id)?.is_some())
    }

    fn insert(&self, policy_type: PolicyType) -> Result<()>;

    fn delete(&self, policy_type_id: PolicyTypeId) -> Result<()>;
}
