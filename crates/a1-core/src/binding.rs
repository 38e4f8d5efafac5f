//! xApp bindings

use crate::error::Result;
use crate::policy::PolicyTypeId;
use serde::{Deserialize, Serialize};

pub type AppName = String;

/// Association of a policy type with a downstream xApp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBinding {
    pub policy_type_id: PolicyTypeId,
    pub app_name: AppName,
    #[serde(default)]
    pub active: bool,
}

/// Source of bindings, owned outside the mediator.
///
/// At most one binding per policy type may be active at a time; the store
/// is responsible for upholding that.
pub trait BindingStore: Send + Sync {
    fn bindings_for(&self, policy_type_id: PolicyTypeId) -> Result<Vec<AppBinding>>;
}
