//! Lifecycle dispatch results

use crate::binding::AppName;
use crate::endpoints;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Start,
    Stop,
}

impl LifecycleAction {
    /// Path segment on the xApp manager.
    pub fn path(self) -> &'static str {
        match self {
            LifecycleAction::Start => endpoints::XAPP_RUN,
            LifecycleAction::Stop => endpoints::XAPP_STOP,
        }
    }
}

/// Successful lifecycle call; status and body are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub app_name: AppName,
    pub action: LifecycleAction,
    pub status: u16,
    pub body: String,
}

/// What happened downstream after an instance mutation was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchReport {
    NotBound,
    Dispatched {
        app_name: AppName,
        response_code: u16,
        response: String,
    },
    /// `app_name` is absent when the binding lookup itself failed.
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app_name: Option<AppName>,
        error: String,
    },
}

impl DispatchReport {
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchReport::Failed { .. })
    }
}

impl From<DispatchOutcome> for DispatchReport {
    fn from(outcome: DispatchOutcome) -> Self {
        DispatchReport::Dispatched {
            app_name: outcome.app_name,
            response_code: outcome.status,
            response: outcome.body,
        }
    }
}
