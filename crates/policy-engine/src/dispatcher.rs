//! Lifecycle calls to the xApp manager

use a1_core::{DispatchError, DispatchOutcome, LifecycleAction};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

/// Starts and stops downstream xApps.
///
/// One call per request: no retries, and no timeout beyond the transport's own.
#[async_trait]
pub trait LifecycleDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        app_name: &str,
        action: LifecycleAction,
    ) -> Result<DispatchOutcome, DispatchError>;

    async fn start(&self, app_name: &str) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch(app_name, LifecycleAction::Start).await
    }

    async fn stop(&self, app_name: &str) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch(app_name, LifecycleAction::Stop).await
    }
}

/// Posts `{"app_name": ...}` to `{base}/run` or `{base}/stop`.
#[derive(Debug, Clone)]
pub struct HttpLifecycleDispatcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLifecycleDispatcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LifecycleDispatcher for HttpLifecycleDispatcher {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn dispatch(
        &self,
        app_name: &str,
        action: LifecycleAction,
    ) -> Result<DispatchOutcome, DispatchError> {
        let url = format!("{}/{}", self.base_url, action.path());
        let transport = |e: reqwest::Error| DispatchError::Transport {
            app_name: app_name.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&json!({ "app_name": app_name }))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!(%url, status = status.as_u16(), "Lifecycle call returned");

        if !status.is_success() {
            return Err(DispatchError::Rejected {
                app_name: app_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(DispatchOutcome {
            app_name: app_name.to_string(),
            action,
            status: status.as_u16(),
            body,
        })
    }
}
