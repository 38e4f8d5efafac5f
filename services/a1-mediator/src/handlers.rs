//! HTTP handlers for the policy and xApp routes.

use std::collections::BTreeSet;

use a1_core::{
    A1Error, DispatchOutcome, InstanceId, PolicyPayload, PolicyType, PolicyTypeDefinition,
    PolicyTypeId,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
};
use policy_engine::{InstanceCreated, MediatorStats};
use serde_json::{json, Value};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;
type TypePath = Result<Path<PolicyTypeId>, PathRejection>;
type InstancePath = Result<Path<(PolicyTypeId, InstanceId)>, PathRejection>;

/// Run a policy-type mutation on the blocking pool; the file store writes to disk.
async fn blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> a1_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError(A1Error::store(format!("store task failed: {e}"))))?
        .map_err(ApiError::from)
}

#[instrument]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "A1 is healthy",
        "version": a1_core::VERSION
    }))
}

#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> ApiResult<MediatorStats> {
    Ok(Json(state.mediator.stats()?))
}

#[instrument(skip(state))]
pub async fn list_policy_types(State(state): State<AppState>) -> ApiResult<BTreeSet<PolicyTypeId>> {
    Ok(Json(state.mediator.list_types()?))
}

#[instrument(skip(state))]
pub async fn get_policy_type(
    State(state): State<AppState>,
    path: TypePath,
) -> ApiResult<PolicyType> {
    let Path(policy_type_id) = path?;
    Ok(Json(state.mediator.get_type(policy_type_id)?))
}

#[instrument(skip(state, definition))]
pub async fn create_policy_type(
    State(state): State<AppState>,
    path: TypePath,
    definition: Result<Json<PolicyTypeDefinition>, JsonRejection>,
) -> ApiResult<PolicyType> {
    let Path(policy_type_id) = path?;
    let Json(definition) = definition.map_err(ApiError::malformed_definition)?;
    let mediator = state.mediator.clone();
    let created = blocking(move || mediator.create_type(policy_type_id, definition)).await?;
    Ok(Json(created))
}

#[instrument(skip(state))]
pub async fn delete_policy_type(
    State(state): State<AppState>,
    path: TypePath,
) -> ApiResult<Value> {
    let Path(policy_type_id) = path?;
    let mediator = state.mediator.clone();
    blocking(move || mediator.delete_type(policy_type_id)).await?;
    Ok(Json(json!({
        "detail": "Policy type and instances deleted successfully"
    })))
}

#[instrument(skip(state, payload))]
pub async fn create_policy_instance(
    State(state): State<AppState>,
    path: InstancePath,
    payload: Result<Json<PolicyPayload>, JsonRejection>,
) -> ApiResult<InstanceCreated> {
    let Path((policy_type_id, policy_instance_id)) = path?;
    let Json(payload) = payload.map_err(ApiError::malformed_payload)?;
    let created = state
        .mediator
        .create_instance(policy_type_id, policy_instance_id, payload)
        .await?;
    Ok(Json(created))
}

#[instrument(skip(state))]
pub async fn list_policy_instances(
    State(state): State<AppState>,
    path: TypePath,
) -> ApiResult<BTreeSet<InstanceId>> {
    let Path(policy_type_id) = path?;
    Ok(Json(state.mediator.list_instances(policy_type_id)?))
}

#[instrument(skip(state))]
pub async fn get_policy_instance(
    State(state): State<AppState>,
    path: InstancePath,
) -> ApiResult<Value> {
    let Path((policy_type_id, policy_instance_id)) = path?;
    let data = state
        .mediator
        .get_instance(policy_type_id, &policy_instance_id)?;
    Ok(Json(json!({ "data": data })))
}

#[instrument(skip(state))]
pub async fn delete_policy_instance(
    State(state): State<AppState>,
    path: InstancePath,
) -> ApiResult<Value> {
    let Path((policy_type_id, policy_instance_id)) = path?;
    let deleted = state
        .mediator
        .delete_instance(policy_type_id, policy_instance_id)
        .await?;
    Ok(Json(json!({
        "detail": "Policy instance successfully deleted",
        "dispatch": deleted.dispatch
    })))
}

#[instrument(skip(state))]
pub async fn lookup_app(
    State(state): State<AppState>,
    path: TypePath,
) -> ApiResult<Value> {
    let Path(policy_type_id) = path?;
    let app_name = state.mediator.lookup(policy_type_id)?;
    Ok(Json(json!({ "app_name": app_name })))
}

fn lifecycle_response(message: &str, outcome: DispatchOutcome) -> Json<Value> {
    Json(json!({
        "message": message,
        "app_name": outcome.app_name,
        "response_code": outcome.status,
        "response": outcome.body
    }))
}

#[instrument(skip(state))]
pub async fn trigger_xapp(
    State(state): State<AppState>,
    path: TypePath,
) -> ApiResult<Value> {
    let Path(policy_type_id) = path?;
    let outcome = state.mediator.trigger(policy_type_id).await?;
    Ok(lifecycle_response("xApp trigger success", outcome))
}

#[instrument(skip(state))]
pub async fn stop_xapp(
    State(state): State<AppState>,
    path: TypePath,
) -> ApiResult<Value> {
    let Path(policy_type_id) = path?;
    let outcome = state.mediator.stop(policy_type_id).await?;
    Ok(lifecycle_response("xApp stopped", outcome))
}
