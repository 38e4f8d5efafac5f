//! Axum router wiring.

use a1_core::endpoints;
use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, state::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handlers::health_check))
        .route(endpoints::STATS, get(handlers::stats))
        .route(endpoints::POLICY_TYPES, get(handlers::list_policy_types))
        .route(
            endpoints::POLICY_TYPE,
            get(handlers::get_policy_type)
                .put(handlers::create_policy_type)
                .delete(handlers::delete_policy_type),
        )
        .route(
            endpoints::POLICY_INSTANCES,
            get(handlers::list_policy_instances),
        )
        .route(
            endpoints::POLICY_INSTANCE,
            get(handlers::get_policy_instance)
                .put(handlers::create_policy_instance)
                .delete(handlers::delete_policy_instance),
        )
        .route(endpoints::LOOKUP, get(handlers::lookup_app))
        .route(endpoints::TRIGGER_XAPP, post(handlers::trigger_xapp))
        .route(endpoints::STOP_XAPP, post(handlers::stop_xapp))
        .with_state(state)
}
