//! Tasktime Server
//!
//! HTTP service for personal task and time tracking: accounts, owner-scoped
//! tasks, start/stop timers and AI-assisted task drafting.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod seed;
pub mod services;
pub mod state;

use std::sync::Arc;

use ::auth::{JwtConfig, JwtManager};
use axum::Router;
use enhancer::Enhancer;
use task_store::TaskStore;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::services::clock::Clock;
use crate::state::AppState;

/// Creates the application router with all routes configured.
pub fn create_app<S: TaskStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let timeout = state.config.request_timeout();

    api::create_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware::<S>,
        ))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration, store and clock.
pub fn create_state<S: TaskStore>(
    config: Config,
    store: S,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<AppState<S>>> {
    let jwt_manager = JwtManager::new(
        JwtConfig::new(&config.jwt_secret).with_expiration_hours(config.jwt_expiration_hours),
    );
    let enhancer = Enhancer::new(config.enhancer_config())?;

    Ok(Arc::new(AppState::new(
        config,
        store,
        jwt_manager,
        enhancer,
        clock,
    )))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
