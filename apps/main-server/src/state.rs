//! Application state.

use std::sync::Arc;

use auth::JwtManager;
use enhancer::Enhancer;
use task_store::TaskStore;

use crate::config::Config;
use crate::services::clock::Clock;

/// Shared application state.
pub struct AppState<S: TaskStore> {
    /// Server configuration.
    pub config: Config,
    /// Task store.
    pub store: S,
    /// Issues and validates access tokens.
    pub jwt_manager: JwtManager,
    /// Task text enhancement.
    pub enhancer: Enhancer,
    /// Time source for timers.
    pub clock: Arc<dyn Clock>,
}

impl<S: TaskStore> AppState<S> {
    /// Creates new application state.
    pub fn new(
        config: Config,
        store: S,
        jwt_manager: JwtManager,
        enhancer: Enhancer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            jwt_manager,
            enhancer,
            clock,
        }
    }
}
