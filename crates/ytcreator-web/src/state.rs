use std::sync::Arc;
use ytcreator_chain::{Pipeline, SessionRegistry};
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The pipeline holds no per-user state; histories live in the session registry.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<Pipeline>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Pipeline) -> Self {
        let sessions = SessionRegistry::with_limits((&config.sessions).into());
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(sessions),
        }
    }
}
