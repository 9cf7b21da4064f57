pub mod config;
pub mod errors;
pub mod gateway;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use gateway::{ContentClient, Session};
use models::RoleMatcher;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub client: ContentClient,
    pub session: Arc<Session>,
    pub roles: RoleMatcher,
}

impl AppState {
    /// State with an empty session; install a credential before serving views.
    pub fn new(config: config::AppConfig) -> Result<Self, errors::AppError> {
        Ok(Self {
            client: ContentClient::new(&config)?,
            session: Arc::new(Session::new()),
            roles: RoleMatcher::from_config(&config),
            config,
        })
    }
}
