//! Shared wiring for the HTTP application: service state, extractor error
//! handlers and CORS. Used by `main.rs` and by the integration tests.
//!
//! The `App` itself is assembled by the caller so middleware and extra
//! services can be layered without naming actix-web's service types.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::web;

use crate::auth::TokenKeys;
use crate::error::AppError;
use crate::services::{AuthService, TaskService};
use crate::store::{TaskStore, UserStore};

/// Services shared by all workers.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub tasks: web::Data<TaskService>,
}

impl AppState {
    /// Builds both services on top of one store implementing both ports.
    pub fn new<S>(store: Arc<S>, keys: TokenKeys, bcrypt_cost: u32) -> Self
    where
        S: UserStore + TaskStore,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let tasks: Arc<dyn TaskStore> = store;
        Self {
            auth: web::Data::new(AuthService::new(users, keys, bcrypt_cost)),
            tasks: web::Data::new(TaskService::new(tasks)),
        }
    }

    /// Registers the services and the extractor error handlers on an app.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.tasks.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid request body: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid query: {}", err)).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|_err, _req| {
                AppError::NotFound("Task not found".into()).into()
            }));
    }
}

/// CORS policy: only `frontend_url` (with credentials) when configured,
/// otherwise any origin.
pub fn cors(frontend_url: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    match frontend_url {
        Some(origin) if origin != "*" => cors.allowed_origin(origin).supports_credentials(),
        _ => cors.allow_any_origin(),
    }
}
