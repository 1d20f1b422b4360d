#![doc = "The `cosmodeck` library crate."]
#![doc = ""]
#![doc = "Accounts, bearer-token authentication and owner-scoped task management"]
#![doc = "for the CosmoDeck API. The server binary (`main.rs`) wires these modules"]
#![doc = "to a Postgres store; tests use the in-memory store."]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::app::AppState;
pub use crate::error::AppError;
