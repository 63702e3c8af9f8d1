//! HTTP service for a task list: CRUD over `/tasks` backed by SQLite.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod service;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::AppError;
pub use service::TaskService;
