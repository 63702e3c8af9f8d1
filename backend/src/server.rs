use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::routes;
use crate::service::TaskService;
use crate::store::{Database, SqliteTaskRepository};

/// Open the configured database and wire the service over it.
pub fn build_service(config: &Config) -> Result<Arc<TaskService>, crate::store::StoreError> {
    let db = Database::open(&config.database_path)?;
    tracing::info!(database = %db.path().display(), "task store ready");
    let repo = Arc::new(SqliteTaskRepository::new(db));
    Ok(Arc::new(TaskService::new(repo)))
}

/// Serve until ctrl-c.
pub async fn run(config: &Config, service: Arc<TaskService>) -> std::io::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "task list server listening");

    axum::serve(listener, routes::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
