mod analytics;
mod config;
mod error;
mod logging;
mod models;
mod rest;

use crate::analytics::AnalyticsService;
use crate::config::CONFIG;
use crate::models::irrigation_data::PgEventSource;
use std::io::{Error, ErrorKind};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

static TERMINATED: AtomicU32 = AtomicU32::new(0);

fn register_sigint_handler(shutdown: CancellationToken) -> std::io::Result<()> {
    ctrlc::set_handler(move || {
        let count = TERMINATED.fetch_add(1, Ordering::Relaxed);
        if count >= 1 {
            info!("Force killing");
            std::process::exit(1);
        }
        info!("Shutting down, waiting for running queries");
        shutdown.cancel();
    })
    .map_err(|e| Error::new(ErrorKind::Other, e))
}

#[tokio::main]
pub async fn main() -> std::io::Result<()> {
    logging::init();

    let shutdown = CancellationToken::new();
    register_sigint_handler(shutdown.clone())?;

    let db_conn = models::establish_db_connection()
        .await
        .ok_or_else(|| Error::new(ErrorKind::ConnectionRefused, "Couldn't connect to database"))?;
    if let Err(e) = models::run_migrations(&db_conn).await {
        error!("Failed running migrations: {}", e);
        return Err(Error::new(ErrorKind::Other, e));
    }

    let source = Arc::new(PgEventSource::new(db_conn));
    let service = AnalyticsService::new(source, shutdown.clone(), CONFIG.query_timeout());
    rest::dispatch_server_daemon(service, shutdown).await;

    logging::shutdown();
    Ok(())
}
