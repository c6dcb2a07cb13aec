#![forbid(unsafe_code)]

use log::{info, warn};
use refreshmock_core::{init_logging, AppConfig, QueryService, RecordStore};
use refreshmock_http::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let store = config.open_store()?;
    info!(
        "event=http_start module=http status=start bind={} store={} data_dir={} policy={:?}",
        config.bind_addr,
        store.backend(),
        config.data_dir.display(),
        config.read_failure_policy
    );
    let queries = QueryService::with_policy(store, config.read_failure_policy);
    let app = router(AppState::new(queries));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=http_start module=http status=ok addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=http_stop module=http status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=http_stop module=http status=error error={err}");
    }
}
