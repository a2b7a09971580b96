// src/bin/api_server.rs

use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use vehicle_inventory::infra::{config::Config, database, logging};
use vehicle_inventory::storage::Repositories;
use vehicle_inventory::transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(config.environment);
    info!("starting vehicle inventory API");
    config.log_summary();

    let pool = database::connect(&config).await?;
    let app_state = transport::http::AppState::new(Repositories::postgres(pool.clone()));
    let app = transport::http::build_app(app_state, config.frontend_url.as_deref());

    let address = format!("0.0.0.0:{}", config.api_port);
    let listener = TcpListener::bind(&address).await?;
    info!("API server listening on http://{}", address);
    info!("Swagger UI available at http://localhost:{}/docs", config.api_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
