use std::{error::Error, net::SocketAddr, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use clientes::{
    infrastructure::{connect, SqlCustomerRepository},
    ClientesConfig,
};
use clientes_web::{app, AppState};
use tracing::{error, info, Level};

const GRACE_PERIOD: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    match ClientesConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .init();
            if let Err(error) = serve(&config).await {
                error!("application error: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("configuration error: {}", error)
        }
    }
}

async fn serve(config: &ClientesConfig) -> Result<(), Box<dyn Error>> {
    let addr = config.server.socket_addr().parse::<SocketAddr>()?;
    let pool = connect(&config.database).await?;
    let app = app(AppState::new(SqlCustomerRepository::new(pool.clone())));

    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    let served = match &config.server.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!("listening at https://{}", addr);
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("listening at http://{}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    pool.close().await;
    info!("database pool closed");
    Ok(served?)
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("shutting down, draining in-flight requests");
    handle.graceful_shutdown(Some(GRACE_PERIOD));
}
