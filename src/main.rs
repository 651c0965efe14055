use mimalloc::MiMalloc;
use pandora_helper::config::Config;
use pandora_helper::db::{Repository, SqliteRepository};
use pandora_helper::server::router::{AppState, helper_router};
use pandora_helper::service::Services;
use pandora_helper::upstream::build_http_client;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_toml();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        http_timeout_secs = cfg.http.timeout_secs,
        http_proxy = %cfg.http.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
    );

    let repo: Arc<dyn Repository> =
        Arc::new(SqliteRepository::connect(&cfg.basic.database_url).await?);
    let client = build_http_client(&cfg.http)?;
    let services = Services::new(repo, &cfg, client);

    let admin_password: Arc<str> = Arc::from(cfg.basic.admin_password.clone());
    let state = AppState::new(services, admin_password);
    let app = helper_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
